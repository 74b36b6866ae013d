//! Sampling rectangle, Z clipping range and the grid built over them.
use log::warn;
use ndarray::{Array1, Array2};
use thiserror::Error;

pub const DEFAULT_BOUND: f64 = 2.0;
pub const DEFAULT_Z_BOUND: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    #[error("'{text}' is not a valid number for {field}")]
    InvalidNumber { field: String, text: String },
    #[error("{axis} bounds are reversed: min {min} > max {max}")]
    ReversedAxis { axis: String, min: f64, max: f64 },
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: String, value: f64 },
    #[error("grid resolution must be at least 1")]
    ZeroResolution,
}

/// Parse an optional bound typed by the user; blank text means `default`.
pub fn parse_bound(field: &str, text: &str, default: f64) -> Result<f64, DomainError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| DomainError::InvalidNumber {
            field: field.to_string(),
            text: trimmed.to_string(),
        })
}

fn check_axis(axis: &str, min: f64, max: f64) -> Result<(), DomainError> {
    for (field, value) in [(format!("{}_min", axis), min), (format!("{}_max", axis), max)] {
        if !value.is_finite() {
            return Err(DomainError::NonFinite { field, value });
        }
    }
    if min > max {
        warn!("rejecting reversed {} axis [{}, {}]", axis, min, max);
        return Err(DomainError::ReversedAxis {
            axis: axis.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

/// Real/imaginary sampling bounds of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainRectangle {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for DomainRectangle {
    fn default() -> Self {
        DomainRectangle {
            x_min: -DEFAULT_BOUND,
            x_max: DEFAULT_BOUND,
            y_min: -DEFAULT_BOUND,
            y_max: DEFAULT_BOUND,
        }
    }
}

impl DomainRectangle {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        DomainRectangle {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Build from free-text fields. Blank fields fall back to −2/2.
    pub fn from_texts(x_min: &str, x_max: &str, y_min: &str, y_max: &str) -> Result<Self, DomainError> {
        let domain = DomainRectangle {
            x_min: parse_bound("x_min", x_min, -DEFAULT_BOUND)?,
            x_max: parse_bound("x_max", x_max, DEFAULT_BOUND)?,
            y_min: parse_bound("y_min", y_min, -DEFAULT_BOUND)?,
            y_max: parse_bound("y_max", y_max, DEFAULT_BOUND)?,
        };
        domain.validate()?;
        Ok(domain)
    }

    /// min ≤ max on both axes, all bounds finite. Equal bounds are allowed.
    pub fn validate(&self) -> Result<(), DomainError> {
        check_axis("x", self.x_min, self.x_max)?;
        check_axis("y", self.y_min, self.y_max)
    }
}

/// Vertical clipping range of the surface plots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZRange {
    pub z_min: f64,
    pub z_max: f64,
}

impl Default for ZRange {
    fn default() -> Self {
        ZRange {
            z_min: -DEFAULT_Z_BOUND,
            z_max: DEFAULT_Z_BOUND,
        }
    }
}

impl ZRange {
    pub fn new(z_min: f64, z_max: f64) -> Self {
        ZRange { z_min, z_max }
    }

    pub fn from_texts(z_min: &str, z_max: &str) -> Result<Self, DomainError> {
        let range = ZRange {
            z_min: parse_bound("z_min", z_min, -DEFAULT_Z_BOUND)?,
            z_max: parse_bound("z_max", z_max, DEFAULT_Z_BOUND)?,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        check_axis("z", self.z_min, self.z_max)
    }

    /// vertical range of the magnitude surface, [0, z_max]
    pub fn magnitude_range(&self) -> (f64, f64) {
        (0.0, self.z_max.max(0.0))
    }
}

/// `num_values` evenly spaced points over [start, end], both ends included.
pub fn linspace(start: f64, end: f64, num_values: usize) -> Array1<f64> {
    if num_values == 1 {
        return Array1::from_elem(1, start);
    }
    let step = (end - start) / (num_values as f64 - 1.0);
    Array1::from_shape_fn(num_values, |i| {
        if i + 1 == num_values {
            end
        } else {
            start + i as f64 * step
        }
    })
}

/// numpy-style meshgrid: rows follow `y`, columns follow `x`.
pub fn meshgrid(x: &Array1<f64>, y: &Array1<f64>) -> (Array2<f64>, Array2<f64>) {
    let shape = (y.len(), x.len());
    let xx = Array2::from_shape_fn(shape, |(_, j)| x[j]);
    let yy = Array2::from_shape_fn(shape, |(i, _)| y[i]);
    (xx, yy)
}

/// The N×N coordinate mesh over a domain rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub xx: Array2<f64>,
    pub yy: Array2<f64>,
}

impl SampleGrid {
    pub fn new(domain: &DomainRectangle, resolution: usize) -> Result<SampleGrid, DomainError> {
        domain.validate()?;
        if resolution == 0 {
            return Err(DomainError::ZeroResolution);
        }
        let x = linspace(domain.x_min, domain.x_max, resolution);
        let y = linspace(domain.y_min, domain.y_max, resolution);
        let (xx, yy) = meshgrid(&x, &y);
        Ok(SampleGrid { x, y, xx, yy })
    }

    pub fn shape(&self) -> (usize, usize) {
        self.xx.dim()
    }
}
