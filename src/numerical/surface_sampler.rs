//! # Surface sampler
//!
//! Evaluates one function expression over the sample grid:
//! 1. `x`, `y` = linspace over the domain rectangle, `(X, Y)` = meshgrid
//! 2. `Z` = z-mapping(X, Y)
//! 3. `F` = f(z = Z, X = Re Z, Y = Im Z)
//! 4. real, imaginary, magnitude and phase (= arg F / π) arrays
//! 5. a 1-D slice along the real axis, `X = t`, `Y = 0`
//!
//! The mapped grid (steps 1 and 2) is computed once by [`SurfaceSampler::prepare`]
//! and shared by every function row.
use crate::numerical::domain::{DomainError, DomainRectangle, SampleGrid, linspace};
use crate::numerical::plot_request::PlotError;
use crate::symbolic::complex_engine::Expr;
use crate::symbolic::complex_eval::{ComplexArray, Environment, EvalOptions, evaluate, scalar};
use crate::symbolic::symbolic_errors::EvalError;
use log::{debug, info, warn};
use ndarray::{Array, Array1, Array2, ArrayBase, Data, Dimension, Ix0, Ix1, Ix2, IxDyn};
use num_complex::Complex64;
use std::f64::consts::PI;
use std::time::Instant;

pub const DEFAULT_RESOLUTION: usize = 200;

fn lift<S, D>(real: &ArrayBase<S, D>) -> ComplexArray
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    real.mapv(|v| Complex64::new(v, 0.0)).into_dyn()
}

/// Broadcast an evaluation result onto the expected shape.
fn fit_to_shape<D: Dimension>(
    operation: &str,
    value: ComplexArray,
    shape: &[usize],
) -> Result<Array<Complex64, D>, EvalError> {
    let left = value.shape().to_vec();
    let mismatch = move || EvalError::ShapeMismatch {
        operation: operation.to_string(),
        left: left.clone(),
        right: shape.to_vec(),
    };
    let full = if value.shape() == shape {
        value
    } else {
        value
            .broadcast(IxDyn(shape))
            .ok_or_else(&mismatch)?
            .to_owned()
    };
    full.into_dimensionality::<D>().map_err(|_| mismatch())
}

/// Grid coordinates together with the z-mapping applied to them.
#[derive(Debug, Clone)]
pub struct MappedGrid {
    pub grid: SampleGrid,
    /// complex coordinate at every grid node
    pub z: Array2<Complex64>,
    /// real-axis parameter
    pub t: Array1<f64>,
    /// z-mapping applied to `X = t, Y = 0`; its failure only costs the real-axis curve
    pub z_slice: Result<Array1<Complex64>, EvalError>,
}

/// 1-D real-axis trace of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct RealSlice {
    pub t: Array1<f64>,
    pub values: Array1<Complex64>,
    pub real: Array1<f64>,
}

/// Evaluated field of one function row and the arrays derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledSurface {
    pub expression: String,
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub xx: Array2<f64>,
    pub yy: Array2<f64>,
    pub values: Array2<Complex64>,
    pub real: Array2<f64>,
    pub imag: Array2<f64>,
    pub magnitude: Array2<f64>,
    /// arg(F) / π, in [−1, 1]
    pub phase: Array2<f64>,
    /// a pole on the real axis fails the curve, not the surfaces
    pub real_slice: Result<RealSlice, EvalError>,
}

impl SampledSurface {
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn non_finite_count(&self) -> usize {
        self.values
            .iter()
            .filter(|v| !(v.re.is_finite() && v.im.is_finite()))
            .count()
    }
}

/// min and max over the finite entries, None if there are none
pub fn finite_range<'a>(values: impl IntoIterator<Item = &'a f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

pub fn normalized_phase(value: Complex64) -> f64 {
    value.arg() / PI
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSampler {
    pub domain: DomainRectangle,
    /// points per axis
    pub resolution: usize,
    pub options: EvalOptions,
}

impl SurfaceSampler {
    pub fn new(domain: DomainRectangle) -> SurfaceSampler {
        SurfaceSampler {
            domain,
            resolution: DEFAULT_RESOLUTION,
            options: EvalOptions::default(),
        }
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_options(mut self, options: EvalOptions) -> Self {
        self.options = options;
        self
    }

    pub fn grid(&self) -> Result<SampleGrid, DomainError> {
        SampleGrid::new(&self.domain, self.resolution)
    }

    /// Steps 1 and 2, plus the mapped real-axis parameter.
    pub fn prepare(&self, z_mapping: &Expr) -> Result<MappedGrid, PlotError> {
        let grid = self.grid()?;
        let shape = [grid.y.len(), grid.x.len()];
        debug!("Evaluating Z function {} on a {}x{} grid", z_mapping, shape[0], shape[1]);
        let env = Environment::new()
            .with("X", lift(&grid.xx))
            .with("Y", lift(&grid.yy));
        let z = fit_to_shape::<Ix2>("z-mapping", evaluate(z_mapping, &env, self.options)?, &shape)?;

        let t = linspace(self.domain.x_min, self.domain.x_max, self.resolution);
        let slice_env = Environment::new()
            .with("X", lift(&t))
            .with("Y", Array1::from_elem(t.len(), Complex64::new(0.0, 0.0)).into_dyn());
        let z_slice = evaluate(z_mapping, &slice_env, self.options)
            .and_then(|v| fit_to_shape::<Ix1>("z-mapping", v, &[t.len()]));
        if let Err(e) = &z_slice {
            warn!("real-axis slice of the z-mapping is unavailable: {}", e);
        }
        Ok(MappedGrid { grid, z, t, z_slice })
    }

    fn function_env(z: ComplexArray) -> Environment {
        let x = z.mapv(|v| Complex64::new(v.re, 0.0));
        let y = z.mapv(|v| Complex64::new(v.im, 0.0));
        Environment::new().with("z", z).with("X", x).with("Y", y)
    }

    /// Steps 3 to 5 for one compiled function.
    pub fn sample_function(
        &self,
        mapped: &MappedGrid,
        function: &Expr,
        label: &str,
    ) -> Result<SampledSurface, EvalError> {
        let begin = Instant::now();
        let shape = mapped.z.shape().to_vec();
        let env = Self::function_env(mapped.z.clone().into_dyn());
        let values = fit_to_shape::<Ix2>(label, evaluate(function, &env, self.options)?, &shape)?;

        let real_slice = mapped.z_slice.clone().and_then(|z_slice| {
            let slice_env = Self::function_env(z_slice.into_dyn());
            let slice_values = fit_to_shape::<Ix1>(
                label,
                evaluate(function, &slice_env, self.options)?,
                &[mapped.t.len()],
            )?;
            Ok(RealSlice {
                t: mapped.t.clone(),
                real: slice_values.mapv(|v| v.re),
                values: slice_values,
            })
        });
        if let Err(e) = &real_slice {
            warn!("real-axis curve of '{}' skipped: {}", label, e);
        }

        let surface = SampledSurface {
            expression: label.to_string(),
            x: mapped.grid.x.clone(),
            y: mapped.grid.y.clone(),
            xx: mapped.grid.xx.clone(),
            yy: mapped.grid.yy.clone(),
            real: values.mapv(|v| v.re),
            imag: values.mapv(|v| v.im),
            magnitude: values.mapv(|v| v.norm()),
            phase: values.mapv(normalized_phase),
            real_slice,
            values,
        };
        info!(
            "sampled '{}' on {}x{} points in {} ms",
            label,
            shape[0],
            shape[1],
            begin.elapsed().as_millis()
        );
        Ok(surface)
    }

    /// Evaluate `function` at the single grid point `(x, y)`.
    pub fn evaluate_at(&self, z_mapping: &Expr, function: &Expr, x: f64, y: f64) -> Result<Complex64, EvalError> {
        let env = Environment::new()
            .with("X", scalar(Complex64::new(x, 0.0)))
            .with("Y", scalar(Complex64::new(y, 0.0)));
        let z = fit_to_shape::<Ix0>("z-mapping", evaluate(z_mapping, &env, self.options)?, &[])?;
        let value = evaluate(function, &Self::function_env(z.into_dyn()), self.options)?;
        Ok(fit_to_shape::<Ix0>(&function.to_string(), value, &[])?.into_scalar())
    }

    /// One-shot sampling of a single function.
    pub fn sample(&self, z_mapping: &Expr, function: &Expr) -> Result<SampledSurface, PlotError> {
        let mapped = self.prepare(z_mapping)?;
        Ok(self.sample_function(&mapped, function, &function.to_string())?)
    }
}
