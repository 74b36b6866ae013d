//! TOML plot file.
//!
//! ```toml
//! [domain]
//! x_min = -3.0
//! x_max = 3.0
//!
//! [expressions]
//! z = "x + i*y"
//! functions = ["gamma(z)", "1/z"]
//!
//! [plot]
//! colorscale = "Twilight"
//! format = "png"
//!
//! [logging]
//! level = "debug"
//! ```
//! Every key is optional; missing keys take the defaults of
//! [`PlotRequest`] and [`RenderSettings`].
use crate::Utils::color_scales::ColorScale;
use crate::Utils::plots::{OutputFormat, RenderSettings};
use crate::numerical::domain::{DomainError, DomainRectangle, ZRange};
use crate::numerical::plot_request::PlotRequest;
use crate::symbolic::complex_eval::EvalOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    TomlWrite(#[from] toml::ser::Error),
    #[error("unknown log level '{0}' (expected off, error, warn, info or debug)")]
    UnknownLogLevel(String),
    #[error("unknown color scale '{0}'")]
    UnknownColorScale(String),
    #[error("unknown output format '{0}' (expected svg or png)")]
    UnknownFormat(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DomainSection {
    pub x_min: Option<f64>,
    pub x_max: Option<f64>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub z_min: Option<f64>,
    pub z_max: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpressionsSection {
    /// z-mapping; blank or missing means `X + i*Y`
    pub z: Option<String>,
    pub functions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotSection {
    pub colorscale: Option<String>,
    pub resolution: Option<usize>,
    pub render_stride: Option<usize>,
    pub format: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub strict_domain: Option<bool>,
    pub parallel: Option<bool>,
    pub export_csv: Option<bool>,
    /// tab separated copy of each surface table, implies `export_csv`
    pub export_tsv: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlotConfig {
    pub domain: DomainSection,
    pub expressions: ExpressionsSection,
    pub plot: PlotSection,
    pub logging: LoggingSection,
}

impl PlotConfig {
    pub fn from_toml_str(text: &str) -> Result<PlotConfig, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<PlotConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        PlotConfig::from_toml_str(&content)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn color_scale(&self) -> Result<ColorScale, ConfigError> {
        match &self.plot.colorscale {
            Some(name) => {
                ColorScale::from_str(name).map_err(|_| ConfigError::UnknownColorScale(name.clone()))
            }
            None => Ok(ColorScale::default()),
        }
    }

    pub fn log_level(&self) -> &str {
        self.logging.level.as_deref().unwrap_or("info")
    }

    pub fn export_csv(&self) -> bool {
        self.plot.export_csv.unwrap_or(false) || self.export_tsv()
    }

    pub fn export_tsv(&self) -> bool {
        self.plot.export_tsv.unwrap_or(false)
    }

    /// Build the compute request; bounds are validated here.
    pub fn to_request(&self) -> Result<PlotRequest, ConfigError> {
        let defaults = PlotRequest::default();
        let d = &self.domain;
        let domain = DomainRectangle {
            x_min: d.x_min.unwrap_or(defaults.domain.x_min),
            x_max: d.x_max.unwrap_or(defaults.domain.x_max),
            y_min: d.y_min.unwrap_or(defaults.domain.y_min),
            y_max: d.y_max.unwrap_or(defaults.domain.y_max),
        };
        domain.validate()?;
        let z_range = ZRange {
            z_min: d.z_min.unwrap_or(defaults.z_range.z_min),
            z_max: d.z_max.unwrap_or(defaults.z_range.z_max),
        };
        z_range.validate()?;
        let functions = if self.expressions.functions.is_empty() {
            defaults.functions
        } else {
            self.expressions.functions.clone()
        };
        Ok(PlotRequest {
            domain,
            z_range,
            z_mapping: self.expressions.z.clone().unwrap_or_default(),
            functions,
            color_scale: self.color_scale()?,
            resolution: self.plot.resolution.unwrap_or(defaults.resolution),
            eval_options: EvalOptions {
                strict_domain: self.plot.strict_domain.unwrap_or(defaults.eval_options.strict_domain),
            },
            parallel: self.plot.parallel.unwrap_or(defaults.parallel),
        })
    }

    pub fn render_settings(&self) -> Result<RenderSettings, ConfigError> {
        let defaults = RenderSettings::default();
        let format = match &self.plot.format {
            Some(name) => OutputFormat::from_str(name).map_err(|_| ConfigError::UnknownFormat(name.clone()))?,
            None => defaults.format,
        };
        Ok(RenderSettings {
            format,
            render_stride: self.plot.render_stride.unwrap_or(defaults.render_stride),
            output_dir: self.plot.output_dir.clone().unwrap_or(defaults.output_dir.clone()),
            ..defaults
        })
    }

    /// Commented starting point for a plot file.
    pub fn sample_config() -> String {
        r#"# complex function plot
[domain]
x_min = -2.0
x_max = 2.0
y_min = -2.0
y_max = 2.0
z_min = -5.0
z_max = 5.0

[expressions]
# z-mapping over X (real part) and Y (imaginary part)
z = "x + i*y"
functions = ["z**2", "sin(z)"]

[plot]
colorscale = "Viridis"
resolution = 200
render_stride = 4
format = "svg"
output_dir = "plots"
strict_domain = true
parallel = false
export_csv = false
export_tsv = false

[logging]
level = "info"
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_gives_defaults() {
        let config = PlotConfig::from_toml_str("").unwrap();
        assert_eq!(config.to_request().unwrap(), PlotRequest::default());
        assert_eq!(config.render_settings().unwrap(), RenderSettings::default());
        assert_eq!(config.log_level(), "info");
        assert!(!config.export_csv());
        assert!(!config.export_tsv());
    }

    #[test]
    fn test_tsv_export_implies_csv() {
        let config = PlotConfig::from_toml_str("[plot]\nexport_tsv = true\n").unwrap();
        assert!(config.export_tsv());
        assert!(config.export_csv());
    }

    #[test]
    fn test_sample_config_round_trips_into_request() {
        let config = PlotConfig::from_toml_str(&PlotConfig::sample_config()).unwrap();
        let request = config.to_request().unwrap();
        assert_eq!(request.functions, vec!["z**2", "sin(z)"]);
        assert_eq!(request.z_mapping, "x + i*y");
        assert_eq!(request.color_scale, ColorScale::Viridis);
        assert_eq!(request.resolution, 200);
    }

    #[test]
    fn test_partial_domain() {
        let config = PlotConfig::from_toml_str("[domain]\nx_min = -1.0\nz_max = 10.0\n").unwrap();
        let request = config.to_request().unwrap();
        assert_eq!(request.domain, DomainRectangle::new(-1.0, 2.0, -2.0, 2.0));
        assert_eq!(request.z_range, ZRange::new(-5.0, 10.0));
    }

    #[test]
    fn test_reversed_domain_in_config() {
        let config = PlotConfig::from_toml_str("[domain]\ny_min = 3.0\ny_max = 1.0\n").unwrap();
        assert!(matches!(
            config.to_request().unwrap_err(),
            ConfigError::Domain(DomainError::ReversedAxis { .. })
        ));
    }

    #[test]
    fn test_unknown_names() {
        let config = PlotConfig::from_toml_str("[plot]\ncolorscale = \"Hot\"\nformat = \"pdf\"\n").unwrap();
        assert!(matches!(config.to_request().unwrap_err(), ConfigError::UnknownColorScale(_)));
        assert!(matches!(config.render_settings().unwrap_err(), ConfigError::UnknownFormat(_)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(matches!(
            PlotConfig::from_toml_str("[plot]\ncolour = \"Jet\"\n").unwrap_err(),
            ConfigError::Toml(_)
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plot.toml");
        let mut config = PlotConfig::default();
        config.expressions.functions = vec!["gamma(z)".to_string()];
        config.plot.colorscale = Some("PurRd".to_string());
        config.plot.format = Some("png".to_string());
        config.save_to_file(&path).unwrap();
        let loaded = PlotConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.color_scale().unwrap(), ColorScale::PuRd);
        assert_eq!(loaded.render_settings().unwrap().format, OutputFormat::Png);
    }
}
