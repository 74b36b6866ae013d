//! Plot request value object and the pure compute step behind every update.
//!
//! A [`PlotRequest`] holds everything one update needs. [`compute`] turns it
//! into a [`PlotOutput`] with one [`RowOutcome`] per function row. A row that
//! fails keeps its own error and the other rows are still sampled. Only the
//! shared inputs (domain, resolution, z-mapping) abort the whole update.
use crate::Utils::color_scales::ColorScale;
use crate::numerical::domain::{DomainError, DomainRectangle, ZRange};
use crate::numerical::surface_sampler::{
    DEFAULT_RESOLUTION, MappedGrid, SampledSurface, SurfaceSampler, finite_range,
};
use crate::symbolic::complex_eval::EvalOptions;
use crate::symbolic::preprocess::{preprocess_function, preprocess_z_mapping};
use crate::symbolic::symbolic_errors::{EvalError, PreprocessError};
use log::{error, info, warn};
use rayon::prelude::*;
use std::time::Instant;
use tabled::{builder::Builder, settings::Style};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlotError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Preprocess(#[from] PreprocessError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("z-mapping '{source_text}': {reason}")]
    ZMapping { source_text: String, reason: String },
    #[error("no function expressions to plot")]
    NoFunctions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub domain: DomainRectangle,
    pub z_range: ZRange,
    /// blank means `X + i*Y`
    pub z_mapping: String,
    pub functions: Vec<String>,
    pub color_scale: ColorScale,
    pub resolution: usize,
    pub eval_options: EvalOptions,
    /// sample the rows on the rayon pool
    pub parallel: bool,
}

impl Default for PlotRequest {
    fn default() -> Self {
        PlotRequest {
            domain: DomainRectangle::default(),
            z_range: ZRange::default(),
            z_mapping: String::new(),
            functions: vec!["z".to_string()],
            color_scale: ColorScale::default(),
            resolution: DEFAULT_RESOLUTION,
            eval_options: EvalOptions::default(),
            parallel: false,
        }
    }
}

impl PlotRequest {
    pub fn new(functions: Vec<&str>) -> PlotRequest {
        PlotRequest {
            functions: functions.into_iter().map(|f| f.to_string()).collect(),
            ..PlotRequest::default()
        }
    }

    pub fn with_domain(mut self, domain: DomainRectangle) -> Self {
        self.domain = domain;
        self
    }

    pub fn with_z_mapping(mut self, z_mapping: &str) -> Self {
        self.z_mapping = z_mapping.to_string();
        self
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn sampler(&self) -> SurfaceSampler {
        SurfaceSampler::new(self.domain)
            .with_resolution(self.resolution)
            .with_options(self.eval_options)
    }
}

/// Result of one function row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub index: usize,
    pub expression: String,
    pub result: Result<SampledSurface, PlotError>,
}

impl RowOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn surface(&self) -> Option<&SampledSurface> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&PlotError> {
        self.result.as_ref().err()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotOutput {
    pub request: PlotRequest,
    /// the z-mapping as it was evaluated
    pub z_mapping: String,
    pub rows: Vec<RowOutcome>,
}

fn format_range(range: Option<(f64, f64)>) -> String {
    match range {
        Some((lo, hi)) => format!("[{:.4}, {:.4}]", lo, hi),
        None => "-".to_string(),
    }
}

impl PlotOutput {
    pub fn surfaces(&self) -> impl Iterator<Item = &SampledSurface> {
        self.rows.iter().filter_map(|row| row.surface())
    }

    pub fn failures(&self) -> impl Iterator<Item = &RowOutcome> {
        self.rows.iter().filter(|row| !row.is_ok())
    }

    pub fn all_failed(&self) -> bool {
        self.rows.iter().all(|row| !row.is_ok())
    }

    /// Per-row statistics rendered as a table.
    pub fn summary_table(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record([
            "#", "expression", "status", "Re", "Im", "|f|", "non-finite", "real axis",
        ]);
        for row in &self.rows {
            let record = match &row.result {
                Ok(surface) => vec![
                    row.index.to_string(),
                    row.expression.clone(),
                    "ok".to_string(),
                    format_range(finite_range(surface.real.iter())),
                    format_range(finite_range(surface.imag.iter())),
                    format_range(finite_range(surface.magnitude.iter())),
                    surface.non_finite_count().to_string(),
                    match &surface.real_slice {
                        Ok(_) => "ok".to_string(),
                        Err(e) => format!("skipped: {}", e),
                    },
                ],
                Err(e) => vec![
                    row.index.to_string(),
                    row.expression.clone(),
                    format!("error: {}", e),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    "-".to_string(),
                ],
            };
            builder.push_record(record);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

fn compute_row(sampler: &SurfaceSampler, mapped: &MappedGrid, text: &str) -> Result<SampledSurface, PlotError> {
    let pre = preprocess_function(text)?;
    let expr = pre.parse().map_err(PreprocessError::from)?;
    Ok(sampler.sample_function(mapped, &expr, &pre.source)?)
}

/// Sample every function row of `request`.
pub fn compute(request: &PlotRequest) -> Result<PlotOutput, PlotError> {
    let begin = Instant::now();
    if request.functions.is_empty() {
        return Err(PlotError::NoFunctions);
    }
    request.domain.validate()?;
    request.z_range.validate()?;

    let mapping = preprocess_z_mapping(&request.z_mapping)?;
    let mapping_expr = mapping.parse().map_err(|e| PlotError::ZMapping {
        source_text: mapping.source.clone(),
        reason: e.to_string(),
    })?;
    let sampler = request.sampler();
    let mapped = sampler.prepare(&mapping_expr).map_err(|e| match e {
        PlotError::Eval(e) => PlotError::ZMapping {
            source_text: mapping.source.clone(),
            reason: e.to_string(),
        },
        other => other,
    })?;

    let run_row = |(index, text): (usize, &String)| {
        let result = compute_row(&sampler, &mapped, text);
        if let Err(e) = &result {
            warn!("row {} '{}' failed: {}", index, text.trim(), e);
        }
        RowOutcome {
            index,
            expression: text.trim().to_string(),
            result,
        }
    };
    let rows: Vec<RowOutcome> = if request.parallel {
        request.functions.par_iter().enumerate().map(run_row).collect()
    } else {
        request.functions.iter().enumerate().map(run_row).collect()
    };

    let output = PlotOutput {
        request: request.clone(),
        z_mapping: mapping.normalized(),
        rows,
    };
    if output.all_failed() {
        error!("every function row failed");
    }
    info!(
        "computed {} row(s) in {} ms",
        output.rows.len(),
        begin.elapsed().as_millis()
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_errors::ParseError;

    #[test]
    fn test_default_request() {
        let request = PlotRequest::default();
        assert_eq!(request.functions, vec!["z"]);
        assert_eq!(request.resolution, 200);
        assert!(request.eval_options.strict_domain);
    }

    #[test]
    fn test_failing_row_does_not_abort_others() {
        let request = PlotRequest::new(vec!["z", "w + 1", "sin(z)"]).with_resolution(10);
        let output = compute(&request).unwrap();
        assert_eq!(output.rows.len(), 3);
        assert!(output.rows[0].is_ok());
        assert_eq!(
            output.rows[1].error(),
            Some(&PlotError::Eval(EvalError::UnknownVariable("w".to_string())))
        );
        assert!(output.rows[2].is_ok());
        assert_eq!(output.surfaces().count(), 2);
        assert_eq!(output.failures().count(), 1);
    }

    #[test]
    fn test_empty_row_reports_its_own_error() {
        let request = PlotRequest::new(vec!["", "z"]).with_resolution(4);
        let output = compute(&request).unwrap();
        assert_eq!(
            output.rows[0].error(),
            Some(&PlotError::Preprocess(PreprocessError::EmptyExpression))
        );
        assert!(output.rows[1].is_ok());
    }

    #[test]
    fn test_deeply_nested_row_is_a_row_error() {
        let nested = format!("{}z{}", "(".repeat(5000), ")".repeat(5000));
        let output = compute(&PlotRequest::new(vec!["z", nested.as_str(), "z + 1"]).with_resolution(4)).unwrap();
        assert!(output.rows[0].is_ok());
        assert!(matches!(
            output.rows[1].error(),
            Some(PlotError::Preprocess(PreprocessError::Parse(ParseError::TooDeep { .. })))
        ));
        assert!(output.rows[2].is_ok());
    }

    #[test]
    fn test_bad_z_mapping_aborts_update() {
        let request = PlotRequest::new(vec!["z"]).with_z_mapping("X + q").with_resolution(4);
        assert!(matches!(
            compute(&request).unwrap_err(),
            PlotError::ZMapping { .. }
        ));
        let request = PlotRequest::new(vec!["z"]).with_z_mapping("X +").with_resolution(4);
        assert!(matches!(
            compute(&request).unwrap_err(),
            PlotError::ZMapping { .. }
        ));
    }

    #[test]
    fn test_reversed_domain_aborts_update() {
        let request = PlotRequest::new(vec!["z"]).with_domain(DomainRectangle::new(2.0, -2.0, -2.0, 2.0));
        assert!(matches!(
            compute(&request).unwrap_err(),
            PlotError::Domain(DomainError::ReversedAxis { .. })
        ));
    }

    #[test]
    fn test_no_functions() {
        let request = PlotRequest::new(vec![]);
        assert_eq!(compute(&request).unwrap_err(), PlotError::NoFunctions);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let rows = vec!["z**2", "exp(z)", "gamma(z + 3)", "1/z"];
        let sequential = compute(&PlotRequest::new(rows.clone()).with_resolution(16)).unwrap();
        let mut request = PlotRequest::new(rows).with_resolution(16);
        request.parallel = true;
        let parallel = compute(&request).unwrap();
        assert_eq!(sequential.rows, parallel.rows);
    }

    #[test]
    fn test_summary_table_lists_every_row() {
        let output = compute(&PlotRequest::new(vec!["z", "w"]).with_resolution(4)).unwrap();
        let table = output.summary_table();
        assert!(table.contains("expression"));
        assert!(table.contains("ok"));
        assert!(table.contains("unknown variable 'w'"));
        assert!(table.contains("real axis"));
    }

    #[test]
    fn test_summary_table_reports_skipped_real_axis() {
        let request = PlotRequest::new(vec!["1/z"])
            .with_domain(DomainRectangle::new(-1.0, 1.0, 0.5, 1.0))
            .with_resolution(3);
        let output = compute(&request).unwrap();
        assert!(output.rows[0].is_ok());
        let table = output.summary_table();
        assert!(table.contains("skipped: domain error in division"));
    }
}
