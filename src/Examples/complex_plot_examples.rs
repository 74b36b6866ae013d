#![allow(non_snake_case)]

use crate::Utils::color_scales::ColorScale;
use crate::numerical::domain::{DomainRectangle, ZRange};
use crate::numerical::plot_request::{PlotOutput, PlotRequest, compute};
use crate::symbolic::complex_eval::EvalOptions;
use log::{error, info};

pub const EXAMPLE_COUNT: usize = 8;

/// Short description of every numbered example.
pub fn example_description(example: usize) -> Option<&'static str> {
    let text = match example {
        0 => "identity f(z) = z over the default rectangle",
        1 => "z**2 on the unit square",
        2 => "Gamma function with its poles on the negative real axis",
        3 => "sin, cos and exp sampled in parallel",
        4 => "real-only expression of x and y",
        5 => "custom z-mapping z = x**2 + i*y",
        6 => "one failing row among working ones",
        7 => "branch cuts of log and sqrt",
        _ => return None,
    };
    Some(text)
}

pub fn example_request(example: usize) -> Option<PlotRequest> {
    let request = match example {
        0 => PlotRequest::default(),
        1 => PlotRequest::new(vec!["z**2"])
            .with_z_mapping("X+i*Y")
            .with_domain(DomainRectangle::new(-1.0, 1.0, -1.0, 1.0)),
        2 => {
            // poles give non-finite values: leave them as gaps in the plot
            let mut request = PlotRequest::new(vec!["gamma(z)"])
                .with_domain(DomainRectangle::new(-4.0, 4.0, -2.0, 2.0));
            request.z_range = ZRange::new(-6.0, 6.0);
            request.color_scale = ColorScale::Twilight;
            request.eval_options = EvalOptions { strict_domain: false };
            request
        }
        3 => {
            let mut request = PlotRequest::new(vec!["sin(z)", "cos(z)", "exp(z)"]);
            request.parallel = true;
            request.color_scale = ColorScale::Plasma;
            request
        }
        4 => PlotRequest::new(vec!["x**2 - y**2"]),
        5 => PlotRequest::new(vec!["sqrt(z)"]).with_z_mapping("x**2 + i*y"),
        6 => PlotRequest::new(vec!["1/(z - 3)", "w + 1", "log(z + 3)"]),
        7 => {
            let mut request = PlotRequest::new(vec!["log(z)", "sqrt(z)"])
                .with_domain(DomainRectangle::new(-2.0, 2.0, -2.0, 2.0));
            request.color_scale = ColorScale::RdBu;
            request
        }
        _ => return None,
    };
    Some(request)
}

/// Compute a numbered example and log its summary table.
pub fn complex_plot_examples(example: usize) -> Option<PlotOutput> {
    let request = example_request(example)?;
    info!(
        "example {}: {}",
        example,
        example_description(example).unwrap_or_default()
    );
    match compute(&request) {
        Ok(output) => {
            info!("\n \n CALC STATISTICS \n \n {}", output.summary_table());
            Some(output)
        }
        Err(e) => {
            error!("example {} failed: {}", example, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_example_has_a_request_and_description() {
        for n in 0..EXAMPLE_COUNT {
            assert!(example_request(n).is_some(), "example {}", n);
            assert!(example_description(n).is_some(), "example {}", n);
        }
        assert!(example_request(EXAMPLE_COUNT).is_none());
    }

    #[test]
    fn test_row_isolation_example() {
        let output = complex_plot_examples(6).unwrap();
        assert!(output.rows[0].is_ok());
        assert!(!output.rows[1].is_ok());
        assert!(output.rows[2].is_ok());
    }

    #[test]
    fn test_gamma_example_keeps_poles_as_gaps() {
        let output = complex_plot_examples(2).unwrap();
        let surface = output.rows[0].surface().unwrap();
        assert!(surface.magnitude.iter().any(|m| m.is_finite()));
    }
}
