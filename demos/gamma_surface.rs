//! Render the Gamma function over the left half plane into ./plots
use RustedComplexPlot::Utils::color_scales::ColorScale;
use RustedComplexPlot::Utils::logger::init_logger;
use RustedComplexPlot::Utils::plots::{RenderSettings, render_all};
use RustedComplexPlot::numerical::domain::{DomainRectangle, ZRange};
use RustedComplexPlot::numerical::plot_request::{PlotRequest, compute};
use RustedComplexPlot::symbolic::complex_eval::EvalOptions;

fn main() -> anyhow::Result<()> {
    init_logger("info", None)?;
    let mut request = PlotRequest::new(vec!["gamma(z)", "1/gamma(z)"])
        .with_domain(DomainRectangle::new(-4.5, 3.5, -2.0, 2.0))
        .with_resolution(160);
    request.z_range = ZRange::new(-8.0, 8.0);
    request.color_scale = ColorScale::Twilight;
    request.eval_options = EvalOptions {
        strict_domain: false,
    };
    let output = compute(&request)?;
    println!("{}", output.summary_table());
    let written = render_all(&output, &RenderSettings::default())?;
    for path in written.paths() {
        println!("{}", path.display());
    }
    Ok(())
}
