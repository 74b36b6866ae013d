/// Domain rectangle, Z range, linspace and meshgrid
pub mod domain;
///  Example#1
/// ```
///    // sample one function over the default rectangle [-2, 2] x [-2, 2]
///    use RustedComplexPlot::numerical::domain::DomainRectangle;
///    use RustedComplexPlot::numerical::surface_sampler::SurfaceSampler;
///    use RustedComplexPlot::symbolic::complex_engine::Expr;
///    let sampler = SurfaceSampler::new(DomainRectangle::default()).with_resolution(50);
///    let mapping = Expr::parse_expression("X + 1j*Y").unwrap();
///    let f = Expr::parse_expression("z**2").unwrap();
///    let surface = sampler.sample(&mapping, &f).unwrap();
///    assert_eq!(surface.shape(), (50, 50));
///    println!("phase at the corner = {}", surface.phase[[0, 0]]);
///  ```
pub mod surface_sampler;
/// Example#2
///  ```
///    // several rows at once, every row keeps its own result
///    use RustedComplexPlot::numerical::plot_request::{PlotRequest, compute};
///    let request = PlotRequest::new(vec!["sin(z)", "w + 1"]).with_resolution(20);
///    let output = compute(&request).unwrap();
///    assert!(output.rows[0].is_ok());
///    assert!(!output.rows[1].is_ok());
///    println!("{}", output.summary_table());
///  ```
pub mod plot_request;
