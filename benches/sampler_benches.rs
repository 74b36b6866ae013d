use RustedComplexPlot::Examples::complex_plot_examples::example_request;
use RustedComplexPlot::Utils::plots::{Document, Scene, SurfaceKind, render_svg_string};
use RustedComplexPlot::numerical::plot_request::compute;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_compute(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute");
    for n in [0, 2, 3] {
        let request = example_request(n).unwrap();
        group.bench_function(format!("example {}", n), |b| {
            b.iter(|| compute(black_box(&request)))
        });
    }
    group.finish();
}

fn bench_parallel_rows(c: &mut Criterion) {
    let mut request = example_request(3).unwrap();
    request.parallel = false;
    c.bench_function("three rows sequential", |b| b.iter(|| compute(&request)));
    request.parallel = true;
    c.bench_function("three rows parallel", |b| b.iter(|| compute(&request)));
}

fn bench_render_svg(c: &mut Criterion) {
    let output = compute(&example_request(1).unwrap()).unwrap();
    let scene = Scene::from_output(&output, 4);
    c.bench_function("render real part svg", |b| {
        b.iter(|| render_svg_string(&scene, Document::Surface(SurfaceKind::RealPart), (800, 600)))
    });
}

criterion_group!(benches, bench_compute, bench_parallel_rows, bench_render_svg);
criterion_main!(benches);
