//! Rendering of the four output documents: real part, imaginary part and
//! magnitude surfaces plus the real-axis curve.
//!
//! Surfaces are drawn as filled quads in a plotters 3D chart, each quad painted
//! through the color scale by the mean phase of its corners. The grid is
//! subsampled by `render_stride` for drawing only.
use crate::Utils::color_scales::ColorScale;
use crate::numerical::domain::ZRange;
use crate::numerical::plot_request::PlotOutput;
use crate::numerical::surface_sampler::{SampledSurface, finite_range};
use itertools::iproduct;
use log::{info, warn};
use ndarray::Array2;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

pub const BACKGROUND: RGBColor = RGBColor(0x12, 0x12, 0x12);
pub const FOREGROUND: RGBColor = RGBColor(0xe0, 0xe0, 0xe0);
pub const DEFAULT_RENDER_STRIDE: usize = 4;

/// colorbar ticks: normalized phase and its label
pub const PHASE_TICKS: [(f64, &str); 5] = [
    (-1.0, "-π"),
    (-0.5, "-π/2"),
    (0.0, "0"),
    (0.5, "π/2"),
    (1.0, "π"),
];

const LEGEND_WIDTH: u32 = 120;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("drawing failed: {0}")]
    Drawing(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("no successful function rows to render")]
    NothingToRender,
}

fn drawing_error(e: impl std::fmt::Display) -> RenderError {
    RenderError::Drawing(format!("{e}"))
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Svg,
    Png,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    pub format: OutputFormat,
    /// draw every n-th grid node
    pub render_stride: usize,
    pub output_dir: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            format: OutputFormat::Svg,
            render_stride: DEFAULT_RENDER_STRIDE,
            output_dir: PathBuf::from("plots"),
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    RealPart,
    ImaginaryPart,
    Magnitude,
}

impl SurfaceKind {
    pub fn values<'a>(&self, surface: &'a SampledSurface) -> &'a Array2<f64> {
        match self {
            SurfaceKind::RealPart => &surface.real,
            SurfaceKind::ImaginaryPart => &surface.imag,
            SurfaceKind::Magnitude => &surface.magnitude,
        }
    }

    /// vertical axis range; the magnitude starts at 0
    pub fn height_range(&self, z_range: &ZRange) -> (f64, f64) {
        match self {
            SurfaceKind::Magnitude => z_range.magnitude_range(),
            _ => (z_range.z_min, z_range.z_max),
        }
    }

    pub fn z_title(&self) -> &'static str {
        match self {
            SurfaceKind::RealPart => "Re(f(z))",
            SurfaceKind::ImaginaryPart => "Im(f(z))",
            SurfaceKind::Magnitude => "|f(z)|",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Document {
    Surface(SurfaceKind),
    RealAxis,
}

pub const DOCUMENTS: [Document; 4] = [
    Document::Surface(SurfaceKind::RealPart),
    Document::Surface(SurfaceKind::ImaginaryPart),
    Document::Surface(SurfaceKind::Magnitude),
    Document::RealAxis,
];

impl Document {
    pub fn title(&self) -> &'static str {
        match self {
            Document::Surface(SurfaceKind::RealPart) => "Real Part of f(z)",
            Document::Surface(SurfaceKind::ImaginaryPart) => "Imaginary Part of f(z)",
            Document::Surface(SurfaceKind::Magnitude) => "Magnitude of f(z)",
            Document::RealAxis => "Real Function f(z)",
        }
    }

    pub fn file_stem(&self) -> &'static str {
        match self {
            Document::Surface(SurfaceKind::RealPart) => "real_part",
            Document::Surface(SurfaceKind::ImaginaryPart) => "imaginary_part",
            Document::Surface(SurfaceKind::Magnitude) => "magnitude",
            Document::RealAxis => "real_function",
        }
    }
}

/// Everything a document needs from one compute pass.
pub struct Scene<'a> {
    pub surfaces: Vec<&'a SampledSurface>,
    pub color_scale: ColorScale,
    pub z_range: ZRange,
    pub render_stride: usize,
}

impl<'a> Scene<'a> {
    pub fn from_output(output: &'a PlotOutput, render_stride: usize) -> Scene<'a> {
        Scene {
            surfaces: output.surfaces().collect(),
            color_scale: output.request.color_scale,
            z_range: output.request.z_range,
            render_stride,
        }
    }
}

/// One filled cell of a surface, corners in chart coordinates
/// `(Re z, height, Im z)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Quad {
    pub corners: [(f64, f64, f64); 4],
    pub color: RGBColor,
}

/// 0, stride, 2*stride, ... and always the last index
pub fn strided_indices(n: usize, stride: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    let mut indices: Vec<usize> = (0..n).step_by(stride.max(1)).collect();
    if indices.last() != Some(&(n - 1)) {
        indices.push(n - 1);
    }
    indices
}

/// Build the quads of one surface. Cells with a non-finite corner or a corner
/// outside the vertical range are skipped.
pub fn surface_quads(
    surface: &SampledSurface,
    kind: SurfaceKind,
    scale: ColorScale,
    z_range: &ZRange,
    stride: usize,
) -> Vec<Quad> {
    let heights = kind.values(surface);
    let (lo, hi) = kind.height_range(z_range);
    let (rows, cols) = surface.shape();
    let ri = strided_indices(rows, stride);
    let ci = strided_indices(cols, stride);
    let mut quads = Vec::with_capacity(ri.len() * ci.len());
    for (r, c) in iproduct!(ri.windows(2), ci.windows(2)) {
        let nodes = [(r[0], c[0]), (r[0], c[1]), (r[1], c[1]), (r[1], c[0])];
        let visible = nodes.iter().all(|&ix| {
            (lo..=hi).contains(&heights[ix]) && surface.phase[ix].is_finite()
        });
        if !visible {
            continue;
        }
        let mean_phase = nodes.iter().map(|&ix| surface.phase[ix]).sum::<f64>() / 4.0;
        let corners = nodes.map(|ix| (surface.xx[ix], heights[ix], surface.yy[ix]));
        quads.push(Quad {
            corners,
            color: scale.phase_color(mean_phase),
        });
    }
    quads
}

/// Painter's order: farthest quad first. `depth` grows away from the viewer.
pub fn sort_back_to_front<F>(quads: &mut [Quad], depth: F)
where
    F: Fn(&(f64, f64, f64)) -> i32,
{
    quads.sort_by_cached_key(|q| {
        let total: i64 = q.corners.iter().map(|c| depth(c) as i64).sum();
        std::cmp::Reverse(total)
    });
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) }
}

fn draw_phase_legend<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    scale: ColorScale,
) -> Result<(), RenderError> {
    let (_, height) = area.dim_in_pixel();
    let top = 60;
    let bottom = height as i32 - 60;
    let text = ("sans-serif", 14).into_font().color(&FOREGROUND);
    area.draw_text("Phase (π units)", &text, (10, top - 30))
        .map_err(drawing_error)?;
    let steps = 100;
    for k in 0..steps {
        let y0 = top + (bottom - top) * k / steps;
        let y1 = top + (bottom - top) * (k + 1) / steps;
        let p = 1.0 - 2.0 * (k as f64 + 0.5) / steps as f64;
        area.draw(&Rectangle::new([(20, y0), (45, y1)], scale.phase_color(p).filled()))
            .map_err(drawing_error)?;
    }
    for (p, label) in PHASE_TICKS {
        let y = top + ((1.0 - p) / 2.0 * (bottom - top) as f64).round() as i32;
        area.draw(&PathElement::new(vec![(45, y), (52, y)], FOREGROUND))
            .map_err(drawing_error)?;
        area.draw_text(label, &text, (56, y - 7)).map_err(drawing_error)?;
    }
    Ok(())
}

fn draw_surface<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    kind: SurfaceKind,
    title: &str,
) -> Result<(), RenderError> {
    let (width, _) = root.dim_in_pixel();
    let (plot_area, legend_area) = root.split_horizontally((width as i32 - LEGEND_WIDTH as i32).max(0));
    let first = scene.surfaces[0];
    let (x_lo, x_hi) = padded(first.x[0], first.x[first.x.len() - 1]);
    let (y_lo, y_hi) = padded(first.y[0], first.y[first.y.len() - 1]);
    let (z_lo, z_hi) = padded(kind.height_range(&scene.z_range).0, kind.height_range(&scene.z_range).1);

    let mut chart = ChartBuilder::on(&plot_area)
        .caption(title, ("sans-serif", 28).into_font().color(&FOREGROUND))
        .margin(20)
        .build_cartesian_3d(x_lo..x_hi, z_lo..z_hi, y_lo..y_hi)
        .map_err(drawing_error)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.5;
        pb.pitch = 0.4;
        pb.scale = 0.85;
        pb.into_matrix()
    });
    chart
        .configure_axes()
        .label_style(("sans-serif", 12).into_font().color(&FOREGROUND))
        .light_grid_style(FOREGROUND.mix(0.1))
        .max_light_lines(3)
        .draw()
        .map_err(drawing_error)?;

    // quads of all surfaces share one depth order so overlapping sheets interleave
    let mut quads: Vec<Quad> = scene
        .surfaces
        .iter()
        .flat_map(|surface| surface_quads(surface, kind, scene.color_scale, &scene.z_range, scene.render_stride))
        .collect();
    let coord = chart.as_coord_spec();
    sort_back_to_front(&mut quads, |&(x, h, y)| coord.projected_depth(&x, &h, &y));
    chart
        .draw_series(
            quads
                .into_iter()
                .map(|q| Polygon::new(q.corners.to_vec(), q.color.filled())),
        )
        .map_err(drawing_error)?;

    let (_, height) = plot_area.dim_in_pixel();
    let axis_titles = format!("x: Re(z)    y: Im(z)    vertical: {}", kind.z_title());
    plot_area
        .draw_text(
            &axis_titles,
            &("sans-serif", 14).into_font().color(&FOREGROUND),
            (20, height as i32 - 24),
        )
        .map_err(drawing_error)?;
    draw_phase_legend(&legend_area, scene.color_scale)
}

/// Split a curve into runs of finite points.
fn finite_segments(t: &[f64], v: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (&x, &y) in t.iter().zip(v.iter()) {
        if y.is_finite() {
            current.push((x, y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn draw_real_axis<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    title: &str,
) -> Result<(), RenderError> {
    let first = scene.surfaces[0];
    let x = &first.x;
    let (t_lo, t_hi) = padded(x[0], x[x.len() - 1]);
    let range = finite_range(
        scene
            .surfaces
            .iter()
            .filter_map(|s| s.real_slice.as_ref().ok())
            .flat_map(|slice| slice.real.iter()),
    )
    .unwrap_or((-1.0, 1.0));
    let (v_lo, v_hi) = padded(range.0, range.1);
    let font = ("sans-serif", 16).into_font().color(&FOREGROUND);

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font().color(&FOREGROUND))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(t_lo..t_hi, v_lo..v_hi)
        .map_err(drawing_error)?;
    chart
        .configure_mesh()
        .x_desc("z")
        .y_desc("f(z)")
        .axis_desc_style(font.clone())
        .label_style(font)
        .axis_style(FOREGROUND)
        .bold_line_style(FOREGROUND.mix(0.2))
        .light_line_style(FOREGROUND.mix(0.05))
        .draw()
        .map_err(drawing_error)?;

    for (col, surface) in scene.surfaces.iter().enumerate() {
        let Ok(slice) = &surface.real_slice else {
            continue;
        };
        let segments = finite_segments(
            &slice.t.iter().copied().collect::<Vec<_>>(),
            &slice.real.iter().copied().collect::<Vec<_>>(),
        );
        for (k, segment) in segments.into_iter().enumerate() {
            let series = chart
                .draw_series(LineSeries::new(segment, Palette99::pick(col).stroke_width(2)))
                .map_err(drawing_error)?;
            if k == 0 {
                series
                    .label(surface.expression.clone())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], Palette99::pick(col)));
            }
        }
    }
    chart
        .configure_series_labels()
        .label_font(("sans-serif", 14).into_font().color(&FOREGROUND))
        .background_style(BACKGROUND.mix(0.8))
        .border_style(FOREGROUND)
        .draw()
        .map_err(drawing_error)?;
    Ok(())
}

/// Draw one document onto any plotters backend.
pub fn draw_document<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    scene: &Scene,
    document: Document,
) -> Result<(), RenderError> {
    if scene.surfaces.is_empty() {
        return Err(RenderError::NothingToRender);
    }
    root.fill(&BACKGROUND).map_err(drawing_error)?;
    match document {
        Document::Surface(kind) => draw_surface(&root, scene, kind, document.title())?,
        Document::RealAxis => draw_real_axis(&root, scene, document.title())?,
    }
    root.present().map_err(drawing_error)?;
    Ok(())
}

/// Render a document as an SVG string.
pub fn render_svg_string(scene: &Scene, document: Document, size: (u32, u32)) -> Result<String, RenderError> {
    let mut buf = String::new();
    {
        let root = SVGBackend::with_string(&mut buf, size).into_drawing_area();
        draw_document(root, scene, document)?;
    }
    Ok(buf)
}

pub fn render_to_file(
    scene: &Scene,
    document: Document,
    path: &Path,
    settings: &RenderSettings,
) -> Result<(), RenderError> {
    let size = (settings.width, settings.height);
    match settings.format {
        OutputFormat::Svg => draw_document(SVGBackend::new(path, size).into_drawing_area(), scene, document),
        OutputFormat::Png => draw_document(BitMapBackend::new(path, size).into_drawing_area(), scene, document),
    }
}

/// Paths of the four written documents.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocuments {
    pub real_part: PathBuf,
    pub imaginary_part: PathBuf,
    pub magnitude: PathBuf,
    pub real_axis: PathBuf,
}

impl RenderedDocuments {
    pub fn paths(&self) -> [&Path; 4] {
        [
            self.real_part.as_path(),
            self.imaginary_part.as_path(),
            self.magnitude.as_path(),
            self.real_axis.as_path(),
        ]
    }
}

/// Write all four documents for a compute pass into `settings.output_dir`.
pub fn render_all(output: &PlotOutput, settings: &RenderSettings) -> Result<RenderedDocuments, RenderError> {
    let scene = Scene::from_output(output, settings.render_stride);
    if scene.surfaces.is_empty() {
        warn!("nothing to render: every function row failed");
        return Err(RenderError::NothingToRender);
    }
    std::fs::create_dir_all(&settings.output_dir)?;
    let render = |document: Document| -> Result<PathBuf, RenderError> {
        let path = settings
            .output_dir
            .join(format!("{}.{}", document.file_stem(), settings.format.extension()));
        render_to_file(&scene, document, &path, settings)?;
        info!("{} written to {}", document.title(), path.display());
        Ok(path)
    };
    Ok(RenderedDocuments {
        real_part: render(DOCUMENTS[0])?,
        imaginary_part: render(DOCUMENTS[1])?,
        magnitude: render(DOCUMENTS[2])?,
        real_axis: render(DOCUMENTS[3])?,
    })
}
