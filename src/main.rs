#![allow(non_snake_case)]
use RustedComplexPlot::Examples::complex_plot_examples::{
    EXAMPLE_COUNT, complex_plot_examples, example_description,
};
use RustedComplexPlot::Utils::color_scales::ColorScale;
use RustedComplexPlot::Utils::config::PlotConfig;
use RustedComplexPlot::Utils::logger::init_logger;
use RustedComplexPlot::Utils::plots::{OutputFormat, RenderSettings, render_all};
use RustedComplexPlot::Utils::save_results::export_row;
use RustedComplexPlot::numerical::domain::{DomainError, parse_bound};
use RustedComplexPlot::numerical::plot_request::{PlotOutput, compute};
use RustedComplexPlot::numerical::surface_sampler::SurfaceSampler;
use RustedComplexPlot::symbolic::complex_eval::EvalOptions;
use RustedComplexPlot::symbolic::complex_functions::NamedFunction;
use RustedComplexPlot::symbolic::preprocess::{preprocess_function, preprocess_z_mapping};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::IntoEnumIterator;
use tabled::builder::Builder;
use tabled::settings::Style;

#[derive(Parser)]
#[command(name = "rusted-complex-plot")]
#[command(about = "Plot complex functions as 3D surfaces colored by phase")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample the function rows and write the four plot documents
    Plot(PlotArgs),
    /// Evaluate one expression at a single point (x, y)
    Eval {
        expression: String,
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,
        #[arg(short, long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f64,
        /// z-mapping over X and Y; blank means X + i*Y
        #[arg(short = 'z', long = "z-mapping", default_value = "")]
        z_mapping: String,
        #[arg(long)]
        lenient: bool,
    },
    /// List the functions accepted in expressions
    Functions,
    /// List the color scales
    Colorscales,
    /// Compute and render one of the numbered examples
    Example {
        number: usize,
        #[arg(long, default_value = "plots")]
        out: PathBuf,
        #[arg(long, default_value = "svg")]
        format: String,
    },
    /// Write a commented plot file
    SampleConfig {
        #[arg(default_value = "plot.toml")]
        path: PathBuf,
    },
}

#[derive(Args, Default)]
struct PlotArgs {
    /// TOML plot file; flags given on the command line override it
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// z-mapping over X and Y
    #[arg(short = 'z', long = "z-mapping")]
    z_mapping: Option<String>,
    /// function row, may be repeated
    #[arg(short = 'f', long = "function")]
    functions: Vec<String>,
    #[arg(long, allow_hyphen_values = true)]
    x_min: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    x_max: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    y_min: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    y_max: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    z_min: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    z_max: Option<String>,
    #[arg(long)]
    colorscale: Option<String>,
    #[arg(long)]
    resolution: Option<usize>,
    #[arg(long)]
    render_stride: Option<usize>,
    /// svg or png
    #[arg(long)]
    format: Option<String>,
    #[arg(short, long)]
    out: Option<PathBuf>,
    /// also write the sampled rows as csv
    #[arg(long)]
    csv: bool,
    /// also write a tab separated surface table per row
    #[arg(long)]
    tsv: bool,
    /// non-finite values become gaps instead of errors
    #[arg(long)]
    lenient: bool,
    /// sample the rows on the rayon pool
    #[arg(long)]
    parallel: bool,
    #[arg(long)]
    log_level: Option<String>,
    /// directory for the log file
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn override_bound(slot: &mut Option<f64>, field: &str, text: &Option<String>) -> Result<(), DomainError> {
    if let Some(text) = text.as_deref().filter(|t| !t.trim().is_empty()) {
        *slot = Some(parse_bound(field, text, 0.0)?);
    }
    Ok(())
}

/// Merge the command line flags into the plot file.
fn merge_args(mut config: PlotConfig, args: &PlotArgs) -> Result<PlotConfig, DomainError> {
    let d = &mut config.domain;
    override_bound(&mut d.x_min, "x_min", &args.x_min)?;
    override_bound(&mut d.x_max, "x_max", &args.x_max)?;
    override_bound(&mut d.y_min, "y_min", &args.y_min)?;
    override_bound(&mut d.y_max, "y_max", &args.y_max)?;
    override_bound(&mut d.z_min, "z_min", &args.z_min)?;
    override_bound(&mut d.z_max, "z_max", &args.z_max)?;
    if args.z_mapping.is_some() {
        config.expressions.z = args.z_mapping.clone();
    }
    if !args.functions.is_empty() {
        config.expressions.functions = args.functions.clone();
    }
    let p = &mut config.plot;
    if args.colorscale.is_some() {
        p.colorscale = args.colorscale.clone();
    }
    if args.resolution.is_some() {
        p.resolution = args.resolution;
    }
    if args.render_stride.is_some() {
        p.render_stride = args.render_stride;
    }
    if args.format.is_some() {
        p.format = args.format.clone();
    }
    if args.out.is_some() {
        p.output_dir = args.out.clone();
    }
    if args.csv {
        p.export_csv = Some(true);
    }
    if args.tsv {
        p.export_tsv = Some(true);
    }
    if args.lenient {
        p.strict_domain = Some(false);
    }
    if args.parallel {
        p.parallel = Some(true);
    }
    if args.log_level.is_some() {
        config.logging.level = args.log_level.clone();
    }
    if args.log_dir.is_some() {
        config.logging.dir = args.log_dir.clone();
    }
    Ok(config)
}

fn write_documents(output: &PlotOutput, settings: &RenderSettings, export_csv: bool, export_tsv: bool) -> Result<()> {
    for failure in output.failures() {
        if let Some(e) = failure.error() {
            warn!("row {} '{}' skipped: {}", failure.index, failure.expression, e);
        }
    }
    if output.all_failed() {
        bail!("every function row failed, nothing to plot");
    }
    let written = render_all(output, settings).context("rendering failed")?;
    for path in written.paths() {
        println!("{}", path.display());
    }
    if export_csv {
        for row in &output.rows {
            if let Some(surface) = row.surface() {
                let export = export_row(surface, row.index, &settings.output_dir, export_tsv)
                    .with_context(|| format!("cannot export row {}", row.index))?;
                for path in export.paths() {
                    println!("{}", path.display());
                }
            }
        }
    }
    Ok(())
}

fn run_plot(args: &PlotArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => PlotConfig::load_from_file(path)
            .with_context(|| format!("cannot read plot file {}", path.display()))?,
        None => PlotConfig::default(),
    };
    let config = merge_args(config, args)?;
    init_logger(config.log_level(), config.logging.dir.as_deref())?;
    let request = config.to_request()?;
    let settings = config.render_settings()?;
    let output = compute(&request)?;
    info!("\n \n CALC STATISTICS \n \n {}", output.summary_table());
    write_documents(&output, &settings, config.export_csv(), config.export_tsv())
}

fn run_eval(expression: &str, x: f64, y: f64, z_mapping: &str, lenient: bool) -> Result<()> {
    let function = preprocess_function(expression)?.parse()?;
    let mapping = preprocess_z_mapping(z_mapping)?.parse()?;
    let sampler = SurfaceSampler::new(Default::default()).with_options(EvalOptions {
        strict_domain: !lenient,
    });
    let value = sampler.evaluate_at(&mapping, &function, x, y)?;
    println!("f = {}", value);
    println!("|f| = {}", value.norm());
    println!("arg f / pi = {}", value.arg() / std::f64::consts::PI);
    Ok(())
}

fn list_functions() -> String {
    let mut builder = Builder::default();
    builder.push_record(["name", "arguments", "description"]);
    for function in NamedFunction::iter() {
        builder.push_record([
            function.to_string(),
            function.arity().to_string(),
            function.description().to_string(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.to_string()
}

fn run_example(number: usize, out: &Path, format: &str) -> Result<()> {
    if number >= EXAMPLE_COUNT {
        bail!("examples are numbered 0 to {}", EXAMPLE_COUNT - 1);
    }
    init_logger("info", None)?;
    let format = OutputFormat::from_str(format)
        .map_err(|_| anyhow::anyhow!("unknown output format '{}'", format))?;
    let settings = RenderSettings {
        format,
        output_dir: out.to_path_buf(),
        ..RenderSettings::default()
    };
    let output = complex_plot_examples(number)
        .with_context(|| format!("example {} failed", number))?;
    write_documents(&output, &settings, false, false)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Plot(args) => run_plot(&args),
        Commands::Eval {
            expression,
            x,
            y,
            z_mapping,
            lenient,
        } => run_eval(&expression, x, y, &z_mapping, lenient),
        Commands::Functions => {
            println!("{}", list_functions());
            Ok(())
        }
        Commands::Colorscales => {
            for scale in ColorScale::iter() {
                println!("{}", scale);
            }
            Ok(())
        }
        Commands::Example { number, out, format } => {
            println!("{}", example_description(number).unwrap_or_default());
            run_example(number, &out, &format)
        }
        Commands::SampleConfig { path } => {
            std::fs::write(&path, PlotConfig::sample_config())
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
