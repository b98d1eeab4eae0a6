use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;

use mirror_tracer::output;

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Renders mirror-like scenes described in JSON or TOML.
#[derive(Parser)]
#[command(name = "mirror_tracer", version)]
struct Args {
    /// Scene description (.json or .toml)
    scene_file: PathBuf,

    /// Output image, replacing the path given in the description
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Maximum number of reflections followed per ray
    #[arg(short, long)]
    max_reflections: Option<u32>,

    /// Render scanlines one after another
    #[arg(long)]
    sequential: bool,

    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::from(args.log_level.clone()))
        .init();

    let mut description = mirror_tracer::load(&args.scene_file)
        .with_context(|| format!("cannot load {}", args.scene_file.display()))?;

    if let Some(max_reflections) = args.max_reflections {
        description.ray_tracer.max_reflections = max_reflections;
    }
    if args.sequential {
        description.ray_tracer.parallel = false;
    }
    if let Some(path) = args.output {
        if description.renders.len() != 1 {
            bail!(
                "--output needs a single camera, the description has {}",
                description.renders.len()
            );
        }
        output::output_format(&path)?;
        description.renders[0].output = path;
    }

    let tracer = &description.ray_tracer;
    let scene = &description.scene;
    info!(
        "ray tracer: {} reflections, {}",
        tracer.max_reflections,
        if tracer.parallel { "parallel" } else { "sequential" }
    );
    info!(
        "scene: {} objects, {} lights, {} background",
        scene.objects.len(),
        scene.lights.len(),
        scene.background
    );

    for render in &description.renders {
        info!("{}", render.camera);
        let progress = ProgressBar::new(render.camera.rows() as u64);
        progress.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} rows ETA: {eta}")?);

        let image = tracer.render(scene, &render.camera, &progress);
        progress.finish();

        output::save(&image, &render.output)
            .with_context(|| format!("cannot save {}", render.output.display()))?;
        info!("image written to {}", render.output.display());
    }
    Ok(())
}
