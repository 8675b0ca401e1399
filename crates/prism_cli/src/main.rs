mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use prism_tracer::{RayTracer, SampleGrid, TraceConfig};

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    log::info!("Starting Prism");

    let mut tracer = RayTracer::new();
    tracer
        .load_scene_file(&args.scene)
        .map_err(|msg| anyhow!(msg))
        .with_context(|| format!("Failed to load scene {}", args.scene.display()))?;

    let width = args.width.max(1);
    let height = args
        .height
        .unwrap_or_else(|| (width as f32 / tracer.aspect_ratio()).round() as u32)
        .max(1);

    let grid = SampleGrid::from_selector(args.aa).unwrap_or_default();
    let config = TraceConfig::default()
        .with_max_depth(args.depth)
        .with_shadows(!args.no_shadows)
        .with_smooth_shading(!args.flat)
        .with_antialiasing(grid)
        .with_cube_map(args.cube_map);

    tracer.trace_setup(width, height);
    tracer.render(&config);

    tracer
        .save_png(&args.output)
        .map_err(|msg| anyhow!(msg))
        .context("Failed to write image")?;

    Ok(())
}
