use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

/// Log levels selectable on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "prism")]
#[command(about = "Recursive ray tracer for JSON scene files")]
pub struct Args {
    /// Scene description (.json)
    pub scene: PathBuf,

    /// Output image path
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value_t = 512)]
    pub width: u32,

    /// Image height in pixels (defaults to width / camera aspect)
    #[arg(long)]
    pub height: Option<u32>,

    /// Maximum reflection/refraction depth
    #[arg(short, long, default_value_t = 3)]
    pub depth: u32,

    /// Disable shadow rays
    #[arg(long)]
    pub no_shadows: bool,

    /// Use flat face normals instead of interpolated vertex normals
    #[arg(long)]
    pub flat: bool,

    /// Antialiasing grid side: 1, 2, 3 or 4 (1, 4, 9 or 16 samples)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=4))]
    pub aa: u32,

    /// Sample the scene's cube map for rays that miss
    #[arg(long)]
    pub cube_map: bool,

    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}
