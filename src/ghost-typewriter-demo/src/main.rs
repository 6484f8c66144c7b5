//! Ghost Typewriter demo - chained typewriter labels in the terminal.

mod config;
mod controls;
mod screen;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use ghost_typewriter::{AnimationDirection, AnimationStyle};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::DemoConfig;
use crate::screen::TypewriterScreen;

/// Ghost Typewriter demo
#[derive(Debug, Parser)]
#[command(name = "ghost-typewriter-demo")]
#[command(about = "Typewriter-animated labels, chained one after another")]
#[command(version)]
struct Args {
    /// Configuration file path (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Traversal direction, overriding the config file
    #[arg(long, value_enum)]
    direction: Option<DirectionArg>,

    /// Reveal or hide, overriding the config file
    #[arg(long, value_enum)]
    style: Option<StyleArg>,

    /// Milliseconds between two characters, overriding the config file
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Log file; the terminal itself belongs to the UI
    #[arg(long, default_value = "ghost-typewriter.log")]
    log_file: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    Forward,
    Backward,
}

impl From<DirectionArg> for AnimationDirection {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Forward => AnimationDirection::Forward,
            DirectionArg::Backward => AnimationDirection::Backward,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StyleArg {
    Reveal,
    Hide,
}

impl From<StyleArg> for AnimationStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Reveal => AnimationStyle::Reveal,
            StyleArg::Hide => AnimationStyle::Hide,
        }
    }
}

/// Keeps the non-blocking log writer alive until exit so buffered lines flush.
struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

fn setup_logging(path: &Path, level: &str) -> Result<LogGuard> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();

    Ok(LogGuard { _guard: guard })
}

fn load_config(args: &Args) -> Result<DemoConfig> {
    let mut config = match &args.config {
        Some(path) => DemoConfig::load(path)?,
        None => DemoConfig::default(),
    };
    config.apply_overrides(
        args.direction.map(Into::into),
        args.style.map(Into::into),
        args.interval_ms,
    );
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(&args.log_file, &args.log_level) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config: {e:#}");
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    info!(
        labels = config.labels.len(),
        direction = ?config.animation.direction,
        style = ?config.animation.style,
        interval = ?config.animation.typing_interval,
        "starting demo"
    );

    let result = TypewriterScreen::new(&config).and_then(|mut screen| screen.run());
    if let Err(e) = result {
        error!("Demo error: {e:#}");
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
