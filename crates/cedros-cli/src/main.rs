use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cedros_core::config::ReducedMotionSource;
use cedros_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "cedros")]
#[command(author, version, about = "Scroll-driven Los Cedros landing page in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Force reduced motion regardless of the platform signal
    #[arg(long, global = true)]
    reduced_motion: bool,

    /// Disable the smooth-scroll emulation (native wheel steps)
    #[arg(long, global = true)]
    no_smooth: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the landing page (default)
    Run,
    /// Drive the page headlessly from a scripted input sequence and print JSON lines
    Simulate(commands::simulate::SimulateArgs),
    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
        /// Only print the config file location
        #[arg(long, conflicts_with = "save")]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = AppConfig::load()?;
    if cli.reduced_motion {
        config.motion.reduced_motion = ReducedMotionSource::Reduce;
    }
    if cli.no_smooth {
        config.scroll.smooth_enabled = false;
    }

    let interactive = matches!(cli.command, None | Some(Commands::Run));
    init_logging(&config, interactive)?;

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Simulate(args)) => commands::simulate::run(config, args),
        Some(Commands::Config { save, path }) => commands::config::run(&config, save, path),
    }
}

/// RUST_LOG wins over the configured level. The TUI owns the terminal, so the
/// interactive mode logs to a file instead of stderr.
fn init_logging(config: &AppConfig, interactive: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.general.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if interactive {
        fs::create_dir_all(config.data_dir())
            .with_context(|| format!("creating {}", config.data_dir().display()))?;
        let log_path = config.log_path();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("opening log file {}", log_path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}
