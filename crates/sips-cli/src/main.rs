mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sips", about = "Series image processing for high-speed radiography")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show geometry and frame count of a source
    Info(commands::info::InfoArgs),
    /// Average a frame range into a reference frame (.npy)
    Average(commands::average::AverageArgs),
    /// Render a single processed frame to TIFF
    Frame(commands::frame::FrameArgs),
    /// Process a frame range into a TIFF sequence, video or array
    Export(commands::export::ExportArgs),
    /// Run a full session from a TOML config
    Run(commands::run::RunArgs),
    /// Print or save the default session config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Average(args) => commands::average::run(args),
        Commands::Frame(args) => commands::frame::run(args),
        Commands::Export(args) => commands::export::run(args),
        Commands::Run(args) => commands::run::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
