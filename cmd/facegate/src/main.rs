//! facegate - face identity matching and liveness from the command line.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod lock;
mod registry;

use commands::{
    ConfigCommand, EnrollCommand, IdentifyCommand, LivenessCommand, StatsCommand, VerifyCommand,
};

/// facegate - enroll, verify and identify faces from precomputed embeddings.
///
/// Embeddings are produced by an external face extractor and passed in as a
/// JSON array of numbers (`null` when no face was detected). An optional
/// frame image is scored for passive liveness.
///
/// The index and registry live in the data directory, configured in
/// ~/.facegate/config.yaml.
#[derive(Parser)]
#[command(name = "facegate")]
#[command(about = "Face identity matching and fraud prevention")]
#[command(version)]
pub struct Cli {
    /// Config file (default is ~/.facegate/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<PathBuf>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage CLI configuration
    Config(ConfigCommand),
    /// Enroll a new identity
    Enroll(EnrollCommand),
    /// Verify a claimed identity, enrolling it if it is new
    Verify(VerifyCommand),
    /// Find the enrolled identity matching a face
    Identify(IdentifyCommand),
    /// Score an image for liveness
    Liveness(LivenessCommand),
    /// Show index statistics
    Stats(StatsCommand),
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match &cli.command {
        Commands::Config(cmd) => cmd.run(&cli),
        Commands::Enroll(cmd) => cmd.run(&cli),
        Commands::Verify(cmd) => cmd.run(&cli),
        Commands::Identify(cmd) => cmd.run(&cli),
        Commands::Liveness(cmd) => cmd.run(&cli),
        Commands::Stats(cmd) => cmd.run(&cli),
    }
}
