//! Tunescan CLI - tune extraction from turn-by-turn beam position data.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tunescan")]
#[command(author, version, about = "NAFF tune extraction for beam positions", long_about = None)]
struct Cli {
    /// Log every extracted component and optimizer fallback
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the dominant frequencies of a sample file
    Analyze(commands::analyze::AnalyzeArgs),

    /// Write a synthetic turn-by-turn beam position record
    Generate(commands::generate::GenerateArgs),

    /// Track a drifting tune through repeated generate and analyze passes
    Sweep(commands::sweep::SweepArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args),
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Sweep(args) => commands::sweep::run(args),
    }
}
