mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "copynum", about = "Per-cell fluorescent protein copy number estimation")]
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
    /// Split raw dual-channel stacks into GFP/RFP stacks and GFP projections
    Preprocess(commands::preprocess::PreprocessArgs),
    /// Run the full copy number analysis
    Run(commands::pipeline::RunArgs),
    /// Summarize an existing per-cell table
    Summarize(commands::summarize::SummarizeArgs),
    /// Print or save a default pipeline config
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Preprocess(args) => commands::preprocess::run(args),
        Commands::Run(args) => commands::pipeline::run(args),
        Commands::Summarize(args) => commands::summarize::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
