use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so plans and readouts on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Plan(args) => args.run(),
        Command::Run(args) => args.run(),
    }
}

#[derive(Parser)]
#[command(name = "hanoi", about = "Plan and replay Tower of Hanoi solutions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the minimal move sequence for a tower.
    Plan(cli::plan::PlanArgs),
    /// Replay the solution against a headless scene, reporting progress.
    Run(cli::run::RunArgs),
}
