use anyhow::{Context, Result};
use clap::Args;
use hanoi::{
    config::Config,
    input::{parse_disk_count, parse_move_delay},
    runner::{RunReport, run_headless, run_realtime},
};
use hanoi_core::{
    progress::{ProgressSink, ProgressStyle},
    scene::MemoryScene,
    sequencer::Resolution,
};
use std::path::PathBuf;
use tracing::warn;

#[derive(Args, Default)]
pub struct RunArgs {
    /// Path to a configuration file (TOML or JSON).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of disks. Invalid input falls back to 3.
    #[arg(long)]
    pub disks: Option<String>,

    /// Seconds between moves. Invalid input falls back to 1.0.
    #[arg(long)]
    pub delay: Option<String>,

    /// Show `Step 0/N` first, then `Steps: Step k/N` per move.
    #[arg(long)]
    pub legacy_progress: bool,

    /// Resolve pegs by scanning disk positions instead of tracking stacks.
    #[arg(long)]
    pub position_scan: bool,

    /// Step a fixed tick as fast as possible instead of following the clock.
    #[arg(long)]
    pub headless: bool,

    /// Print the final report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Prints each readout on its own line.
struct StdoutProgress;

impl ProgressSink for StdoutProgress {
    fn show(&mut self, readout: &str) {
        println!("{readout}");
    }
}

impl RunArgs {
    pub fn run(&self) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;

        let mut scene = MemoryScene::new();
        let mut sink = StdoutProgress;
        let report = if self.headless {
            run_headless(&config, &mut scene, &mut sink)?
        } else {
            realtime(&config, &mut scene, &mut sink)?
        };

        if self.json {
            let json = serde_json::to_string_pretty(&report).context("failed to render report")?;
            println!("{json}");
        } else {
            print_summary(&report);
        }
        Ok(())
    }

    /// Configuration file (or defaults) with command-line overrides applied.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };
        if let Some(disks) = &self.disks {
            config.simulation.disk_count = parse_disk_count(disks);
        }
        if let Some(delay) = &self.delay {
            config.simulation.move_delay = parse_move_delay(delay);
        }
        if self.legacy_progress {
            config.display.progress_style = ProgressStyle::Legacy;
        }
        if self.position_scan {
            config.display.resolution = Resolution::PositionScan;
        }
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn realtime(
    config: &Config,
    scene: &mut MemoryScene,
    sink: &mut StdoutProgress,
) -> Result<RunReport> {
    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };
    run_realtime(config, scene, sink, shutdown).await
}

fn print_summary(report: &RunReport) {
    let outcome = if report.cancelled {
        "Cancelled"
    } else {
        "Finished"
    };
    println!(
        "{outcome} after {}/{} moves ({} landed, {} ticks)",
        report.launched, report.total, report.completed, report.ticks
    );
    for (peg, ranks) in report.pegs.iter().enumerate() {
        println!("peg {peg}: {ranks:?}");
    }
    if !report.unplaced.is_empty() {
        println!("between pegs: {:?}", report.unplaced);
    }
    if !report.floating.is_empty() {
        println!("not resting: {:?}", report.floating);
    }
}
