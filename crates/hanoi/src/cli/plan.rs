use anyhow::{Context, Result, ensure};
use clap::{Args, ValueEnum};
use hanoi::{config::MAX_DISKS, input::parse_disk_count};
use hanoi_core::planner::{Move, Towers, move_count, plan};
use serde::Serialize;

#[derive(Args)]
pub struct PlanArgs {
    /// Number of disks. Anything that is not a non-negative integer means 3.
    pub disks: String,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Replay the plan on an abstract three-peg model and check every move.
    #[arg(long)]
    pub verify: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    disks: u32,
    total: u64,
    moves: &'a [Move],
}

impl PlanArgs {
    pub fn run(&self) -> Result<()> {
        let disks = parse_disk_count(&self.disks);
        ensure!(
            disks <= MAX_DISKS,
            "refusing to plan {disks} disks (at most {MAX_DISKS})"
        );

        let moves = plan(disks);
        println!("{}", render(disks, &moves, self.format)?);

        if self.verify {
            verify(disks, &moves)?;
            eprintln!("Verified {} moves: every move legal, tower solved", moves.len());
        }
        Ok(())
    }
}

fn render(disks: u32, moves: &[Move], format: Format) -> Result<String> {
    match format {
        Format::Text => {
            let width = moves.len().to_string().len();
            Ok(moves
                .iter()
                .enumerate()
                .map(|(i, mv)| format!("{:>width$}. {mv}", i + 1))
                .collect::<Vec<_>>()
                .join("\n"))
        }
        Format::Json => {
            let output = PlanOutput {
                disks,
                total: move_count(disks),
                moves,
            };
            serde_json::to_string_pretty(&output).context("failed to render plan as JSON")
        }
    }
}

fn verify(disks: u32, moves: &[Move]) -> Result<()> {
    let mut towers = Towers::new(disks);
    for (i, &mv) in moves.iter().enumerate() {
        towers
            .apply(mv)
            .with_context(|| format!("move {} ({mv}) is illegal", i + 1))?;
    }
    ensure!(towers.is_solved(), "plan does not end with the tower on peg 2");
    Ok(())
}
