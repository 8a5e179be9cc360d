//! Drives a [`Sequencer`] to completion against a scene.
//!
//! Headless runs step a fixed tick in a tight loop. Real-time runs tick on a
//! tokio interval and stop early when the shutdown future resolves.

use crate::config::Config;
use anyhow::{Context, Result};
use hanoi_core::{
    occupancy::{GROUND_LEVEL, approx_eq},
    planner::Peg,
    progress::ProgressSink,
    scene::{MemoryScene, Scene},
    sequencer::{RunStatus, Sequencer},
};
use serde::Serialize;
use std::{future::Future, time::Duration};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::info;

const MIN_FRAME: Duration = Duration::from_micros(100);

/// Outcome of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub total: u64,
    pub launched: u64,
    pub completed: u64,
    pub cancelled: bool,
    pub ticks: u64,
    /// Disk ranks resting over each peg, bottom to top, read back from the scene.
    pub pegs: [Vec<u32>; 3],
    /// Ranks of disks that ended up between pegs.
    pub unplaced: Vec<u32>,
    /// Ranks of disks over a peg but not resting directly on the disk (or
    /// the ground) below them.
    pub floating: Vec<u32>,
}

impl RunReport {
    /// All disks sit on the right peg, largest at the bottom, each one
    /// resting on the one below.
    pub fn is_solved(&self) -> bool {
        let n = self.pegs.iter().map(Vec::len).sum::<usize>() + self.unplaced.len();
        self.pegs[2].len() == n
            && self.pegs[2].windows(2).all(|w| w[0] > w[1])
            && self.floating.is_empty()
    }
}

pub fn run_headless<P>(config: &Config, scene: &mut MemoryScene, sink: &mut P) -> Result<RunReport>
where
    P: ProgressSink + ?Sized,
{
    config.validate()?;
    let mut sequencer = Sequencer::new(config.sequencer_config())?;
    sequencer.start(config.simulation.disk_count, scene, sink)?;

    let dt = config.frame_time();
    let mut ticks = 0;
    while sequencer.is_animating() {
        sequencer
            .advance(dt, scene, sink)
            .with_context(|| format!("run failed at tick {ticks}"))?;
        ticks += 1;
    }
    Ok(report(&sequencer, scene, ticks))
}

pub async fn run_realtime<P, F>(
    config: &Config,
    scene: &mut MemoryScene,
    sink: &mut P,
    shutdown: F,
) -> Result<RunReport>
where
    P: ProgressSink + ?Sized,
    F: Future<Output = ()>,
{
    config.validate()?;
    let mut sequencer = Sequencer::new(config.sequencer_config())?;
    sequencer.start(config.simulation.disk_count, scene, sink)?;

    let frame = Duration::from_secs_f64(config.frame_time()).max(MIN_FRAME);
    let mut interval = time::interval(frame);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut last = Instant::now();
    let mut ticks = 0;
    while sequencer.is_animating() {
        tokio::select! {
            now = interval.tick() => {
                let dt = now.saturating_duration_since(last).as_secs_f64();
                last = now;
                sequencer
                    .advance(dt, scene, sink)
                    .with_context(|| format!("run failed at tick {ticks}"))?;
                ticks += 1;
            }
            () = &mut shutdown => {
                info!("shutdown requested");
                sequencer.cancel();
            }
        }
    }
    Ok(report(&sequencer, scene, ticks))
}

fn report<S: Scene + ?Sized>(sequencer: &Sequencer, scene: &S, ticks: u64) -> RunReport {
    let config = sequencer.config();
    let progress = sequencer.progress();
    let mut pegs: [Vec<(f64, u32)>; 3] = Default::default();
    let mut unplaced = Vec::new();

    if let Some(state) = sequencer.state() {
        for &(disk, rank) in state.disks() {
            let Some(pos) = scene.position(disk) else {
                continue;
            };
            let peg = Peg::ALL
                .into_iter()
                .find(|&p| approx_eq(config.peg(p).x, pos.x));
            match peg {
                Some(p) => pegs[p.index()].push((pos.y, rank)),
                None => unplaced.push(rank),
            }
        }
    }

    let mut floating = Vec::new();
    for stack in &mut pegs {
        stack.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (level, &(y, rank)) in stack.iter().enumerate() {
            if !approx_eq(y, GROUND_LEVEL + config.layout.resting_height(level)) {
                floating.push(rank);
            }
        }
    }

    RunReport {
        total: progress.total,
        launched: progress.launched,
        completed: progress.completed,
        cancelled: sequencer
            .state()
            .is_some_and(|s| s.status() == RunStatus::Cancelled),
        ticks,
        pegs: pegs.map(|stack| stack.into_iter().map(|(_, rank)| rank).collect()),
        unplaced,
        floating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanoi_core::{progress::RecordingProgress, sequencer::Resolution};

    fn config(disks: u32, delay: f64) -> Config {
        let mut config = Config::default();
        config.simulation.disk_count = disks;
        config.simulation.move_delay = delay;
        config
    }

    #[test]
    fn headless_run_solves_tower() {
        let mut scene = MemoryScene::new();
        let mut sink = RecordingProgress::default();
        let report = run_headless(&config(3, 0.5), &mut scene, &mut sink).unwrap();

        assert!(report.is_solved(), "{report:?}");
        assert_eq!(report.pegs[2], vec![2, 1, 0]);
        assert_eq!((report.total, report.launched, report.completed), (7, 7, 7));
        assert!(!report.cancelled);
        assert_eq!(sink.last(), Some("Step 7/7"));
    }

    #[test]
    fn headless_run_with_no_disks() {
        let mut scene = MemoryScene::new();
        let mut sink = RecordingProgress::default();
        let report = run_headless(&config(0, 1.0), &mut scene, &mut sink).unwrap();
        assert_eq!(report.ticks, 0);
        assert_eq!(report.total, 0);
        assert!(report.is_solved());
    }

    #[test]
    fn coarse_position_scan_run_rests_every_disk() {
        let mut config = config(3, 1.0);
        config.simulation.frame_rate = 2.0;
        config.display.resolution = Resolution::PositionScan;

        let mut scene = MemoryScene::new();
        let mut sink = RecordingProgress::default();
        let report = run_headless(&config, &mut scene, &mut sink).unwrap();

        assert!(report.is_solved(), "{report:?}");
        assert!(report.floating.is_empty());
        assert_eq!(report.pegs[2], vec![2, 1, 0]);
    }

    #[test]
    fn report_flags_floating_disks() {
        let config = config(2, 1.0);
        let mut sequencer = Sequencer::new(config.sequencer_config()).unwrap();
        let mut scene = MemoryScene::new();
        sequencer.start(2, &mut scene, &mut ()).unwrap();
        assert!(report(&sequencer, &scene, 0).floating.is_empty());

        let (small, _) = sequencer.state().unwrap().disks()[1];
        let left = sequencer.config().peg(Peg::Left);
        scene.set_position(small, left.with_y(2.0));

        let summary = report(&sequencer, &scene, 0);
        assert_eq!(summary.pegs[0], vec![1, 0]);
        assert_eq!(summary.floating, vec![0]);
        assert!(!summary.is_solved());
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_run_follows_the_clock() {
        let mut scene = MemoryScene::new();
        let mut sink = RecordingProgress::default();
        let started = Instant::now();

        let report = run_realtime(
            &config(2, 0.5),
            &mut scene,
            &mut sink,
            std::future::pending(),
        )
        .await
        .unwrap();

        assert!(report.is_solved(), "{report:?}");
        // three launches half a second apart, then the last disk lands
        let elapsed = started.elapsed().as_secs_f64();
        assert!(elapsed > 1.9, "finished after {elapsed}s");
        assert!(elapsed < 2.5, "finished after {elapsed}s");
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_run_stops_on_shutdown() {
        let mut scene = MemoryScene::new();
        let mut sink = RecordingProgress::default();

        let report = run_realtime(
            &config(4, 0.5),
            &mut scene,
            &mut sink,
            time::sleep(Duration::from_millis(1_200)),
        )
        .await
        .unwrap();

        assert!(report.cancelled);
        assert_eq!(report.total, 15);
        assert_eq!(report.launched, 2);
        assert!(!report.is_solved());
    }
}
