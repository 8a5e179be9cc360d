//! Replays a move plan against a scene.
//!
//! The [`Sequencer`] is advanced once per rendering tick. Each tick first
//! moves every in-flight [`Relocation`] along its trajectory, then runs the
//! controller's inter-move timer, launching the next planned move whenever
//! a full delay has elapsed. The timer does not wait for earlier
//! relocations to land, so short delays (or coarse ticks) put several disks
//! in the air at once. With [`Resolution::PositionScan`], disks still in the
//! air over the source or destination peg are landed before the scan, since
//! a lifted disk would otherwise read as the top of its stack.
//!
//! A run's state lives in a single [`SimulationState`] that is built fresh
//! by [`Sequencer::start`] and never shared.

use crate::{
    occupancy::{PegStacks, Resting, approx_eq, scan_landing_height, scan_top_disk},
    planner::{Move, Peg, move_count, plan},
    progress::{Progress, ProgressSink, ProgressStyle},
    scene::{DiskId, DiskLayout, Scene},
    trajectory::{Coord, DEFAULT_LIFT_HEIGHT, Relocation, phase_duration},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

#[derive(Debug, Error, PartialEq)]
pub enum SequenceError {
    #[error("a run is already animating")]
    Busy,
    #[error("invalid sequencer configuration: {0}")]
    InvalidConfig(String),
    #[error("step {step}: no disk found on source peg {peg}")]
    SceneInconsistency { step: u64, peg: Peg },
    #[error("step {step}: disk {rank} cannot land on smaller disk {below} at peg {peg}")]
    IllegalPlacement {
        step: u64,
        rank: u32,
        below: u32,
        peg: Peg,
    },
}

pub type Result<T> = std::result::Result<T, SequenceError>;

/// How the sequencer decides which disk sits on which peg.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Explicit per-peg stacks updated on every launch.
    #[default]
    Stacks,
    /// Scan live disk positions on every launch.
    PositionScan,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SequencerConfig {
    /// Seconds between consecutive launches.
    pub move_delay: f64,
    pub lift_height: f64,
    pub layout: DiskLayout,
    /// Reference points of pegs 0, 1 and 2.
    pub pegs: [Coord; 3],
    pub resolution: Resolution,
    pub style: ProgressStyle,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            move_delay: 1.0,
            lift_height: DEFAULT_LIFT_HEIGHT,
            layout: DiskLayout::default(),
            pegs: [
                Coord::new(-3.0, 0.0, 0.0),
                Coord::new(0.0, 0.0, 0.0),
                Coord::new(3.0, 0.0, 0.0),
            ],
            resolution: Resolution::default(),
            style: ProgressStyle::default(),
        }
    }
}

impl SequencerConfig {
    pub fn peg(&self, peg: Peg) -> Coord {
        self.pegs[peg.index()]
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(SequenceError::InvalidConfig(msg));
        if !self.move_delay.is_finite() || self.move_delay <= 0.0 {
            return invalid(format!("move delay must be positive, got {}", self.move_delay));
        }
        if !self.lift_height.is_finite() || self.lift_height < 0.0 {
            return invalid(format!("lift height must be non-negative, got {}", self.lift_height));
        }
        let h = self.layout.disk_height;
        if !h.is_finite() || h < 0.0 {
            return invalid(format!("disk height must be non-negative, got {h}"));
        }
        for (i, a) in self.pegs.iter().enumerate() {
            if ![a.x, a.y, a.z].iter().all(|v| v.is_finite()) {
                return invalid(format!("peg {i} position is not finite"));
            }
            for (j, b) in self.pegs.iter().enumerate().skip(i + 1) {
                if approx_eq(a.x, b.x) {
                    return invalid(format!("pegs {i} and {j} share x = {}", a.x));
                }
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Animating,
    Finished,
    Cancelled,
    Failed,
}

#[derive(Clone, Debug)]
enum Occupancy {
    Stacks(PegStacks),
    Scan,
}

/// Everything belonging to one run.
#[derive(Clone, Debug)]
pub struct SimulationState {
    moves: Vec<Move>,
    next_move: usize,
    timer: f64,
    progress: Progress,
    /// Spawned disks as `(handle, rank)`, bottom of the initial tower first.
    disks: Vec<(DiskId, u32)>,
    occupancy: Occupancy,
    relocations: BTreeMap<DiskId, Relocation>,
    status: RunStatus,
}

impl SimulationState {
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn disks(&self) -> &[(DiskId, u32)] {
        &self.disks
    }

    pub fn rank_of(&self, disk: DiskId) -> Option<u32> {
        rank_of(&self.disks, disk)
    }

    /// Explicit stacks, when the run tracks them.
    pub fn stacks(&self) -> Option<&PegStacks> {
        match &self.occupancy {
            Occupancy::Stacks(stacks) => Some(stacks),
            Occupancy::Scan => None,
        }
    }

    pub fn in_flight(&self) -> impl Iterator<Item = (DiskId, &Relocation)> {
        self.relocations.iter().map(|(id, r)| (*id, r))
    }

    fn all_launched(&self) -> bool {
        self.next_move >= self.moves.len()
    }

    fn launch<S, P>(&mut self, config: &SequencerConfig, scene: &mut S, sink: &mut P) -> Result<()>
    where
        S: Scene + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let mv = self.moves[self.next_move];
        let step = self.next_move as u64 + 1;
        let dest = config.peg(mv.to);
        let disk_height = config.layout.disk_height;

        if matches!(self.occupancy, Occupancy::Scan) {
            self.settle_at(&[config.peg(mv.from).x, dest.x], step, scene);
        }

        let disks = &self.disks;
        let ids = || disks.iter().map(|(id, _)| *id);
        let (disk, rank, rest) = match &self.occupancy {
            Occupancy::Stacks(stacks) => {
                let source = stacks
                    .top(mv.from)
                    .ok_or(SequenceError::SceneInconsistency { step, peg: mv.from })?;
                if let Some(below) = stacks.top(mv.to)
                    && below.rank < source.rank
                {
                    return Err(SequenceError::IllegalPlacement {
                        step,
                        rank: source.rank,
                        below: below.rank,
                        peg: mv.to,
                    });
                }
                let rest = dest.with_y(stacks.landing_height(mv.to, disk_height));
                (source.disk, source.rank, rest)
            }
            Occupancy::Scan => {
                let source_x = config.peg(mv.from).x;
                let (disk, _) = scan_top_disk(&*scene, ids(), source_x)
                    .ok_or(SequenceError::SceneInconsistency { step, peg: mv.from })?;
                let rank = rank_of(disks, disk)
                    .ok_or(SequenceError::SceneInconsistency { step, peg: mv.from })?;
                if let Some((top, _)) = scan_top_disk(&*scene, ids(), dest.x)
                    && let Some(below) = rank_of(disks, top)
                    && below < rank
                {
                    return Err(SequenceError::IllegalPlacement {
                        step,
                        rank,
                        below,
                        peg: mv.to,
                    });
                }
                let rest = dest.with_y(scan_landing_height(&*scene, ids(), dest.x, disk_height));
                (disk, rank, rest)
            }
        };

        if let Some(mut stale) = self.relocations.remove(&disk) {
            warn!(%disk, step, "disk still in flight, snapping it to its landing spot");
            scene.set_position(disk, stale.finish());
            self.progress.completed += 1;
        }
        let start = scene
            .position(disk)
            .ok_or(SequenceError::SceneInconsistency { step, peg: mv.from })?;

        // stacks change only once the launch can no longer fail
        if let Occupancy::Stacks(stacks) = &mut self.occupancy
            && let Some(source) = stacks.pop(mv.from)
        {
            stacks
                .push(mv.to, Resting { rest, ..source })
                .map_err(|below| SequenceError::IllegalPlacement {
                    step,
                    rank,
                    below: below.rank,
                    peg: mv.to,
                })?;
        }

        self.next_move += 1;
        self.progress.launched += 1;
        sink.show(&self.progress.step_readout(config.style));
        debug!(step, %mv, %disk, rank, target_y = rest.y, "launching move");

        self.relocations.insert(
            disk,
            Relocation::new(
                start,
                rest,
                config.lift_height,
                phase_duration(config.move_delay),
            ),
        );
        Ok(())
    }

    /// Land every in-flight disk whose path touches a peg at one of `xs`, so a
    /// position scan over those pegs only sees resting disks.
    fn settle_at<S: Scene + ?Sized>(&mut self, xs: &[f64], step: u64, scene: &mut S) {
        let near = |c: Coord| xs.iter().any(|&x| approx_eq(c.x, x));
        let settling: Vec<DiskId> = self
            .relocations
            .iter()
            .filter(|(_, r)| near(r.start()) || near(r.position()) || near(r.target()))
            .map(|(id, _)| *id)
            .collect();
        for disk in settling {
            if let Some(mut relocation) = self.relocations.remove(&disk) {
                debug!(%disk, step, "landing in-flight disk before scanning");
                scene.set_position(disk, relocation.finish());
                self.progress.completed += 1;
            }
        }
    }
}

fn rank_of(disks: &[(DiskId, u32)], disk: DiskId) -> Option<u32> {
    disks
        .iter()
        .find_map(|&(id, rank)| (id == disk).then_some(rank))
}

/// Drives runs one tick at a time.
#[derive(Debug)]
pub struct Sequencer {
    config: SequencerConfig,
    state: Option<SimulationState>,
}

impl Sequencer {
    pub fn new(config: SequencerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: None,
        })
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&SimulationState> {
        self.state.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.status == RunStatus::Animating)
    }

    pub fn progress(&self) -> Progress {
        self.state
            .as_ref()
            .map(SimulationState::progress)
            .unwrap_or_default()
    }

    /// Begin a new run with `disk_count` disks on peg 0.
    ///
    /// Refused with [`SequenceError::Busy`] while another run is animating;
    /// the scene is left untouched in that case. Returns the number of
    /// planned moves.
    pub fn start<S, P>(&mut self, disk_count: u32, scene: &mut S, sink: &mut P) -> Result<u64>
    where
        S: Scene + ?Sized,
        P: ProgressSink + ?Sized,
    {
        if self.is_animating() {
            debug!("start requested while animating; ignored");
            return Err(SequenceError::Busy);
        }

        if let Some(previous) = self.state.take() {
            for (disk, _) in previous.disks {
                scene.despawn_disk(disk);
            }
        }

        let layout = self.config.layout;
        let base = self.config.peg(Peg::Left);
        let disks = layout.spawn_tower(scene, disk_count, base);

        let occupancy = match self.config.resolution {
            Resolution::Stacks => Occupancy::Stacks(PegStacks::with_tower(
                Peg::Left,
                disks.iter().enumerate().map(|(level, &(disk, rank))| Resting {
                    disk,
                    rank,
                    rest: base.with_y(layout.resting_height(level)),
                }),
            )),
            Resolution::PositionScan => Occupancy::Scan,
        };

        let moves = plan(disk_count);
        let total = move_count(disk_count);
        let progress = Progress::new(total);
        sink.show(&progress.initial_readout());
        info!(
            disks = disk_count,
            total,
            move_delay = self.config.move_delay,
            resolution = ?self.config.resolution,
            "starting run"
        );

        let status = if moves.is_empty() {
            RunStatus::Finished
        } else {
            RunStatus::Animating
        };
        self.state = Some(SimulationState {
            moves,
            next_move: 0,
            timer: 0.0,
            progress,
            disks,
            occupancy,
            relocations: BTreeMap::new(),
            status,
        });
        Ok(total)
    }

    /// Stop the current run. In-flight disks stay where they are.
    ///
    /// Returns whether a run was actually animating.
    pub fn cancel(&mut self) -> bool {
        match self.state.as_mut() {
            Some(state) if state.status == RunStatus::Animating => {
                info!(
                    launched = state.progress.launched,
                    in_flight = state.relocations.len(),
                    "cancelling run"
                );
                state.relocations.clear();
                state.status = RunStatus::Cancelled;
                true
            }
            _ => false,
        }
    }

    /// Cancel whatever is running and start over.
    pub fn restart<S, P>(&mut self, disk_count: u32, scene: &mut S, sink: &mut P) -> Result<u64>
    where
        S: Scene + ?Sized,
        P: ProgressSink + ?Sized,
    {
        self.cancel();
        self.start(disk_count, scene, sink)
    }

    /// Advance the run by one tick of `dt` seconds.
    ///
    /// A launch failure stops the run and is returned; later calls are
    /// no-ops.
    pub fn advance<S, P>(&mut self, dt: f64, scene: &mut S, sink: &mut P) -> Result<()>
    where
        S: Scene + ?Sized,
        P: ProgressSink + ?Sized,
    {
        let config = &self.config;
        let Some(state) = self.state.as_mut() else {
            return Ok(());
        };
        if state.status != RunStatus::Animating {
            return Ok(());
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        for (&disk, relocation) in state.relocations.iter_mut() {
            scene.set_position(disk, relocation.advance(dt));
        }
        let before = state.relocations.len();
        state.relocations.retain(|disk, relocation| {
            if relocation.is_done() {
                trace!(%disk, "relocation finished");
            }
            !relocation.is_done()
        });
        state.progress.completed += (before - state.relocations.len()) as u64;

        if !state.all_launched() {
            state.timer += dt;
            while state.timer >= config.move_delay && !state.all_launched() {
                state.timer -= config.move_delay;
                if let Err(err) = state.launch(config, scene, sink) {
                    warn!(%err, "run stopped");
                    state.status = RunStatus::Failed;
                    return Err(err);
                }
            }
        }

        if state.all_launched() && state.relocations.is_empty() {
            state.status = RunStatus::Finished;
            info!(steps = state.progress.launched, "run finished");
        }
        Ok(())
    }
}
