//! Three-phase relocation trajectory.
//!
//! A disk is lifted straight up, carried across at the lifted height and
//! lowered onto its landing spot. Each phase is a linear interpolation that
//! advances by the elapsed time of every rendering tick; the phases run
//! strictly one after another and the disk snaps to its exact target once
//! the last one ends.

use serde::Serialize;

/// Fraction of the inter-move delay spent in each of the three phases.
pub const PHASE_FRACTION: f64 = 0.3;
/// Vertical clearance added above the start position during the lift.
pub const DEFAULT_LIFT_HEIGHT: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coord {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    /// Linear interpolation with `t` clamped to `[0, 1]`.
    pub fn lerp(a: Coord, b: Coord, t: f64) -> Coord {
        let t = t.clamp(0.0, 1.0);
        Coord {
            x: a.x + (b.x - a.x) * t,
            y: a.y + (b.y - a.y) * t,
            z: a.z + (b.z - a.z) * t,
        }
    }
}

/// Phase duration for a given inter-move delay.
pub fn phase_duration(move_delay: f64) -> f64 {
    move_delay * PHASE_FRACTION
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Lift,
    Translate,
    Descend,
    Done,
}

impl Phase {
    fn next(self) -> Self {
        match self {
            Phase::Lift => Phase::Translate,
            Phase::Translate => Phase::Descend,
            Phase::Descend | Phase::Done => Phase::Done,
        }
    }
}

/// In-flight relocation of a single disk.
#[derive(Clone, Debug, PartialEq)]
pub struct Relocation {
    start: Coord,
    lifted: Coord,
    above_target: Coord,
    target: Coord,
    phase: Phase,
    elapsed: f64,
    duration: f64,
    position: Coord,
}

impl Relocation {
    pub fn new(start: Coord, target: Coord, lift_height: f64, phase_duration: f64) -> Self {
        let lifted = start.with_y(start.y + lift_height);
        let above_target = Coord::new(target.x, lifted.y, target.z);
        Self {
            start,
            lifted,
            above_target,
            target,
            phase: Phase::Lift,
            elapsed: 0.0,
            duration: phase_duration.max(0.0),
            position: start,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn start(&self) -> Coord {
        self.start
    }

    pub fn target(&self) -> Coord {
        self.target
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Waypoints bounding the current phase, `None` once done.
    fn segment(&self) -> Option<(Coord, Coord)> {
        match self.phase {
            Phase::Lift => Some((self.start, self.lifted)),
            Phase::Translate => Some((self.lifted, self.above_target)),
            Phase::Descend => Some((self.above_target, self.target)),
            Phase::Done => None,
        }
    }

    /// Advance by one tick of `dt` seconds and return the new position.
    pub fn advance(&mut self, dt: f64) -> Coord {
        // zero-length phases finish within the same tick
        while self.duration <= 0.0 && !self.is_done() {
            self.enter(self.phase.next());
        }

        if let Some((from, to)) = self.segment() {
            self.elapsed += dt.max(0.0);
            self.position = Coord::lerp(from, to, self.elapsed / self.duration);
            if self.elapsed >= self.duration {
                self.enter(self.phase.next());
            }
        }

        self.position
    }

    /// Jump straight to the end of the trajectory.
    pub fn finish(&mut self) -> Coord {
        self.enter(Phase::Done);
        self.position
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.elapsed = 0.0;
        if let Some((from, _)) = self.segment() {
            self.position = from;
        } else {
            self.position = self.target;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Coord = Coord::new(-3.0, 0.5, 0.0);
    const TARGET: Coord = Coord::new(3.0, 0.0, 0.0);

    fn assert_close(a: Coord, b: Coord) {
        let d = (a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs();
        assert!(d < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn lerp_clamps() {
        let a = Coord::new(0.0, 0.0, 0.0);
        let b = Coord::new(2.0, 4.0, -2.0);
        assert_eq!(Coord::lerp(a, b, 0.5), Coord::new(1.0, 2.0, -1.0));
        assert_eq!(Coord::lerp(a, b, 1.7), b);
        assert_eq!(Coord::lerp(a, b, -1.0), a);
    }

    #[test]
    fn phase_duration_is_fraction_of_delay() {
        assert!((phase_duration(1.0) - 0.3).abs() < 1e-12);
        assert!((phase_duration(2.5) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn walks_through_waypoints() {
        let mut r = Relocation::new(START, TARGET, DEFAULT_LIFT_HEIGHT, 1.0);
        assert_eq!(r.phase(), Phase::Lift);

        assert_close(r.advance(0.5), Coord::new(-3.0, 1.5, 0.0));
        assert_eq!(r.phase(), Phase::Lift);
        assert_close(r.advance(0.5), Coord::new(-3.0, 2.5, 0.0));
        assert_eq!(r.phase(), Phase::Translate);

        assert_close(r.advance(0.5), Coord::new(0.0, 2.5, 0.0));
        assert_close(r.advance(0.5), Coord::new(3.0, 2.5, 0.0));
        assert_eq!(r.phase(), Phase::Descend);

        assert_close(r.advance(0.25), Coord::new(3.0, 1.875, 0.0));
        r.advance(1.0);
        assert!(r.is_done());
        assert_eq!(r.position(), TARGET);
    }

    #[test]
    fn excess_time_is_not_carried_into_next_phase() {
        let mut r = Relocation::new(START, TARGET, 2.0, 0.3);
        assert_close(r.advance(10.0), Coord::new(-3.0, 2.5, 0.0));
        assert_eq!(r.phase(), Phase::Translate);
        assert_close(r.advance(10.0), Coord::new(3.0, 2.5, 0.0));
        assert_eq!(r.advance(10.0), TARGET);
        assert!(r.is_done());
        // further ticks are inert
        assert_eq!(r.advance(1.0), TARGET);
    }

    #[test]
    fn snaps_exactly_to_target() {
        let target = Coord::new(0.1 + 0.2, 0.7, 0.0);
        let mut r = Relocation::new(START, target, 2.0, 0.3);
        while !r.is_done() {
            r.advance(1.0 / 60.0);
        }
        assert_eq!(r.position(), target);
    }

    #[test]
    fn zero_duration_completes_in_one_tick() {
        let mut r = Relocation::new(START, TARGET, 2.0, 0.0);
        assert_eq!(r.advance(0.0), TARGET);
        assert!(r.is_done());
    }

    #[test]
    fn finish_skips_remaining_phases() {
        let mut r = Relocation::new(START, TARGET, 2.0, 1.0);
        r.advance(0.1);
        assert_eq!(r.finish(), TARGET);
        assert!(r.is_done());
    }
}
