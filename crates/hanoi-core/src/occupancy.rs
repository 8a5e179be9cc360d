//! Which disk sits where.
//!
//! [`PegStacks`] tracks every peg as an explicit stack updated on each
//! move. The `scan_*` functions instead derive occupancy from live disk
//! positions, which reproduces the legacy behavior including its blind
//! spots for disks still in flight.

use crate::{
    planner::Peg,
    scene::{DiskId, Scene},
    trajectory::Coord,
};

/// Height of an empty peg's landing spot.
pub const GROUND_LEVEL: f64 = 0.0;

/// A disk at rest (or about to be) on a peg.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resting {
    pub disk: DiskId,
    pub rank: u32,
    /// Position the disk occupies once its relocation ends.
    pub rest: Coord,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PegStacks {
    pegs: [Vec<Resting>; 3],
}

impl PegStacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stacks with `tower` (bottom to top) on `peg`.
    pub fn with_tower(peg: Peg, tower: impl IntoIterator<Item = Resting>) -> Self {
        let mut stacks = Self::new();
        stacks.pegs[peg.index()].extend(tower);
        stacks
    }

    pub fn peg(&self, peg: Peg) -> &[Resting] {
        &self.pegs[peg.index()]
    }

    pub fn top(&self, peg: Peg) -> Option<&Resting> {
        self.pegs[peg.index()].last()
    }

    pub fn pop(&mut self, peg: Peg) -> Option<Resting> {
        self.pegs[peg.index()].pop()
    }

    /// Push `entry` onto `peg`. On refusal the top of `peg` is returned and
    /// nothing changes.
    pub fn push(&mut self, peg: Peg, entry: Resting) -> Result<(), Resting> {
        if let Some(&below) = self.top(peg)
            && below.rank < entry.rank
        {
            return Err(below);
        }
        self.pegs[peg.index()].push(entry);
        Ok(())
    }

    /// Height a disk dropped onto `peg` comes to rest at.
    pub fn landing_height(&self, peg: Peg, disk_height: f64) -> f64 {
        self.top(peg)
            .map_or(GROUND_LEVEL, |top| top.rest.y + disk_height)
    }

    pub fn len(&self) -> usize {
        self.pegs.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Float equality with a small relative tolerance.
pub fn approx_eq(a: f64, b: f64) -> bool {
    let scale = a.abs().max(b.abs()).max(1.0);
    (a - b).abs() <= 1e-6 * scale
}

/// Topmost disk whose position is over `peg_x`.
pub fn scan_top_disk<S: Scene + ?Sized>(
    scene: &S,
    disks: impl IntoIterator<Item = DiskId>,
    peg_x: f64,
) -> Option<(DiskId, Coord)> {
    disks
        .into_iter()
        .filter_map(|id| scene.position(id).map(|pos| (id, pos)))
        .filter(|(_, pos)| approx_eq(pos.x, peg_x))
        .fold(None, |best: Option<(DiskId, Coord)>, (id, pos)| match best {
            Some((_, top)) if top.y >= pos.y => best,
            _ => Some((id, pos)),
        })
}

/// Landing height over `peg_x` derived from every disk positioned there.
pub fn scan_landing_height<S: Scene + ?Sized>(
    scene: &S,
    disks: impl IntoIterator<Item = DiskId>,
    peg_x: f64,
    disk_height: f64,
) -> f64 {
    disks
        .into_iter()
        .filter_map(|id| scene.position(id))
        .filter(|pos| approx_eq(pos.x, peg_x))
        .map(|pos| pos.y + disk_height)
        .fold(GROUND_LEVEL, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{DiskLayout, MemoryScene};

    fn resting(disk: u32, rank: u32, y: f64) -> Resting {
        Resting {
            disk: DiskId(disk),
            rank,
            rest: Coord::new(0.0, y, 0.0),
        }
    }

    #[test]
    fn empty_peg_lands_on_ground() {
        let stacks = PegStacks::new();
        assert_eq!(stacks.landing_height(Peg::Right, 0.5), GROUND_LEVEL);
        assert!(stacks.is_empty());
    }

    #[test]
    fn occupied_peg_lands_on_top_disk() {
        let stacks =
            PegStacks::with_tower(Peg::Middle, [resting(0, 2, 0.0), resting(1, 1, 0.5)]);
        assert_eq!(stacks.landing_height(Peg::Middle, 0.5), 1.0);
        assert_eq!(stacks.top(Peg::Middle).unwrap().rank, 1);
        assert_eq!(stacks.len(), 2);
    }

    #[test]
    fn push_refuses_larger_on_smaller() {
        let mut stacks = PegStacks::with_tower(Peg::Left, [resting(0, 0, 0.0)]);
        let below = stacks.push(Peg::Left, resting(1, 3, 0.5)).unwrap_err();
        assert_eq!(below.disk, DiskId(0));
        assert_eq!(stacks.peg(Peg::Left).len(), 1);

        let top = stacks.pop(Peg::Left).unwrap();
        stacks.push(Peg::Right, top).unwrap();
        assert!(stacks.peg(Peg::Left).is_empty());
        assert_eq!(stacks.pop(Peg::Left), None);
    }

    #[test]
    fn approx_eq_tolerates_drift() {
        assert!(approx_eq(0.1 + 0.2, 0.3));
        assert!(approx_eq(-3.0, -3.0 + 1e-9));
        assert!(!approx_eq(0.0, 0.01));
    }

    #[test]
    fn scan_finds_topmost_disk_over_peg() {
        let mut scene = MemoryScene::new();
        let tower = DiskLayout::default().spawn_tower(&mut scene, 3, Coord::new(-3.0, 0.0, 0.0));
        let ids: Vec<DiskId> = tower.iter().map(|(id, _)| *id).collect();

        let (top, pos) = scan_top_disk(&scene, ids.iter().copied(), -3.0).unwrap();
        assert_eq!(top, tower[2].0);
        assert_eq!(pos.y, 1.0);

        assert_eq!(scan_top_disk(&scene, ids.iter().copied(), 3.0), None);
        assert_eq!(scan_landing_height(&scene, ids.iter().copied(), 3.0, 0.5), 0.0);
        assert_eq!(scan_landing_height(&scene, ids.iter().copied(), -3.0, 0.5), 1.5);
    }
}
