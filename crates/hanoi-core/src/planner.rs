//! Minimal move sequence for the three-peg Tower of Hanoi.
//!
//! [`plan`] produces the classic recursive solution moving a tower from the
//! left peg to the right peg. [`Towers`] is an abstract stack model used to
//! check a plan without trusting the recursion.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

const PREALLOCATE_LIMIT: u64 = 1 << 20;

/// One of the three fixed pegs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "usize")]
pub enum Peg {
    Left,
    Middle,
    Right,
}

impl Peg {
    pub const ALL: [Peg; 3] = [Peg::Left, Peg::Middle, Peg::Right];

    pub const fn index(self) -> usize {
        match self {
            Peg::Left => 0,
            Peg::Middle => 1,
            Peg::Right => 2,
        }
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Peg::Left),
            1 => Some(Peg::Middle),
            2 => Some(Peg::Right),
            _ => None,
        }
    }
}

impl From<Peg> for usize {
    fn from(peg: Peg) -> Self {
        peg.index()
    }
}

impl fmt::Display for Peg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Move the topmost disk of `from` onto `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub from: Peg,
    pub to: Peg,
}

impl Move {
    pub const fn new(from: Peg, to: Peg) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Number of moves in the minimal solution for `disks` disks (`2^n - 1`).
///
/// Saturates at `u64::MAX` for towers too tall to count.
pub fn move_count(disks: u32) -> u64 {
    1u64.checked_shl(disks).map_or(u64::MAX, |n| n - 1)
}

/// Plan the minimal move sequence for a tower of `disks` disks on the left
/// peg to end up on the right peg.
pub fn plan(disks: u32) -> Vec<Move> {
    let capacity = move_count(disks).min(PREALLOCATE_LIMIT);
    let mut moves = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));
    solve(disks, Peg::Left, Peg::Right, Peg::Middle, &mut moves);
    moves
}

fn solve(n: u32, from: Peg, to: Peg, aux: Peg, out: &mut Vec<Move>) {
    if n == 0 {
        return;
    }
    solve(n - 1, from, aux, to, out);
    out.push(Move::new(from, to));
    solve(n - 1, aux, to, from, out);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("no disk on peg {peg}")]
    EmptySource { peg: Peg },
    #[error("disk {disk} cannot rest on smaller disk {below} on peg {peg}")]
    LargerOnSmaller { disk: u32, below: u32, peg: Peg },
}

/// Abstract three-peg model holding disk ranks, bottom to top.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Towers {
    pegs: [Vec<u32>; 3],
    disks: u32,
}

impl Towers {
    /// A tower of `disks` disks stacked on the left peg, largest at the bottom.
    pub fn new(disks: u32) -> Self {
        Self {
            pegs: [(0..disks).rev().collect(), Vec::new(), Vec::new()],
            disks,
        }
    }

    pub fn peg(&self, peg: Peg) -> &[u32] {
        &self.pegs[peg.index()]
    }

    /// Apply `mv`, refusing moves from an empty peg or onto a smaller disk.
    pub fn apply(&mut self, mv: Move) -> Result<(), IllegalMove> {
        let disk = *self.pegs[mv.from.index()]
            .last()
            .ok_or(IllegalMove::EmptySource { peg: mv.from })?;
        if let Some(&below) = self.pegs[mv.to.index()].last()
            && below < disk
        {
            return Err(IllegalMove::LargerOnSmaller {
                disk,
                below,
                peg: mv.to,
            });
        }
        self.pegs[mv.from.index()].pop();
        self.pegs[mv.to.index()].push(disk);
        Ok(())
    }

    /// Every disk is on the right peg, in order.
    pub fn is_solved(&self) -> bool {
        self.pegs[0].is_empty()
            && self.pegs[1].is_empty()
            && self.pegs[2].iter().copied().eq((0..self.disks).rev())
    }
}
