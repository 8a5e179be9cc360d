//! The world the sequencer moves disks around in.

use crate::trajectory::Coord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Handle to a disk object owned by a [`Scene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DiskId(pub u32);

impl fmt::Display for DiskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "disk#{}", self.0)
    }
}

/// Everything needed to instantiate a disk.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DiskSpec {
    /// 0 is the smallest disk.
    pub rank: u32,
    pub width: f64,
    pub height: f64,
    pub position: Coord,
}

/// Scene collaborator: creates, destroys, reads and places disk objects.
pub trait Scene {
    fn spawn_disk(&mut self, spec: DiskSpec) -> DiskId;
    fn despawn_disk(&mut self, disk: DiskId);
    fn position(&self, disk: DiskId) -> Option<Coord>;
    fn set_position(&mut self, disk: DiskId, position: Coord);
}

/// Disk dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct DiskLayout {
    pub disk_height: f64,
    pub min_width: f64,
    pub width_increment: f64,
}

impl Default for DiskLayout {
    fn default() -> Self {
        Self {
            disk_height: 0.5,
            min_width: 1.0,
            width_increment: 0.5,
        }
    }
}

impl DiskLayout {
    pub fn width(&self, rank: u32) -> f64 {
        self.min_width + f64::from(rank) * self.width_increment
    }

    /// Resting height of the `level`-th disk from the bottom of a stack.
    pub fn resting_height(&self, level: usize) -> f64 {
        level as f64 * self.disk_height
    }

    /// Spawn `count` disks stacked from ground level over `base`, largest
    /// first. Returns `(handle, rank)` pairs bottom to top.
    pub fn spawn_tower<S: Scene + ?Sized>(
        &self,
        scene: &mut S,
        count: u32,
        base: Coord,
    ) -> Vec<(DiskId, u32)> {
        (0..count)
            .rev()
            .enumerate()
            .map(|(level, rank)| {
                let position = base.with_y(self.resting_height(level));
                let id = scene.spawn_disk(DiskSpec {
                    rank,
                    width: self.width(rank),
                    height: self.disk_height,
                    position,
                });
                (id, rank)
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MemoryDisk {
    pub spec: DiskSpec,
    pub position: Coord,
}

/// Headless scene keeping disks in memory.
#[derive(Debug, Default)]
pub struct MemoryScene {
    disks: BTreeMap<DiskId, MemoryDisk>,
    next_id: u32,
    spawned: usize,
    despawned: usize,
    updates: usize,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disk(&self, disk: DiskId) -> Option<&MemoryDisk> {
        self.disks.get(&disk)
    }

    pub fn disks(&self) -> impl Iterator<Item = (DiskId, &MemoryDisk)> {
        self.disks.iter().map(|(id, disk)| (*id, disk))
    }

    pub fn len(&self) -> usize {
        self.disks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.disks.is_empty()
    }

    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn despawned(&self) -> usize {
        self.despawned
    }

    /// Number of `set_position` calls so far.
    pub fn updates(&self) -> usize {
        self.updates
    }
}

impl Scene for MemoryScene {
    fn spawn_disk(&mut self, spec: DiskSpec) -> DiskId {
        let id = DiskId(self.next_id);
        self.next_id += 1;
        self.spawned += 1;
        self.disks.insert(
            id,
            MemoryDisk {
                spec,
                position: spec.position,
            },
        );
        id
    }

    fn despawn_disk(&mut self, disk: DiskId) {
        if self.disks.remove(&disk).is_some() {
            self.despawned += 1;
        }
    }

    fn position(&self, disk: DiskId) -> Option<Coord> {
        self.disks.get(&disk).map(|d| d.position)
    }

    fn set_position(&mut self, disk: DiskId, position: Coord) {
        if let Some(d) = self.disks.get_mut(&disk) {
            d.position = position;
            self.updates += 1;
        }
    }
}
