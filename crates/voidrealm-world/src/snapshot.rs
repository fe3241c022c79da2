//! Layered voxel snapshots: the undo log for one region.
//!
//! A [`VoxelSnapshot`] records the original content of every voxel a region
//! may overwrite, grouped by an integer layer key (a `y` offset for the shell
//! and interior, a ring index for the platform). Phased animations walk a
//! range of layers at a time, so per-tick work is bounded by the size of the
//! layers crossed rather than the whole snapshot.
//!
//! Restoration only ever visits captured positions; nothing is synthesized.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use voidrealm_types::{Voxel, VoxelPos};

use crate::host::VoxelWorld;

/// Original voxel contents grouped by layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoxelSnapshot {
    /// Original content per captured position.
    originals: BTreeMap<VoxelPos, Voxel>,
    /// Captured positions grouped by layer key.
    layers: BTreeMap<i32, Vec<VoxelPos>>,
}

impl VoxelSnapshot {
    /// Create an empty snapshot.
    pub const fn new() -> Self {
        Self {
            originals: BTreeMap::new(),
            layers: BTreeMap::new(),
        }
    }

    /// Record the original content of `pos` under `layer`.
    ///
    /// Returns `false` (and leaves the snapshot untouched) if the position
    /// was already recorded; the first capture always wins.
    pub fn record(&mut self, layer: i32, pos: VoxelPos, original: Voxel) -> bool {
        if self.originals.contains_key(&pos) {
            return false;
        }
        self.originals.insert(pos, original);
        self.layers.entry(layer).or_default().push(pos);
        true
    }

    /// Read `pos` from the world and record it under `layer`.
    pub fn capture<W: VoxelWorld + ?Sized>(&mut self, world: &W, layer: i32, pos: VoxelPos) -> bool {
        if self.originals.contains_key(&pos) {
            return false;
        }
        self.record(layer, pos, world.voxel(pos))
    }

    /// Original content of a captured position.
    pub fn original(&self, pos: VoxelPos) -> Option<Voxel> {
        self.originals.get(&pos).copied()
    }

    /// Whether a position was captured.
    pub fn contains(&self, pos: VoxelPos) -> bool {
        self.originals.contains_key(&pos)
    }

    /// Number of captured positions.
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Whether nothing was captured.
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Iterate over every captured position and its original content.
    pub fn iter(&self) -> impl Iterator<Item = (VoxelPos, Voxel)> + '_ {
        self.originals.iter().map(|(pos, voxel)| (*pos, *voxel))
    }

    /// Positions captured under layers within `range`.
    fn positions_in(&self, range: RangeInclusive<i32>) -> impl Iterator<Item = VoxelPos> + '_ {
        self.layers
            .range(range)
            .flat_map(|(_, positions)| positions.iter().copied())
    }

    /// Write `material` to every captured position in the given layers.
    ///
    /// Returns the number of voxels written.
    pub fn materialize<W: VoxelWorld + ?Sized>(
        &self,
        world: &mut W,
        layers: RangeInclusive<i32>,
        material: Voxel,
    ) -> usize {
        let mut written: usize = 0;
        for pos in self.positions_in(layers) {
            world.set_voxel(pos, material);
            written = written.saturating_add(1);
        }
        written
    }

    /// Revert captured positions in the given layers whose current content
    /// is still `active`. Anything else is left untouched.
    ///
    /// Returns the number of voxels reverted.
    pub fn revert<W: VoxelWorld + ?Sized>(
        &self,
        world: &mut W,
        layers: RangeInclusive<i32>,
        active: Voxel,
    ) -> usize {
        let mut reverted: usize = 0;
        for pos in self.positions_in(layers) {
            if revert_one(world, pos, self.originals.get(&pos).copied(), active) {
                reverted = reverted.saturating_add(1);
            }
        }
        reverted
    }

    /// Revert every captured position whose current content is `active`.
    pub fn revert_all<W: VoxelWorld + ?Sized>(&self, world: &mut W, active: Voxel) -> usize {
        let mut reverted: usize = 0;
        for (pos, original) in &self.originals {
            if revert_one(world, *pos, Some(*original), active) {
                reverted = reverted.saturating_add(1);
            }
        }
        reverted
    }

    /// Write every captured original back, whatever the world holds now.
    ///
    /// Positions already holding their original are skipped, so a second
    /// call writes nothing. Returns the number of voxels written.
    pub fn restore_all<W: VoxelWorld + ?Sized>(&self, world: &mut W) -> usize {
        let mut restored: usize = 0;
        for (pos, original) in &self.originals {
            if world.voxel(*pos) != *original {
                world.set_voxel(*pos, *original);
                restored = restored.saturating_add(1);
            }
        }
        restored
    }
}

/// Write `original` back to `pos` if the world still holds `active` there.
fn revert_one<W: VoxelWorld + ?Sized>(
    world: &mut W,
    pos: VoxelPos,
    original: Option<Voxel>,
    active: Voxel,
) -> bool {
    let Some(original) = original else {
        return false;
    };
    if world.voxel(pos) != active || original == active {
        return false;
    }
    world.set_voxel(pos, original);
    true
}
