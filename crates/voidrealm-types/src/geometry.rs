//! Voxel coordinates and voxel content.
//!
//! The host world is addressed by integer [`VoxelPos`] coordinates; mobile
//! entities live in continuous space and use [`glam::DVec3`] directly.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Position of a voxel in the world (integer world coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VoxelPos {
    /// East-west coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// North-south coordinate.
    pub z: i32,
}

impl VoxelPos {
    /// Create a voxel position from its components.
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Return the voxel containing a continuous world position.
    #[allow(clippy::cast_possible_truncation)] // World coordinates fit in i32 by host contract.
    pub fn containing(pos: DVec3) -> Self {
        Self {
            x: pos.x.floor() as i32,
            y: pos.y.floor() as i32,
            z: pos.z.floor() as i32,
        }
    }

    /// Return the voxel directly beneath the one containing `pos`.
    ///
    /// This is the voxel an entity standing at `pos` has under its feet.
    pub fn beneath(pos: DVec3) -> Self {
        Self::containing(pos).offset(0, -1, 0)
    }

    /// Create a new position offset by the given amounts (saturating).
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            z: self.z.saturating_add(dz),
        }
    }

    /// Convert to a continuous position at the voxel's minimum corner.
    pub fn as_dvec3(self) -> DVec3 {
        DVec3::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}

impl core::fmt::Display for VoxelPos {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Opaque voxel content as stored by the host world.
///
/// The region lifecycle never interprets content beyond comparing it for
/// equality and recognising [`Voxel::AIR`]. Material ids for the barrier and
/// the platform come from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Voxel(pub u32);

impl Voxel {
    /// Empty space.
    pub const AIR: Self = Self(0);

    /// Whether this voxel is empty space.
    pub const fn is_air(self) -> bool {
        self.0 == Self::AIR.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containing_floors_negative_coordinates() {
        let pos = VoxelPos::containing(DVec3::new(-0.5, 64.2, 3.99));
        assert_eq!(pos, VoxelPos::new(-1, 64, 3));
    }

    #[test]
    fn beneath_is_one_voxel_down() {
        let pos = VoxelPos::beneath(DVec3::new(10.5, 65.0, -4.5));
        assert_eq!(pos, VoxelPos::new(10, 64, -5));
    }

    #[test]
    fn offset_saturates_at_bounds() {
        let pos = VoxelPos::new(i32::MAX, 0, i32::MIN).offset(1, 2, -1);
        assert_eq!(pos, VoxelPos::new(i32::MAX, 2, i32::MIN));
    }

    #[test]
    fn default_voxel_is_air() {
        assert!(Voxel::default().is_air());
        assert!(!Voxel(7).is_air());
    }
}
