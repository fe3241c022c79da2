//! Region geometry: shell, platform, and interior membership.
//!
//! All membership tests work on integer offsets `(x, y, z)` from the region
//! center, with `d = sqrt(x² + y² + z²)` and `R` the region radius:
//!
//! - **Shell**: `R-1 <= d <= R+1`, offsets bounded by `[-R, R]` on each axis.
//!   Layer key: `y`.
//! - **Platform**: `y == 0` and `sqrt(x² + z²) < R-2`. Layer key: the ring
//!   index `floor(sqrt(x² + z²))`, so ring 0 is the center column.
//! - **Interior**: `d < R-1` and `y > 0` (strictly above the platform plane).
//!
//! Points in continuous space belong to the region when their distance from
//! the center is at most `R-1`.

use glam::DVec3;
use voidrealm_types::VoxelPos;

/// Spherical region geometry anchored at a fixed center voxel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionShape {
    /// The voxel beneath the caster's feet at cast time.
    center: VoxelPos,
    /// Shell radius in voxels.
    radius: i32,
}

/// Euclidean length of an integer offset.
fn length(x: i32, y: i32, z: i32) -> f64 {
    let (x, y, z) = (f64::from(x), f64::from(y), f64::from(z));
    (x * x + y * y + z * z).sqrt()
}

impl RegionShape {
    /// Create a region shape.
    pub const fn new(center: VoxelPos, radius: i32) -> Self {
        Self { center, radius }
    }

    /// The center voxel.
    pub const fn center(&self) -> VoxelPos {
        self.center
    }

    /// The shell radius.
    pub const fn radius(&self) -> i32 {
        self.radius
    }

    /// Exclusive outer bound of the platform disk (`R-2`).
    ///
    /// This is also the number of platform rings.
    pub const fn platform_extent(&self) -> i32 {
        self.radius.saturating_sub(2)
    }

    /// Whether an offset lies on the shell.
    pub fn is_shell_offset(&self, x: i32, y: i32, z: i32) -> bool {
        let d = length(x, y, z);
        let r = f64::from(self.radius);
        d >= r - 1.0 && d <= r + 1.0
    }

    /// Whether a horizontal offset on the center plane lies on the platform.
    pub fn is_platform_offset(&self, x: i32, z: i32) -> bool {
        length(x, 0, z) < f64::from(self.platform_extent())
    }

    /// Whether an offset lies in the clearable interior above the platform.
    pub fn is_interior_offset(&self, x: i32, y: i32, z: i32) -> bool {
        y > 0 && length(x, y, z) < f64::from(self.radius.saturating_sub(1))
    }

    /// Every shell voxel, keyed by its layer (`y` offset).
    pub fn shell(&self) -> Vec<(i32, VoxelPos)> {
        let r = self.radius;
        let mut out = Vec::new();
        for y in r.saturating_neg()..=r {
            for x in r.saturating_neg()..=r {
                for z in r.saturating_neg()..=r {
                    if self.is_shell_offset(x, y, z) {
                        out.push((y, self.center.offset(x, y, z)));
                    }
                }
            }
        }
        out
    }

    /// Every platform voxel, keyed by its ring index.
    #[allow(clippy::cast_possible_truncation)] // Ring index is bounded by the radius.
    pub fn platform(&self) -> Vec<(i32, VoxelPos)> {
        let extent = self.platform_extent();
        let mut out = Vec::new();
        for x in extent.saturating_neg()..=extent {
            for z in extent.saturating_neg()..=extent {
                if self.is_platform_offset(x, z) {
                    let ring = length(x, 0, z).floor() as i32;
                    out.push((ring, self.center.offset(x, 0, z)));
                }
            }
        }
        out
    }

    /// Every interior voxel above the platform, keyed by its `y` offset.
    pub fn interior(&self) -> Vec<(i32, VoxelPos)> {
        let bound = self.radius.saturating_sub(2);
        let mut out = Vec::new();
        for y in 1..=bound {
            for x in bound.saturating_neg()..=bound {
                for z in bound.saturating_neg()..=bound {
                    if self.is_interior_offset(x, y, z) {
                        out.push((y, self.center.offset(x, y, z)));
                    }
                }
            }
        }
        out
    }

    /// Whether a continuous position is inside the sealed sphere.
    pub fn contains_point(&self, pos: DVec3) -> bool {
        pos.distance(self.center.as_dvec3()) <= f64::from(self.radius.saturating_sub(1))
    }

    /// Axis-aligned bounding box of the region, for entity queries.
    pub fn bounding_box(&self) -> (DVec3, DVec3) {
        let c = self.center.as_dvec3();
        let r = DVec3::splat(f64::from(self.radius));
        (c - r, c + r)
    }

    /// Height at which trapped entities stand: the top face of the platform.
    pub fn standing_height(&self) -> f64 {
        f64::from(self.center.y) + 1.0
    }
}
