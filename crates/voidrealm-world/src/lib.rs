//! Host world contracts, region geometry, and voxel snapshots.
//!
//! This crate models everything the region lifecycle needs from the world it
//! mutates, without owning that world: the traits a host implements, the
//! geometry of a spherical region, and the layered undo log used to restore
//! it. An in-memory host is included for tests and the demo engine.
//!
//! # Modules
//!
//! - [`error`] -- Error types for in-memory world management.
//! - [`host`] -- [`VoxelWorld`], [`EntityService`], and the combined [`Host`]
//!   contract, plus [`TickingHost`] for hosts that own the game tick.
//! - [`memory`] -- [`MemoryWorld`], a flat in-memory host.
//! - [`shape`] -- [`RegionShape`]: shell, platform, and interior membership.
//! - [`snapshot`] -- [`VoxelSnapshot`]: original voxel contents by layer.

pub mod error;
pub mod host;
pub mod memory;
pub mod shape;
pub mod snapshot;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use host::{Capabilities, EntityService, Host, TickingHost, VoxelWorld};
pub use memory::{ActiveEffect, MemoryEntity, MemoryWorld};
pub use shape::RegionShape;
pub use snapshot::VoxelSnapshot;
