//! Shared type definitions for the Voidrealm region lifecycle.
//!
//! This crate is the single source of truth for the value types that cross
//! crate boundaries: identifiers, voxel coordinates and content, lifecycle
//! phases, status effect kinds, and the notices relayed to observers.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for entities and region instances
//! - [`geometry`] -- Integer voxel coordinates and opaque voxel content
//! - [`enums`] -- Lifecycle phase and status effect kinds
//! - [`notice`] -- Lifecycle notices and their JSON wire frames

pub mod enums;
pub mod geometry;
pub mod ids;
pub mod notice;

// Re-export all public types at crate root for convenience.
pub use enums::{EffectKind, Phase};
pub use geometry::{Voxel, VoxelPos};
pub use glam::DVec3;
pub use ids::{EntityId, InstanceId};
pub use notice::{Notice, PAYLOAD_NAMESPACE, WirePayload};
