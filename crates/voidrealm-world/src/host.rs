//! Contracts the host game exposes to the region lifecycle.
//!
//! The voxel store and the entity system are owned by the host; the region
//! lifecycle only sees them through these traits. Entity calls are keyed by
//! [`EntityId`] rather than by borrowed handles, and an entity that no longer
//! exists simply answers `None` (queries) or ignores the call (mutations).

use glam::DVec3;
use voidrealm_types::{EffectKind, EntityId, Voxel, VoxelPos};

/// Read/write access to the voxel store plus the spatial entity query.
pub trait VoxelWorld {
    /// Return the content of a single voxel.
    fn voxel(&self, pos: VoxelPos) -> Voxel;

    /// Overwrite the content of a single voxel.
    fn set_voxel(&mut self, pos: VoxelPos, voxel: Voxel);

    /// Return every entity whose position lies inside the axis-aligned box
    /// spanned by `min` and `max` (inclusive).
    fn entities_in_box(&self, min: DVec3, max: DVec3) -> Vec<EntityId>;
}

/// What an entity can do, as far as trapping is concerned.
///
/// Hosts answer this instead of exposing their entity type hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// The entity is alive and can carry timed status effects.
    pub living: bool,
    /// The entity has an autonomy (AI) flag that can be switched off.
    pub autonomy: bool,
}

/// Per-entity position, velocity, status effect, and autonomy control.
pub trait EntityService {
    /// Capabilities of an entity, or `None` if it no longer exists.
    fn capabilities(&self, id: EntityId) -> Option<Capabilities>;

    /// Current position, or `None` if the entity no longer exists.
    fn position(&self, id: EntityId) -> Option<DVec3>;

    /// Teleport the entity.
    fn set_position(&mut self, id: EntityId, pos: DVec3);

    /// Overwrite the entity's velocity.
    fn set_velocity(&mut self, id: EntityId, velocity: DVec3);

    /// Apply (or refresh) a timed status effect.
    fn apply_effect(&mut self, id: EntityId, kind: EffectKind, duration_ticks: u32, amplifier: u8);

    /// Remove a status effect if present.
    fn clear_effect(&mut self, id: EntityId, kind: EffectKind);

    /// Whether the entity currently carries a status effect.
    fn has_effect(&self, id: EntityId, kind: EffectKind) -> bool;

    /// Current autonomy flag, or `None` if the entity has none (or is gone).
    fn autonomy(&self, id: EntityId) -> Option<bool>;

    /// Set the autonomy flag. Ignored for entities without one.
    fn set_autonomy(&mut self, id: EntityId, enabled: bool);

    /// Remove the entity from the world.
    fn discard(&mut self, id: EntityId);
}

/// Everything a region instance needs from its host.
pub trait Host: VoxelWorld + EntityService {}

impl<T: VoxelWorld + EntityService + ?Sized> Host for T {}

/// A host that also owns the game tick used to time status effects.
///
/// Effect durations are measured in game ticks, independently of the
/// wall-clock samples that drive phase progress.
pub trait TickingHost: Host {
    /// Advance the game tick by one, expiring timed effects.
    fn advance_game_tick(&mut self);

    /// Current game tick.
    fn game_tick(&self) -> u64;
}
