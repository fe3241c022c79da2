//! In-memory host world used by tests and the demo engine.
//!
//! [`MemoryWorld`] is a flat voxel world (solid ground up to a configurable
//! level, air above) with sparse per-voxel overrides, plus a small entity
//! table with positions, velocities, autonomy flags, and tick-timed status
//! effects. It implements every host contract in [`crate::host`].

use std::collections::BTreeMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::debug;
use voidrealm_types::{EffectKind, EntityId, Voxel, VoxelPos};

use crate::error::WorldError;
use crate::host::{Capabilities, EntityService, TickingHost, VoxelWorld};

/// A timed status effect carried by an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEffect {
    /// Game ticks until the effect expires.
    pub remaining_ticks: u32,
    /// Effect strength tier.
    pub amplifier: u8,
}

/// One entity in the in-memory world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntity {
    /// Current position.
    pub position: DVec3,
    /// Current velocity.
    pub velocity: DVec3,
    /// Whether the entity is alive (can carry status effects).
    pub living: bool,
    /// Autonomy flag, for entities that have one.
    pub autonomy: Option<bool>,
    /// Active timed effects.
    pub effects: BTreeMap<EffectKind, ActiveEffect>,
}

impl MemoryEntity {
    fn new(position: DVec3, living: bool, autonomy: Option<bool>) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            living,
            autonomy,
            effects: BTreeMap::new(),
        }
    }

    /// A player-like entity: living, no autonomy flag.
    pub fn player(position: DVec3) -> Self {
        Self::new(position, true, None)
    }

    /// A mob: living, autonomy enabled.
    pub fn mob(position: DVec3) -> Self {
        Self::new(position, true, Some(true))
    }

    /// A non-living object (dropped item, projectile, ...).
    pub fn object(position: DVec3) -> Self {
        Self::new(position, false, None)
    }

    /// Whether the entity carries an effect of the given kind.
    pub fn has_effect(&self, kind: EffectKind) -> bool {
        self.effects.contains_key(&kind)
    }
}

/// Flat in-memory voxel world with an entity table.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorld {
    /// Highest solid `y` level of the natural terrain.
    ground_level: i32,
    /// Content of natural terrain at or below `ground_level`.
    ground: Voxel,
    /// Voxels that differ from the natural terrain.
    overrides: BTreeMap<VoxelPos, Voxel>,
    /// Entities by id.
    entities: BTreeMap<EntityId, MemoryEntity>,
    /// Current game tick.
    game_tick: u64,
    /// Number of `set_voxel` calls since creation.
    writes: u64,
}

impl MemoryWorld {
    /// Create a world whose terrain is `ground` up to and including
    /// `ground_level`, and air above.
    pub const fn flat(ground_level: i32, ground: Voxel) -> Self {
        Self {
            ground_level,
            ground,
            overrides: BTreeMap::new(),
            entities: BTreeMap::new(),
            game_tick: 0,
            writes: 0,
        }
    }

    /// Natural terrain content at a position.
    const fn natural(&self, pos: VoxelPos) -> Voxel {
        if pos.y <= self.ground_level {
            self.ground
        } else {
            Voxel::AIR
        }
    }

    /// Insert an entity under a fresh id.
    pub fn spawn(&mut self, entity: MemoryEntity) -> EntityId {
        let id = EntityId::new();
        self.entities.insert(id, entity);
        debug!(entity = %id, "Entity spawned");
        id
    }

    /// Insert an entity under a host-chosen id.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateEntity`] if the id is taken.
    pub fn spawn_with_id(&mut self, id: EntityId, entity: MemoryEntity) -> Result<(), WorldError> {
        if self.entities.contains_key(&id) {
            return Err(WorldError::DuplicateEntity(id));
        }
        self.entities.insert(id, entity);
        Ok(())
    }

    /// Remove an entity (despawn, disconnect).
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::EntityNotFound`] if the id is unknown.
    pub fn despawn(&mut self, id: EntityId) -> Result<MemoryEntity, WorldError> {
        self.entities
            .remove(&id)
            .ok_or(WorldError::EntityNotFound(id))
    }

    /// Look up an entity.
    pub fn entity(&self, id: EntityId) -> Option<&MemoryEntity> {
        self.entities.get(&id)
    }

    /// Number of entities in the world.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Number of voxels that differ from natural terrain.
    pub fn modified_voxel_count(&self) -> usize {
        self.overrides.len()
    }

    /// Total number of voxel writes performed so far.
    pub const fn write_count(&self) -> u64 {
        self.writes
    }
}

impl VoxelWorld for MemoryWorld {
    fn voxel(&self, pos: VoxelPos) -> Voxel {
        self.overrides
            .get(&pos)
            .copied()
            .unwrap_or_else(|| self.natural(pos))
    }

    fn set_voxel(&mut self, pos: VoxelPos, voxel: Voxel) {
        self.writes = self.writes.saturating_add(1);
        if voxel == self.natural(pos) {
            self.overrides.remove(&pos);
        } else {
            self.overrides.insert(pos, voxel);
        }
    }

    fn entities_in_box(&self, min: DVec3, max: DVec3) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, e)| e.position.cmpge(min).all() && e.position.cmple(max).all())
            .map(|(id, _)| *id)
            .collect()
    }
}

impl EntityService for MemoryWorld {
    fn capabilities(&self, id: EntityId) -> Option<Capabilities> {
        self.entities.get(&id).map(|e| Capabilities {
            living: e.living,
            autonomy: e.autonomy.is_some(),
        })
    }

    fn position(&self, id: EntityId) -> Option<DVec3> {
        self.entities.get(&id).map(|e| e.position)
    }

    fn set_position(&mut self, id: EntityId, pos: DVec3) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.position = pos;
        }
    }

    fn set_velocity(&mut self, id: EntityId, velocity: DVec3) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.velocity = velocity;
        }
    }

    fn apply_effect(&mut self, id: EntityId, kind: EffectKind, duration_ticks: u32, amplifier: u8) {
        if let Some(e) = self.entities.get_mut(&id) {
            if !e.living || duration_ticks == 0 {
                return;
            }
            e.effects.insert(
                kind,
                ActiveEffect {
                    remaining_ticks: duration_ticks,
                    amplifier,
                },
            );
        }
    }

    fn clear_effect(&mut self, id: EntityId, kind: EffectKind) {
        if let Some(e) = self.entities.get_mut(&id) {
            e.effects.remove(&kind);
        }
    }

    fn has_effect(&self, id: EntityId, kind: EffectKind) -> bool {
        self.entities.get(&id).is_some_and(|e| e.has_effect(kind))
    }

    fn autonomy(&self, id: EntityId) -> Option<bool> {
        self.entities.get(&id).and_then(|e| e.autonomy)
    }

    fn set_autonomy(&mut self, id: EntityId, enabled: bool) {
        if let Some(flag) = self.entities.get_mut(&id).and_then(|e| e.autonomy.as_mut()) {
            *flag = enabled;
        }
    }

    fn discard(&mut self, id: EntityId) {
        if self.entities.remove(&id).is_some() {
            debug!(entity = %id, "Entity discarded");
        }
    }
}

impl TickingHost for MemoryWorld {
    fn advance_game_tick(&mut self) {
        self.game_tick = self.game_tick.saturating_add(1);
        for entity in self.entities.values_mut() {
            entity.effects.retain(|_, effect| {
                effect.remaining_ticks = effect.remaining_ticks.saturating_sub(1);
                effect.remaining_ticks > 0
            });
        }
    }

    fn game_tick(&self) -> u64 {
        self.game_tick
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STONE: Voxel = Voxel(1);

    #[test]
    fn flat_terrain_is_solid_below_ground() {
        let w = MemoryWorld::flat(64, STONE);
        assert_eq!(w.voxel(VoxelPos::new(3, 64, -2)), STONE);
        assert_eq!(w.voxel(VoxelPos::new(3, 65, -2)), Voxel::AIR);
    }

    #[test]
    fn writing_natural_content_drops_override() {
        let mut w = MemoryWorld::flat(64, STONE);
        let pos = VoxelPos::new(0, 70, 0);
        w.set_voxel(pos, Voxel(9));
        assert_eq!(w.modified_voxel_count(), 1);
        w.set_voxel(pos, Voxel::AIR);
        assert_eq!(w.modified_voxel_count(), 0);
        assert_eq!(w.write_count(), 2);
    }

    #[test]
    fn box_query_is_inclusive() {
        let mut w = MemoryWorld::flat(64, STONE);
        let inside = w.spawn(MemoryEntity::mob(DVec3::new(5.0, 65.0, 5.0)));
        let _outside = w.spawn(MemoryEntity::mob(DVec3::new(50.0, 65.0, 5.0)));
        let found = w.entities_in_box(DVec3::new(0.0, 60.0, 0.0), DVec3::new(5.0, 70.0, 5.0));
        assert_eq!(found, vec![inside]);
    }

    #[test]
    fn effects_expire_with_game_ticks() {
        let mut w = MemoryWorld::flat(64, STONE);
        let id = w.spawn(MemoryEntity::player(DVec3::ZERO));
        w.apply_effect(id, EffectKind::Exhaustion, 2, 0);
        w.advance_game_tick();
        assert!(w.has_effect(id, EffectKind::Exhaustion));
        w.advance_game_tick();
        assert!(!w.has_effect(id, EffectKind::Exhaustion));
        assert_eq!(w.game_tick(), 2);
    }

    #[test]
    fn objects_do_not_take_effects() {
        let mut w = MemoryWorld::flat(64, STONE);
        let id = w.spawn(MemoryEntity::object(DVec3::ZERO));
        w.apply_effect(id, EffectKind::Slowness, 40, 255);
        assert!(!w.has_effect(id, EffectKind::Slowness));
    }

    #[test]
    fn autonomy_only_for_entities_that_have_it() {
        let mut w = MemoryWorld::flat(64, STONE);
        let mob = w.spawn(MemoryEntity::mob(DVec3::ZERO));
        let player = w.spawn(MemoryEntity::player(DVec3::ZERO));
        w.set_autonomy(mob, false);
        w.set_autonomy(player, false);
        assert_eq!(w.autonomy(mob), Some(false));
        assert_eq!(w.autonomy(player), None);
        assert!(w.capabilities(mob).unwrap().autonomy);
        assert!(!w.capabilities(player).unwrap().autonomy);
    }

    #[test]
    fn duplicate_and_missing_ids_are_errors() {
        let mut w = MemoryWorld::flat(64, STONE);
        let id = EntityId::new();
        assert!(w.spawn_with_id(id, MemoryEntity::mob(DVec3::ZERO)).is_ok());
        assert!(matches!(
            w.spawn_with_id(id, MemoryEntity::mob(DVec3::ZERO)),
            Err(WorldError::DuplicateEntity(_))
        ));
        assert!(w.despawn(id).is_ok());
        assert!(matches!(w.despawn(id), Err(WorldError::EntityNotFound(_))));
    }
}
