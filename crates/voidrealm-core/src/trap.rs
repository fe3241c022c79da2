//! Entity trapping, maintenance, and restoration.
//!
//! [`EntityLedger`] is the entity half of a region's undo log: the original
//! position of every trapped entity and the original autonomy flag of those
//! that have one. It is filled exactly once, at activation, and drained on
//! teardown.
//!
//! The caster is always part of the ledger. It is lifted onto the platform
//! with everyone else but is never incapacitated.

use std::collections::BTreeMap;

use glam::DVec3;
use tracing::debug;
use voidrealm_types::{EffectKind, EntityId};
use voidrealm_world::{Host, RegionShape};

use crate::config::EffectConfig;

/// Original state of every entity a region has touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityLedger {
    /// Original position by entity.
    trapped: BTreeMap<EntityId, DVec3>,
    /// Original autonomy flag by entity, for entities that have one.
    autonomy_backup: BTreeMap<EntityId, bool>,
    /// Set once [`trap`](Self::trap) has run.
    sealed: bool,
}

impl EntityLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            trapped: BTreeMap::new(),
            autonomy_backup: BTreeMap::new(),
            sealed: false,
        }
    }

    /// Number of trapped entities (caster included).
    pub fn len(&self) -> usize {
        self.trapped.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.trapped.is_empty()
    }

    /// Whether an entity is trapped.
    pub fn contains(&self, id: EntityId) -> bool {
        self.trapped.contains_key(&id)
    }

    /// Recorded original autonomy flag of a trapped entity.
    pub fn original_autonomy(&self, id: EntityId) -> Option<bool> {
        self.autonomy_backup.get(&id).copied()
    }

    /// Capture and incapacitate every living entity inside the region.
    ///
    /// The caster is recorded at `caster_origin` (where it stood when the
    /// cast began) and lifted onto the platform. Every other living entity
    /// within the sealed sphere is recorded at its current position, lifted,
    /// stripped of autonomy, and incapacitated for `effects.trap_ticks`.
    ///
    /// Runs at most once per ledger; later calls return 0.
    pub fn trap(
        &mut self,
        host: &mut dyn Host,
        shape: &RegionShape,
        caster: EntityId,
        caster_origin: DVec3,
        effects: &EffectConfig,
    ) -> usize {
        if self.sealed {
            return 0;
        }
        self.sealed = true;
        let standing = shape.standing_height();

        if let Some(current) = host.position(caster) {
            let _ = self.trapped.insert(caster, caster_origin);
            host.set_position(caster, DVec3::new(current.x, standing, current.z));
            host.set_velocity(caster, DVec3::ZERO);
        }

        let (min, max) = shape.bounding_box();
        for id in host.entities_in_box(min, max) {
            if self.trapped.contains_key(&id) {
                continue;
            }
            let Some(caps) = host.capabilities(id) else {
                continue;
            };
            if !caps.living {
                continue;
            }
            let Some(pos) = host.position(id) else {
                continue;
            };
            if !shape.contains_point(pos) {
                continue;
            }

            let _ = self.trapped.insert(id, pos);
            host.set_position(id, DVec3::new(pos.x, standing, pos.z));
            if caps.autonomy {
                if let Some(flag) = host.autonomy(id) {
                    let _ = self.autonomy_backup.insert(id, flag);
                    host.set_autonomy(id, false);
                }
            }
            incapacitate(host, id, effects, effects.trap_ticks);
            debug!(entity = %id, "Entity trapped");
        }
        self.trapped.len()
    }

    /// Re-apply incapacitation to every trapped entity except the caster and
    /// force autonomy back off. Entities that vanished are skipped.
    pub fn refresh(&self, host: &mut dyn Host, caster: EntityId, effects: &EffectConfig) {
        for id in self.trapped.keys().copied() {
            if id == caster || host.capabilities(id).is_none() {
                continue;
            }
            incapacitate(host, id, effects, effects.refresh_ticks);
            if self.autonomy_backup.contains_key(&id) {
                host.set_autonomy(id, false);
            }
        }
    }

    /// Discard living entities inside the region that are neither trapped nor
    /// the caster. Returns how many were removed.
    pub fn sweep_intruders(&self, host: &mut dyn Host, shape: &RegionShape, caster: EntityId) -> usize {
        let (min, max) = shape.bounding_box();
        let mut removed: usize = 0;
        for id in host.entities_in_box(min, max) {
            if id == caster || self.trapped.contains_key(&id) {
                continue;
            }
            let living = host.capabilities(id).is_some_and(|caps| caps.living);
            let inside = host.position(id).is_some_and(|pos| shape.contains_point(pos));
            if living && inside {
                host.discard(id);
                removed = removed.saturating_add(1);
                debug!(entity = %id, "Intruder discarded");
            }
        }
        removed
    }

    /// Return every trapped entity to its original state and empty the ledger.
    ///
    /// The caster goes first. Other entities have their incapacitation
    /// cleared, their autonomy flag restored, and are moved back to where
    /// they stood. Entities that no longer exist are skipped. Returns how
    /// many entities were restored; a second call returns 0.
    pub fn restore(&mut self, host: &mut dyn Host, caster: EntityId) -> usize {
        let mut restored: usize = 0;

        if let Some(origin) = self.trapped.remove(&caster) {
            if host.capabilities(caster).is_some() {
                host.set_position(caster, origin);
                host.set_velocity(caster, DVec3::ZERO);
                restored = restored.saturating_add(1);
            }
        }

        let trapped = std::mem::take(&mut self.trapped);
        for (id, origin) in trapped {
            if host.capabilities(id).is_none() {
                debug!(entity = %id, "Trapped entity vanished, skipping restore");
                continue;
            }
            for kind in EffectKind::INCAPACITATION {
                host.clear_effect(id, kind);
            }
            if let Some(flag) = self.autonomy_backup.get(&id) {
                host.set_autonomy(id, *flag);
            }
            host.set_position(id, origin);
            host.set_velocity(id, DVec3::ZERO);
            restored = restored.saturating_add(1);
        }
        self.autonomy_backup.clear();
        restored
    }
}

/// Apply all four incapacitation effects and stop the entity in place.
fn incapacitate(host: &mut dyn Host, id: EntityId, effects: &EffectConfig, duration_ticks: u32) {
    for kind in EffectKind::INCAPACITATION {
        let amplifier = if kind == EffectKind::Blindness {
            effects.vision_amplifier
        } else {
            effects.amplifier
        };
        host.apply_effect(id, kind, duration_ticks, amplifier);
    }
    host.set_velocity(id, DVec3::ZERO);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voidrealm_types::{Voxel, VoxelPos};
    use voidrealm_world::{EntityService, MemoryEntity, MemoryWorld};

    use super::*;

    fn setup() -> (MemoryWorld, RegionShape, EntityId) {
        let mut world = MemoryWorld::flat(64, Voxel(1));
        let caster = world.spawn(MemoryEntity::player(DVec3::new(0.5, 65.0, 0.5)));
        (world, RegionShape::new(VoxelPos::new(0, 64, 0), 25), caster)
    }

    #[test]
    fn caster_is_trapped_but_not_incapacitated() {
        let (mut world, shape, caster) = setup();
        let mut ledger = EntityLedger::new();
        let origin = DVec3::new(0.5, 65.0, 0.5);
        assert_eq!(ledger.trap(&mut world, &shape, caster, origin, &EffectConfig::default()), 1);
        assert!(ledger.contains(caster));
        assert!(!world.has_effect(caster, EffectKind::Slowness));
    }

    #[test]
    fn mob_inside_is_lifted_and_stopped() {
        let (mut world, shape, caster) = setup();
        let mob = world.spawn(MemoryEntity::mob(DVec3::new(5.0, 70.0, 3.0)));
        let mut ledger = EntityLedger::new();
        let _ = ledger.trap(&mut world, &shape, caster, DVec3::ZERO, &EffectConfig::default());

        let entity = world.entity(mob).unwrap();
        assert!((entity.position.y - 65.0).abs() < f64::EPSILON);
        assert_eq!(entity.autonomy, Some(false));
        assert_eq!(ledger.original_autonomy(mob), Some(true));
        assert_eq!(entity.effects.len(), 4);
        assert_eq!(entity.effects[&EffectKind::Blindness].amplifier, 0);
        assert_eq!(entity.effects[&EffectKind::Slowness].amplifier, 255);
    }

    #[test]
    fn objects_and_far_entities_are_ignored() {
        let (mut world, shape, caster) = setup();
        let item = world.spawn(MemoryEntity::object(DVec3::new(2.0, 65.0, 2.0)));
        // Inside the bounding box but outside the sphere.
        let corner = world.spawn(MemoryEntity::mob(DVec3::new(20.0, 84.0, 20.0)));
        let mut ledger = EntityLedger::new();
        let _ = ledger.trap(&mut world, &shape, caster, DVec3::ZERO, &EffectConfig::default());

        assert!(!ledger.contains(item));
        assert!(!ledger.contains(corner));
        assert_eq!(world.autonomy(corner), Some(true));
        assert!(world.entity(corner).unwrap().effects.is_empty());
    }

    #[test]
    fn trap_runs_once() {
        let (mut world, shape, caster) = setup();
        let mut ledger = EntityLedger::new();
        let _ = ledger.trap(&mut world, &shape, caster, DVec3::ZERO, &EffectConfig::default());
        let late = world.spawn(MemoryEntity::mob(DVec3::new(1.0, 66.0, 1.0)));
        assert_eq!(ledger.trap(&mut world, &shape, caster, DVec3::ZERO, &EffectConfig::default()), 0);
        assert!(!ledger.contains(late));
    }

    #[test]
    fn restore_skips_vanished_and_empties_ledger() {
        let (mut world, shape, caster) = setup();
        let start = DVec3::new(4.0, 68.0, -2.0);
        let mob = world.spawn(MemoryEntity::mob(start));
        let gone = world.spawn(MemoryEntity::mob(DVec3::new(-3.0, 66.0, 0.0)));
        let mut ledger = EntityLedger::new();
        let _ = ledger.trap(&mut world, &shape, caster, DVec3::new(0.5, 65.0, 0.5), &EffectConfig::default());
        let _ = world.despawn(gone).unwrap();

        assert_eq!(ledger.restore(&mut world, caster), 2);
        assert!(ledger.is_empty());
        let entity = world.entity(mob).unwrap();
        assert_eq!(entity.position, start);
        assert_eq!(entity.autonomy, Some(true));
        assert!(entity.effects.is_empty());
        assert_eq!(ledger.restore(&mut world, caster), 0);
    }

    #[test]
    fn sweep_discards_only_newcomers() {
        let (mut world, shape, caster) = setup();
        let mob = world.spawn(MemoryEntity::mob(DVec3::new(3.0, 66.0, 3.0)));
        let mut ledger = EntityLedger::new();
        let _ = ledger.trap(&mut world, &shape, caster, DVec3::ZERO, &EffectConfig::default());
        let intruder = world.spawn(MemoryEntity::mob(DVec3::new(-4.0, 66.0, 2.0)));
        let item = world.spawn(MemoryEntity::object(DVec3::new(-4.0, 66.0, 2.0)));

        assert_eq!(ledger.sweep_intruders(&mut world, &shape, caster), 1);
        assert!(world.entity(intruder).is_none());
        assert!(world.entity(item).is_some());
        assert!(world.entity(mob).is_some());
    }

    #[test]
    fn refresh_keeps_autonomy_off() {
        let (mut world, shape, caster) = setup();
        let mob = world.spawn(MemoryEntity::mob(DVec3::new(3.0, 66.0, 3.0)));
        let effects = EffectConfig::default();
        let mut ledger = EntityLedger::new();
        let _ = ledger.trap(&mut world, &shape, caster, DVec3::ZERO, &effects);
        world.set_autonomy(mob, true);
        ledger.refresh(&mut world, caster, &effects);

        assert_eq!(world.autonomy(mob), Some(false));
        let slow = world.entity(mob).unwrap().effects[&EffectKind::Slowness];
        assert_eq!(slow.remaining_ticks, effects.refresh_ticks);
    }
}
