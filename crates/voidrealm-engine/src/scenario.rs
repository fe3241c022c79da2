//! Demo scenario: a seeded in-memory world and a scripted request timeline.
//!
//! The scenario places one caster on a flat world, scatters mobs, dropped
//! objects, and stone pillars around it, then scripts a full lifecycle:
//! a cooldown check and a cast, a break once the region is active, and a
//! recast that lands on the cooldown.

use glam::DVec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info};
use voidrealm_core::requests::{Request, ScriptedRequests};
use voidrealm_types::{EntityId, Voxel, VoxelPos};
use voidrealm_world::{MemoryEntity, MemoryWorld, VoxelWorld};

use crate::error::EngineError;

/// Terrain material of the demo world.
const GROUND: Voxel = Voxel(1);

/// Pillar material.
const PILLAR: Voxel = Voxel(4);

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Demo scenario settings, read from the `demo` section of
/// `voidrealm-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    /// RNG seed for placement.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Highest solid layer of the flat terrain.
    #[serde(default = "default_ground_level")]
    pub ground_level: i32,

    /// Mobs scattered around the caster.
    #[serde(default = "default_mob_count")]
    pub mob_count: u32,

    /// Dropped objects scattered around the caster.
    #[serde(default = "default_object_count")]
    pub object_count: u32,

    /// Stone pillars standing on the terrain.
    #[serde(default = "default_pillar_count")]
    pub pillar_count: u32,

    /// Half-width of the square everything is scattered in, in voxels.
    #[serde(default = "default_spread")]
    pub spread: i32,

    /// Host tick on which the caster breaks the region.
    #[serde(default = "default_break_at_tick")]
    pub break_at_tick: u64,

    /// Host tick on which the caster tries to cast again.
    #[serde(default = "default_recast_at_tick")]
    pub recast_at_tick: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            ground_level: default_ground_level(),
            mob_count: default_mob_count(),
            object_count: default_object_count(),
            pillar_count: default_pillar_count(),
            spread: default_spread(),
            break_at_tick: default_break_at_tick(),
            recast_at_tick: default_recast_at_tick(),
        }
    }
}

const fn default_seed() -> u64 {
    42
}

const fn default_ground_level() -> i32 {
    64
}

const fn default_mob_count() -> u32 {
    6
}

const fn default_object_count() -> u32 {
    2
}

const fn default_pillar_count() -> u32 {
    8
}

const fn default_spread() -> i32 {
    40
}

const fn default_break_at_tick() -> u64 {
    100
}

const fn default_recast_at_tick() -> u64 {
    160
}

impl DemoConfig {
    /// Check that the timeline is ordered and the spread is usable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Scenario`] describing the first problem found.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.spread <= 0 {
            return Err(EngineError::Scenario {
                message: format!("spread must be positive, got {}", self.spread),
            });
        }
        if self.break_at_tick <= 1 {
            return Err(EngineError::Scenario {
                message: String::from("break_at_tick must come after the cast on tick 1"),
            });
        }
        if self.recast_at_tick <= self.break_at_tick {
            return Err(EngineError::Scenario {
                message: String::from("recast_at_tick must come after break_at_tick"),
            });
        }
        Ok(())
    }
}

// -----------------------------------------------------------------------
// Scenario
// -----------------------------------------------------------------------

/// A ready-to-run demo: the world, the caster, and the request script.
#[derive(Debug)]
pub struct Scenario {
    /// The populated world.
    pub world: MemoryWorld,
    /// The actor that casts.
    pub caster: EntityId,
    /// Every other entity placed in the world.
    pub bystanders: Vec<EntityId>,
    /// The request timeline.
    pub script: ScriptedRequests,
}

/// Build the demo world and script.
///
/// # Errors
///
/// Returns [`EngineError::Scenario`] if `config` is inconsistent, or
/// [`EngineError::World`] if the caster cannot be placed.
pub fn build_scenario(config: &DemoConfig) -> Result<Scenario, EngineError> {
    config.validate()?;

    let mut rng = SmallRng::seed_from_u64(config.seed);
    let mut world = MemoryWorld::flat(config.ground_level, GROUND);
    let surface = f64::from(config.ground_level.saturating_add(1));

    let caster = EntityId::new();
    world.spawn_with_id(caster, MemoryEntity::player(DVec3::new(0.5, surface, 0.5)))?;

    for _ in 0..config.pillar_count {
        let x = rng.random_range(config.spread.saturating_neg()..=config.spread);
        let z = rng.random_range(config.spread.saturating_neg()..=config.spread);
        let height: i32 = rng.random_range(2..=6);
        for dy in 1..=height {
            world.set_voxel(VoxelPos::new(x, config.ground_level.saturating_add(dy), z), PILLAR);
        }
        debug!(x, z, height, "Pillar placed");
    }

    let spread = f64::from(config.spread);
    let mut bystanders = Vec::new();
    for _ in 0..config.mob_count {
        let pos = DVec3::new(rng.random_range(-spread..spread), surface, rng.random_range(-spread..spread));
        bystanders.push(world.spawn(MemoryEntity::mob(pos)));
    }
    for _ in 0..config.object_count {
        let pos = DVec3::new(rng.random_range(-spread..spread), surface, rng.random_range(-spread..spread));
        bystanders.push(world.spawn(MemoryEntity::object(pos)));
    }

    let script = ScriptedRequests::new()
        .at(1, Request::CheckCooldown(caster))
        .at(1, Request::Cast(caster))
        .at(config.break_at_tick, Request::Break(caster))
        .at(config.recast_at_tick, Request::CheckCooldown(caster))
        .at(config.recast_at_tick, Request::Cast(caster));

    info!(
        caster = %caster,
        bystanders = bystanders.len(),
        pillars = config.pillar_count,
        modified_voxels = world.modified_voxel_count(),
        "Demo scenario built"
    );

    Ok(Scenario {
        world,
        caster,
        bystanders,
        script,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voidrealm_core::requests::RequestSource;

    use super::*;

    #[test]
    fn same_seed_builds_same_world() {
        let config = DemoConfig::default();
        let a = build_scenario(&config).unwrap();
        let b = build_scenario(&config).unwrap();
        assert_eq!(a.world.modified_voxel_count(), b.world.modified_voxel_count());
        assert_eq!(a.bystanders.len(), 8);
        assert_eq!(a.world.entity_count(), 9);
    }

    #[test]
    fn script_follows_the_timeline() {
        let config = DemoConfig::default();
        let mut scenario = build_scenario(&config).unwrap();
        let caster = scenario.caster;

        assert_eq!(
            scenario.script.poll(1),
            vec![Request::CheckCooldown(caster), Request::Cast(caster)]
        );
        assert_eq!(scenario.script.poll(100), vec![Request::Break(caster)]);
        assert_eq!(scenario.script.poll(160).len(), 2);
        assert!(scenario.script.is_exhausted());
    }

    #[test]
    fn out_of_order_timeline_is_rejected() {
        let config = DemoConfig {
            break_at_tick: 50,
            recast_at_tick: 40,
            ..DemoConfig::default()
        };
        assert!(matches!(build_scenario(&config), Err(EngineError::Scenario { .. })));
    }

    #[test]
    fn parses_partial_section() {
        let config: DemoConfig = serde_yml::from_str("seed: 7\nmob_count: 1\n").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.mob_count, 1);
        assert_eq!(config.break_at_tick, 100);
    }
}
