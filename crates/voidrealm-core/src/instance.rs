//! The region lifecycle state machine.
//!
//! A [`RegionInstance`] owns everything one caster's region has done to the
//! world: the voxel snapshots of shell, platform, and interior, the entity
//! ledger, and the animation cursors. It is driven by [`RegionInstance::tick`]
//! with a wall-clock sample and moves strictly forward through
//! [`Phase`]:
//!
//! ```text
//! Casting -> BarrierBuilding -> PlatformBuilding -> Active -> Breaking -> Finished
//! ```
//!
//! Within one tick the order is: animate, check the phase deadline, then run
//! active maintenance. Several transitions may cascade in a single tick when
//! the host samples time sparsely.
//!
//! # Cursors
//!
//! | Cursor | Initial | Range | Direction |
//! |---|---|---|---|
//! | `built_shell_height` | `-R-1` | `[-R, R]` | up, bottom layer first |
//! | `built_platform_radius` | `0` | `[0, R-2]` | out, center ring first |
//! | `breaking_shell_height` | `R+1` | `[-R, R]` | down, top layer first |
//! | `breaking_platform_radius` | `R-2` | `[0, R-2]` | in, outer ring first |
//!
//! Each cursor only ever moves in its direction; each tick touches only the
//! layers between the previous cursor and the new target.

use std::time::{Duration, Instant};

use glam::DVec3;
use tracing::{debug, info, warn};
use voidrealm_types::{EffectKind, EntityId, InstanceId, Notice, Phase, Voxel, VoxelPos};
use voidrealm_world::{Host, RegionShape, VoxelSnapshot};

use crate::config::{DomainConfig, EffectConfig, MaterialConfig, PolicyConfig, TimingConfig};
use crate::error::{BreakDenied, CastDenied};
use crate::notify::Notifier;
use crate::progress;
use crate::trap::EntityLedger;

/// Number of shell layers for a radius: `2R+1`.
const fn layer_count(radius: i32) -> i32 {
    radius.saturating_mul(2).saturating_add(1)
}

/// One caster's region, from snapshot to full restoration.
#[derive(Debug, Clone)]
pub struct RegionInstance {
    id: InstanceId,
    actor: EntityId,
    shape: RegionShape,
    phase: Phase,

    /// Where the caster stood when the cast began.
    caster_origin: DVec3,

    cast_started_at: Instant,
    platform_started_at: Option<Instant>,
    activated_at: Option<Instant>,
    break_started_at: Option<Instant>,

    shell: VoxelSnapshot,
    platform: VoxelSnapshot,
    interior: VoxelSnapshot,
    entities: EntityLedger,

    built_shell_height: i32,
    built_platform_radius: i32,
    platform_complete: bool,
    breaking_shell_height: i32,
    breaking_platform_radius: i32,

    timing: TimingConfig,
    effects: EffectConfig,
    materials: MaterialConfig,
    policy: PolicyConfig,
}

impl RegionInstance {
    /// Start a region for `actor`, anchored beneath its feet.
    ///
    /// Shell and platform contents are captured before anything is written,
    /// then [`Notice::CastStarted`] is sent.
    ///
    /// # Errors
    ///
    /// Returns [`CastDenied::UnknownActor`] if the host has no position for
    /// the actor.
    pub fn begin(
        actor: EntityId,
        now: Instant,
        host: &dyn Host,
        config: &DomainConfig,
        notifier: &mut dyn Notifier,
    ) -> Result<Self, CastDenied> {
        let caster_origin = host.position(actor).ok_or(CastDenied::UnknownActor)?;
        let radius = config.region.radius();
        let shape = RegionShape::new(VoxelPos::beneath(caster_origin), radius);

        let mut shell = VoxelSnapshot::new();
        for (layer, pos) in shape.shell() {
            let _ = shell.capture(host, layer, pos);
        }
        let mut platform = VoxelSnapshot::new();
        for (ring, pos) in shape.platform() {
            if !shell.contains(pos) {
                let _ = platform.capture(host, ring, pos);
            }
        }

        let instance = Self {
            id: InstanceId::new(),
            actor,
            shape,
            phase: Phase::Casting,
            caster_origin,
            cast_started_at: now,
            platform_started_at: None,
            activated_at: None,
            break_started_at: None,
            shell,
            platform,
            interior: VoxelSnapshot::new(),
            entities: EntityLedger::new(),
            built_shell_height: radius.saturating_neg().saturating_sub(1),
            built_platform_radius: 0,
            platform_complete: false,
            breaking_shell_height: radius.saturating_add(1),
            breaking_platform_radius: shape.platform_extent(),
            timing: config.timing,
            effects: config.effects,
            materials: config.materials,
            policy: config.policy,
        };

        notifier.notify(actor, Notice::CastStarted);
        info!(
            instance = %instance.id,
            actor = %actor,
            center = %instance.shape.center(),
            radius,
            shell_voxels = instance.shell.len(),
            platform_voxels = instance.platform.len(),
            "Region cast started"
        );
        Ok(instance)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Unique id of this instance.
    pub const fn id(&self) -> InstanceId {
        self.id
    }

    /// The caster that owns this instance.
    pub const fn actor(&self) -> EntityId {
        self.actor
    }

    /// Current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Region geometry.
    pub const fn shape(&self) -> &RegionShape {
        &self.shape
    }

    /// When the region activated, if it has.
    pub const fn activated_at(&self) -> Option<Instant> {
        self.activated_at
    }

    /// Highest shell layer materialized so far.
    pub const fn built_shell_height(&self) -> i32 {
        self.built_shell_height
    }

    /// Number of platform rings materialized so far.
    pub const fn built_platform_radius(&self) -> i32 {
        self.built_platform_radius
    }

    /// Lowest shell layer reverted so far.
    pub const fn breaking_shell_height(&self) -> i32 {
        self.breaking_shell_height
    }

    /// Number of platform rings still standing.
    pub const fn breaking_platform_radius(&self) -> i32 {
        self.breaking_platform_radius
    }

    /// Original shell contents.
    pub const fn shell_snapshot(&self) -> &VoxelSnapshot {
        &self.shell
    }

    /// Original platform contents.
    pub const fn platform_snapshot(&self) -> &VoxelSnapshot {
        &self.platform
    }

    /// Original interior contents that were cleared at activation.
    pub const fn interior_snapshot(&self) -> &VoxelSnapshot {
        &self.interior
    }

    /// Entities currently held by the region.
    pub const fn entities(&self) -> &EntityLedger {
        &self.entities
    }

    /// Whether the instance has completed teardown.
    pub const fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    fn since_cast(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.cast_started_at)
    }

    fn advance(&mut self, next: Phase) {
        if !self.phase.can_advance_to(next) {
            warn!(
                instance = %self.id,
                from = ?self.phase,
                to = ?next,
                "Ignoring illegal phase transition"
            );
            return;
        }
        debug!(instance = %self.id, from = ?self.phase, to = ?next, "Phase transition");
        self.phase = next;
    }

    // -----------------------------------------------------------------------
    // Driving
    // -----------------------------------------------------------------------

    /// Advance the lifecycle to `now`.
    ///
    /// `now` must not go backwards between calls; an earlier sample is
    /// treated as no time having passed.
    pub fn tick(&mut self, now: Instant, host: &mut dyn Host, notifier: &mut dyn Notifier) {
        if self.phase == Phase::Casting {
            self.advance(Phase::BarrierBuilding);
        }

        if self.phase == Phase::BarrierBuilding {
            self.build_shell(now, host);
            if self.since_cast(now) >= self.timing.build() {
                self.complete_shell(now, host, notifier);
            }
        }

        if self.phase == Phase::PlatformBuilding {
            self.build_platform(now, host);
            if self.since_cast(now) >= self.timing.activation() {
                self.activate(now, host, notifier);
            }
        }

        match self.phase {
            Phase::Active => self.maintain(host),
            Phase::Breaking => self.tear_down(now, host, notifier),
            Phase::Casting | Phase::BarrierBuilding | Phase::PlatformBuilding | Phase::Finished => {}
        }
    }

    /// Begin teardown.
    ///
    /// # Errors
    ///
    /// Returns [`BreakDenied::NoActiveInstance`] unless the instance is
    /// [`Phase::Active`]. Teardown, once started, always runs to completion.
    pub fn request_break(&mut self, now: Instant, notifier: &mut dyn Notifier) -> Result<(), BreakDenied> {
        if self.phase != Phase::Active {
            return Err(BreakDenied::NoActiveInstance);
        }
        self.break_started_at = Some(now);
        self.advance(Phase::Breaking);
        notifier.notify(self.actor, Notice::BreakStarted);
        info!(
            instance = %self.id,
            actor = %self.actor,
            break_duration_ms = self.timing.break_duration_ms,
            "Region teardown started"
        );
        Ok(())
    }

    /// Write every snapshot back to the world.
    ///
    /// Cleared interior voxels always get their original back. Shell and
    /// platform voxels are reverted only where the world still holds their
    /// material. Repeated calls write nothing.
    /// Returns the number of voxels written.
    pub fn restore_world(&mut self, host: &mut dyn Host) -> usize {
        let interior = self.interior.restore_all(host);
        let shell = self.shell.revert_all(host, self.materials.barrier());
        let platform = self.platform.revert_all(host, self.materials.platform());
        self.breaking_shell_height = self.shape.radius().saturating_neg();
        self.breaking_platform_radius = 0;
        interior.saturating_add(shell).saturating_add(platform)
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    fn build_shell(&mut self, now: Instant, host: &mut dyn Host) {
        let r = self.shape.radius();
        let steps = progress::cursor(self.since_cast(now), self.timing.build(), layer_count(r));
        let target = steps.saturating_sub(r).min(r);
        if target <= self.built_shell_height {
            return;
        }
        let from = self.built_shell_height.saturating_add(1);
        let written = self.shell.materialize(host, from..=target, self.materials.barrier());
        self.built_shell_height = target;
        debug!(instance = %self.id, height = target, written, "Shell layers built");
    }

    fn complete_shell(&mut self, now: Instant, host: &mut dyn Host, notifier: &mut dyn Notifier) {
        let r = self.shape.radius();
        if self.built_shell_height < r {
            let from = self.built_shell_height.saturating_add(1);
            let _ = self.shell.materialize(host, from..=r, self.materials.barrier());
            self.built_shell_height = r;
        }
        notifier.notify(self.actor, Notice::BarrierComplete);
        self.platform_started_at = Some(now);
        self.advance(Phase::PlatformBuilding);
        info!(instance = %self.id, actor = %self.actor, "Barrier complete");
    }

    fn build_platform(&mut self, now: Instant, host: &mut dyn Host) {
        if self.platform_complete {
            return;
        }
        let Some(started) = self.platform_started_at else {
            return;
        };
        let elapsed = now.saturating_duration_since(started);
        let extent = self.shape.platform_extent();
        let target = progress::cursor(elapsed, self.timing.platform(), extent);
        if target > self.built_platform_radius {
            let written = self.platform.materialize(
                host,
                self.built_platform_radius..=target.saturating_sub(1),
                self.materials.platform(),
            );
            self.built_platform_radius = target;
            debug!(instance = %self.id, rings = target, written, "Platform rings built");
        }
        if elapsed >= self.timing.platform() {
            self.finish_platform(host);
        }
    }

    fn finish_platform(&mut self, host: &mut dyn Host) {
        if self.platform_complete {
            return;
        }
        let extent = self.shape.platform_extent();
        if self.built_platform_radius < extent {
            let _ = self.platform.materialize(
                host,
                self.built_platform_radius..=extent.saturating_sub(1),
                self.materials.platform(),
            );
            self.built_platform_radius = extent;
        }
        self.platform_complete = true;
    }

    fn activate(&mut self, now: Instant, host: &mut dyn Host, notifier: &mut dyn Notifier) {
        self.finish_platform(host);
        let cleared = self.clear_interior(host);
        let trapped = self.entities.trap(
            host,
            &self.shape,
            self.actor,
            self.caster_origin,
            &self.effects,
        );
        self.activated_at = Some(now);
        self.advance(Phase::Active);
        notifier.notify(self.actor, Notice::Activated);
        info!(
            instance = %self.id,
            actor = %self.actor,
            interior_cleared = cleared,
            trapped,
            "Region activated"
        );
    }

    /// Record and clear every non-air voxel above the platform.
    fn clear_interior(&mut self, host: &mut dyn Host) -> usize {
        let mut cleared: usize = 0;
        for (layer, pos) in self.shape.interior() {
            if self.shell.contains(pos) || self.platform.contains(pos) {
                continue;
            }
            let current = host.voxel(pos);
            if current.is_air() {
                continue;
            }
            if self.interior.record(layer, pos, current) {
                host.set_voxel(pos, Voxel::AIR);
                cleared = cleared.saturating_add(1);
            }
        }
        cleared
    }

    // -----------------------------------------------------------------------
    // Active maintenance
    // -----------------------------------------------------------------------

    fn maintain(&self, host: &mut dyn Host) {
        self.entities.refresh(host, self.actor, &self.effects);
        if self.policy.seal_region {
            let removed = self.entities.sweep_intruders(host, &self.shape, self.actor);
            if removed > 0 {
                debug!(instance = %self.id, removed, "Intruders removed from sealed region");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    fn tear_down(&mut self, now: Instant, host: &mut dyn Host, notifier: &mut dyn Notifier) {
        let Some(started) = self.break_started_at else {
            return;
        };
        let elapsed = now.saturating_duration_since(started);
        let duration = self.timing.breaking();

        let r = self.shape.radius();
        let steps = progress::cursor(elapsed, duration, layer_count(r));
        let lowest = r.saturating_sub(steps).max(r.saturating_neg());
        if lowest < self.breaking_shell_height {
            let reverted = self.shell.revert(
                host,
                lowest..=self.breaking_shell_height.saturating_sub(1),
                self.materials.barrier(),
            );
            self.breaking_shell_height = lowest;
            debug!(instance = %self.id, height = lowest, reverted, "Shell layers reverted");
        }

        let extent = self.shape.platform_extent();
        let inner = extent
            .saturating_sub(progress::cursor(elapsed, duration, extent))
            .max(0);
        if inner < self.breaking_platform_radius {
            let reverted = self.platform.revert(
                host,
                inner..=self.breaking_platform_radius.saturating_sub(1),
                self.materials.platform(),
            );
            self.breaking_platform_radius = inner;
            debug!(instance = %self.id, rings = inner, reverted, "Platform rings reverted");
        }

        if elapsed >= duration {
            self.finish(host, notifier);
        }
    }

    fn finish(&mut self, host: &mut dyn Host, notifier: &mut dyn Notifier) {
        let voxels = self.restore_world(host);
        let entities = self.entities.restore(host, self.actor);
        host.apply_effect(self.actor, EffectKind::Exhaustion, self.effects.cooldown_ticks, 0);
        self.advance(Phase::Finished);
        notifier.notify(self.actor, Notice::Deactivated);
        info!(
            instance = %self.id,
            actor = %self.actor,
            voxels_restored = voxels,
            entities_restored = entities,
            cooldown_ticks = self.effects.cooldown_ticks,
            "Region finished"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use voidrealm_world::{EntityService, MemoryEntity, MemoryWorld, VoxelWorld};

    use super::*;
    use crate::notify::RecordingNotifier;

    const STONE: Voxel = Voxel(1);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn setup() -> (MemoryWorld, EntityId, RecordingNotifier) {
        let mut world = MemoryWorld::flat(64, STONE);
        let caster = world.spawn(MemoryEntity::player(DVec3::new(0.5, 65.0, 0.5)));
        (world, caster, RecordingNotifier::new())
    }

    #[test]
    fn begin_snapshots_without_writing() {
        let (world, caster, mut rec) = setup();
        let t0 = Instant::now();
        let inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();

        assert_eq!(inst.phase(), Phase::Casting);
        assert_eq!(inst.shape().center(), VoxelPos::new(0, 64, 0));
        assert!(!inst.shell_snapshot().is_empty());
        assert!(!inst.platform_snapshot().is_empty());
        assert_eq!(world.write_count(), 0);
        assert_eq!(rec.for_actor(caster), vec![Notice::CastStarted]);
    }

    #[test]
    fn unknown_actor_cannot_cast() {
        let (world, _, mut rec) = setup();
        let err = RegionInstance::begin(
            EntityId::new(),
            Instant::now(),
            &world,
            &DomainConfig::default(),
            &mut rec,
        )
        .unwrap_err();
        assert_eq!(err, CastDenied::UnknownActor);
        assert!(rec.notices.is_empty());
    }

    #[test]
    fn first_tick_enters_barrier_building() {
        let (mut world, caster, mut rec) = setup();
        let t0 = Instant::now();
        let mut inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();
        inst.tick(t0, &mut world, &mut rec);
        assert_eq!(inst.phase(), Phase::BarrierBuilding);
        // Zero progress already covers the bottom layer.
        assert_eq!(inst.built_shell_height(), -25);
        assert_eq!(world.voxel(VoxelPos::new(0, 39, 0)), Voxel(49));
    }

    #[test]
    fn sparse_sampling_cascades_to_active() {
        let (mut world, caster, mut rec) = setup();
        let t0 = Instant::now();
        let mut inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();
        inst.tick(t0 + ms(5000), &mut world, &mut rec);

        assert_eq!(inst.phase(), Phase::Active);
        assert_eq!(inst.built_shell_height(), 25);
        assert_eq!(inst.built_platform_radius(), 23);
        assert_eq!(
            rec.for_actor(caster),
            vec![Notice::CastStarted, Notice::BarrierComplete, Notice::Activated]
        );
    }

    #[test]
    fn platform_waits_for_activation_gate() {
        let (mut world, caster, mut rec) = setup();
        let t0 = Instant::now();
        let mut inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();
        inst.tick(t0 + ms(2000), &mut world, &mut rec);
        assert_eq!(inst.phase(), Phase::PlatformBuilding);
        assert_eq!(inst.built_platform_radius(), 0);

        inst.tick(t0 + ms(2500), &mut world, &mut rec);
        assert_eq!(inst.built_platform_radius(), 11);
        assert_eq!(world.voxel(VoxelPos::new(0, 64, 0)), Voxel(251));

        inst.tick(t0 + ms(2999), &mut world, &mut rec);
        assert_eq!(inst.phase(), Phase::PlatformBuilding);
        inst.tick(t0 + ms(3000), &mut world, &mut rec);
        assert_eq!(inst.phase(), Phase::Active);
        assert_eq!(inst.activated_at(), Some(t0 + ms(3000)));
    }

    #[test]
    fn interior_is_cleared_and_recorded() {
        let (mut world, caster, mut rec) = setup();
        let pillar = VoxelPos::new(3, 70, 3);
        world.set_voxel(pillar, Voxel(17));
        let t0 = Instant::now();
        let mut inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();
        inst.tick(t0 + ms(3000), &mut world, &mut rec);

        assert_eq!(world.voxel(pillar), Voxel::AIR);
        assert_eq!(inst.interior_snapshot().original(pillar), Some(Voxel(17)));
        assert_eq!(inst.interior_snapshot().len(), 1);
    }

    #[test]
    fn break_is_denied_before_active() {
        let (world, caster, mut rec) = setup();
        let t0 = Instant::now();
        let mut inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();
        assert_eq!(
            inst.request_break(t0, &mut rec),
            Err(BreakDenied::NoActiveInstance)
        );
        assert_eq!(inst.phase(), Phase::Casting);
    }

    #[test]
    fn break_cursors_move_down_and_in() {
        let (mut world, caster, mut rec) = setup();
        let t0 = Instant::now();
        let mut inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();
        inst.tick(t0 + ms(3000), &mut world, &mut rec);
        let b0 = t0 + ms(3000);
        inst.request_break(b0, &mut rec).unwrap();
        assert_eq!(inst.phase(), Phase::Breaking);
        assert_eq!(inst.request_break(b0, &mut rec), Err(BreakDenied::NoActiveInstance));

        inst.tick(b0 + ms(1000), &mut world, &mut rec);
        assert_eq!(inst.breaking_shell_height(), 0);
        assert_eq!(inst.breaking_platform_radius(), 12);
        // Top of the shell is gone, bottom still stands.
        assert_eq!(world.voxel(VoxelPos::new(0, 89, 0)), Voxel::AIR);
        assert_eq!(world.voxel(VoxelPos::new(0, 39, 0)), Voxel(49));

        inst.tick(b0 + ms(2000), &mut world, &mut rec);
        assert!(inst.is_finished());
        assert!(inst.entities().is_empty());
    }

    #[test]
    fn finish_applies_cooldown_marker() {
        let (mut world, caster, mut rec) = setup();
        let t0 = Instant::now();
        let mut inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();
        inst.tick(t0 + ms(3000), &mut world, &mut rec);
        inst.request_break(t0 + ms(3000), &mut rec).unwrap();
        inst.tick(t0 + ms(6000), &mut world, &mut rec);

        assert!(world.has_effect(caster, EffectKind::Exhaustion));
        assert!(!world.has_effect(caster, EffectKind::Slowness));
        assert_eq!(rec.for_actor(caster).last(), Some(&Notice::Deactivated));
        assert_eq!(world.modified_voxel_count(), 0);
    }

    #[test]
    fn finished_instance_ignores_ticks() {
        let (mut world, caster, mut rec) = setup();
        let t0 = Instant::now();
        let mut inst = RegionInstance::begin(caster, t0, &world, &DomainConfig::default(), &mut rec).unwrap();
        inst.tick(t0 + ms(3000), &mut world, &mut rec);
        inst.request_break(t0 + ms(3000), &mut rec).unwrap();
        inst.tick(t0 + ms(5000), &mut world, &mut rec);
        let writes = world.write_count();
        let notices = rec.notices.len();

        inst.tick(t0 + ms(9000), &mut world, &mut rec);
        assert_eq!(world.write_count(), writes);
        assert_eq!(rec.notices.len(), notices);
    }
}
