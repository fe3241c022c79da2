//! Instance registry: one live region per actor.
//!
//! [`InstanceRegistry`] owns every live [`RegionInstance`], keyed by the
//! owning actor. It is the only place that creates instances, routes break
//! requests, drives ticks, and drops finished instances. The actor key is the
//! single source of truth for "does this actor have a region".

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, info};
use voidrealm_types::{EffectKind, EntityId, InstanceId, Phase};
use voidrealm_world::Host;

use crate::config::{ConfigError, DomainConfig};
use crate::error::{BreakDenied, CastDenied, CooldownStatus};
use crate::instance::RegionInstance;
use crate::notify::Notifier;

// ---------------------------------------------------------------------------
// TickReport
// ---------------------------------------------------------------------------

/// Outcome of one registry tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Instances ticked.
    pub ticked: usize,
    /// Actors whose instance finished and was removed this tick.
    pub reaped: Vec<EntityId>,
}

// ---------------------------------------------------------------------------
// InstanceRegistry
// ---------------------------------------------------------------------------

/// Owner of every live region, keyed by actor.
#[derive(Debug, Clone)]
pub struct InstanceRegistry {
    config: DomainConfig,
    instances: BTreeMap<EntityId, RegionInstance>,
}

impl InstanceRegistry {
    /// Create an empty registry.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the configuration is inconsistent.
    pub fn new(config: DomainConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            instances: BTreeMap::new(),
        })
    }

    /// The configuration every new instance is created with.
    pub const fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Start a region for `actor`.
    ///
    /// The snapshot is taken synchronously; the first write happens on the
    /// next [`tick`](Self::tick).
    ///
    /// # Errors
    ///
    /// - [`CastDenied::AlreadyActive`] if the actor owns an unfinished
    ///   instance, whatever its phase.
    /// - [`CastDenied::OnCooldown`] if the actor carries the cooldown marker.
    /// - [`CastDenied::UnknownActor`] if the host does not know the actor.
    pub fn request_cast(
        &mut self,
        actor: EntityId,
        now: Instant,
        host: &dyn Host,
        notifier: &mut dyn Notifier,
    ) -> Result<InstanceId, CastDenied> {
        if self.has_live_instance(actor) {
            debug!(actor = %actor, "Cast denied: already active");
            return Err(CastDenied::AlreadyActive);
        }
        if host.has_effect(actor, EffectKind::Exhaustion) {
            debug!(actor = %actor, "Cast denied: on cooldown");
            return Err(CastDenied::OnCooldown);
        }

        let instance = RegionInstance::begin(actor, now, host, &self.config, notifier)?;
        let id = instance.id();
        let _ = self.instances.insert(actor, instance);
        Ok(id)
    }

    /// Start teardown of the actor's region.
    ///
    /// # Errors
    ///
    /// Returns [`BreakDenied::NoActiveInstance`] unless the actor owns an
    /// instance in [`Phase::Active`].
    pub fn request_break(
        &mut self,
        actor: EntityId,
        now: Instant,
        notifier: &mut dyn Notifier,
    ) -> Result<(), BreakDenied> {
        let instance = self
            .instances
            .get_mut(&actor)
            .ok_or(BreakDenied::NoActiveInstance)?;
        instance.request_break(now, notifier)
    }

    /// Whether a cast by `actor` would pass the cooldown gate.
    ///
    /// An actor with a live instance is always ready (the gesture will be
    /// routed to a break instead).
    pub fn check_cooldown(&self, actor: EntityId, host: &dyn Host) -> CooldownStatus {
        if self.has_live_instance(actor) || !host.has_effect(actor, EffectKind::Exhaustion) {
            CooldownStatus::Ready
        } else {
            CooldownStatus::Denied(CastDenied::OnCooldown)
        }
    }

    /// Tick every instance in actor order, then drop the finished ones.
    pub fn tick(&mut self, now: Instant, host: &mut dyn Host, notifier: &mut dyn Notifier) -> TickReport {
        let mut report = TickReport::default();
        for instance in self.instances.values_mut() {
            instance.tick(now, host, notifier);
            report.ticked = report.ticked.saturating_add(1);
        }

        self.instances.retain(|actor, instance| {
            if instance.is_finished() {
                report.reaped.push(*actor);
                false
            } else {
                true
            }
        });
        for actor in &report.reaped {
            info!(actor = %actor, "Finished region removed");
        }
        report
    }

    /// Number of live instances.
    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    /// Whether `actor` owns an unfinished instance.
    pub fn has_live_instance(&self, actor: EntityId) -> bool {
        self.instances
            .get(&actor)
            .is_some_and(|instance| instance.phase().is_live())
    }

    /// Phase of the actor's instance, if any.
    pub fn phase_of(&self, actor: EntityId) -> Option<Phase> {
        self.instances.get(&actor).map(RegionInstance::phase)
    }

    /// The actor's instance, if any.
    pub fn instance(&self, actor: EntityId) -> Option<&RegionInstance> {
        self.instances.get(&actor)
    }
}
