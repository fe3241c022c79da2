//! Enumeration types for the Voidrealm region lifecycle.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Lifecycle phase
// ---------------------------------------------------------------------------

/// Lifecycle phase of a region instance.
///
/// Phases only ever move forward in declaration order, so the derived
/// [`Ord`] doubles as the transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Snapshot taken, nothing materialized yet.
    Casting,
    /// The spherical shell is rising layer by layer.
    BarrierBuilding,
    /// The shell is complete and the floor disk is spreading outwards.
    PlatformBuilding,
    /// Interior cleared, entities trapped; stays here until a break request.
    Active,
    /// Shell and platform are being reverted to their snapshots.
    Breaking,
    /// Everything restored. Terminal.
    Finished,
}

impl Phase {
    /// Whether the instance still occupies its actor's slot.
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Finished)
    }

    /// Whether `next` is the single legal successor of this phase.
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Casting, Self::BarrierBuilding)
                | (Self::BarrierBuilding, Self::PlatformBuilding)
                | (Self::PlatformBuilding, Self::Active)
                | (Self::Active, Self::Breaking)
                | (Self::Breaking, Self::Finished)
        )
    }
}

// ---------------------------------------------------------------------------
// Timed status effects
// ---------------------------------------------------------------------------

/// Timed status effect kinds the region lifecycle applies to entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Movement-speed impairment.
    Slowness,
    /// Power (attack strength) impairment.
    Weakness,
    /// Work-speed impairment.
    Fatigue,
    /// Vision block.
    Blindness,
    /// Post-break cooldown marker on the caster.
    Exhaustion,
}

impl EffectKind {
    /// The incapacitation bundle applied to every trapped entity.
    pub const INCAPACITATION: [Self; 4] =
        [Self::Slowness, Self::Weakness, Self::Fatigue, Self::Blindness];

    /// Whether this kind belongs to the incapacitation bundle.
    pub const fn is_incapacitation(self) -> bool {
        !matches!(self, Self::Exhaustion)
    }
}
