//! Notices emitted by the region lifecycle and their wire representation.
//!
//! Every phase transition produces a [`Notice`] addressed to the instance's
//! actor. A subset of them is also relayed to the actor's remote observer
//! (the client UI) as a [`WirePayload`]: cast started, activated,
//! deactivated, and the cooldown-ok reply to a hold-to-confirm check.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// Namespace prefix for all wire payload ids.
pub const PAYLOAD_NAMESPACE: &str = "voidrealm";

/// A lifecycle notice addressed to an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// The cast was accepted and the region snapshot has been taken.
    CastStarted,
    /// Every shell voxel has been materialized.
    BarrierComplete,
    /// The region is sealed and its occupants trapped.
    Activated,
    /// A break request was accepted; teardown has begun.
    BreakStarted,
    /// The region has been fully restored.
    Deactivated,
    /// The actor may proceed with a hold-to-confirm gesture.
    CooldownOk,
}

impl Notice {
    /// User-facing message shown to the actor.
    pub const fn message(self) -> &'static str {
        match self {
            Self::CastStarted => "Casting Domain Expansion...",
            Self::BarrierComplete => "Domain barrier complete...",
            Self::Activated => "Domain Expansion: Unlimited Void",
            Self::BreakStarted => "Breaking Domain Expansion...",
            Self::Deactivated => {
                "Domain Expansion ended. You feel exhausted... (2 minutes cooldown)"
            }
            Self::CooldownOk => "Hold to expand your domain",
        }
    }

    /// Wire payload path for notices relayed to the remote observer.
    ///
    /// Returns `None` for actor-only notices.
    pub const fn payload_path(self) -> Option<&'static str> {
        match self {
            Self::CastStarted => Some("start_cast"),
            Self::Activated => Some("domain_activated"),
            Self::Deactivated => Some("domain_deactivated"),
            Self::CooldownOk => Some("cooldown_ok"),
            Self::BarrierComplete | Self::BreakStarted => None,
        }
    }

    /// Whether this notice is relayed to the remote observer.
    pub const fn is_observed(self) -> bool {
        self.payload_path().is_some()
    }
}

/// A notice frame as sent over the observer transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePayload {
    /// Namespaced payload id, e.g. `voidrealm:domain_activated`.
    pub id: String,
    /// The actor the notice is addressed to.
    pub actor: EntityId,
    /// The notice itself.
    pub notice: Notice,
    /// Wall-clock time the notice was emitted.
    pub emitted_at: DateTime<Utc>,
}

impl WirePayload {
    /// Build the wire frame for an observed notice.
    ///
    /// Returns `None` if `notice` is actor-only.
    pub fn for_notice(actor: EntityId, notice: Notice) -> Option<Self> {
        let path = notice.payload_path()?;
        Some(Self {
            id: format!("{PAYLOAD_NAMESPACE}:{path}"),
            actor,
            notice,
            emitted_at: Utc::now(),
        })
    }

    /// Serialize the frame to JSON.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn observed_notices_match_transport_contract() {
        assert!(Notice::CastStarted.is_observed());
        assert!(Notice::Activated.is_observed());
        assert!(Notice::Deactivated.is_observed());
        assert!(Notice::CooldownOk.is_observed());
        assert!(!Notice::BarrierComplete.is_observed());
        assert!(!Notice::BreakStarted.is_observed());
    }

    #[test]
    fn payload_id_is_namespaced() {
        let actor = EntityId::new();
        let payload = WirePayload::for_notice(actor, Notice::Activated).unwrap();
        assert_eq!(payload.id, "voidrealm:domain_activated");
        assert_eq!(payload.actor, actor);
    }

    #[test]
    fn actor_only_notice_has_no_payload() {
        assert!(WirePayload::for_notice(EntityId::new(), Notice::BreakStarted).is_none());
    }

    #[test]
    fn payload_json_carries_notice_name() {
        let payload = WirePayload::for_notice(EntityId::new(), Notice::CastStarted).unwrap();
        let json = payload.to_json().unwrap();
        assert!(json.contains("\"notice\":\"cast_started\""));
        let back: WirePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payload);
    }
}
