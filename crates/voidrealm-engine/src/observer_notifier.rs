//! Notifier that relays observed notices to the remote observer.
//!
//! Every notice is logged as the actor would see it. Notices with a wire
//! payload path (cast started, activated, deactivated, cooldown ok) are
//! also serialized into a [`WirePayload`] frame and queued on an outbox,
//! which stands in for the observer transport.

use tracing::{debug, info, warn};
use voidrealm_core::notify::Notifier;
use voidrealm_types::{EntityId, Notice, WirePayload};

/// Notifier that bridges lifecycle notices to the observer transport.
#[derive(Debug, Default)]
pub struct ObserverNotifier {
    outbox: Vec<String>,
    delivered: u64,
}

impl ObserverNotifier {
    /// Create a notifier with an empty outbox.
    pub const fn new() -> Self {
        Self {
            outbox: Vec::new(),
            delivered: 0,
        }
    }

    /// Frames queued for the observer, in emission order.
    pub fn outbox(&self) -> &[String] {
        &self.outbox
    }

    /// Take every queued frame, leaving the outbox empty.
    pub fn drain_outbox(&mut self) -> Vec<String> {
        std::mem::take(&mut self.outbox)
    }

    /// Total notices seen, observed or not.
    pub const fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl Notifier for ObserverNotifier {
    fn notify(&mut self, actor: EntityId, notice: Notice) {
        self.delivered = self.delivered.saturating_add(1);
        info!(actor = %actor, notice = ?notice, "{}", notice.message());

        let Some(payload) = WirePayload::for_notice(actor, notice) else {
            return;
        };
        match payload.to_json() {
            Ok(frame) => {
                debug!(actor = %actor, id = payload.id, "Observer frame queued");
                self.outbox.push(frame);
            }
            Err(e) => {
                warn!(actor = %actor, error = %e, "failed to serialize observer frame");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn only_observed_notices_reach_the_outbox() {
        let actor = EntityId::new();
        let mut notifier = ObserverNotifier::new();
        for notice in [
            Notice::CastStarted,
            Notice::BarrierComplete,
            Notice::Activated,
            Notice::BreakStarted,
            Notice::Deactivated,
        ] {
            notifier.notify(actor, notice);
        }

        assert_eq!(notifier.delivered(), 5);
        assert_eq!(notifier.outbox().len(), 3);
    }

    #[test]
    fn frames_carry_namespaced_ids() {
        let actor = EntityId::new();
        let mut notifier = ObserverNotifier::new();
        notifier.notify(actor, Notice::CooldownOk);
        notifier.notify(actor, Notice::Activated);

        let frames = notifier.drain_outbox();
        assert!(notifier.outbox().is_empty());

        let first: WirePayload = serde_json::from_str(frames.first().unwrap()).unwrap();
        assert_eq!(first.id, "voidrealm:cooldown_ok");
        assert_eq!(first.actor, actor);
        assert_eq!(first.notice, Notice::CooldownOk);

        let second: WirePayload = serde_json::from_str(frames.get(1).unwrap()).unwrap();
        assert_eq!(second.id, "voidrealm:domain_activated");
    }
}
