//! Outbound notices.
//!
//! Region instances report their phase transitions through a [`Notifier`].
//! The host decides what to do with each [`Notice`]: show the message to the
//! actor, forward it to a remote observer, or both.

use voidrealm_types::{EntityId, Notice};

/// Receiver of lifecycle notices.
pub trait Notifier: Send {
    /// Called once per transition, addressed to the owning actor.
    fn notify(&mut self, actor: EntityId, notice: Notice);
}

/// A notifier that drops everything.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&mut self, _actor: EntityId, _notice: Notice) {}
}

/// A notifier that keeps every notice in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingNotifier {
    /// Notices received so far.
    pub notices: Vec<(EntityId, Notice)>,
}

impl RecordingNotifier {
    /// Create an empty recorder.
    pub const fn new() -> Self {
        Self {
            notices: Vec::new(),
        }
    }

    /// Notices addressed to one actor, in arrival order.
    pub fn for_actor(&self, actor: EntityId) -> Vec<Notice> {
        self.notices
            .iter()
            .filter(|(id, _)| *id == actor)
            .map(|(_, notice)| *notice)
            .collect()
    }

    /// Number of times a notice was received for any actor.
    pub fn count(&self, notice: Notice) -> usize {
        self.notices.iter().filter(|(_, n)| *n == notice).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, actor: EntityId, notice: Notice) {
        self.notices.push((actor, notice));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_filters_by_actor() {
        let a = EntityId::new();
        let b = EntityId::new();
        let mut rec = RecordingNotifier::new();
        rec.notify(a, Notice::CastStarted);
        rec.notify(b, Notice::CastStarted);
        rec.notify(a, Notice::Activated);

        assert_eq!(rec.for_actor(a), vec![Notice::CastStarted, Notice::Activated]);
        assert_eq!(rec.count(Notice::CastStarted), 2);
    }
}
