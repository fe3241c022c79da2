//! Request denials.
//!
//! These are expected, user-facing outcomes rather than failures. The
//! `Display` text of each variant is the message shown to the requester.

/// Why a cast request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CastDenied {
    /// The actor still carries the cooldown marker from a previous region.
    #[error("You are still exhausted from your last Domain Expansion!")]
    OnCooldown,

    /// The actor already owns a region that has not finished.
    #[error("You already have an active Domain Expansion!")]
    AlreadyActive,

    /// The host does not know the actor, so there is nowhere to anchor the region.
    #[error("You cannot cast a Domain Expansion right now.")]
    UnknownActor,
}

/// Why a break request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BreakDenied {
    /// The actor owns no region in the active phase.
    #[error("You don't have an active Domain Expansion to break!")]
    NoActiveInstance,
}

/// Answer to a cooldown query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownStatus {
    /// A cast (or break, for a live region) would be accepted.
    Ready,
    /// A cast would be refused for the given reason.
    Denied(CastDenied),
}

impl CooldownStatus {
    /// Whether the actor may proceed.
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    /// User-facing reason, when denied.
    pub fn reason(self) -> Option<String> {
        match self {
            Self::Ready => None,
            Self::Denied(denied) => Some(denied.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denials_carry_user_messages() {
        assert!(CastDenied::OnCooldown.to_string().contains("exhausted"));
        assert!(CastDenied::AlreadyActive.to_string().contains("already"));
        assert!(BreakDenied::NoActiveInstance.to_string().contains("break"));
    }

    #[test]
    fn cooldown_status_reason() {
        assert!(CooldownStatus::Ready.is_ready());
        assert_eq!(CooldownStatus::Ready.reason(), None);
        let denied = CooldownStatus::Denied(CastDenied::OnCooldown);
        assert!(!denied.is_ready());
        assert_eq!(denied.reason(), Some(CastDenied::OnCooldown.to_string()));
    }
}
