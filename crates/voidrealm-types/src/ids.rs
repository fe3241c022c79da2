//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Entities and region instances each get a strongly-typed ID so the two can
//! never be mixed up at compile time. Hosts that already hand out stable
//! UUIDs for their entities convert them with `From<Uuid>`; the `new()`
//! constructors use UUID v7 (time-ordered) for tests and the demo world.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Stable identifier of a mobile entity in the host world.
    ///
    /// Actors (casters) are entities too, so the same type keys both the
    /// registry's actor slots and an instance's trapped-entity map.
    EntityId
}

define_id! {
    /// Unique identifier for one region instance (one cast).
    InstanceId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let entity = EntityId::new();
        let instance = InstanceId::new();
        assert_ne!(entity.into_inner(), Uuid::nil());
        assert_ne!(instance.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = EntityId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }

    #[test]
    fn host_uuid_converts_losslessly() {
        let raw = Uuid::now_v7();
        let id = EntityId::from(raw);
        assert_eq!(Uuid::from(id), raw);
    }
}
