//! Error types for the `voidrealm-world` crate.
//!
//! The host contracts in [`crate::host`] are infallible (missing
//! entities are reported as `None`), so errors only arise from managing the
//! in-memory world itself.

use voidrealm_types::EntityId;

/// Errors that can occur while managing a [`MemoryWorld`](crate::MemoryWorld).
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// An entity was not found in the world.
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    /// A duplicate entity was inserted where uniqueness is required.
    #[error("duplicate entity id: {0}")]
    DuplicateEntity(EntityId),
}
