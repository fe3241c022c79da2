//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup and the host
//! loop so `main` can propagate with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading or validation failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: voidrealm_core::config::ConfigError,
    },

    /// Demo world construction failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: voidrealm_world::WorldError,
    },

    /// The host loop refused to start.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: voidrealm_core::runner::RunnerError,
    },

    /// The demo scenario could not be loaded or built.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the scenario failure.
        message: String,
    },
}
