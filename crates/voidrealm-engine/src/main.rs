//! Demo engine binary for Voidrealm.
//!
//! Wires the instance registry to an in-memory world, a scripted request
//! source, and the observer notifier, then runs the host loop until the
//! script is exhausted and every region has been restored.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `voidrealm-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the demo scenario from the `demo` section
//! 4. Create the instance registry
//! 5. Run the host loop
//! 6. Log the result and verify the world was restored

mod error;
mod observer_notifier;
mod scenario;

use std::path::Path;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use voidrealm_core::config::{DomainConfig, LoggingConfig};
use voidrealm_core::registry::InstanceRegistry;
use voidrealm_core::runner;

use crate::error::EngineError;
use crate::observer_notifier::ObserverNotifier;
use crate::scenario::DemoConfig;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "voidrealm-config.yaml";

/// Application entry point for the demo engine.
///
/// # Errors
///
/// Returns an error if configuration, scenario construction, or the host
/// loop fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("voidrealm-engine starting");
    if from_file {
        info!(path = CONFIG_PATH, "Configuration loaded");
    } else {
        info!("Config file not found, using defaults");
    }
    info!(
        radius = config.region.radius,
        build_ms = config.timing.build_duration_ms,
        activation_ms = config.timing.activation_delay_ms,
        break_ms = config.timing.break_duration_ms,
        cooldown_ticks = config.effects.cooldown_ticks,
        seal_region = config.policy.seal_region,
        "Domain settings"
    );

    // 3. Build the demo scenario.
    let demo = load_demo_config()?;
    let scenario::Scenario {
        mut world,
        caster,
        bystanders,
        mut script,
    } = scenario::build_scenario(&demo)?;
    let baseline = world.modified_voxel_count();

    // 4. Create the registry.
    let runner_settings = config.runner;
    let mut registry = InstanceRegistry::new(config)?;
    let mut notifier = ObserverNotifier::new();
    info!(caster = %caster, bystanders = bystanders.len(), "Entering host loop");

    // 5. Run the host loop.
    let summary = runner::run_host(
        &mut registry,
        &mut world,
        &mut script,
        &mut notifier,
        &runner_settings,
    )
    .await?;

    // 6. Log results.
    runner::log_run_end(&summary);
    for frame in notifier.outbox() {
        debug!(frame = frame.as_str(), "Observer frame");
    }
    let frames = notifier.drain_outbox();
    info!(
        notices = notifier.delivered(),
        observer_frames = frames.len(),
        "Notices delivered"
    );
    if world.modified_voxel_count() == baseline {
        info!(modified_voxels = baseline, "World restored to its pre-cast state");
    } else {
        warn!(
            baseline,
            modified_voxels = world.modified_voxel_count(),
            "World differs from its pre-cast state"
        );
    }

    info!(
        end_reason = ?summary.end_reason,
        total_ticks = summary.total_ticks,
        "voidrealm-engine shutdown complete"
    );

    Ok(())
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.as_str()));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the domain configuration from `voidrealm-config.yaml`.
///
/// Returns the configuration and whether it came from the file.
fn load_config() -> Result<(DomainConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((DomainConfig::from_file(config_path)?, true))
    } else {
        Ok((DomainConfig::default(), false))
    }
}

/// Load the demo scenario settings from `voidrealm-config.yaml`.
///
/// Reads the `demo` section from the YAML file. If the file does not exist
/// or lacks the `demo` key, defaults are used.
fn load_demo_config() -> Result<DemoConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok(DemoConfig::default());
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Scenario {
        message: format!("failed to read config file: {e}"),
    })?;
    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(|e| EngineError::Scenario {
        message: format!("failed to parse config YAML: {e}"),
    })?;

    raw.get("demo").map_or_else(
        || Ok(DemoConfig::default()),
        |demo_value| {
            serde_yml::from_value(demo_value.clone()).map_err(|e| EngineError::Scenario {
                message: format!("failed to parse demo config: {e}"),
            })
        },
    )
}
