//! Configuration loading and typed config structures for Voidrealm.
//!
//! The canonical configuration lives in `voidrealm-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, a loader, and [`DomainConfig::validate`] for the
//! relationships between fields that serde cannot express.
//!
//! Every field has a default, so an empty file yields the stock region:
//! radius 25, a 2 s barrier build, a 1 s platform build, activation 3 s after
//! the cast, a 2 s teardown, and a 2400-tick cooldown.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use voidrealm_types::Voxel;

/// Smallest radius for which shell, platform, and interior are all non-empty.
pub const MIN_RADIUS: u16 = 4;

/// Largest accepted radius.
pub const MAX_RADIUS: u16 = 128;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The values parsed but are inconsistent.
    #[error("invalid config: {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `voidrealm-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DomainConfig {
    /// Region geometry.
    #[serde(default)]
    pub region: RegionConfig,

    /// Phase durations.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Status effect windows and strengths.
    #[serde(default)]
    pub effects: EffectConfig,

    /// Voxel materials written by the region.
    #[serde(default)]
    pub materials: MaterialConfig,

    /// Optional behaviors.
    #[serde(default)]
    pub policy: PolicyConfig,

    /// Host loop settings.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DomainConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values are inconsistent.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_RADIUS..=MAX_RADIUS).contains(&self.region.radius) {
            return Err(invalid(
                "region.radius",
                format!("must be within {MIN_RADIUS}..={MAX_RADIUS}, got {}", self.region.radius),
            ));
        }

        let t = &self.timing;
        for (field, value) in [
            ("timing.build_duration_ms", t.build_duration_ms),
            ("timing.platform_duration_ms", t.platform_duration_ms),
            ("timing.activation_delay_ms", t.activation_delay_ms),
            ("timing.break_duration_ms", t.break_duration_ms),
        ] {
            if value == 0 {
                return Err(invalid(field, String::from("must be greater than zero")));
            }
        }
        if t.activation_delay_ms < t.build_duration_ms {
            return Err(invalid(
                "timing.activation_delay_ms",
                format!(
                    "must not be shorter than timing.build_duration_ms ({} < {})",
                    t.activation_delay_ms, t.build_duration_ms
                ),
            ));
        }

        // Effects are refreshed once per game tick; a one-tick window would
        // lapse between refreshes.
        if self.effects.refresh_ticks <= 1 {
            return Err(invalid(
                "effects.refresh_ticks",
                String::from("must exceed one game tick"),
            ));
        }
        if self.effects.trap_ticks == 0 {
            return Err(invalid("effects.trap_ticks", String::from("must be greater than zero")));
        }

        let m = &self.materials;
        if m.barrier().is_air() || m.platform().is_air() {
            return Err(invalid("materials", String::from("materials must not be air")));
        }
        if m.barrier == m.platform {
            return Err(invalid(
                "materials.platform",
                String::from("must differ from materials.barrier"),
            ));
        }
        Ok(())
    }
}

const fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

/// Region geometry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RegionConfig {
    /// Shell radius in voxels.
    #[serde(default = "default_radius")]
    pub radius: u16,
}

impl RegionConfig {
    /// The radius as a signed voxel offset.
    pub fn radius(self) -> i32 {
        i32::from(self.radius)
    }
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
        }
    }
}

/// Phase durations, in wall-clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TimingConfig {
    /// Time from cast until the barrier shell is complete.
    #[serde(default = "default_build_duration_ms")]
    pub build_duration_ms: u64,

    /// Time to grow the platform once the shell is complete.
    #[serde(default = "default_platform_duration_ms")]
    pub platform_duration_ms: u64,

    /// Time from cast until the region activates.
    #[serde(default = "default_activation_delay_ms")]
    pub activation_delay_ms: u64,

    /// Time to tear the region down after a break request.
    #[serde(default = "default_break_duration_ms")]
    pub break_duration_ms: u64,
}

impl TimingConfig {
    /// Barrier build duration.
    pub const fn build(&self) -> Duration {
        Duration::from_millis(self.build_duration_ms)
    }

    /// Platform build duration.
    pub const fn platform(&self) -> Duration {
        Duration::from_millis(self.platform_duration_ms)
    }

    /// Delay from cast to activation.
    pub const fn activation(&self) -> Duration {
        Duration::from_millis(self.activation_delay_ms)
    }

    /// Teardown duration.
    pub const fn breaking(&self) -> Duration {
        Duration::from_millis(self.break_duration_ms)
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            build_duration_ms: default_build_duration_ms(),
            platform_duration_ms: default_platform_duration_ms(),
            activation_delay_ms: default_activation_delay_ms(),
            break_duration_ms: default_break_duration_ms(),
        }
    }
}

/// Status effect configuration. Durations are in game ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EffectConfig {
    /// Cooldown marker duration applied to the caster on teardown.
    #[serde(default = "default_cooldown_ticks")]
    pub cooldown_ticks: u32,

    /// Incapacitation duration applied at activation.
    #[serde(default = "default_trap_ticks")]
    pub trap_ticks: u32,

    /// Incapacitation duration re-applied on every active tick.
    #[serde(default = "default_refresh_ticks")]
    pub refresh_ticks: u32,

    /// Strength of the movement, power, and work-speed effects.
    #[serde(default = "default_amplifier")]
    pub amplifier: u8,

    /// Strength of the vision effect.
    #[serde(default)]
    pub vision_amplifier: u8,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            cooldown_ticks: default_cooldown_ticks(),
            trap_ticks: default_trap_ticks(),
            refresh_ticks: default_refresh_ticks(),
            amplifier: default_amplifier(),
            vision_amplifier: 0,
        }
    }
}

/// Voxel materials, as host voxel ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MaterialConfig {
    /// Material of the barrier shell.
    #[serde(default = "default_barrier")]
    pub barrier: u32,

    /// Material of the platform disk.
    #[serde(default = "default_platform")]
    pub platform: u32,
}

impl MaterialConfig {
    /// The barrier material as a voxel.
    pub const fn barrier(self) -> Voxel {
        Voxel(self.barrier)
    }

    /// The platform material as a voxel.
    pub const fn platform(self) -> Voxel {
        Voxel(self.platform)
    }
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            barrier: default_barrier(),
            platform: default_platform(),
        }
    }
}

/// Optional behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PolicyConfig {
    /// Discard living entities that enter an active region after activation.
    #[serde(default)]
    pub seal_region: bool,
}

/// Host loop configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Stop once no requests are pending and no instance is live.
    #[serde(default = "default_true")]
    pub stop_when_idle: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            max_ticks: 0,
            stop_when_idle: true,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted log lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_radius() -> u16 {
    25
}

const fn default_build_duration_ms() -> u64 {
    2000
}

const fn default_platform_duration_ms() -> u64 {
    1000
}

const fn default_activation_delay_ms() -> u64 {
    3000
}

const fn default_break_duration_ms() -> u64 {
    2000
}

const fn default_cooldown_ticks() -> u32 {
    2400
}

const fn default_trap_ticks() -> u32 {
    40
}

const fn default_refresh_ticks() -> u32 {
    10
}

const fn default_amplifier() -> u8 {
    255
}

const fn default_barrier() -> u32 {
    49
}

const fn default_platform() -> u32 {
    251
}

const fn default_tick_interval_ms() -> u64 {
    50
}

fn default_log_level() -> String {
    String::from("info")
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DomainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.region.radius(), 25);
        assert_eq!(config.timing.build(), Duration::from_millis(2000));
        assert_eq!(config.timing.activation(), Duration::from_millis(3000));
        assert_eq!(config.effects.cooldown_ticks, 2400);
        assert_eq!(config.effects.amplifier, 255);
        assert!(!config.policy.seal_region);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
region:
  radius: 12

timing:
  build_duration_ms: 1500
  platform_duration_ms: 500
  activation_delay_ms: 2500
  break_duration_ms: 3000

effects:
  cooldown_ticks: 600
  trap_ticks: 60
  refresh_ticks: 20
  amplifier: 4
  vision_amplifier: 1

materials:
  barrier: 7
  platform: 8

policy:
  seal_region: true

runner:
  tick_interval_ms: 10
  max_ticks: 500
  stop_when_idle: false

logging:
  level: "debug"
  json: true
"#;

        let config = DomainConfig::parse(yaml).unwrap();
        assert_eq!(config.region.radius, 12);
        assert_eq!(config.timing.breaking(), Duration::from_millis(3000));
        assert_eq!(config.effects.refresh_ticks, 20);
        assert_eq!(config.materials.barrier(), Voxel(7));
        assert!(config.policy.seal_region);
        assert_eq!(config.runner.max_ticks, 500);
        assert!(!config.runner.stop_when_idle);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = DomainConfig::parse("timing:\n  break_duration_ms: 3000\n").unwrap();
        assert_eq!(config.timing.break_duration_ms, 3000);
        // Everything else uses defaults
        assert_eq!(config.timing.build_duration_ms, 2000);
        assert_eq!(config.region.radius, 25);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(DomainConfig::parse("").is_ok());
    }

    #[test]
    fn rejects_small_radius() {
        let err = DomainConfig::parse("region:\n  radius: 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "region.radius", .. }));
    }

    #[test]
    fn rejects_zero_duration() {
        let err = DomainConfig::parse("timing:\n  platform_duration_ms: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "timing.platform_duration_ms",
                ..
            }
        ));
    }

    #[test]
    fn rejects_activation_before_build() {
        let yaml = "timing:\n  build_duration_ms: 4000\n  activation_delay_ms: 3000\n";
        let err = DomainConfig::parse(yaml).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "timing.activation_delay_ms",
                ..
            }
        ));
    }

    #[test]
    fn rejects_single_tick_refresh() {
        let err = DomainConfig::parse("effects:\n  refresh_ticks: 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "effects.refresh_ticks", .. }));
    }

    #[test]
    fn rejects_shared_material() {
        let err = DomainConfig::parse("materials:\n  barrier: 9\n  platform: 9\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "materials.platform", .. }));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let err = DomainConfig::parse("region: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("voidrealm-config.yaml");
        if path.exists() {
            let config = DomainConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
