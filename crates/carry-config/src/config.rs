//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Hold-to-interact timing.
    pub interaction: InteractionConfig,
    /// Defaults for blocks declared carryable without explicit slot settings.
    pub carry: CarryDefaultsConfig,
    /// Headless simulation settings.
    pub sim: SimConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Timing of the hold-to-interact gesture.
///
/// The time an interaction needs is the block's interact delay multiplied by
/// the modifier of the action being performed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InteractionConfig {
    /// Multiplier applied when picking a block up.
    pub pickup_speed_modifier: f32,
    /// Multiplier applied when placing a carried block down.
    pub place_speed_modifier: f32,
    /// Multiplier applied when swapping a block to or from the back.
    pub swap_speed_modifier: f32,
    /// Interact delay in seconds for blocks that don't declare their own.
    pub default_interact_delay: f32,
}

/// Walk-speed modifier and animation for one carry slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlotDefaults {
    /// Added to the carrier's walk speed multiplier (negative slows down).
    pub walk_speed_modifier: f32,
    /// Animation played while something sits in the slot.
    pub animation: Option<String>,
}

/// Per-slot defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CarryDefaultsConfig {
    /// Carrying in both hands.
    pub hands: SlotDefaults,
    /// Carrying on the shoulder.
    pub shoulder: SlotDefaults,
    /// Carrying on the back.
    pub back: SlotDefaults,
}

/// Settings for the `carry-sim` binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Client frame rate in Hz.
    pub tick_rate: u32,
    /// Upper bound on frames spent per scripted phase.
    pub max_frames_per_phase: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            pickup_speed_modifier: 1.0,
            place_speed_modifier: 0.75,
            swap_speed_modifier: 1.5,
            default_interact_delay: 0.8,
        }
    }
}

impl Default for SlotDefaults {
    fn default() -> Self {
        Self {
            walk_speed_modifier: 0.0,
            animation: None,
        }
    }
}

impl Default for CarryDefaultsConfig {
    fn default() -> Self {
        Self {
            hands: SlotDefaults {
                walk_speed_modifier: -0.25,
                animation: Some("holdheavy".to_string()),
            },
            shoulder: SlotDefaults {
                walk_speed_modifier: -0.15,
                animation: Some("holdlight".to_string()),
            },
            back: SlotDefaults {
                walk_speed_modifier: -0.1,
                animation: None,
            },
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            max_frames_per_phase: 600,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
                path: config_path.clone(),
                source,
            })?;
            let config: Config = ron::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: config_path.clone(),
                source,
            })?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_speed_modifiers() {
        let interaction = InteractionConfig::default();
        assert_eq!(interaction.pickup_speed_modifier, 1.0);
        assert_eq!(interaction.place_speed_modifier, 0.75);
        assert_eq!(interaction.swap_speed_modifier, 1.5);
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("place_speed_modifier: 0.75"));
        assert!(ron_str.contains("holdheavy"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let config: Config = ron::from_str("(debug: (log_level: \"debug\"))").unwrap();
        assert_eq!(config.interaction, InteractionConfig::default());
        assert_eq!(config.debug.log_level, "debug");
    }

    #[test]
    fn test_partial_section_keeps_other_fields() {
        let config: Config = ron::from_str("(interaction: (swap_speed_modifier: 2.0))").unwrap();
        assert_eq!(config.interaction.swap_speed_modifier, 2.0);
        assert_eq!(config.interaction.place_speed_modifier, 0.75);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.interaction.default_interact_delay = 1.25;
        config.carry.back.animation = Some("strapped".to_string());

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_invalid_file_names_its_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "(interaction: (pickup_speed_modifier: \"fast\"))").unwrap();

        let err = Config::load_or_create(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
        assert_eq!(err.path(), Some(path.as_path()));
        assert!(err.to_string().contains(CONFIG_FILE));
    }

    #[test]
    fn test_save_into_file_path_reports_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();

        let err = Config::default().save(&blocker).unwrap_err();
        assert!(matches!(err, ConfigError::Write { .. }), "{err:?}");
        assert_eq!(err.path(), Some(blocker.as_path()));
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
