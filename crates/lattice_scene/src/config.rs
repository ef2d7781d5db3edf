//! Simulation configuration, loaded from TOML.
//!
//! ```toml
//! world_name = "Overworld"
//! tree_capacity = 256
//!
//! [clock]
//! fixed_step_ms = 16
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SceneError, SceneResult};

/// Top-level simulation settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Name given to the world node.
    pub world_name: String,
    /// Scopes to pre-allocate in the arena.
    pub tree_capacity: usize,
    /// Clock settings.
    pub clock: ClockConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_name: String::from("World"),
            tree_capacity: 64,
            clock: ClockConfig::default(),
        }
    }
}

/// Clock settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Fixed step per update in milliseconds. Wall-clock time when absent.
    pub fixed_step_ms: Option<u64>,
}

impl SimulationConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML or an empty world name.
    pub fn from_toml_str(text: &str) -> SceneResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| SceneError::InvalidConfig(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> SceneResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SceneError::InvalidConfig(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks values that parse but make no sense.
    ///
    /// # Errors
    ///
    /// `InvalidConfig`.
    pub fn validate(&self) -> SceneResult<()> {
        if self.world_name.is_empty() {
            return Err(SceneError::InvalidConfig("world_name cannot be empty".to_string()));
        }
        if self.clock.fixed_step_ms == Some(0) {
            return Err(SceneError::InvalidConfig("clock.fixed_step_ms must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = SimulationConfig::from_toml_str(
            r#"
            world_name = "Overworld"
            tree_capacity = 128

            [clock]
            fixed_step_ms = 16
            "#,
        )
        .unwrap();
        assert_eq!(config.world_name, "Overworld");
        assert_eq!(config.tree_capacity, 128);
        assert_eq!(config.clock.fixed_step_ms, Some(16));
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config = SimulationConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert_eq!(config.clock.fixed_step_ms, None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(matches!(
            SimulationConfig::from_toml_str("tree_capacity = \"lots\""),
            Err(SceneError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("world_name = \"\""),
            Err(SceneError::InvalidConfig(_))
        ));
        assert!(matches!(
            SimulationConfig::from_toml_str("[clock]\nfixed_step_ms = 0"),
            Err(SceneError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimulationConfig::from_file("/nonexistent/lattice.toml"),
            Err(SceneError::InvalidConfig(_))
        ));
    }
}
