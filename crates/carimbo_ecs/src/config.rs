//! # ECS Configuration
//!
//! Capacity limits for the ECS core, fixed for the lifetime of a manager.
//! Loaded once at startup from TOML; every key is optional.
//!
//! ```toml
//! max_entities = 10000
//! max_component_types = 256
//! max_component_size = 1024
//! max_systems = 32
//! max_system_size = 1024
//! system_alignment = 64
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::ecs::Signature;
use crate::error::{EcsError, EcsResult};

/// Capacity limits shared by every manager of one world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Upper bound on simultaneously live entities.
    pub max_entities: usize,
    /// Upper bound on distinct component types ever enrolled.
    pub max_component_types: usize,
    /// Per-slot byte budget for a single component value.
    pub max_component_size: usize,
    /// Upper bound on registered systems.
    pub max_systems: usize,
    /// Per-system byte budget.
    pub max_system_size: usize,
    /// Maximum alignment a system type may require.
    pub system_alignment: usize,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_entities: 10_000,
            max_component_types: Signature::CAPACITY,
            max_component_size: 1024,
            max_systems: 32,
            max_system_size: 1024,
            system_alignment: 64,
        }
    }
}

impl EcsConfig {
    /// Parses and validates a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] on malformed TOML, unknown keys,
    /// or limits that fail [`EcsConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the file cannot be read or
    /// its contents are invalid.
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EcsError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded ECS configuration");
        Ok(config)
    }

    /// Checks every limit against what the core can represent.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_entities == 0 || self.max_entities > u32::MAX as usize {
            return Err(EcsError::InvalidConfig(format!(
                "max_entities must be in 1..={}, got {}",
                u32::MAX,
                self.max_entities
            )));
        }
        if self.max_component_types == 0 || self.max_component_types > Signature::CAPACITY {
            return Err(EcsError::InvalidConfig(format!(
                "max_component_types must be in 1..={}, got {}",
                Signature::CAPACITY,
                self.max_component_types
            )));
        }
        if self.max_component_size == 0 {
            return Err(EcsError::InvalidConfig(
                "max_component_size must be greater than zero".into(),
            ));
        }
        if self.max_systems == 0 {
            return Err(EcsError::InvalidConfig(
                "max_systems must be greater than zero".into(),
            ));
        }
        if self.max_system_size == 0 {
            return Err(EcsError::InvalidConfig(
                "max_system_size must be greater than zero".into(),
            ));
        }
        if !self.system_alignment.is_power_of_two() {
            return Err(EcsError::InvalidConfig(format!(
                "system_alignment must be a power of two, got {}",
                self.system_alignment
            )));
        }
        Ok(())
    }

    /// Returns a copy with a different entity capacity.
    #[must_use]
    pub const fn with_max_entities(mut self, max_entities: usize) -> Self {
        self.max_entities = max_entities;
        self
    }

    /// Returns a copy with a different system limit.
    #[must_use]
    pub const fn with_max_systems(mut self, max_systems: usize) -> Self {
        self.max_systems = max_systems;
        self
    }

    /// Returns a copy with a different component-type limit.
    #[must_use]
    pub const fn with_max_component_types(mut self, max_component_types: usize) -> Self {
        self.max_component_types = max_component_types;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = EcsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_entities, 10_000);
        assert_eq!(config.max_component_types, 256);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EcsConfig::from_toml_str("max_entities = 128\nmax_systems = 4\n").unwrap();
        assert_eq!(config.max_entities, 128);
        assert_eq!(config.max_systems, 4);
        assert_eq!(config.system_alignment, 64);
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = EcsConfig::from_toml_str("max_entites = 5").unwrap_err();
        assert!(matches!(err, EcsError::InvalidConfig(_)));
    }

    #[test]
    fn test_rejects_bad_limits() {
        assert!(EcsConfig::from_toml_str("max_entities = 0").is_err());
        assert!(EcsConfig::from_toml_str("max_component_types = 257").is_err());
        assert!(EcsConfig::from_toml_str("system_alignment = 48").is_err());
        assert!(!EcsError::InvalidConfig(String::new()).is_contract_violation());
    }

    #[test]
    fn test_load_missing_file() {
        let err = EcsConfig::load("/nonexistent/carimbo/ecs.toml").unwrap_err();
        assert!(matches!(err, EcsError::InvalidConfig(msg) if msg.contains("ecs.toml")));
    }
}
