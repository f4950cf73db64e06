//! Per-machine configuration.
//!
//! # Example
//!
//! ```rust
//! use deferflow::config::EngineConfig;
//!
//! let config = EngineConfig::builder()
//!     .name("remote")
//!     .active_capacity(8)
//!     .deferred_capacity(4)
//!     .history_limit(32)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.active_capacity, 8);
//!
//! let from_json = EngineConfig::from_json(r#"{ "name": "remote", "deferred_capacity": 4 }"#).unwrap();
//! assert_eq!(from_json.deferred_capacity, 4);
//! assert_eq!(from_json.active_capacity, EngineConfig::DEFAULT_CAPACITY);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which of a machine's two queues a value refers to.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueKind {
    Active,
    Deferred,
}

impl std::fmt::Display for QueueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => f.write_str("active"),
            Self::Deferred => f.write_str("deferred"),
        }
    }
}

/// Errors raised while validating or loading a configuration.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("The {queue} queue needs a capacity of at least 1")]
    ZeroCapacity { queue: QueueKind },

    #[error("The {queue} queue capacity may not exceed {max}")]
    CapacityTooLarge { queue: QueueKind, max: usize },

    #[error("The history limit may not exceed {max}")]
    HistoryTooLarge { max: usize },

    #[error("Invalid configuration: {0}")]
    Parse(String),
}

/// Sizing and identity of one machine instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Instance name used in logs and diagnostics
    pub name: Option<String>,

    /// Number of events the active queue holds
    pub active_capacity: usize,

    /// Number of events the deferred queue holds
    pub deferred_capacity: usize,

    /// Number of transition records kept; 0 disables history
    pub history_limit: usize,
}

impl EngineConfig {
    pub const DEFAULT_CAPACITY: usize = 16;

    /// Largest accepted queue capacity. Queue storage is allocated up front.
    pub const MAX_CAPACITY: usize = 65_536;

    pub const MAX_HISTORY: usize = 65_536;

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Check the configuration (pure).
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::check_capacity(QueueKind::Active, self.active_capacity)?;
        Self::check_capacity(QueueKind::Deferred, self.deferred_capacity)?;
        if self.history_limit > Self::MAX_HISTORY {
            return Err(ConfigError::HistoryTooLarge {
                max: Self::MAX_HISTORY,
            });
        }
        Ok(())
    }

    fn check_capacity(queue: QueueKind, capacity: usize) -> Result<(), ConfigError> {
        match capacity {
            0 => Err(ConfigError::ZeroCapacity { queue }),
            n if n > Self::MAX_CAPACITY => Err(ConfigError::CapacityTooLarge {
                queue,
                max: Self::MAX_CAPACITY,
            }),
            _ => Ok(()),
        }
    }

    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: None,
            active_capacity: Self::DEFAULT_CAPACITY,
            deferred_capacity: Self::DEFAULT_CAPACITY,
            history_limit: 0,
        }
    }
}

/// Builder for creating an [`EngineConfig`]
pub struct ConfigBuilder {
    config: EngineConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    /// Set the instance name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = Some(name.into());
        self
    }

    /// Set the same capacity for both queues
    pub fn capacity(self, n: usize) -> Self {
        self.active_capacity(n).deferred_capacity(n)
    }

    pub fn active_capacity(mut self, n: usize) -> Self {
        self.config.active_capacity = n;
        self
    }

    pub fn deferred_capacity(mut self, n: usize) -> Self {
        self.config.deferred_capacity = n;
        self
    }

    /// Keep the last `n` transitions
    pub fn history_limit(mut self, n: usize) -> Self {
        self.config.history_limit = n;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
