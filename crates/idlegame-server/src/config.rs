//! Server configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! See `data/server.toml` for the shipped defaults.

use std::path::Path;
use std::time::Duration;

use idlegame_logic::NewPlayer;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Seconds between game clock ticks.
    pub tick_interval_secs: u64,
    pub new_player: NewPlayerDefaults,
}

/// Starting stats handed to newly registered players.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewPlayerDefaults {
    pub gold: u64,
    pub click_rate: f64,
    pub attack_value: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: 1,
            new_player: NewPlayerDefaults::default(),
        }
    }
}

impl Default for NewPlayerDefaults {
    fn default() -> Self {
        Self {
            gold: 0,
            click_rate: 1.0,
            attack_value: 1,
        }
    }
}

impl ServerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_secs == 0 {
            return Err(ConfigError::Invalid("tick_interval_secs must be at least 1"));
        }
        if i64::try_from(self.tick_interval_secs).is_err() {
            return Err(ConfigError::Invalid("tick_interval_secs is too large"));
        }
        let rate = self.new_player.click_rate;
        if !rate.is_finite() || rate < 0.0 {
            return Err(ConfigError::Invalid(
                "new_player.click_rate must be a non-negative number",
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs)
    }

    /// Game seconds per tick, saturating for configs that skipped `validate`.
    pub fn tick_interval_secs(&self) -> i64 {
        i64::try_from(self.tick_interval_secs).unwrap_or(i64::MAX)
    }

    /// Registration parameters for `name` using the configured defaults.
    pub fn new_player(&self, name: impl Into<String>) -> NewPlayer {
        NewPlayer {
            name: name.into(),
            gold: self.new_player.gold,
            click_rate: self.new_player.click_rate,
            attack_value: self.new_player.attack_value,
        }
    }
}
