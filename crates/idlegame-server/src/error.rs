//! Error taxonomy for the session layer.
//!
//! The simulation itself never fails; everything here comes from looking up
//! players and upgrades or from the collaborators behind them.

use idlegame_logic::{PlayerId, UpgradeId};
use thiserror::Error;

/// Failures reported by a persistence or catalog collaborator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("upgrade {0} not found")]
    UpgradeNotFound(UpgradeId),
    #[error("player name '{0}' is already taken")]
    NameTaken(String),
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Failures surfaced by [`crate::service::GameService`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),
    #[error("upgrade {0} not found")]
    UpgradeNotFound(UpgradeId),
    #[error("player {0} is not logged in")]
    NotLoggedIn(PlayerId),
    #[error("player with name '{0}' already exists")]
    NameTaken(String),
    #[error("upgrade {0} is not available")]
    UpgradeDisabled(UpgradeId),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PlayerNotFound(id) => GameError::PlayerNotFound(id),
            StoreError::UpgradeNotFound(id) => GameError::UpgradeNotFound(id),
            StoreError::NameTaken(name) => GameError::NameTaken(name),
            other => GameError::Store(other),
        }
    }
}

/// Failures building a [`crate::catalog::StaticUpgradeCatalog`].
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse upgrade catalog: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate upgrade id {0}")]
    DuplicateId(UpgradeId),
    #[error("upgrade {id} has a non-positive multiplier")]
    InvalidMultiplier { id: UpgradeId },
}

/// Failures loading [`crate::config::ServerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_game_error() {
        assert_eq!(
            GameError::from(StoreError::PlayerNotFound(3)),
            GameError::PlayerNotFound(3)
        );
        assert_eq!(
            GameError::from(StoreError::UpgradeNotFound(9)),
            GameError::UpgradeNotFound(9)
        );
    }

    #[test]
    fn test_backend_error_passes_through() {
        let err = GameError::from(StoreError::Backend("disk full".into()));
        assert_eq!(err.to_string(), "store backend failure: disk full");
    }
}
