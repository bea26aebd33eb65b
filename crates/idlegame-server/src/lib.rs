//! Idle game session server.
//!
//! Keeps logged-in players live in memory, drives them with a periodic
//! game clock, and persists them through a pluggable store. All game rules
//! live in `idlegame-logic`; this crate only decides *when* they run and
//! keeps concurrent access to each player serialized.
//!
//! # Wiring
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use idlegame_server::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::load("data/server.toml")?;
//! let service = Arc::new(GameService::new(
//!     config,
//!     Arc::new(ActiveSessionRegistry::new()),
//!     Arc::new(MemoryPlayerStore::new()),
//!     Arc::new(StaticUpgradeCatalog::builtin()?),
//!     Arc::new(SystemTimeSource),
//! ));
//!
//! let clock = GameClock::new(service.clone()).spawn();
//! let player = service.register_player("Ada")?;
//! service.login(player.id)?;
//! service.click(player.id)?;
//! service.logout(player.id)?;
//! clock.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod registry;
pub mod service;
pub mod store;
pub mod time;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::catalog::{StaticUpgradeCatalog, UpgradeCatalog};
    pub use crate::clock::{ClockHandle, GameClock};
    pub use crate::config::ServerConfig;
    pub use crate::error::{GameError, StoreError};
    pub use crate::registry::{ActiveSessionRegistry, AttachOutcome};
    pub use crate::service::{GameService, LoginSummary, TickReport};
    pub use crate::store::{MemoryPlayerStore, PlayerStore};
    pub use crate::time::{ManualTime, SystemTimeSource, TimeSource};
}
