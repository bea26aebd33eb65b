//! Pure simulation logic for the idle game.
//!
//! This crate contains all game logic that is independent of any database,
//! scheduler, or runtime. Functions take plain data and the current time and
//! return results, making them unit-testable and usable both from the session
//! server and from the headless harness.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`model`] | Player, upgrade and owned-upgrade records |
//! | [`stats`] | Effective attack, click rate and DPS from base stats + upgrades |
//! | [`progression`] | Level curve, enemy health, offline currency grant |
//! | [`simulation`] | Per-player combat state machine (clicks, ticks, login/logout) |

pub mod model;
pub mod progression;
pub mod simulation;
pub mod stats;

pub use model::{NewPlayer, OwnedUpgrade, PlayerId, PlayerState, Upgrade, UpgradeId};
pub use simulation::{AttackOutcome, PlayerSimulation};
