//! Game operations backed by the session registry.
//!
//! Request handlers call these; the game clock calls [`GameService::tick`].
//! Live players are mutated in the registry and persisted afterwards. A save
//! failure after a tick is logged and retried implicitly on the next tick,
//! so at most one tick of progress is at risk.

use std::sync::Arc;

use idlegame_logic::{NewPlayer, PlayerId, PlayerSimulation, PlayerState, Upgrade, UpgradeId};

use crate::catalog::UpgradeCatalog;
use crate::config::ServerConfig;
use crate::error::{GameError, StoreError};
use crate::registry::{ActiveSessionRegistry, AttachOutcome};
use crate::store::PlayerStore;
use crate::time::TimeSource;

/// Result of a login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginSummary {
    pub offline_gold: u64,
    /// The player was already live and kept their in-memory session.
    pub reused_session: bool,
}

impl LoginSummary {
    pub fn message(&self) -> String {
        if self.offline_gold > 0 {
            format!("You earned {} gold while offline!", self.offline_gold)
        } else {
            "Welcome back!".to_string()
        }
    }
}

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub advanced: usize,
    pub saved: usize,
    pub failed_saves: usize,
}

pub struct GameService {
    config: ServerConfig,
    registry: Arc<ActiveSessionRegistry>,
    players: Arc<dyn PlayerStore>,
    catalog: Arc<dyn UpgradeCatalog>,
    time: Arc<dyn TimeSource>,
}

impl GameService {
    pub fn new(
        config: ServerConfig,
        registry: Arc<ActiveSessionRegistry>,
        players: Arc<dyn PlayerStore>,
        catalog: Arc<dyn UpgradeCatalog>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        Self {
            config,
            registry,
            players,
            catalog,
            time,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ActiveSessionRegistry> {
        &self.registry
    }

    // ========================================================================
    // SESSIONS
    // ========================================================================

    /// Make a player live and credit gold earned while they were away.
    ///
    /// A player who is already live keeps their session and earns nothing:
    /// the clock has been ticking them the whole time.
    pub fn login(&self, id: PlayerId) -> Result<LoginSummary, GameError> {
        let now = self.time.now();
        let players = &self.players;

        let load = || {
            let state = players.load_player(id)?;
            if state.last_activity > now {
                log::warn!(
                    "Player {} last active in the future ({} > {}), no offline progress",
                    id,
                    state.last_activity,
                    now
                );
            }
            Ok::<_, StoreError>(state)
        };
        let (outcome, offline_gold) =
            self.registry
                .attach_with(id, load, |sim, outcome| match outcome {
                    AttachOutcome::Attached => {
                        let gold = sim.record_login(now);
                        if let Err(e) = players.save_player(sim.state()) {
                            log::warn!("Failed to save player {} after login: {}", id, e);
                        }
                        gold
                    }
                    AttachOutcome::Reused => {
                        sim.record_activity(now);
                        0
                    }
                })?;

        let reused_session = outcome == AttachOutcome::Reused;
        if reused_session {
            log::debug!("Player {} logged in again while live", id);
        } else {
            log::info!(
                "Player {} logged in, {} gold earned offline ({} active)",
                id,
                offline_gold,
                self.registry.active_count()
            );
        }
        Ok(LoginSummary {
            offline_gold,
            reused_session,
        })
    }

    /// End a player's session and persist their final state.
    ///
    /// A player who is not live still has their activity time rolled
    /// forward and saved.
    pub fn logout(&self, id: PlayerId) -> Result<(), GameError> {
        let now = self.time.now();

        let detached = self.registry.detach_and(id, |sim| {
            sim.record_logout(now);
            self.players.save_player(sim.state())
        });
        let state = match detached {
            Some((state, saved)) => {
                saved?;
                state
            }
            None => {
                let mut sim = PlayerSimulation::new(self.players.load_player(id)?);
                sim.record_logout(now);
                self.players.save_player(sim.state())?
            }
        };

        log::info!(
            "Player {} logged out with {} gold, {} kills ({} active)",
            id,
            state.gold,
            state.kill_count,
            self.registry.active_count()
        );
        Ok(())
    }

    /// One manual attack. Returns the gold it earned (0 or the defeat reward).
    pub fn click(&self, id: PlayerId) -> Result<u64, GameError> {
        let now = self.time.now();
        match self.registry.with_session(id, |sim| sim.apply_click(now)) {
            Some(outcome) => Ok(outcome.gold_earned),
            None => {
                // Distinguish unknown players from offline ones.
                self.players.load_player(id)?;
                Err(GameError::NotLoggedIn(id))
            }
        }
    }

    /// Advance every live player by the configured interval and save them.
    pub fn tick(&self) -> TickReport {
        self.advance(self.config.tick_interval_secs())
    }

    /// Advance every live player by `interval_secs` and save them.
    pub fn advance(&self, interval_secs: i64) -> TickReport {
        let now = self.time.now();
        let (mut saved, mut failed_saves) = (0, 0);
        let advanced = self.registry.advance_all_with(interval_secs, now, |state| {
            match self.players.save_player(state) {
                Ok(_) => saved += 1,
                Err(e) => {
                    failed_saves += 1;
                    log::warn!("Failed to save player {} after tick: {}", state.id, e);
                }
            }
        });
        let report = TickReport {
            advanced,
            saved,
            failed_saves,
        };

        if report.advanced > 0 {
            log::debug!(
                "Tick advanced {} players by {}s ({} saved)",
                report.advanced,
                interval_secs,
                report.saved
            );
        }
        report
    }

    pub fn active_player_count(&self) -> usize {
        self.registry.active_count()
    }

    // ========================================================================
    // PLAYERS
    // ========================================================================

    /// Register a player with the configured starting stats.
    pub fn register_player(&self, name: &str) -> Result<PlayerState, GameError> {
        self.register_player_with(self.config.new_player(name))
    }

    pub fn register_player_with(&self, new: NewPlayer) -> Result<PlayerState, GameError> {
        if self.players.find_player_by_name(&new.name)?.is_some() {
            return Err(GameError::NameTaken(new.name));
        }
        let state = self.players.insert_player(new, self.time.now())?;
        log::info!("Registered player {} '{}'", state.id, state.name);
        Ok(state)
    }

    /// Current state: the live copy if logged in, otherwise the stored one.
    pub fn player(&self, id: PlayerId) -> Result<PlayerState, GameError> {
        match self.registry.snapshot(id) {
            Some(state) => Ok(state),
            None => Ok(self.players.load_player(id)?),
        }
    }

    pub fn players(&self) -> Result<Vec<PlayerState>, GameError> {
        let stored = self.players.list_players()?;
        Ok(stored
            .into_iter()
            .map(|p| self.registry.snapshot(p.id).unwrap_or(p))
            .collect())
    }

    // ========================================================================
    // UPGRADES
    // ========================================================================

    pub fn list_upgrades(&self) -> Vec<Upgrade> {
        self.catalog.list_upgrades()
    }

    pub fn get_upgrade(&self, id: UpgradeId) -> Result<Upgrade, GameError> {
        Ok(self.catalog.get_upgrade(id)?)
    }

    /// Give a catalog upgrade to a player. Disabled upgrades are refused.
    pub fn grant_upgrade(
        &self,
        player_id: PlayerId,
        upgrade_id: UpgradeId,
    ) -> Result<PlayerState, GameError> {
        let upgrade = self.catalog.get_upgrade(upgrade_id)?;
        if !upgrade.enabled {
            log::warn!(
                "Refused disabled upgrade {} for player {}",
                upgrade_id,
                player_id
            );
            return Err(GameError::UpgradeDisabled(upgrade_id));
        }

        let live = self.registry.with_session(player_id, |sim| {
            sim.grant_upgrade(upgrade.clone());
            self.players.save_player(sim.state())
        });
        match live {
            Some(saved) => Ok(saved?),
            None => {
                let mut sim = PlayerSimulation::new(self.players.load_player(player_id)?);
                sim.grant_upgrade(upgrade);
                Ok(self.players.save_player(sim.state())?)
            }
        }
    }
}
