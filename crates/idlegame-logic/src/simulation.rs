//! Per-player combat state machine.
//!
//! The current enemy is always observed alive. Damage that pushes its health
//! below zero defeats it in the same step: the player earns
//! [`DEFEAT_REWARD`], the kill count advances, and a fresh enemy at the new
//! level's full health takes its place. At most one enemy is defeated per
//! damage application, however large the overkill.
//!
//! Every operation takes `now` (epoch seconds) explicitly so results are
//! deterministic under test.

use serde::{Deserialize, Serialize};

use crate::model::{OwnedUpgrade, PlayerState, Upgrade};
use crate::progression::{self, DEFEAT_REWARD};

/// Result of one damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AttackOutcome {
    pub damage: u64,
    pub gold_earned: u64,
    pub enemy_defeated: bool,
}

/// A live player's mutable combat state.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSimulation {
    state: PlayerState,
}

impl PlayerSimulation {
    pub fn new(state: PlayerState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn into_state(self) -> PlayerState {
        self.state
    }

    /// Continuous damage for `seconds` of passive combat, applied in one step.
    ///
    /// Used by the scheduled tick. Negative durations count as zero.
    pub fn apply_elapsed_time(&mut self, seconds: i64, now: i64) -> AttackOutcome {
        let seconds = seconds.max(0);
        let raw = (self.state.dps() * seconds as f64).floor();
        let damage = if raw.is_finite() && raw > 0.0 {
            raw as u64
        } else {
            0
        };

        let outcome = self.apply_damage(damage);
        self.mark_activity(now);
        outcome
    }

    /// One manual attack for the player's effective attack value.
    pub fn apply_click(&mut self, now: i64) -> AttackOutcome {
        let damage = self.state.effective_attack();
        let outcome = self.apply_damage(damage);
        self.mark_activity(now);
        outcome
    }

    /// Credit gold for the time since last activity and start a session.
    ///
    /// Returns the gold granted. The enemy is left untouched.
    pub fn record_login(&mut self, now: i64) -> u64 {
        let elapsed = now - self.state.last_activity;
        let gold = progression::offline_progress(
            elapsed,
            self.state.dps(),
            self.state.enemy_max_health(),
        );
        self.state.gold = self.state.gold.saturating_add(gold);
        self.mark_activity(now);
        gold
    }

    pub fn record_logout(&mut self, now: i64) {
        self.mark_activity(now);
    }

    /// Bookkeeping for a player who is already in a session: roll play time
    /// forward without any offline grant. Ticks already covered that time.
    pub fn record_activity(&mut self, now: i64) {
        self.mark_activity(now);
    }

    /// Add an upgrade to the owned set, or bump its count if already owned.
    ///
    /// Disabled upgrades are refused and `false` is returned.
    pub fn grant_upgrade(&mut self, upgrade: Upgrade) -> bool {
        if !upgrade.enabled {
            return false;
        }
        match self
            .state
            .upgrades
            .iter_mut()
            .find(|o| o.upgrade.id == upgrade.id)
        {
            Some(owned) => owned.count = owned.count.saturating_add(1),
            None => self.state.upgrades.push(OwnedUpgrade::new(upgrade)),
        }
        true
    }

    fn apply_damage(&mut self, damage: u64) -> AttackOutcome {
        let damage_hp = i64::try_from(damage).unwrap_or(i64::MAX);
        self.state.current_enemy_health = self.state.current_enemy_health.saturating_sub(damage_hp);

        let enemy_defeated = self.state.current_enemy_health < 0;
        let mut gold_earned = 0;
        if enemy_defeated {
            gold_earned = DEFEAT_REWARD;
            self.state.gold = self.state.gold.saturating_add(DEFEAT_REWARD);
            self.state.kill_count += 1;
            self.state.current_enemy_health = self.state.enemy_max_health();
        }

        AttackOutcome {
            damage,
            gold_earned,
            enemy_defeated,
        }
    }

    /// Roll play time forward to `now` and make it the last activity.
    ///
    /// `last_activity` never moves backwards, so a skewed clock cannot
    /// widen the next offline window.
    fn mark_activity(&mut self, now: i64) {
        let elapsed = (now - self.state.last_activity).max(0) as u64;
        self.state.play_time_seconds = self.state.play_time_seconds.saturating_add(elapsed);
        self.state.last_activity = self.state.last_activity.max(now);
    }
}

impl From<PlayerState> for PlayerSimulation {
    fn from(state: PlayerState) -> Self {
        Self::new(state)
    }
}
