//! Player and upgrade records.
//!
//! These are plain data. Derived values (level, enemy max health, effective
//! stats) are computed on demand and never stored.

use serde::{Deserialize, Serialize};

use crate::progression;
use crate::stats;

pub type PlayerId = u64;
pub type UpgradeId = u64;

/// A permanent upgrade definition from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub id: UpgradeId,
    pub name: String,
    pub cost: u64,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    /// Flat bonus added to base attack before any multiplier.
    #[serde(default)]
    pub attack_value_addition: u64,
    #[serde(default = "neutral_multiplier")]
    pub damage_multiplier: f64,
    #[serde(default = "neutral_multiplier")]
    pub click_rate_multiplier: f64,
}

fn neutral_multiplier() -> f64 {
    1.0
}

impl Upgrade {
    /// An enabled upgrade with no effect. Handy as a starting point.
    pub fn neutral(id: UpgradeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            cost: 0,
            description: String::new(),
            enabled: true,
            attack_value_addition: 0,
            damage_multiplier: 1.0,
            click_rate_multiplier: 1.0,
        }
    }
}

/// An upgrade held by a player.
///
/// `count` is tracked but not used by the stat formulas: each owned upgrade
/// applies its effect once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedUpgrade {
    pub upgrade: Upgrade,
    pub count: u32,
}

impl OwnedUpgrade {
    pub fn new(upgrade: Upgrade) -> Self {
        Self { upgrade, count: 1 }
    }
}

/// Registration parameters for a new player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPlayer {
    pub name: String,
    pub gold: u64,
    pub click_rate: f64,
    pub attack_value: u64,
}

impl NewPlayer {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gold: 0,
            click_rate: 1.0,
            attack_value: 1,
        }
    }

    /// Build the initial persisted state, facing a full-health level 1 enemy.
    pub fn into_state(self, id: PlayerId, now: i64) -> PlayerState {
        PlayerState {
            id,
            name: self.name,
            gold: self.gold,
            click_rate: self.click_rate.max(0.0),
            attack_value: self.attack_value,
            kill_count: 0,
            current_enemy_health: progression::enemy_max_health(0),
            last_activity: now,
            play_time_seconds: 0,
            upgrades: Vec::new(),
        }
    }
}

/// Everything persisted about one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub id: PlayerId,
    pub name: String,
    pub gold: u64,
    pub click_rate: f64,
    pub attack_value: u64,
    /// Score, and the input to the level curve.
    pub kill_count: u64,
    pub current_enemy_health: i64,
    /// Epoch seconds.
    pub last_activity: i64,
    pub play_time_seconds: u64,
    #[serde(default)]
    pub upgrades: Vec<OwnedUpgrade>,
}

impl PlayerState {
    pub fn level(&self) -> u64 {
        progression::level(self.kill_count)
    }

    pub fn enemy_max_health(&self) -> i64 {
        progression::enemy_max_health(self.kill_count)
    }

    pub fn effective_attack(&self) -> u64 {
        stats::effective_attack(self.attack_value, &self.upgrades)
    }

    pub fn effective_click_rate(&self) -> f64 {
        stats::effective_click_rate(self.click_rate, &self.upgrades)
    }

    pub fn dps(&self) -> f64 {
        stats::dps(self.effective_attack(), self.effective_click_rate())
    }

    pub fn owns(&self, upgrade_id: UpgradeId) -> bool {
        self.upgrades.iter().any(|o| o.upgrade.id == upgrade_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_defaults() {
        let state = NewPlayer::named("Alice").into_state(7, 1_000);
        assert_eq!(state.id, 7);
        assert_eq!(state.gold, 0);
        assert_eq!(state.attack_value, 1);
        assert_eq!(state.click_rate, 1.0);
        assert_eq!(state.kill_count, 0);
        assert_eq!(state.level(), 1);
        assert_eq!(state.current_enemy_health, 1);
        assert_eq!(state.last_activity, 1_000);
    }

    #[test]
    fn test_negative_click_rate_clamped_on_registration() {
        let mut new = NewPlayer::named("Bob");
        new.click_rate = -3.0;
        assert_eq!(new.into_state(1, 0).click_rate, 0.0);
    }

    #[test]
    fn test_neutral_upgrade_has_no_effect() {
        let upgrade = Upgrade::neutral(3, "Gold Rush");
        assert!(upgrade.enabled);
        assert_eq!(upgrade.damage_multiplier, 1.0);
        assert_eq!(upgrade.click_rate_multiplier, 1.0);
        assert_eq!(upgrade.attack_value_addition, 0);
    }

    #[test]
    fn test_owns() {
        let mut state = NewPlayer::named("Carol").into_state(1, 0);
        state.upgrades.push(OwnedUpgrade::new(Upgrade::neutral(4, "Critical Hits")));
        assert!(state.owns(4));
        assert!(!state.owns(5));
    }
}
