//! Combat stat formulas: effective attack, click rate and DPS.
//!
//! Flat attack bonuses are summed first, then every damage multiplier is
//! applied to the running total one upgrade at a time, truncating toward
//! zero after each step. Folding the multipliers into one product first gives
//! different results once two or more multipliers are owned.

use crate::model::OwnedUpgrade;

/// Base attack plus all flat bonuses, then each multiplier with per-step
/// truncation.
pub fn effective_attack(base: u64, upgrades: &[OwnedUpgrade]) -> u64 {
    let mut attack = upgrades.iter().fold(base, |total, owned| {
        total.saturating_add(owned.upgrade.attack_value_addition)
    });

    for owned in upgrades {
        // `as` truncates toward zero and saturates (NaN -> 0)
        attack = (attack as f64 * owned.upgrade.damage_multiplier) as u64;
    }

    attack
}

/// Base click rate times every click-rate multiplier. No truncation.
pub fn effective_click_rate(base: f64, upgrades: &[OwnedUpgrade]) -> f64 {
    upgrades
        .iter()
        .fold(base, |rate, owned| rate * owned.upgrade.click_rate_multiplier)
}

/// Continuous damage per second used for ticks and offline progress.
pub fn dps(effective_attack: u64, effective_click_rate: f64) -> f64 {
    effective_attack as f64 * effective_click_rate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Upgrade;

    fn owned(addition: u64, damage: f64, rate: f64) -> OwnedUpgrade {
        let mut upgrade = Upgrade::neutral(0, "test");
        upgrade.attack_value_addition = addition;
        upgrade.damage_multiplier = damage;
        upgrade.click_rate_multiplier = rate;
        OwnedUpgrade::new(upgrade)
    }

    #[test]
    fn test_empty_upgrades_keep_base() {
        assert_eq!(effective_attack(7, &[]), 7);
        assert_eq!(effective_click_rate(1.25, &[]), 1.25);
    }

    #[test]
    fn test_addition_then_multiplier() {
        let upgrades = [owned(5, 1.0, 1.0), owned(0, 2.0, 1.0)];
        assert_eq!(effective_attack(1, &upgrades), 12);
    }

    #[test]
    fn test_additions_apply_before_any_multiplier() {
        // Multiplier listed first still sees the flat bonus.
        let upgrades = [owned(0, 2.0, 1.0), owned(5, 1.0, 1.0)];
        assert_eq!(effective_attack(1, &upgrades), 12);
    }

    #[test]
    fn test_truncation_per_step() {
        // 5 * 1.5 = 7.5 -> 7, 7 * 1.5 = 10.5 -> 10
        // A combined product would give 5 * 2.25 = 11.25 -> 11.
        let upgrades = [owned(0, 1.5, 1.0), owned(0, 1.5, 1.0)];
        assert_eq!(effective_attack(5, &upgrades), 10);
    }

    #[test]
    fn test_fractional_multiplier_truncates_to_zero() {
        let upgrades = [owned(0, 0.5, 1.0)];
        assert_eq!(effective_attack(1, &upgrades), 0);
    }

    #[test]
    fn test_click_rate_multipliers_compound() {
        let upgrades = [owned(0, 1.0, 1.1), owned(0, 1.0, 2.0)];
        let rate = effective_click_rate(1.0, &upgrades);
        assert!((rate - 2.2).abs() < 1e-9);
    }

    #[test]
    fn test_dps() {
        assert_eq!(dps(2, 1.0), 2.0);
        assert_eq!(dps(0, 3.0), 0.0);
        assert!((dps(12, 1.1) - 13.2).abs() < 1e-9);
    }
}
