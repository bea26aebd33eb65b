//! Level curve and time-based currency.
//!
//! Enemies cycle through five levels by kill count: max health 1, 101, 201,
//! 301, 401, then back to 1 on every fifth kill.

/// Gold granted for each defeated enemy.
pub const DEFEAT_REWARD: u64 = 10;

/// Theoretical offline kills needed for one gold.
pub const OFFLINE_KILLS_PER_GOLD: f64 = 100.0;

/// Number of levels before the difficulty cycle wraps.
pub const LEVEL_CYCLE: u64 = 5;

/// Health added per level above the first.
pub const HEALTH_PER_LEVEL: i64 = 100;

pub fn level(kill_count: u64) -> u64 {
    kill_count % LEVEL_CYCLE + 1
}

pub fn enemy_max_health(kill_count: u64) -> i64 {
    (level(kill_count) as i64 - 1) * HEALTH_PER_LEVEL + 1
}

/// Gold granted for `seconds_elapsed` of absence at the given DPS.
///
/// A lump economic grant: kill count and enemy health are untouched.
/// Less than one second of absence, or a DPS that is zero, negative or not
/// finite, grants nothing.
pub fn offline_progress(seconds_elapsed: i64, dps: f64, enemy_max_health: i64) -> u64 {
    if seconds_elapsed < 1 {
        return 0;
    }
    if !dps.is_finite() || dps <= 0.0 || enemy_max_health <= 0 {
        return 0;
    }

    // Seconds to empty one enemy health bar.
    let kill_time = enemy_max_health as f64 / dps;
    let theoretical_kills = seconds_elapsed as f64 / kill_time;
    let gold = (theoretical_kills / OFFLINE_KILLS_PER_GOLD).floor();

    if gold.is_finite() && gold > 0.0 {
        gold as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_cycle() {
        assert_eq!(level(0), 1);
        assert_eq!(level(4), 5);
        assert_eq!(level(5), 1);
        assert_eq!(level(10), 1);
        assert_eq!(level(13), 4);
    }

    #[test]
    fn test_enemy_max_health_by_level() {
        let healths: Vec<i64> = (0..5).map(enemy_max_health).collect();
        assert_eq!(healths, vec![1, 101, 201, 301, 401]);
    }

    #[test]
    fn test_enemy_max_health_repeats_every_five_kills() {
        for kills in 0..200u64 {
            assert_eq!(enemy_max_health(kills), enemy_max_health(kills % 5));
        }
        assert_eq!(enemy_max_health(u64::MAX), enemy_max_health(u64::MAX % 5));
    }

    #[test]
    fn test_offline_under_one_second_is_zero() {
        assert_eq!(offline_progress(0, 1_000.0, 1), 0);
        assert_eq!(offline_progress(-50, 1_000.0, 1), 0);
        assert_eq!(offline_progress(0, f64::NAN, 0), 0);
    }

    #[test]
    fn test_offline_attack_two() {
        // dps 2, kill time 0.5s, 200 kills -> 2 gold
        assert_eq!(offline_progress(100, 2.0, 1), 2);
    }

    #[test]
    fn test_offline_attack_one() {
        assert_eq!(offline_progress(100, 1.0, 1), 1);
        assert_eq!(offline_progress(1_000, 1.0, 1), 10);
    }

    #[test]
    fn test_offline_zero_dps_clamps() {
        assert_eq!(offline_progress(1_000, 0.0, 1), 0);
        assert_eq!(offline_progress(1_000, -1.0, 1), 0);
        assert_eq!(offline_progress(1_000, f64::INFINITY, 1), 0);
    }

    #[test]
    fn test_offline_tougher_enemy_slows_progress() {
        // dps 101 at 101 hp: one kill per second, 1000 kills -> 10 gold
        assert_eq!(offline_progress(1_000, 101.0, 101), 10);
        // same dps at 201 hp takes about twice as long per kill
        assert_eq!(offline_progress(1_000, 101.0, 201), 5);
        assert_eq!(offline_progress(100, 1.0, 101), 0);
    }
}
