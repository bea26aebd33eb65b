//! Integration tests for a player's full progression loop.
//!
//! Exercises: NewPlayer → upgrades → clicks / ticks → defeat cycle
//! → logout → offline catch-up on the next login.
//!
//! All tests are pure logic. No registry, no clock.

use idlegame_logic::model::{NewPlayer, PlayerState, Upgrade};
use idlegame_logic::progression::{enemy_max_health, offline_progress, DEFEAT_REWARD};
use idlegame_logic::simulation::PlayerSimulation;
use idlegame_logic::stats;

// ── Helpers ────────────────────────────────────────────────────────────

fn fresh_player(attack: u64) -> PlayerState {
    let mut new = NewPlayer::named("Integration");
    new.attack_value = attack;
    new.into_state(1, 10_000)
}

fn upgrade(id: u64, addition: u64, damage: f64, rate: f64) -> Upgrade {
    let mut u = Upgrade::neutral(id, format!("upgrade-{id}"));
    u.attack_value_addition = addition;
    u.damage_multiplier = damage;
    u.click_rate_multiplier = rate;
    u
}

// ── Stat folding ───────────────────────────────────────────────────────

#[test]
fn flat_bonus_then_double_damage_gives_twelve() {
    let mut sim = PlayerSimulation::new(fresh_player(1));
    assert!(sim.grant_upgrade(upgrade(1, 5, 1.0, 1.0)));
    assert!(sim.grant_upgrade(upgrade(2, 0, 2.0, 1.0)));
    assert_eq!(sim.state().effective_attack(), 12);
}

#[test]
fn upgrades_feed_dps() {
    let mut sim = PlayerSimulation::new(fresh_player(4));
    sim.grant_upgrade(upgrade(1, 0, 1.0, 1.1));
    sim.grant_upgrade(upgrade(2, 0, 1.0, 2.0));
    let state = sim.state();
    let expected = stats::dps(4, 2.2);
    assert!((state.dps() - expected).abs() < 1e-9);
}

// ── Defeat cycle ───────────────────────────────────────────────────────

#[test]
fn every_defeat_grants_one_kill_and_ten_gold() {
    let mut sim = PlayerSimulation::new(fresh_player(30));
    let mut defeats = 0;
    for i in 0..500 {
        if sim.apply_click(10_000 + i).enemy_defeated {
            defeats += 1;
        }
        let state = sim.state();
        assert_eq!(state.kill_count, defeats);
        assert_eq!(state.gold, defeats * DEFEAT_REWARD);
        assert!(state.current_enemy_health >= 0);
        assert!(state.current_enemy_health <= state.enemy_max_health());
    }
    assert!(defeats > 5, "should cycle through all levels");
}

#[test]
fn enemy_health_resets_to_next_level() {
    let mut sim = PlayerSimulation::new(fresh_player(1_000));
    for kills in 1..=10u64 {
        sim.apply_click(10_000);
        assert_eq!(sim.state().kill_count, kills);
        assert_eq!(sim.state().current_enemy_health, enemy_max_health(kills));
    }
}

#[test]
fn many_small_ticks_track_one_large_tick() {
    let mut state = fresh_player(3);
    state.kill_count = 4;
    state.current_enemy_health = 401;
    let mut small = PlayerSimulation::new(state.clone());
    let mut large = PlayerSimulation::new(state);

    for i in 1..=50 {
        small.apply_elapsed_time(1, 10_000 + i);
    }
    large.apply_elapsed_time(50, 10_050);

    assert_eq!(
        small.state().current_enemy_health,
        large.state().current_enemy_health
    );
    assert_eq!(small.state().play_time_seconds, 50);
    assert_eq!(large.state().play_time_seconds, 50);
}

#[test]
fn small_ticks_drift_only_by_truncation() {
    let mut state = fresh_player(1);
    state.click_rate = 0.7;
    state.kill_count = 4;
    state.current_enemy_health = 401;
    let mut small = PlayerSimulation::new(state.clone());
    let mut large = PlayerSimulation::new(state);

    for i in 1..=10 {
        small.apply_elapsed_time(1, 10_000 + i);
    }
    large.apply_elapsed_time(10, 10_010);

    // 0.7/s truncates to nothing per second but 7 over ten seconds.
    let drift = small.state().current_enemy_health - large.state().current_enemy_health;
    assert!((0..=10).contains(&drift));
}

// ── Session lifecycle ──────────────────────────────────────────────────

#[test]
fn logout_then_login_grants_offline_gold() {
    let mut sim = PlayerSimulation::new(fresh_player(1));
    sim.record_login(10_000);
    sim.record_logout(10_060);

    let mut returning = PlayerSimulation::new(sim.into_state());
    let granted = returning.record_login(11_060);
    assert_eq!(granted, offline_progress(1_000, 1.0, 1));
    assert_eq!(granted, 10);
    assert_eq!(returning.state().gold, 10);
    assert_eq!(returning.state().play_time_seconds, 1_060);
}

#[test]
fn zero_attack_player_earns_nothing_offline() {
    let mut state = fresh_player(0);
    state.last_activity = 0;
    let mut sim = PlayerSimulation::new(state);
    assert_eq!(sim.record_login(1_000_000), 0);
}
