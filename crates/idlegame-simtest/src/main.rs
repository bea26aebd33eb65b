//! Idle Game Headless Simulation Harness
//!
//! Validates the pure game rules and the session server in-process.
//! No network, no database: players live in the in-memory store and time
//! is driven by hand, except for a short real run of the game clock.
//!
//! Usage:
//!   cargo run -p idlegame-simtest
//!   cargo run -p idlegame-simtest -- --verbose
//!   cargo run -p idlegame-simtest -- --config data/server.toml

use std::sync::Arc;
use std::time::Duration;

use idlegame_logic::progression::{self, DEFEAT_REWARD};
use idlegame_logic::stats;
use idlegame_logic::{NewPlayer, OwnedUpgrade, PlayerSimulation, Upgrade};
use idlegame_server::prelude::*;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {}", e);
            std::process::exit(2);
        }
    };

    println!("=== Idle Game Simulation Harness ===\n");
    if verbose {
        println!(
            "  tick every {}s, new players start with attack {} at {} clicks/s\n",
            config.tick_interval_secs,
            config.new_player.attack_value,
            config.new_player.click_rate
        );
    }

    let mut results = Vec::new();

    // 1. Upgrade catalog
    results.extend(validate_catalog(verbose));

    // 2. Stat folding
    results.extend(validate_stat_formulas(verbose));

    // 3. Level curve and offline grant
    results.extend(validate_progression(verbose));

    // 4. Per-player simulation
    results.extend(validate_simulation(verbose));

    // 5. Sessions through the service
    results.extend(validate_sessions(&config, verbose));

    // 6. Live game clock
    results.extend(validate_game_clock(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_config(args: &[String]) -> Result<ServerConfig, idlegame_server::error::ConfigError> {
    match args.iter().position(|a| a == "--config") {
        Some(i) => match args.get(i + 1) {
            Some(path) => ServerConfig::load(path),
            None => Err(idlegame_server::error::ConfigError::Invalid(
                "--config needs a path",
            )),
        },
        None => Ok(ServerConfig::default()),
    }
}

fn service_with(
    config: ServerConfig,
    start: i64,
) -> (GameService, Arc<MemoryPlayerStore>, Arc<ManualTime>) {
    let store = Arc::new(MemoryPlayerStore::new());
    let time = Arc::new(ManualTime::new(start));
    let catalog = match StaticUpgradeCatalog::builtin() {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Builtin catalog is invalid: {}", e);
            std::process::exit(2);
        }
    };
    let service = GameService::new(
        config,
        Arc::new(ActiveSessionRegistry::new()),
        store.clone(),
        Arc::new(catalog),
        time.clone(),
    );
    (service, store, time)
}

// ── 1. Upgrade Catalog ──────────────────────────────────────────────────

fn validate_catalog(verbose: bool) -> Vec<TestResult> {
    println!("--- Upgrade Catalog ---");
    let mut results = Vec::new();

    let catalog = match StaticUpgradeCatalog::builtin() {
        Ok(c) => c,
        Err(e) => {
            results.push(TestResult {
                name: "catalog_parse".into(),
                passed: false,
                detail: format!("catalog error: {}", e),
            });
            return results;
        }
    };
    let upgrades = catalog.list_upgrades();

    results.push(TestResult {
        name: "catalog_size".into(),
        passed: upgrades.len() == 8,
        detail: format!("{} upgrades loaded", upgrades.len()),
    });

    let disabled: Vec<_> = upgrades.iter().filter(|u| !u.enabled).collect();
    results.push(TestResult {
        name: "catalog_disabled".into(),
        passed: disabled.len() == 2,
        detail: format!(
            "disabled: {}",
            disabled
                .iter()
                .map(|u| u.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    });

    let free: Vec<_> = upgrades.iter().filter(|u| u.cost == 0).collect();
    results.push(TestResult {
        name: "catalog_positive_costs".into(),
        passed: free.is_empty(),
        detail: if free.is_empty() {
            "every upgrade has a price".into()
        } else {
            format!("{} upgrades cost nothing", free.len())
        },
    });

    if verbose {
        println!("  Upgrades:");
        for u in &upgrades {
            println!(
                "    {:>2} {:20} {:>6}g  atk x{:.1} rate x{:.1}{}",
                u.id,
                u.name,
                u.cost,
                u.damage_multiplier,
                u.click_rate_multiplier,
                if u.enabled { "" } else { "  (disabled)" }
            );
        }
    }

    results
}

// ── 2. Stat Formulas ────────────────────────────────────────────────────

fn validate_stat_formulas(_verbose: bool) -> Vec<TestResult> {
    println!("--- Stat Formulas ---");
    let mut results = Vec::new();

    let base = stats::effective_attack(7, &[]);
    results.push(TestResult {
        name: "stats_no_upgrades".into(),
        passed: base == 7,
        detail: format!("attack 7 with no upgrades → {}", base),
    });

    let mut flat = Upgrade::neutral(1, "Whetstone");
    flat.attack_value_addition = 5;
    let mut double = Upgrade::neutral(2, "Double");
    double.damage_multiplier = 2.0;
    let owned = [OwnedUpgrade::new(flat), OwnedUpgrade::new(double)];
    let folded = stats::effective_attack(1, &owned);
    results.push(TestResult {
        name: "stats_add_then_multiply".into(),
        passed: folded == 12,
        detail: format!("(1 + 5) x 2 → {}", folded),
    });

    let mut fast = Upgrade::neutral(3, "Fast");
    fast.click_rate_multiplier = 1.5;
    let rate = stats::effective_click_rate(2.0, &[OwnedUpgrade::new(fast)]);
    let dps = stats::dps(4, rate);
    results.push(TestResult {
        name: "stats_dps".into(),
        passed: (dps - 12.0).abs() < 1e-9,
        detail: format!("attack 4 at {:.1} clicks/s → {:.1} dps", rate, dps),
    });

    results
}

// ── 3. Progression ──────────────────────────────────────────────────────

fn validate_progression(verbose: bool) -> Vec<TestResult> {
    println!("--- Progression ---");
    let mut results = Vec::new();

    let curve: Vec<(u64, i64)> = [0u64, 1, 4, 5, 7]
        .iter()
        .map(|&k| (progression::level(k), progression::enemy_max_health(k)))
        .collect();
    let expected = [(1, 1), (2, 101), (5, 401), (1, 1), (3, 201)];
    results.push(TestResult {
        name: "progression_level_cycle".into(),
        passed: curve == expected,
        detail: format!("(level, health) at 0/1/4/5/7 kills: {:?}", curve),
    });

    let cases = [
        (100, 2.0, 1, 2),
        (1_000, 1.0, 1, 10),
        (1_000, 101.0, 201, 5),
        (100, 1.0, 101, 0),
        (0, 50.0, 1, 0),
        (500, 0.0, 1, 0),
    ];
    let mut bad = Vec::new();
    for &(secs, dps, health, want) in &cases {
        let got = progression::offline_progress(secs, dps, health);
        if verbose {
            println!(
                "  {:>5}s at {:>5.1} dps vs {:>3} hp → {} gold",
                secs, dps, health, got
            );
        }
        if got != want {
            bad.push(format!(
                "{}s/{}dps/{}hp gave {} not {}",
                secs, dps, health, got, want
            ));
        }
    }
    results.push(TestResult {
        name: "progression_offline_grant".into(),
        passed: bad.is_empty(),
        detail: if bad.is_empty() {
            format!("{} offline cases match", cases.len())
        } else {
            bad.join("; ")
        },
    });

    results
}

// ── 4. Simulation ───────────────────────────────────────────────────────

fn validate_simulation(verbose: bool) -> Vec<TestResult> {
    println!("--- Player Simulation ---");
    let mut results = Vec::new();

    // Ten one-second ticks equal one ten-second tick while no enemy falls
    let mut ticker = NewPlayer::named("Ticker").into_state(1, 0);
    ticker.kill_count = 1;
    ticker.current_enemy_health = progression::enemy_max_health(1);
    let mut stepped = PlayerSimulation::new(ticker.clone());
    let mut jumped = PlayerSimulation::new(ticker);
    for t in 1..=10 {
        stepped.apply_elapsed_time(1, t);
    }
    jumped.apply_elapsed_time(10, 10);
    results.push(TestResult {
        name: "sim_tick_granularity".into(),
        passed: stepped.state() == jumped.state(),
        detail: format!(
            "10x1s: {} hp, 1x10s: {} hp",
            stepped.state().current_enemy_health,
            jumped.state().current_enemy_health
        ),
    });

    // An overkill tick still defeats only one enemy
    let mut new = NewPlayer::named("Overkill");
    new.attack_value = 1_000;
    let mut sim = PlayerSimulation::new(new.into_state(2, 0));
    let outcome = sim.apply_elapsed_time(60, 60);
    results.push(TestResult {
        name: "sim_one_defeat_per_tick".into(),
        passed: outcome.enemy_defeated && sim.state().kill_count == 1,
        detail: format!(
            "{} damage in one tick → {} kill(s)",
            outcome.damage,
            sim.state().kill_count
        ),
    });

    // Clicking through a full level cycle
    let mut sim = PlayerSimulation::new(NewPlayer::named("Clicker").into_state(3, 0));
    let mut clicks = 0u64;
    while sim.state().kill_count < 5 && clicks < 10_000 {
        clicks += 1;
        sim.apply_click(clicks as i64);
    }
    let state = sim.state();
    results.push(TestResult {
        name: "sim_click_full_cycle".into(),
        passed: clicks == 1_010 && state.level() == 1 && state.gold == 5 * DEFEAT_REWARD,
        detail: format!(
            "{} clicks → level {}, {} gold, enemy at {} hp",
            clicks,
            state.level(),
            state.gold,
            state.current_enemy_health
        ),
    });
    if verbose {
        println!("  play time after clicking: {}s", state.play_time_seconds);
    }

    // Offline grant on login
    let mut sim = PlayerSimulation::new(NewPlayer::named("Sleeper").into_state(4, 0));
    sim.record_logout(60);
    let earned = sim.record_login(60 + 3_600);
    results.push(TestResult {
        name: "sim_offline_hour".into(),
        passed: earned == 36 && sim.state().gold == 36,
        detail: format!("one hour away at 1 dps → {} gold", earned),
    });

    results
}

// ── 5. Sessions ─────────────────────────────────────────────────────────

fn validate_sessions(config: &ServerConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Sessions ---");
    let mut results = Vec::new();
    let (service, store, time) = service_with(config.clone(), 1_000_000);

    let player = match service.register_player("Harness") {
        Ok(p) => p,
        Err(e) => {
            results.push(TestResult {
                name: "session_register".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };
    let duplicate = service.register_player("Harness");
    results.push(TestResult {
        name: "session_unique_names".into(),
        passed: matches!(duplicate, Err(GameError::NameTaken(_))),
        detail: format!("second registration → {:?}", duplicate.map(|p| p.id)),
    });

    let offline_click = service.click(player.id);
    results.push(TestResult {
        name: "session_click_needs_login".into(),
        passed: offline_click == Err(GameError::NotLoggedIn(player.id)),
        detail: format!("{:?}", offline_click),
    });

    time.advance(1_000);
    let first = service.login(player.id);
    let second = service.login(player.id);
    let both_ok = matches!(
        (&first, &second),
        (Ok(a), Ok(b)) if !a.reused_session && b.reused_session
    );
    results.push(TestResult {
        name: "session_relogin_reuses".into(),
        passed: both_ok && service.active_player_count() == 1,
        detail: format!(
            "{} live, first login: {}",
            service.active_player_count(),
            first.as_ref().map(|s| s.message()).unwrap_or_default()
        ),
    });

    let mut ticked = 0;
    for _ in 0..20 {
        time.advance(config.tick_interval_secs());
        ticked += service.tick().advanced;
    }
    results.push(TestResult {
        name: "session_ticks_advance_live".into(),
        passed: ticked == 20,
        detail: format!("{} player-ticks over 20 ticks", ticked),
    });

    let live = service.player(player.id).ok();
    let logout = service.logout(player.id);
    let stored = store.load_player(player.id).ok();
    results.push(TestResult {
        name: "session_logout_persists".into(),
        passed: logout.is_ok()
            && service.active_player_count() == 0
            && live.as_ref().map(|s| s.kill_count) == stored.as_ref().map(|s| s.kill_count),
        detail: match &stored {
            Some(s) => format!(
                "stored {} gold, {} kills, {}s played",
                s.gold, s.kill_count, s.play_time_seconds
            ),
            None => "player missing from store".into(),
        },
    });

    let granted = service.grant_upgrade(player.id, 2);
    let denied = service.grant_upgrade(player.id, 8);
    results.push(TestResult {
        name: "session_upgrades".into(),
        passed: granted.is_ok() && denied == Err(GameError::UpgradeDisabled(8)),
        detail: format!(
            "attack after Double Damage: {}",
            granted.map(|s| s.effective_attack()).unwrap_or(0)
        ),
    });

    if verbose {
        println!("  store saw {} saves", store.save_count());
    }

    results
}

// ── 6. Game Clock ───────────────────────────────────────────────────────

fn validate_game_clock(config: &ServerConfig, _verbose: bool) -> Vec<TestResult> {
    println!("--- Game Clock ---");
    let mut results = Vec::new();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            results.push(TestResult {
                name: "clock_runtime".into(),
                passed: false,
                detail: format!("tokio runtime: {}", e),
            });
            return results;
        }
    };

    let (service, store, _time) = service_with(config.clone(), 0);
    let service = Arc::new(service);
    let player = service.register_player("Clocked").ok();
    if let Some(p) = &player {
        let _ = service.login(p.id);
    }
    let saves_before = store.save_count();

    let period = Duration::from_millis(20);
    let ticks = runtime.block_on(async {
        let handle = GameClock::with_period(service.clone(), period).spawn();
        tokio::time::sleep(period * 5 + period / 2).await;
        handle.stop().await
    });

    let saves = store.save_count() - saves_before;
    results.push(TestResult {
        name: "clock_ticks_and_saves".into(),
        passed: ticks >= 1 && saves == ticks,
        detail: format!("{} ticks in ~{:?}, {} saves", ticks, period * 5, saves),
    });

    results
}
