//! The periodic game clock.
//!
//! A single tokio task that runs [`GameService::tick`] on the blocking pool
//! once per configured interval until stopped. A tick finishes before the
//! next one or a shutdown is looked at. The first tick fires one full
//! interval after start. If the runtime falls behind, ticks are delayed
//! rather than bunched up, so players are never advanced twice in one instant.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::service::GameService;

pub struct GameClock {
    service: Arc<GameService>,
    period: Duration,
}

/// A running clock. Drop it or call [`ClockHandle::stop`] to halt ticking.
pub struct ClockHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

impl GameClock {
    /// A clock ticking at the service's configured interval.
    pub fn new(service: Arc<GameService>) -> Self {
        let period = service.config().tick_interval();
        Self::with_period(service, period)
    }

    pub fn with_period(service: Arc<GameService>, period: Duration) -> Self {
        Self { service, period }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking on the current tokio runtime.
    pub fn spawn(self) -> ClockHandle {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        ClockHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) -> u64 {
        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        log::info!("Game clock started (tick every {:?})", self.period);
        let mut ticks = 0u64;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Saves hit the store synchronously; keep them off the
                    // runtime's worker threads.
                    let service = Arc::clone(&self.service);
                    let tick = tokio::task::spawn_blocking(move || service.tick()).await;
                    ticks += 1;
                    match tick {
                        Ok(report) if report.failed_saves > 0 => {
                            log::warn!(
                                "Tick {}: {} of {} saves failed",
                                ticks,
                                report.failed_saves,
                                report.advanced
                            );
                        }
                        Ok(_) => {}
                        Err(e) => log::error!("Tick {} did not finish: {}", ticks, e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("Game clock stopped after {} ticks", ticks);
        ticks
    }
}

impl ClockHandle {
    /// Stop the clock and wait for the in-flight tick, if any, to finish.
    ///
    /// Returns the number of ticks that ran.
    pub async fn stop(self) -> u64 {
        // A send error means the task is already gone.
        let _ = self.shutdown.send(true);
        match self.task.await {
            Ok(ticks) => ticks,
            Err(e) => {
                log::warn!("Game clock task ended abnormally: {}", e);
                0
            }
        }
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}
