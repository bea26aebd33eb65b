//! Live player sessions.
//!
//! One [`PlayerSimulation`] per logged-in player, each behind its own mutex
//! so a click, a tick and a logout on the same player never interleave. The
//! map of sessions sits behind a read/write lock that is only ever held for
//! map lookups and edits, never while waiting on a player or on the store.
//!
//! Lock order: a player's mutex may be held while taking the map lock, but
//! the map lock is never held while waiting on an existing player's mutex.
//! The one exception is locking a brand new, uncontended entry before it is
//! published, so nobody can observe a session that is still loading.
//!
//! An entry whose simulation has been taken out is closed. A logout closes
//! the entry under its mutex before removing it from the map, so a tick or
//! click that grabbed the entry earlier finds it closed and skips it, and a
//! waiting login retries against a fresh entry.
//!
//! Simulation state is valid between operations, so poisoned locks are
//! recovered rather than propagated.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use idlegame_logic::{PlayerId, PlayerSimulation, PlayerState};

/// `None` once the session is closed (or while its first load is running).
type SessionEntry = Arc<Mutex<Option<PlayerSimulation>>>;

/// Whether an attach created a session or found one already live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    /// The player was already live; the existing in-memory state was kept
    /// and the supplied (possibly stale) state discarded.
    Reused,
}

#[derive(Debug, Default)]
pub struct ActiveSessionRegistry {
    sessions: RwLock<HashMap<PlayerId, SessionEntry>>,
}

impl ActiveSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `state` live unless its player already is.
    pub fn attach(&self, state: PlayerState) -> AttachOutcome {
        let attached = self.attach_with(state.id, || Ok::<_, Infallible>(state), |_, _| ());
        match attached {
            Ok((outcome, ())) => outcome,
            Err(never) => match never {},
        }
    }

    /// Make `id` live, loading its state with `load` only if no session
    /// exists, then run `f` on the live simulation.
    ///
    /// `load` and `f` run under the new player's mutex, so concurrent
    /// attaches for the same player wait and then reuse the session instead
    /// of loading twice. If `load` fails nothing is attached.
    pub fn attach_with<R, E>(
        &self,
        id: PlayerId,
        load: impl FnOnce() -> Result<PlayerState, E>,
        f: impl FnOnce(&mut PlayerSimulation, AttachOutcome) -> R,
    ) -> Result<(AttachOutcome, R), E> {
        loop {
            let mut sessions = self.write();
            if let Some(existing) = sessions.get(&id).map(Arc::clone) {
                drop(sessions);
                let mut slot = lock_entry(&existing);
                match slot.as_mut() {
                    Some(sim) => {
                        log::debug!("Player {} already live, reusing session", id);
                        let result = f(sim, AttachOutcome::Reused);
                        return Ok((AttachOutcome::Reused, result));
                    }
                    // Closed by a logout while we waited; it is gone from
                    // the map now, so the next pass starts fresh.
                    None => continue,
                }
            }

            let entry: SessionEntry = Arc::new(Mutex::new(None));
            let mut slot = lock_entry(&entry);
            sessions.insert(id, Arc::clone(&entry));
            drop(sessions);

            return match load() {
                Ok(state) => {
                    let sim = slot.insert(PlayerSimulation::new(state));
                    let result = f(sim, AttachOutcome::Attached);
                    Ok((AttachOutcome::Attached, result))
                }
                Err(e) => {
                    self.remove_entry(id, &entry);
                    Err(e)
                }
            };
        }
    }

    /// Remove a player and hand back the final state for persistence.
    pub fn detach(&self, id: PlayerId) -> Option<PlayerState> {
        self.detach_and(id, |_| ()).map(|(state, ())| state)
    }

    /// Close a player's session, running `f` on the simulation first.
    ///
    /// `f` runs under the player's mutex, before the entry leaves the map,
    /// so a final save made there is ordered after every tick save and is
    /// visible to the next login.
    pub fn detach_and<R>(
        &self,
        id: PlayerId,
        f: impl FnOnce(&mut PlayerSimulation) -> R,
    ) -> Option<(PlayerState, R)> {
        let entry = self.entry(id)?;
        let mut slot = lock_entry(&entry);
        let mut sim = slot.take()?;
        let result = f(&mut sim);
        self.remove_entry(id, &entry);
        Some((sim.into_state(), result))
    }

    /// Run `f` against a live player. `None` if the player is not live.
    pub fn with_session<R>(
        &self,
        id: PlayerId,
        f: impl FnOnce(&mut PlayerSimulation) -> R,
    ) -> Option<R> {
        let entry = self.entry(id)?;
        let mut slot = lock_entry(&entry);
        slot.as_mut().map(f)
    }

    /// Advance every live player by `interval_seconds` of passive combat.
    ///
    /// Returns the post-tick state of each player for persistence.
    pub fn advance_all(&self, interval_seconds: i64, now: i64) -> Vec<PlayerState> {
        let mut snapshots = Vec::new();
        self.advance_all_with(interval_seconds, now, |state| snapshots.push(state.clone()));
        snapshots
    }

    /// Advance every live player, handing each post-tick state to `persist`.
    ///
    /// The map lock is released before any player is touched. `persist`
    /// runs under that player's mutex only, so saves for one player land in
    /// the order their mutations happened. Players that log out mid-tick are
    /// skipped; players that log in mid-tick wait for the next one.
    pub fn advance_all_with(
        &self,
        interval_seconds: i64,
        now: i64,
        mut persist: impl FnMut(&PlayerState),
    ) -> usize {
        let entries: Vec<SessionEntry> = self.read().values().cloned().collect();
        let mut advanced = 0;
        for entry in &entries {
            let mut slot = lock_entry(entry);
            if let Some(sim) = slot.as_mut() {
                sim.apply_elapsed_time(interval_seconds, now);
                persist(sim.state());
                advanced += 1;
            }
        }
        advanced
    }

    pub fn snapshot(&self, id: PlayerId) -> Option<PlayerState> {
        self.with_session(id, |sim| sim.state().clone())
    }

    pub fn is_live(&self, id: PlayerId) -> bool {
        self.read().contains_key(&id)
    }

    pub fn active_count(&self) -> usize {
        self.read().len()
    }

    pub fn live_ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.read().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn entry(&self, id: PlayerId) -> Option<SessionEntry> {
        self.read().get(&id).map(Arc::clone)
    }

    /// Drop `id` from the map if it still points at `entry`.
    fn remove_entry(&self, id: PlayerId, entry: &SessionEntry) {
        let mut sessions = self.write();
        if sessions.get(&id).is_some_and(|current| Arc::ptr_eq(current, entry)) {
            sessions.remove(&id);
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<PlayerId, SessionEntry>> {
        self.sessions.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<PlayerId, SessionEntry>> {
        self.sessions.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn lock_entry(entry: &SessionEntry) -> MutexGuard<'_, Option<PlayerSimulation>> {
    entry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
