//! Player persistence contract.
//!
//! The session layer never sees rows or transactions; it loads and saves
//! whole [`PlayerState`] records through [`PlayerStore`]. [`MemoryPlayerStore`]
//! is a process-local implementation used by tests and the harness.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use idlegame_logic::{NewPlayer, PlayerId, PlayerState};

use crate::error::StoreError;

pub trait PlayerStore: Send + Sync {
    fn load_player(&self, id: PlayerId) -> Result<PlayerState, StoreError>;

    fn save_player(&self, state: &PlayerState) -> Result<PlayerState, StoreError>;

    fn find_player_by_name(&self, name: &str) -> Result<Option<PlayerState>, StoreError>;

    /// Persist a new player, assigning its id. Names are unique.
    fn insert_player(&self, new: NewPlayer, now: i64) -> Result<PlayerState, StoreError>;

    fn list_players(&self) -> Result<Vec<PlayerState>, StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryPlayerStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    players: BTreeMap<PlayerId, PlayerState>,
    next_id: PlayerId,
    saves: u64,
}

impl MemoryPlayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total successful `save_player` calls.
    pub fn save_count(&self) -> u64 {
        self.lock().saves
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PlayerStore for MemoryPlayerStore {
    fn load_player(&self, id: PlayerId) -> Result<PlayerState, StoreError> {
        self.lock()
            .players
            .get(&id)
            .cloned()
            .ok_or(StoreError::PlayerNotFound(id))
    }

    fn save_player(&self, state: &PlayerState) -> Result<PlayerState, StoreError> {
        let mut inner = self.lock();
        if !inner.players.contains_key(&state.id) {
            return Err(StoreError::PlayerNotFound(state.id));
        }
        inner.players.insert(state.id, state.clone());
        inner.saves += 1;
        Ok(state.clone())
    }

    fn find_player_by_name(&self, name: &str) -> Result<Option<PlayerState>, StoreError> {
        Ok(self
            .lock()
            .players
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    fn insert_player(&self, new: NewPlayer, now: i64) -> Result<PlayerState, StoreError> {
        let mut inner = self.lock();
        if inner.players.values().any(|p| p.name == new.name) {
            return Err(StoreError::NameTaken(new.name));
        }
        inner.next_id += 1;
        let state = new.into_state(inner.next_id, now);
        inner.players.insert(state.id, state.clone());
        Ok(state)
    }

    fn list_players(&self) -> Result<Vec<PlayerState>, StoreError> {
        Ok(self.lock().players.values().cloned().collect())
    }
}
