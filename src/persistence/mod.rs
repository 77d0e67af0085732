//! Snapshot persistence
//!
//! Mirrors the game state into a durable slot after every change and restores
//! it once at startup. Every failure here degrades to "in memory only" rather
//! than stopping the game.

pub mod store;

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{error::StoreError, state::GameState};

pub use store::{FileStore, MemoryStore, SnapshotStore, STORAGE_KEY};

/// Loads, saves and clears game snapshots through a [`SnapshotStore`]
#[derive(Debug, Clone)]
pub struct Persistence {
    store: Arc<dyn SnapshotStore>,
}

impl Persistence {
    /// Wrap a store
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }

    /// Persistence that never outlives the process
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Restore the last snapshot, or the default game if there is none usable.
    ///
    /// A game that was running comes back paused, since nothing ticked while
    /// the process was down.
    pub fn load(&self) -> GameState {
        let raw = match self.store.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                info!("No saved game found, starting with defaults");
                return GameState::default();
            }
            Err(e) => {
                warn!("Failed to read saved game: {}", e);
                return GameState::default();
            }
        };

        match serde_json::from_str::<GameState>(&raw) {
            Ok(state) => {
                let state = Self::sanitize(state);
                info!(
                    "Restored saved game: {} players, running={}, paused={}",
                    state.players.len(),
                    state.is_running,
                    state.is_paused
                );
                state
            }
            Err(e) => {
                warn!("Saved game is malformed, starting with defaults: {}", e);
                GameState::default()
            }
        }
    }

    /// Overwrite the slot with `state`. Failures are logged and ignored.
    pub fn save(&self, state: &GameState) {
        let result = serde_json::to_string(state)
            .map_err(StoreError::from)
            .and_then(|json| self.store.write(&json));

        match result {
            Ok(()) => debug!("Saved game snapshot"),
            Err(e) => warn!("Failed to save game: {}", e),
        }
    }

    /// Erase the slot. Failures are logged and ignored.
    pub fn clear(&self) {
        match self.store.erase() {
            Ok(()) => info!("Cleared saved game"),
            Err(e) => warn!("Failed to clear saved game: {}", e),
        }
    }

    fn sanitize(mut state: GameState) -> GameState {
        if state.is_running {
            state.is_paused = true;
        }
        if let Some(index) = state.active_player_index {
            if index >= state.players.len() {
                warn!(
                    "Saved active player index {} is out of range, clearing it",
                    index
                );
                state.active_player_index = None;
            }
        }
        state
    }
}
