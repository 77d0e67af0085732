//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{GameState, TimerSettings, TimerState};
use crate::{error::StateError, persistence::Persistence};

/// A published game snapshot.
///
/// `arm_generation` goes up on every transition that leaves the game ticking
/// for a different reason than before (resumed, switched player), so a watcher
/// that missed the intermediate states still knows to restart its countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChange {
    pub arm_generation: u64,
    pub game: GameState,
}

/// Owns the one canonical game state and mirrors every change to storage
#[derive(Debug)]
pub struct AppState {
    /// The game, mutated only through the intent methods below
    game: Arc<Mutex<GameState>>,
    /// Bumped under the game lock whenever ticking (re)starts
    arm_generation: Arc<Mutex<u64>>,
    /// Durable snapshot slot
    persistence: Persistence,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Publishes every new snapshot to the tick task and other watchers
    state_change_tx: watch::Sender<StateChange>,
    /// Keep the receiver alive so sends succeed with no other watchers
    _state_change_rx: watch::Receiver<StateChange>,
}

impl AppState {
    /// Create the application state, restoring the last saved game
    pub fn new(port: u16, host: String, persistence: Persistence) -> Self {
        let game = persistence.load();
        let (state_change_tx, state_change_rx) = watch::channel(StateChange {
            arm_generation: 0,
            game: game.clone(),
        });

        Self {
            game: Arc::new(Mutex::new(game)),
            arm_generation: Arc::new(Mutex::new(0)),
            persistence,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            state_change_tx,
            _state_change_rx: state_change_rx,
        }
    }

    /// Apply a transition, persist the result and notify watchers
    pub fn update_state<F>(&self, action: &str, updater: F) -> Result<GameState, StateError>
    where
        F: FnOnce(&mut GameState),
    {
        let mut game = self.game.lock()?;
        let before = TimerState::from_game(&game);
        updater(&mut game);
        let new_state = game.clone();

        // Save and publish while still holding the lock so both land in transition order
        self.persistence.save(&new_state);
        self.publish(before, new_state.clone())?;
        drop(game);

        self.record_action(action);
        Ok(new_state)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Notify watchers. Callers hold the game lock.
    fn publish(&self, before: TimerState, game: GameState) -> Result<(), StateError> {
        let mut arm_generation = self.arm_generation.lock()?;
        let after = TimerState::from_game(&game);
        if after.is_active() && after != before {
            *arm_generation += 1;
            debug!("Countdown armed, generation {}", *arm_generation);
        }

        let change = StateChange {
            arm_generation: *arm_generation,
            game,
        };
        if let Err(e) = self.state_change_tx.send(change) {
            warn!("Failed to send state change notification: {}", e);
        }
        Ok(())
    }

    /// Add a player, returning their id alongside the new state
    pub fn add_player(&self, name: &str) -> Result<(String, GameState), StateError> {
        info!("Adding player: {}", name);
        let mut id = String::new();
        let state = self.update_state("add-player", |game| id = game.add_player(name))?;
        Ok((id, state))
    }

    /// Remove a player by id; unknown ids leave the game unchanged
    pub fn remove_player(&self, id: &str) -> Result<GameState, StateError> {
        info!("Removing player: {}", id);
        self.update_state("remove-player", |game| {
            if !game.remove_player(id) {
                debug!("No player with id {}", id);
            }
        })
    }

    /// Replace the settings and re-arm every clock
    pub fn update_settings(&self, settings: TimerSettings) -> Result<GameState, StateError> {
        info!(
            "Updating settings: initial={}s, bonus={}s",
            settings.initial_time, settings.bonus_time
        );
        self.update_state("update-settings", |game| game.update_settings(settings))
    }

    pub fn start_game(&self) -> Result<GameState, StateError> {
        info!("Starting game");
        self.update_state("start", GameState::start_game)
    }

    pub fn pause_game(&self) -> Result<GameState, StateError> {
        info!("Pausing game");
        self.update_state("pause", GameState::pause_game)
    }

    pub fn resume_game(&self) -> Result<GameState, StateError> {
        info!("Resuming game");
        self.update_state("resume", GameState::resume_game)
    }

    pub fn handle_player_click(&self, index: usize) -> Result<GameState, StateError> {
        info!("Player {} clicked", index);
        self.update_state("player-click", |game| game.handle_player_click(index))
    }

    pub fn end_turn(&self) -> Result<GameState, StateError> {
        info!("Ending turn");
        self.update_state("end-turn", GameState::end_turn)
    }

    pub fn handle_next_turn(&self) -> Result<GameState, StateError> {
        info!("Next turn for current player");
        self.update_state("next-turn", GameState::handle_next_turn)
    }

    pub fn handle_continue(&self) -> Result<GameState, StateError> {
        info!("Continuing game");
        self.update_state("continue", GameState::handle_continue)
    }

    pub fn reset_game(&self) -> Result<GameState, StateError> {
        info!("Resetting game");
        self.update_state("reset", GameState::reset_game)
    }

    /// Erase the saved game and return to the built-in defaults
    pub fn clear_all_data(&self) -> Result<GameState, StateError> {
        info!("Clearing all data");
        let mut game = self.game.lock()?;
        let before = TimerState::from_game(&game);
        self.persistence.clear();
        game.clear_all();
        let new_state = game.clone();
        self.publish(before, new_state.clone())?;
        drop(game);

        self.record_action("clear-all");
        Ok(new_state)
    }

    /// Take one second off the active clock if the game is ticking.
    ///
    /// Not recorded as a user action. Returns whether anything changed.
    pub fn tick(&self) -> Result<bool, StateError> {
        let mut game = self.game.lock()?;
        let before = TimerState::from_game(&game);
        if !game.tick() {
            return Ok(false);
        }
        let new_state = game.clone();
        self.persistence.save(&new_state);
        if let Some(player) = new_state.active_player() {
            debug!("Tick: {} has {}s left", player.name, player.time_remaining);
        }
        self.publish(before, new_state)?;
        Ok(true)
    }

    /// Get current game state
    pub fn get_game_state(&self) -> Result<GameState, StateError> {
        Ok(self.game.lock()?.clone())
    }

    /// Watch every future state change
    pub fn subscribe(&self) -> watch::Receiver<StateChange> {
        self.state_change_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn app_with_store() -> (AppState, Persistence) {
        let persistence = Persistence::new(Arc::new(MemoryStore::new()));
        let app = AppState::new(0, "127.0.0.1".to_string(), persistence.clone());
        (app, persistence)
    }

    #[test]
    fn test_every_transition_is_persisted() {
        let (app, persistence) = app_with_store();

        app.start_game().unwrap();
        app.resume_game().unwrap();
        app.tick().unwrap();

        let saved = persistence.load();
        assert_eq!(saved.players[0].time_remaining, 29);
        assert!(saved.is_running);
        // A running game always reloads paused
        assert!(saved.is_paused);
    }

    #[test]
    fn test_restores_saved_game_on_startup() {
        let (app, persistence) = app_with_store();
        let (id, _) = app.add_player("Cid").unwrap();

        let restarted = AppState::new(0, "127.0.0.1".to_string(), persistence);
        let game = restarted.get_game_state().unwrap();
        assert_eq!(game.players.len(), 3);
        assert_eq!(game.players[2].id, id);
    }

    #[test]
    fn test_tick_only_when_ticking() {
        let (app, _) = app_with_store();
        assert!(!app.tick().unwrap());

        app.start_game().unwrap();
        assert!(!app.tick().unwrap());

        app.handle_continue().unwrap();
        assert!(app.tick().unwrap());
        assert_eq!(app.get_game_state().unwrap().players[0].time_remaining, 29);
    }

    #[test]
    fn test_clear_all_data_erases_snapshot() {
        let (app, persistence) = app_with_store();
        app.add_player("Cid").unwrap();
        app.update_settings(TimerSettings {
            initial_time: 100,
            bonus_time: 0,
        })
        .unwrap();

        let game = app.clear_all_data().unwrap();
        assert_eq!(game, GameState::default());
        assert_eq!(persistence.load(), GameState::default());
    }

    #[test]
    fn test_subscribers_see_changes() {
        let (app, _) = app_with_store();
        let mut rx = app.subscribe();

        app.start_game().unwrap();
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().game.is_running);
    }

    #[test]
    fn test_arm_generation_bumps_when_ticking_restarts() {
        let (app, _) = app_with_store();
        let rx = app.subscribe();
        let generation = || rx.borrow().arm_generation;

        app.start_game().unwrap();
        assert_eq!(generation(), 0);

        app.resume_game().unwrap();
        assert_eq!(generation(), 1);

        app.tick().unwrap();
        app.resume_game().unwrap();
        assert_eq!(generation(), 1, "nothing restarted");

        app.pause_game().unwrap();
        app.resume_game().unwrap();
        assert_eq!(generation(), 2);

        app.handle_player_click(1).unwrap();
        app.handle_player_click(0).unwrap();
        assert_eq!(generation(), 4);

        app.reset_game().unwrap();
        assert_eq!(generation(), 4);
    }

    #[test]
    fn test_last_action_is_recorded() {
        let (app, _) = app_with_store();
        app.handle_player_click(1).unwrap();

        let (action, time) = app.get_last_action();
        assert_eq!(action.as_deref(), Some("player-click"));
        assert!(time.is_some());
    }
}
