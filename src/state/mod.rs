//! State management module
//!
//! This module contains the game state, its transitions, and the shared owner
//! that persists and publishes it.

pub mod game_state;
pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use game_state::{default_players, GamePhase, GameState, Player, TimerSettings};
pub use app_state::{AppState, StateChange};
pub use timer_state::TimerState;
