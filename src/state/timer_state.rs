//! Tick timer state derived from the game state

use serde::Serialize;

use super::GameState;

/// Whether the one-second countdown should run, and for whom.
///
/// The tick task compares consecutive values of this to decide when to arm,
/// re-arm, or cancel its interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerState {
    pub active: bool,
    pub player_index: Option<usize>,
}

impl TimerState {
    /// Create an inactive timer state
    pub fn new() -> Self {
        Self::inactive()
    }

    /// Create a timer state counting down the given player
    pub fn active(player_index: usize) -> Self {
        Self {
            active: true,
            player_index: Some(player_index),
        }
    }

    /// Create an inactive timer state
    pub fn inactive() -> Self {
        Self {
            active: false,
            player_index: None,
        }
    }

    /// Evaluate the ticking predicate against a game snapshot
    pub fn from_game(game: &GameState) -> Self {
        match game.active_player_index {
            Some(index) if game.should_tick() => Self::active(index),
            _ => Self::inactive(),
        }
    }

    /// Check if the timer is active
    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl Default for TimerState {
    fn default() -> Self {
        Self::new()
    }
}
