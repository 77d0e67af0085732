//! Game state structure and turn/timer transitions

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Seconds on every clock when nothing else is configured
pub const DEFAULT_INITIAL_TIME: u32 = 30;
/// Seconds credited at turn transitions when nothing else is configured
pub const DEFAULT_BONUS_TIME: u32 = 10;

/// A single player and their clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Stable identifier for the player's lifetime
    pub id: String,
    /// Display label
    pub name: String,
    /// Seconds left on the clock; negative means overtime
    pub time_remaining: i64,
    /// Highest value `time_remaining` has reached, only used for progress display
    pub max_time: i64,
}

impl Player {
    /// Create a player with a full clock
    pub fn new(id: impl Into<String>, name: impl Into<String>, initial_time: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            time_remaining: i64::from(initial_time),
            max_time: i64::from(initial_time),
        }
    }

    /// Check if the player has run past zero
    pub fn is_overtime(&self) -> bool {
        self.time_remaining < 0
    }

    /// Add bonus seconds, raising `max_time` if the clock now exceeds it
    fn credit(&mut self, seconds: u32) {
        self.time_remaining += i64::from(seconds);
        self.max_time = self.max_time.max(self.time_remaining);
    }

    /// Put the clock back to `initial_time`, discarding elapsed time
    fn rearm(&mut self, initial_time: u32) {
        self.time_remaining = i64::from(initial_time);
        self.max_time = i64::from(initial_time);
    }
}

/// Clock settings shared by every player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    /// Seconds assigned to each clock when armed
    pub initial_time: u32,
    /// Seconds credited at turn transitions
    pub bonus_time: u32,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            initial_time: DEFAULT_INITIAL_TIME,
            bonus_time: DEFAULT_BONUS_TIME,
        }
    }
}

/// Coarse phase derived from the running and paused flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GamePhase {
    Setup,
    Paused,
    Playing,
}

/// The single source of truth for a game session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Players in turn order
    pub players: Vec<Player>,
    /// Index of the player whose clock runs
    #[serde(default)]
    pub active_player_index: Option<usize>,
    /// Set once the game leaves setup
    #[serde(default)]
    pub is_running: bool,
    /// No clock decrements while set
    #[serde(default)]
    pub is_paused: bool,
    pub settings: TimerSettings,
}

/// The built-in roster used on first start and after a full wipe
pub fn default_players() -> Vec<Player> {
    vec![
        Player::new("default-ole", "Ole", DEFAULT_INITIAL_TIME),
        Player::new("default-lydi", "Lydi", DEFAULT_INITIAL_TIME),
    ]
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            players: default_players(),
            active_player_index: None,
            is_running: false,
            is_paused: false,
            settings: TimerSettings::default(),
        }
    }
}

impl GameState {
    /// Current phase of the game
    pub fn phase(&self) -> GamePhase {
        match (self.is_running, self.is_paused) {
            (false, _) => GamePhase::Setup,
            (true, true) => GamePhase::Paused,
            (true, false) => GamePhase::Playing,
        }
    }

    /// The continue / next-turn review controls are shown while paused
    pub fn review_buttons_visible(&self) -> bool {
        self.is_paused
    }

    /// Whether the one-second decrement should be running right now
    pub fn should_tick(&self) -> bool {
        self.is_running
            && !self.is_paused
            && self.active_player_index.is_some()
            && !self.review_buttons_visible()
    }

    /// The player whose clock is running, if any
    pub fn active_player(&self) -> Option<&Player> {
        self.active_player_index.and_then(|i| self.players.get(i))
    }

    /// Setup is complete enough to leave: two players and a non-zero clock
    pub fn can_start(&self) -> bool {
        self.players.len() >= 2 && self.settings.initial_time > 0
    }

    /// Append a player with a fresh id and a full clock, returning the id
    pub fn add_player(&mut self, name: impl Into<String>) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.players
            .push(Player::new(id.clone(), name, self.settings.initial_time));
        id
    }

    /// Remove a player by id. Returns false if no such player exists.
    ///
    /// Removing the active player hands the turn to the first remaining
    /// player; removing someone earlier in the order shifts the index so it
    /// still points at the same player.
    pub fn remove_player(&mut self, id: &str) -> bool {
        let Some(removed) = self.players.iter().position(|p| p.id == id) else {
            return false;
        };
        self.players.remove(removed);

        self.active_player_index = match self.active_player_index {
            Some(active) if active == removed => {
                if self.players.is_empty() {
                    None
                } else {
                    Some(0)
                }
            }
            Some(active) if removed < active => Some(active - 1),
            other => other,
        };
        true
    }

    /// Replace the settings and re-arm every clock with the new initial time
    pub fn update_settings(&mut self, settings: TimerSettings) {
        self.settings = settings;
        for player in &mut self.players {
            player.rearm(settings.initial_time);
        }
    }

    /// Leave setup with the first player selected and the clock paused
    pub fn start_game(&mut self) {
        self.is_running = true;
        self.is_paused = true;
        self.active_player_index = if self.players.is_empty() { None } else { Some(0) };
    }

    pub fn pause_game(&mut self) {
        self.is_paused = true;
    }

    pub fn resume_game(&mut self) {
        self.is_paused = false;
    }

    /// Clicking the active player toggles pause; clicking anyone else hands
    /// them the turn with a bonus credit and resumes play.
    pub fn handle_player_click(&mut self, index: usize) {
        if Some(index) == self.active_player_index {
            self.is_paused = !self.is_paused;
            return;
        }

        let bonus = self.settings.bonus_time;
        let Some(player) = self.players.get_mut(index) else {
            debug!("Ignoring click on missing player index {}", index);
            return;
        };
        player.credit(bonus);
        self.active_player_index = Some(index);
        self.is_paused = false;
    }

    /// Pass the turn to the next player in order, crediting them the bonus
    pub fn end_turn(&mut self) {
        let Some(active) = self.active_player_index else {
            return;
        };
        if self.players.is_empty() {
            return;
        }

        let next = (active + 1) % self.players.len();
        let bonus = self.settings.bonus_time;
        self.players[next].credit(bonus);
        self.active_player_index = Some(next);
        self.is_paused = false;
    }

    /// Credit the bonus to the current player and resume without moving the turn
    pub fn handle_next_turn(&mut self) {
        let bonus = self.settings.bonus_time;
        let Some(player) = self
            .active_player_index
            .and_then(|i| self.players.get_mut(i))
        else {
            return;
        };
        player.credit(bonus);
        self.is_paused = false;
    }

    /// Resume without crediting anything
    pub fn handle_continue(&mut self) {
        self.is_paused = false;
    }

    /// Take one second off the active clock. There is no floor at zero.
    ///
    /// Returns true if a clock was decremented.
    pub fn tick(&mut self) -> bool {
        if !self.should_tick() {
            return false;
        }
        match self
            .active_player_index
            .and_then(|i| self.players.get_mut(i))
        {
            Some(player) => {
                player.time_remaining -= 1;
                true
            }
            None => false,
        }
    }

    /// Back to setup with every clock re-armed; an empty roster gets the defaults
    pub fn reset_game(&mut self) {
        if self.players.is_empty() {
            self.players = default_players();
        } else {
            let initial = self.settings.initial_time;
            for player in &mut self.players {
                player.rearm(initial);
            }
        }
        self.active_player_index = None;
        self.is_paused = false;
        self.is_running = false;
    }

    /// Discard everything, including custom players and settings
    pub fn clear_all(&mut self) {
        *self = Self::default();
    }
}
