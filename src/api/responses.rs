//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    layout::{format_clock, progress, LOW_TIME_THRESHOLD},
    state::{GamePhase, GameState, Player, TimerSettings, TimerState},
};

/// A player as a front end wants to draw them
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: String,
    pub name: String,
    pub time_remaining: i64,
    pub max_time: i64,
    /// `m:ss`, negative in overtime
    pub clock: String,
    pub progress: f64,
    pub overtime: bool,
    pub low_time: bool,
    pub active: bool,
}

impl PlayerView {
    fn new(player: &Player, active: bool) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            time_remaining: player.time_remaining,
            max_time: player.max_time,
            clock: format_clock(player.time_remaining),
            progress: progress(player),
            overtime: player.is_overtime(),
            low_time: player.time_remaining > 0 && player.time_remaining <= LOW_TIME_THRESHOLD,
            active,
        }
    }
}

/// Game snapshot plus the values derived from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub players: Vec<PlayerView>,
    pub active_player_index: Option<usize>,
    pub is_running: bool,
    pub is_paused: bool,
    pub settings: TimerSettings,
    pub phase: GamePhase,
    pub ticking: bool,
    pub show_review_buttons: bool,
    pub can_start: bool,
}

impl From<&GameState> for GameView {
    fn from(game: &GameState) -> Self {
        Self {
            players: game
                .players
                .iter()
                .enumerate()
                .map(|(i, p)| PlayerView::new(p, game.active_player_index == Some(i)))
                .collect(),
            active_player_index: game.active_player_index,
            is_running: game.is_running,
            is_paused: game.is_paused,
            settings: game.settings,
            phase: game.phase(),
            ticking: game.should_tick(),
            show_review_buttons: game.review_buttons_visible(),
            can_start: game.can_start(),
        }
    }
}

/// API response structure for state change endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub state: GameView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, state: &GameState) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            state: GameView::from(state),
        }
    }

    /// The intent was applied
    pub fn ok(message: String, state: &GameState) -> Self {
        Self::new("ok".to_string(), message, state)
    }

    /// The intent was refused before reaching the game
    pub fn rejected(message: String, state: &GameState) -> Self {
        Self::new("rejected".to_string(), message, state)
    }
}

/// Full status, including the tick timer and server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub state: GameView,
    pub timer: TimerState,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body of `POST /players`
#[derive(Debug, Clone, Deserialize)]
pub struct AddPlayerRequest {
    pub name: String,
}

/// Query of `GET /layout`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LayoutQuery {
    pub width: f64,
    pub height: f64,
}
