//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use tracing::{debug, error, info, warn};

use crate::{
    error::StateError,
    layout::{square_grid, GridLayout},
    state::{AppState, GameState, TimerSettings, TimerState},
};
use super::responses::{
    AddPlayerRequest, ApiResponse, GameView, HealthResponse, LayoutQuery, StatusResponse,
};

/// Turn the result of an intent into a response
fn respond(
    result: Result<GameState, StateError>,
    message: &str,
) -> Result<Json<ApiResponse>, StatusCode> {
    match result {
        Ok(game) => Ok(Json(ApiResponse::ok(message.to_string(), &game))),
        Err(e) => {
            error!("{} failed: {}", message, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Refuse an intent, echoing the unchanged state
fn reject(
    state: &AppState,
    status: StatusCode,
    message: String,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    warn!("Rejected: {}", message);
    match state.get_game_state() {
        Ok(game) => Ok((status, Json(ApiResponse::rejected(message, &game)))),
        Err(e) => {
            error!("Failed to get game state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /players - Add a player with a full clock
pub async fn add_player_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AddPlayerRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    let name = request.name.trim();
    if name.is_empty() {
        return reject(&state, StatusCode::BAD_REQUEST, "Player name must not be empty".to_string());
    }

    match state.add_player(name) {
        Ok((id, game)) => {
            info!("Player {} added with id {}", name, id);
            Ok((
                StatusCode::CREATED,
                Json(ApiResponse::ok(format!("Player {} added", name), &game)),
            ))
        }
        Err(e) => {
            error!("Failed to add player: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle DELETE /players/:id - Remove a player
pub async fn remove_player_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.remove_player(&id), "Player removed")
}

/// Handle PUT /settings - Replace settings and re-arm every clock
pub async fn update_settings_handler(
    State(state): State<Arc<AppState>>,
    Json(settings): Json<TimerSettings>,
) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.update_settings(settings), "Settings updated")
}

/// Handle POST /game/start - Leave setup, paused on the first player
pub async fn start_game_handler(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse>), StatusCode> {
    let game = state.get_game_state().map_err(|e| {
        error!("Failed to get game state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    if !game.can_start() {
        return reject(
            &state,
            StatusCode::CONFLICT,
            "At least two players and a non-zero initial time are needed to start".to_string(),
        );
    }

    respond(state.start_game(), "Game started").map(|json| (StatusCode::OK, json))
}

/// Handle POST /game/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.pause_game(), "Game paused")
}

/// Handle POST /game/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.resume_game(), "Game resumed")
}

/// Handle POST /game/end-turn - Pass the turn to the next player
pub async fn end_turn_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.end_turn(), "Turn ended")
}

/// Handle POST /game/next-turn - Credit the current player and resume
pub async fn next_turn_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.handle_next_turn(), "Bonus credited")
}

/// Handle POST /game/continue - Resume without a bonus
pub async fn continue_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.handle_continue(), "Game continued")
}

/// Handle POST /game/reset - Back to setup with fresh clocks
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.reset_game(), "Game reset")
}

/// Handle POST /click/:index - A player's tile was tapped.
///
/// An index that is negative or not a number leaves the game unchanged.
pub async fn player_click_handler(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match index.parse::<usize>() {
        Ok(index) => respond(state.handle_player_click(index), "Player clicked"),
        Err(_) => {
            debug!("Ignoring click on invalid player index {:?}", index);
            respond(state.get_game_state(), "No such player")
        }
    }
}

/// Handle DELETE /data - Erase the saved game and return to defaults
pub async fn clear_data_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    respond(state.clear_all_data(), "All data cleared")
}

/// Handle GET /state - Return current game and timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let game = match state.get_game_state() {
        Ok(game) => game,
        Err(e) => {
            error!("Failed to get game state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer: TimerState::from_game(&game),
        state: GameView::from(&game),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /layout - Tile size and columns for the current roster
pub async fn layout_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LayoutQuery>,
) -> Result<Json<GridLayout>, StatusCode> {
    match state.get_game_state() {
        Ok(game) => Ok(Json(square_grid(query.width, query.height, game.players.len()))),
        Err(e) => {
            error!("Failed to get game state: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
