//! HTTP API module
//!
//! Each mutating endpoint maps onto exactly one game intent.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/state", get(status_handler))
        .route("/layout", get(layout_handler))
        .route("/players", post(add_player_handler))
        .route("/players/:id", delete(remove_player_handler))
        .route("/click/:index", post(player_click_handler))
        .route("/settings", put(update_settings_handler))
        .route("/game/start", post(start_game_handler))
        .route("/game/pause", post(pause_handler))
        .route("/game/resume", post(resume_handler))
        .route("/game/end-turn", post(end_turn_handler))
        .route("/game/next-turn", post(next_turn_handler))
        .route("/game/continue", post(continue_handler))
        .route("/game/reset", post(reset_handler))
        .route("/data", delete(clear_data_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
