//! Board Game Timer - per-player countdown clocks for board games
//!
//! This library provides the turn/timer state machine, its snapshot
//! persistence, the one-second tick task and an HTTP API for front ends.

pub mod config;
pub mod error;
pub mod state;
pub mod persistence;
pub mod layout;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, GameState};
pub use persistence::Persistence;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
