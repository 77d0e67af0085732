//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod tick_timer;

// Re-export main functions
pub use tick_timer::{spawn_tick_timer, tick_timer_task, TICK_PERIOD};
