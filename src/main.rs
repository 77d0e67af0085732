//! Board Game Timer - per-player countdown clocks for board games
//!
//! This is the main entry point for the board-game-timer server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use board_game_timer::{
    config::Config,
    persistence::{FileStore, Persistence},
    state::AppState,
    api::create_router,
    tasks::spawn_tick_timer,
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("board_game_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting board-game-timer v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, state_file={}",
          config.host, config.port, config.state_file().display());

    // Restore the saved game, if any
    let persistence = Persistence::new(Arc::new(FileStore::new(&config.data_dir)));
    let state = Arc::new(AppState::new(config.port, config.host.clone(), persistence));

    let tick_timer = spawn_tick_timer(Arc::clone(&state));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET    /state          - Game state and timer");
    info!("  POST   /players        - Add a player");
    info!("  DELETE /players/:id    - Remove a player");
    info!("  PUT    /settings       - Replace settings, re-arming every clock");
    info!("  POST   /game/start     - Start the game (paused)");
    info!("  POST   /click/:index   - Tap a player's tile");
    info!("  POST   /game/end-turn  - Pass the turn on");
    info!("  POST   /game/reset     - Back to setup");
    info!("  DELETE /data           - Erase everything");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    tick_timer.abort();
    info!("Server shutdown complete");
    Ok(())
}
