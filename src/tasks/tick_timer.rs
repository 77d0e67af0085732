//! Tick timer background task

use std::{
    future,
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, Interval},
};
use tracing::{debug, error, info};

use crate::state::{AppState, StateChange, TimerState};

/// Time between decrements of the active clock
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What the countdown is currently armed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    generation: u64,
    timer: TimerState,
}

impl Armed {
    fn from_change(change: &StateChange) -> Self {
        Self {
            generation: change.arm_generation,
            timer: TimerState::from_game(&change.game),
        }
    }
}

/// Spawn the tick timer on the current runtime.
///
/// Aborting the returned handle cancels any outstanding countdown.
pub fn spawn_tick_timer(state: Arc<AppState>) -> JoinHandle<()> {
    tokio::spawn(tick_timer_task(state))
}

/// Background task that counts down the active player's clock.
///
/// Holds at most one interval. A fresh one is armed whenever the game starts
/// ticking again or the turn moves to another player, even if the
/// intermediate states were never observed, and it is dropped as soon as the
/// game stops ticking. Only a weak reference to the state is kept, so the
/// task ends once the state is dropped.
pub async fn tick_timer_task(state: Arc<AppState>) {
    info!("Starting tick timer task");

    let mut state_rx = state.subscribe();
    let weak_state: Weak<AppState> = Arc::downgrade(&state);
    drop(state);

    let mut current = Armed {
        generation: 0,
        timer: TimerState::inactive(),
    };
    let mut interval: Option<Interval> = None;

    // Evaluate the state we start with as if it had just changed
    let initial = Armed::from_change(&state_rx.borrow_and_update());
    rearm(&mut current, &mut interval, initial);

    loop {
        tokio::select! {
            _ = next_tick(&mut interval) => {
                let Some(state) = weak_state.upgrade() else {
                    break;
                };
                if let Err(e) = state.tick() {
                    error!("Failed to apply tick: {}", e);
                }
            }

            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = Armed::from_change(&state_rx.borrow_and_update());
                rearm(&mut current, &mut interval, next);
            }
        }
    }

    info!("Game state dropped, stopping tick timer");
}

/// Arm, re-arm or cancel the interval when the armed state moves
fn rearm(current: &mut Armed, interval: &mut Option<Interval>, next: Armed) {
    if next == *current {
        return;
    }
    debug!("Timer state changed: {:?} -> {:?}", current, next);

    match next.timer.player_index {
        Some(index) if next.timer.is_active() => {
            info!("Counting down player {}", index);
            // Replacing the interval drops the old one, so only one is ever live
            *interval = Some(interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD));
        }
        _ => {
            if interval.take().is_some() {
                info!("Countdown stopped");
            }
        }
    }
    *current = next;
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        persistence::Persistence,
        state::TimerSettings,
    };
    use tokio::time::sleep;

    fn app() -> Arc<AppState> {
        Arc::new(AppState::new(
            0,
            "127.0.0.1".to_string(),
            Persistence::in_memory(),
        ))
    }

    fn times(app: &AppState) -> Vec<i64> {
        app.get_game_state()
            .unwrap()
            .players
            .iter()
            .map(|p| p.time_remaining)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_down_once_per_second() {
        let app = app();
        let handle = spawn_tick_timer(Arc::clone(&app));

        app.start_game().unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(times(&app), vec![30, 30], "starts paused");

        app.resume_game().unwrap();
        sleep(Duration::from_millis(5500)).await;
        assert_eq!(times(&app), vec![25, 30]);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_cancels_and_resume_rearms() {
        let app = app();
        let handle = spawn_tick_timer(Arc::clone(&app));

        app.start_game().unwrap();
        app.resume_game().unwrap();
        sleep(Duration::from_millis(2500)).await;
        assert_eq!(times(&app), vec![28, 30]);

        app.pause_game().unwrap();
        sleep(Duration::from_secs(10)).await;
        assert_eq!(times(&app), vec![28, 30]);

        app.resume_game().unwrap();
        sleep(Duration::from_millis(2600)).await;
        assert_eq!(times(&app), vec![26, 30]);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_toggles_never_double_decrement() {
        let app = app();
        let handle = spawn_tick_timer(Arc::clone(&app));

        app.start_game().unwrap();
        for _ in 0..5 {
            app.resume_game().unwrap();
            tokio::task::yield_now().await;
            app.pause_game().unwrap();
            tokio::task::yield_now().await;
        }
        app.resume_game().unwrap();
        sleep(Duration::from_millis(3500)).await;

        assert_eq!(times(&app), vec![27, 30]);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_change_restarts_the_second() {
        let app = app();
        let handle = spawn_tick_timer(Arc::clone(&app));

        app.start_game().unwrap();
        app.resume_game().unwrap();
        sleep(Duration::from_millis(1500)).await;
        assert_eq!(times(&app), vec![29, 30]);

        app.end_turn().unwrap();
        sleep(Duration::from_millis(700)).await;
        assert_eq!(times(&app), vec![29, 40]);

        sleep(Duration::from_millis(500)).await;
        assert_eq!(times(&app), vec![29, 39]);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_keeps_counting_into_overtime() {
        let app = app();
        app.update_settings(TimerSettings {
            initial_time: 1,
            bonus_time: 0,
        })
        .unwrap();
        let handle = spawn_tick_timer(Arc::clone(&app));

        app.start_game().unwrap();
        app.handle_continue().unwrap();
        sleep(Duration::from_millis(4500)).await;

        assert_eq!(times(&app), vec![-3, 1]);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_stops_countdown() {
        let app = app();
        let handle = spawn_tick_timer(Arc::clone(&app));

        app.start_game().unwrap();
        app.resume_game().unwrap();
        sleep(Duration::from_millis(1500)).await;
        app.reset_game().unwrap();
        sleep(Duration::from_secs(5)).await;

        assert_eq!(times(&app), vec![30, 30]);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_picks_up_already_running_game() {
        let app = app();
        app.start_game().unwrap();
        app.resume_game().unwrap();

        let handle = spawn_tick_timer(Arc::clone(&app));
        sleep(Duration::from_millis(2500)).await;

        assert_eq!(times(&app), vec![28, 30]);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume_back_to_back_restarts_the_second() {
        let app = app();
        let handle = spawn_tick_timer(Arc::clone(&app));

        app.start_game().unwrap();
        app.resume_game().unwrap();
        sleep(Duration::from_millis(900)).await;

        app.pause_game().unwrap();
        app.resume_game().unwrap();
        sleep(Duration::from_millis(200)).await;
        assert_eq!(times(&app), vec![30, 30]);

        sleep(Duration::from_millis(900)).await;
        assert_eq!(times(&app), vec![29, 30]);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_away_and_back_restarts_the_second() {
        let app = app();
        let handle = spawn_tick_timer(Arc::clone(&app));

        app.start_game().unwrap();
        app.resume_game().unwrap();
        sleep(Duration::from_millis(900)).await;

        app.handle_player_click(1).unwrap();
        app.handle_player_click(0).unwrap();
        sleep(Duration::from_millis(200)).await;
        assert_eq!(times(&app), vec![40, 40]);

        sleep(Duration::from_millis(900)).await;
        assert_eq!(times(&app), vec![39, 40]);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_state_is_dropped() {
        let app = app();
        app.start_game().unwrap();
        app.resume_game().unwrap();
        let handle = spawn_tick_timer(Arc::clone(&app));
        sleep(Duration::from_millis(1500)).await;

        drop(app);
        let finished = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert!(matches!(finished, Ok(Ok(()))));
    }
}
