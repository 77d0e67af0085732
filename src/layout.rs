//! Display helpers for front ends: clock formatting and tile grid sizing

use serde::Serialize;

use crate::state::Player;

/// Clocks at or below this many seconds (and above zero) count as running low
pub const LOW_TIME_THRESHOLD: i64 = 60;

/// Format seconds as `m:ss`, with a leading `-` in overtime
pub fn format_clock(seconds: i64) -> String {
    let sign = if seconds < 0 { "-" } else { "" };
    let abs = seconds.unsigned_abs();
    format!("{}{}:{:02}", sign, abs / 60, abs % 60)
}

/// Fraction of the clock left, for progress rings. Full while in overtime.
pub fn progress(player: &Player) -> f64 {
    if player.is_overtime() {
        return 1.0;
    }
    if player.max_time <= 0 {
        return 0.0;
    }
    (player.time_remaining as f64 / player.max_time as f64).clamp(0.0, 1.0)
}

/// Tile edge length and column count for laying out player tiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GridLayout {
    pub tile_size: f64,
    pub columns: usize,
}

/// Find the largest square tile that fits `count` tiles into `width` x `height`.
///
/// Every row count from 1 to `count` is tried; ties go to the layout with
/// more rows.
pub fn square_grid(width: f64, height: f64, count: usize) -> GridLayout {
    match count {
        0 => {
            return GridLayout {
                tile_size: 0.0,
                columns: 0,
            }
        }
        1 => {
            return GridLayout {
                tile_size: width.min(height),
                columns: 1,
            }
        }
        _ => {}
    }

    let mut best = GridLayout {
        tile_size: 0.0,
        columns: 0,
    };
    for rows in 1..=count {
        let columns = count.div_ceil(rows);
        let tile_size = (width / columns as f64).min(height / rows as f64);
        if tile_size >= best.tile_size {
            best = GridLayout { tile_size, columns };
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(300), "5:00");
        assert_eq!(format_clock(-65), "-1:05");
        assert_eq!(format_clock(3725), "62:05");
    }

    #[test]
    fn test_progress() {
        let mut player = Player::new("p", "P", 100);
        assert_eq!(progress(&player), 1.0);

        player.time_remaining = 25;
        assert_eq!(progress(&player), 0.25);

        player.time_remaining = -1;
        assert_eq!(progress(&player), 1.0);

        let empty = Player::new("q", "Q", 0);
        assert_eq!(progress(&empty), 0.0);
    }

    #[test]
    fn test_square_grid_edge_cases() {
        assert_eq!(square_grid(400.0, 300.0, 0).columns, 0);
        assert_eq!(
            square_grid(400.0, 300.0, 1),
            GridLayout {
                tile_size: 300.0,
                columns: 1
            }
        );
    }

    #[test]
    fn test_square_grid_portrait_stacks_players() {
        let layout = square_grid(400.0, 800.0, 2);
        assert_eq!(layout.columns, 1);
        assert_eq!(layout.tile_size, 400.0);
    }

    #[test]
    fn test_square_grid_landscape_spreads_players() {
        let layout = square_grid(800.0, 400.0, 2);
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.tile_size, 400.0);
    }

    #[test]
    fn test_square_grid_four_in_a_square() {
        let layout = square_grid(600.0, 600.0, 4);
        assert_eq!(layout.columns, 2);
        assert_eq!(layout.tile_size, 300.0);
    }
}
