//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::persistence::STORAGE_KEY;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "board-game-timer")]
#[command(about = "Per-player countdown clocks for board games, served over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Directory holding the saved game
    #[arg(short, long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Where the snapshot file lives
    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join(format!("{}.json", STORAGE_KEY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["board-game-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.log_level(), "info");
        assert_eq!(config.state_file(), PathBuf::from("./board-game-timer-state.json"));
    }

    #[test]
    fn test_flags() {
        let config =
            Config::try_parse_from(["board-game-timer", "-p", "8080", "-d", "/var/lib/bgt", "-v"])
                .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.log_level(), "debug");
        assert_eq!(
            config.state_file(),
            PathBuf::from("/var/lib/bgt/board-game-timer-state.json")
        );
    }
}
