//! User configuration stored in ~/.chess-puzzle-cli/config.json.

use super::persistence::{app_path, load_json_or_default, save_json};
use crate::source::lichess::DAILY_PUZZLE_URL;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Daily puzzle endpoint.
    pub puzzle_url: String,
    /// Default log filter when RUST_LOG is unset.
    pub log_level: String,
    /// Show the expected move after a wrong answer.
    pub reveal_expected_move: bool,
    /// Event poll interval for the UI loop.
    pub tick_rate_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            puzzle_url: DAILY_PUZZLE_URL.to_string(),
            log_level: "info".to_string(),
            reveal_expected_move: true,
            tick_rate_ms: 100,
        }
    }
}

impl AppConfig {
    /// Load the config from the app directory, writing defaults on first run.
    pub fn load() -> io::Result<Self> {
        let path = app_path(CONFIG_FILE)?;
        let exists = path.exists();
        let config = Self::load_from(&path);
        if !exists {
            save_json(&path, &config)?;
        }
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Self {
        load_json_or_default(path)
    }
}
