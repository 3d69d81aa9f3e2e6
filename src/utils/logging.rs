//! File-backed logging. The terminal belongs to the UI, so log lines go to
//! ~/.chess-puzzle-cli/chess-puzzle.log instead of stderr.

use super::persistence::app_path;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;

pub const LOG_FILE: &str = "chess-puzzle.log";

/// Install the global logger. `RUST_LOG` overrides `default_level`.
pub fn init_logging(default_level: &str) -> io::Result<PathBuf> {
    let path = app_path(LOG_FILE)?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .map_err(io::Error::other)?;

    Ok(path)
}
