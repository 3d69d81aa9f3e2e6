//! Puzzle sources: where the day's puzzle comes from.
//!
//! Every source converts its payload into a validated [`Puzzle`] at the
//! boundary, so the session never sees untyped data.

pub mod file;
pub mod lichess;

pub use file::FileSource;
pub use lichess::LichessDaily;

use crate::puzzle::{Puzzle, PuzzleError};

/// Why a source could not supply a puzzle.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// Network, HTTP or I/O failure.
    #[error("puzzle unavailable: {0}")]
    Unavailable(String),

    #[error("invalid puzzle data format: {0}")]
    InvalidFormat(String),

    #[error("puzzle data is incomplete: missing {0}")]
    Incomplete(&'static str),

    #[error("cannot replay game PGN at ply {ply} ({token:?}): {reason}")]
    BadPgn {
        ply: usize,
        token: String,
        reason: String,
    },

    #[error(transparent)]
    Malformed(#[from] PuzzleError),
}

/// Anything that can hand the host a puzzle to load.
pub trait PuzzleSource {
    fn fetch(&self) -> Result<Puzzle, SourceError>;

    /// Short label used in logs and error messages.
    fn describe(&self) -> String;
}
