//! chess-puzzle-cli - daily chess puzzle trainer for the terminal.
//!
//! The puzzle core (`puzzle`) is independent of the terminal; the host pieces
//! (`app`, `input`, `ui`, `agent`, `clock`, `status_file`) drive it.

pub mod agent;
pub mod app;
pub mod clock;
pub mod input;
pub mod puzzle;
pub mod source;
pub mod status_file;
pub mod ui;
pub mod utils;
