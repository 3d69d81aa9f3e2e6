//! Puzzle core: move encoding, the chess oracle seam, and the session state machine.

pub mod logic;
pub mod oracle;
pub mod types;

pub use logic::*;
pub use oracle::*;
pub use types::*;
