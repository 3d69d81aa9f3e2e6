//! Interactive puzzle screen: the host-side state that drives a puzzle session.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
