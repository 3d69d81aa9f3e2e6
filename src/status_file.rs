//! JSON status snapshots for an external agent to follow the session.

use crate::agent::AgentStatus;
use crate::puzzle::{ChessRules, PuzzleSession};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub puzzle_id: Option<String>,
    pub fen: String,
    pub cursor: usize,
    pub total: usize,
    pub solved: bool,
    /// "white" or "black"; absent once solved.
    pub expected_side: Option<&'static str>,
    pub last_outcome: Option<String>,
    pub agent_status: String,
    pub updated_at: String,
}

impl StatusSnapshot {
    pub fn capture(
        session: &PuzzleSession<ChessRules>,
        last_outcome: Option<&str>,
        agent: &AgentStatus,
    ) -> Self {
        let expected_side = if session.is_solved() {
            None
        } else {
            Some(side_name(session.current_position().side_to_move()))
        };

        Self {
            puzzle_id: session.puzzle().id.clone(),
            fen: session.current_fen(),
            cursor: session.cursor(),
            total: session.solution_len(),
            solved: session.is_solved(),
            expected_side,
            last_outcome: last_outcome.map(str::to_string),
            agent_status: agent.to_string(),
            updated_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub fn side_name(color: chess::Color) -> &'static str {
    match color {
        chess::Color::White => "white",
        chess::Color::Black => "black",
    }
}

/// Writes snapshots to the `--status-file` path, or does nothing without one.
#[derive(Debug, Clone, Default)]
pub struct StatusReporter {
    path: Option<PathBuf>,
}

impl StatusReporter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    pub fn report(&self, snapshot: &StatusSnapshot) -> io::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}
