pub mod game_common;
pub mod puzzle_scene;

use crate::app::PuzzleApp;
use ratatui::Frame;

/// Host-side state shown next to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostStatus {
    /// Agent status line, e.g. "AI Agent: Running (PID: 42)".
    pub agent: String,
    /// Clock text in MM:SS, when a clock file is configured.
    pub clock: Option<String>,
}

/// Main UI drawing function.
pub fn draw_ui(frame: &mut Frame, app: &PuzzleApp, host: &HostStatus) {
    let area = frame.size();
    puzzle_scene::render_puzzle_scene(frame, area, app, host);
}
