//! Key handling for the puzzle screen.

use crate::agent::AgentSession;
use crate::app::{process_input, PuzzleApp, PuzzleInput, SessionEnd};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Result of handling a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputResult {
    /// Continue the main loop normally.
    Continue,
    /// Leave the main loop.
    Quit,
}

/// Map a key event to a puzzle input.
pub fn map_key(key: KeyEvent) -> PuzzleInput {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => PuzzleInput::Quit,
            _ => PuzzleInput::Other,
        };
    }

    match key.code {
        KeyCode::Up => PuzzleInput::Up,
        KeyCode::Down => PuzzleInput::Down,
        KeyCode::Left => PuzzleInput::Left,
        KeyCode::Right => PuzzleInput::Right,
        KeyCode::Char(' ') => PuzzleInput::Pick,
        KeyCode::Char(c) => PuzzleInput::Char(c),
        KeyCode::Backspace => PuzzleInput::Backspace,
        KeyCode::Enter => PuzzleInput::Submit,
        KeyCode::Esc => PuzzleInput::Cancel,
        _ => PuzzleInput::Other,
    }
}

pub fn handle_key(key: KeyEvent, app: &mut PuzzleApp, agent: &mut AgentSession) -> InputResult {
    // Windows reports both press and release.
    if key.kind == KeyEventKind::Release {
        return InputResult::Continue;
    }

    // Finished session: any key leaves.
    if app.is_over() {
        return InputResult::Quit;
    }

    process_input(app, map_key(key), agent);

    match &app.session_end {
        None => InputResult::Continue,
        Some(end) => {
            // The agent does not outlive the session.
            agent.terminate();
            match end {
                SessionEnd::Quit | SessionEnd::AgentFinished(_) => InputResult::Quit,
                // Keep the result banner up until the next key.
                SessionEnd::Solved | SessionEnd::Failed(_) => InputResult::Continue,
            }
        }
    }
}
