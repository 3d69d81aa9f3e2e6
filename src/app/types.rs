//! Interactive puzzle screen state.

use crate::puzzle::{ChessRules, PuzzleSession, Square};

/// Most feedback lines kept for display.
pub const MAX_FEEDBACK: usize = 6;

/// Input actions for the puzzle screen (UI-agnostic).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PuzzleInput {
    Char(char),
    Backspace,
    Submit, // Enter - submit typed move
    Up,
    Down,
    Left,
    Right,
    Pick,   // Space - pick from/to square under the cursor
    Cancel, // Esc - clear selection, then input line
    Quit,   // Ctrl-Q / Ctrl-C
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub text: String,
    pub kind: FeedbackKind,
}

/// How the session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Solved,
    Quit,
    /// The AI agent exited; carries its status line.
    AgentFinished(String),
    /// A collaborator failed mid-session.
    Failed(String),
}

/// Active puzzle screen. Owns the session; the agent is passed in separately.
#[derive(Debug, Clone)]
pub struct PuzzleApp {
    pub session: PuzzleSession<ChessRules>,

    /// Side the user plays (side to move in the start position).
    pub player_color: chess::Color,
    pub reveal_expected: bool,

    // Move entry
    pub input: String,
    pub cursor: Square,
    pub selected_square: Option<Square>,

    // Feedback
    pub feedback: Vec<Feedback>,
    pub last_outcome: Option<String>,

    pub session_end: Option<SessionEnd>,
}

impl PuzzleApp {
    pub fn new(session: PuzzleSession<ChessRules>, reveal_expected: bool) -> Self {
        let player_color = session.current_position().side_to_move();
        let cursor = match player_color {
            chess::Color::White => (4, 1),
            chess::Color::Black => (4, 6),
        };

        Self {
            session,
            player_color,
            reveal_expected,
            input: String::new(),
            cursor,
            selected_square: None,
            feedback: Vec::new(),
            last_outcome: None,
            session_end: None,
        }
    }

    /// Board is drawn from Black's side when the user plays Black.
    pub fn is_flipped(&self) -> bool {
        self.player_color == chess::Color::Black
    }

    /// Move the cursor in screen directions; respects board orientation.
    pub fn move_cursor(&mut self, dx: i8, dy: i8) {
        let (dx, dy) = if self.is_flipped() { (-dx, -dy) } else { (dx, dy) };
        let new_x = (self.cursor.0 as i8 + dx).clamp(0, 7) as u8;
        let new_y = (self.cursor.1 as i8 + dy).clamp(0, 7) as u8;
        self.cursor = (new_x, new_y);
    }

    pub fn push_feedback(&mut self, text: impl Into<String>, kind: FeedbackKind) {
        let text = text.into();
        log::info!("{}", text);
        self.last_outcome = Some(text.clone());
        self.feedback.push(Feedback { text, kind });
        if self.feedback.len() > MAX_FEEDBACK {
            let excess = self.feedback.len() - MAX_FEEDBACK;
            self.feedback.drain(..excess);
        }
    }

    pub fn is_over(&self) -> bool {
        self.session_end.is_some()
    }
}
