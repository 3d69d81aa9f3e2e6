//! Puzzle data structures: move encoding, puzzle definition, outcomes and errors.

use std::fmt;
use std::str::FromStr;

/// A board square as (file, rank), both 0-7. File 0 = a, rank 0 = rank 1.
pub type Square = (u8, u8);

/// Piece a pawn may promote to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionPiece {
    Queen,
    Rook,
    Bishop,
    Knight,
}

impl PromotionPiece {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'q' => Some(Self::Queen),
            'r' => Some(Self::Rook),
            'b' => Some(Self::Bishop),
            'n' => Some(Self::Knight),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Self::Queen => 'q',
            Self::Rook => 'r',
            Self::Bishop => 'b',
            Self::Knight => 'n',
        }
    }
}

/// Why a move string could not be parsed.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveParseError {
    #[error("expected 4 or 5 characters, got {0}")]
    BadLength(usize),

    #[error("invalid square {0:?}")]
    BadSquare(String),

    #[error("invalid promotion piece {0:?}")]
    BadPromotion(char),
}

/// A move in UCI long algebraic form, e.g. `e2e4` or `e7e8q`.
///
/// Parsing is purely structural: it knows nothing about the position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UciMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PromotionPiece>,
}

/// Parse an algebraic square like `e4` into (file, rank).
pub fn parse_square(text: &str) -> Option<Square> {
    let mut chars = text.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    if !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some((file as u8 - b'a', rank as u8 - b'1'))
}

/// Render (file, rank) as an algebraic square like `e4`.
pub fn square_name(square: Square) -> String {
    format!("{}{}", (b'a' + square.0) as char, square.1 + 1)
}

impl FromStr for UciMove {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.is_ascii() {
            return Err(MoveParseError::BadLength(s.chars().count()));
        }
        if s.len() != 4 && s.len() != 5 {
            return Err(MoveParseError::BadLength(s.len()));
        }

        let from = parse_square(&s[0..2])
            .ok_or_else(|| MoveParseError::BadSquare(s[0..2].into()))?;
        let to = parse_square(&s[2..4])
            .ok_or_else(|| MoveParseError::BadSquare(s[2..4].into()))?;
        let promotion = s[4..]
            .chars()
            .next()
            .map(|c| PromotionPiece::from_char(c).ok_or(MoveParseError::BadPromotion(c)))
            .transpose()?;

        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

impl fmt::Display for UciMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", square_name(self.from), square_name(self.to))?;
        if let Some(p) = self.promotion {
            write!(f, "{}", p.to_char())?;
        }
        Ok(())
    }
}

/// A puzzle definition: start position plus the full solution line.
///
/// The solution alternates sides starting with the side to move in `start_fen`.
/// Built once at the source boundary and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    start_fen: String,
    solution: Vec<UciMove>,
    pub id: Option<String>,
    pub rating: Option<u32>,
    pub themes: Vec<String>,
}

impl Puzzle {
    /// Build a puzzle, rejecting an empty solution or unparseable solution moves.
    ///
    /// The start position is only checked when the puzzle is loaded into a
    /// session, since that needs an oracle.
    pub fn new<S: AsRef<str>>(
        start_fen: impl Into<String>,
        moves: &[S],
    ) -> Result<Self, PuzzleError> {
        if moves.is_empty() {
            return Err(PuzzleError::MalformedPuzzle(
                "solution has no moves".to_string(),
            ));
        }

        let solution = moves
            .iter()
            .map(|m| {
                let text = m.as_ref();
                text.parse::<UciMove>().map_err(|e| {
                    PuzzleError::MalformedPuzzle(format!("solution move {:?}: {}", text, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            start_fen: start_fen.into(),
            solution,
            id: None,
            rating: None,
            themes: Vec::new(),
        })
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn solution(&self) -> &[UciMove] {
        &self.solution
    }

    pub fn len(&self) -> usize {
        self.solution.len()
    }

    /// Always false for a constructed puzzle.
    pub fn is_empty(&self) -> bool {
        self.solution.is_empty()
    }
}

/// Where the session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    InProgress,
    Solved,
}

/// Result of submitting a move (or applying the scripted reply).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move matched and was played. `solved` is true after the last move.
    Accepted { solved: bool },
    /// The move did not match. State is unchanged.
    Incorrect { expected: UciMove },
    /// The text was not a move. State is unchanged.
    MalformedInput,
    /// The puzzle is already solved. State is unchanged.
    AlreadySolved,
}

impl MoveOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

/// Errors raised by the puzzle core.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    /// Bad puzzle data: start position, empty solution, or unparseable solution move.
    #[error("malformed puzzle: {0}")]
    MalformedPuzzle(String),

    /// The oracle refused a move taken from the solution line.
    #[error("chess rules rejected solution move {mv} at {fen}: {reason}")]
    OracleRejected {
        mv: UciMove,
        fen: String,
        reason: String,
    },
}
