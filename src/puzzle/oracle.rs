//! Chess rules oracle: the only way the puzzle core touches chess rules.
//!
//! The session never inspects positions itself. It asks an oracle to parse the
//! start position and to play solution moves, so any rules implementation can
//! be swapped in. [`ChessRules`] is the production oracle, backed by the
//! `chess` crate.

use super::types::{PromotionPiece, Square, UciMove};
use std::fmt;
use std::str::FromStr;

/// Failures reported by an oracle.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("invalid position {fen:?}: {reason}")]
    InvalidPosition { fen: String, reason: String },

    #[error("move {mv} is not playable: {reason}")]
    InvalidMove { mv: UciMove, reason: String },
}

/// Capability to validate and apply moves on some position representation.
pub trait ChessOracle {
    type Position: Clone + PartialEq + fmt::Debug;

    /// Parse a FEN string into a position.
    fn parse_position(&self, fen: &str) -> Result<Self::Position, OracleError>;

    /// Play `mv` on `position`, returning the successor position.
    fn apply_move(
        &self,
        position: &Self::Position,
        mv: &UciMove,
    ) -> Result<Self::Position, OracleError>;

    /// Encode a position back to FEN.
    fn fen(&self, position: &Self::Position) -> String;
}

/// Oracle backed by the `chess` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChessRules;

impl ChessRules {
    pub fn to_chess_square(square: Square) -> chess::Square {
        chess::Square::make_square(
            chess::Rank::from_index(square.1 as usize),
            chess::File::from_index(square.0 as usize),
        )
    }

    pub fn to_chess_move(mv: &UciMove) -> chess::ChessMove {
        let promotion = mv.promotion.map(|p| match p {
            PromotionPiece::Queen => chess::Piece::Queen,
            PromotionPiece::Rook => chess::Piece::Rook,
            PromotionPiece::Bishop => chess::Piece::Bishop,
            PromotionPiece::Knight => chess::Piece::Knight,
        });
        chess::ChessMove::new(
            Self::to_chess_square(mv.from),
            Self::to_chess_square(mv.to),
            promotion,
        )
    }
}

impl ChessOracle for ChessRules {
    type Position = chess::Board;

    fn parse_position(&self, fen: &str) -> Result<chess::Board, OracleError> {
        chess::Board::from_str(fen).map_err(|e| OracleError::InvalidPosition {
            fen: fen.to_string(),
            reason: format!("{:?}", e),
        })
    }

    fn apply_move(
        &self,
        position: &chess::Board,
        mv: &UciMove,
    ) -> Result<chess::Board, OracleError> {
        let chess_move = Self::to_chess_move(mv);
        // make_move_new assumes a legal move.
        if !position.legal(chess_move) {
            return Err(OracleError::InvalidMove {
                mv: *mv,
                reason: "illegal in this position".to_string(),
            });
        }
        Ok(position.make_move_new(chess_move))
    }

    fn fen(&self, position: &chess::Board) -> String {
        position.to_string()
    }
}
