//! Lichess daily puzzle source.
//!
//! Fetches `/api/puzzle/daily` and rebuilds the puzzle's start position by
//! replaying the source game's PGN up to the puzzle's first move.

use super::{PuzzleSource, SourceError};
use crate::puzzle::Puzzle;
use serde::Deserialize;
use std::time::Duration;

pub const DAILY_PUZZLE_URL: &str = "https://lichess.org/api/puzzle/daily";

const USER_AGENT: &str = concat!("chess-puzzle-cli/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyPuzzleResponse {
    pub game: Option<LichessGame>,
    pub puzzle: Option<LichessPuzzle>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LichessGame {
    pub id: Option<String>,
    pub pgn: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LichessPuzzle {
    pub id: Option<String>,
    #[serde(rename = "initialPly")]
    pub initial_ply: Option<usize>,
    #[serde(default)]
    pub solution: Vec<String>,
    pub rating: Option<u32>,
    #[serde(default)]
    pub themes: Vec<String>,
    /// Some mirrors include the start position directly.
    pub fen: Option<String>,
}

/// The daily puzzle endpoint.
#[derive(Debug, Clone)]
pub struct LichessDaily {
    url: String,
}

impl LichessDaily {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    fn fetch_response(&self) -> Result<DailyPuzzleResponse, SourceError> {
        let response: DailyPuzzleResponse = ureq::get(&self.url)
            .set("User-Agent", USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .call()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?
            .into_json()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(response)
    }
}

impl Default for LichessDaily {
    fn default() -> Self {
        Self::new(DAILY_PUZZLE_URL)
    }
}

impl PuzzleSource for LichessDaily {
    fn fetch(&self) -> Result<Puzzle, SourceError> {
        log::info!("Fetching daily puzzle from {}", self.url);
        let response = self.fetch_response()?;
        puzzle_from_response(response)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Convert a daily-puzzle payload into a validated [`Puzzle`].
pub fn puzzle_from_response(response: DailyPuzzleResponse) -> Result<Puzzle, SourceError> {
    let info = response
        .puzzle
        .ok_or_else(|| SourceError::InvalidFormat("missing puzzle".to_string()))?;
    if info.solution.is_empty() {
        return Err(SourceError::Incomplete("solution"));
    }

    let start_fen = match info.fen {
        Some(fen) => fen,
        None => {
            let game = response
                .game
                .ok_or_else(|| SourceError::InvalidFormat("missing game".to_string()))?;
            let pgn = game.pgn.ok_or(SourceError::Incomplete("pgn"))?;
            let initial_ply = info.initial_ply.ok_or(SourceError::Incomplete("initialPly"))?;
            // initialPly is the index of the last game move before the puzzle starts.
            replay_pgn(&pgn, initial_ply + 1)?.to_string()
        }
    };

    let mut puzzle = Puzzle::new(start_fen, info.solution.as_slice())?;
    puzzle.id = info.id;
    puzzle.rating = info.rating;
    puzzle.themes = info.themes;
    Ok(puzzle)
}

/// Split movetext into SAN tokens, dropping move numbers, results and annotations.
pub fn san_tokens(pgn: &str) -> Vec<&str> {
    pgn.split_whitespace()
        .filter(|tok| !matches!(*tok, "1-0" | "0-1" | "1/2-1/2" | "*"))
        .map(|tok| {
            tok.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
                .trim_end_matches(['+', '#', '!', '?'])
        })
        .filter(|tok| !tok.is_empty())
        .collect()
}

/// Play the first `plies` SAN moves of `pgn` from the standard start position.
pub fn replay_pgn(pgn: &str, plies: usize) -> Result<chess::Board, SourceError> {
    let tokens = san_tokens(pgn);
    let mut board = chess::Board::default();

    for ply in 0..plies {
        let token = tokens.get(ply).ok_or_else(|| SourceError::BadPgn {
            ply,
            token: String::new(),
            reason: format!("game has only {} plies", tokens.len()),
        })?;
        let mv = chess::ChessMove::from_san(&board, token).map_err(|e| SourceError::BadPgn {
            ply,
            token: token.to_string(),
            reason: format!("{:?}", e),
        })?;
        board = board.make_move_new(mv);
    }

    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response() -> DailyPuzzleResponse {
        serde_json::from_str(
            r#"{
                "game": {"id": "g1", "pgn": "1. d4 Nf6 2. c4 e6 3. Nc3 Bb4"},
                "puzzle": {"id": "p1", "initialPly": 2, "solution": ["c7c5", "d7d5"],
                           "rating": 1500, "themes": ["opening", "short"]}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_san_tokens_strip_numbers_and_results() {
        assert_eq!(
            san_tokens("1. e4 e5 2.Nf3 Nc6 3. Bb5+ a6 4. Bxc6!? 1-0"),
            vec!["e4", "e5", "Nf3", "Nc6", "Bb5", "a6", "Bxc6"]
        );
        assert_eq!(
            san_tokens("e4 e5 Qh5 Nc6 Bc4 Nf6 Qxf7#"),
            vec!["e4", "e5", "Qh5", "Nc6", "Bc4", "Nf6", "Qxf7"]
        );
    }

    #[test]
    fn test_replay_pgn_counts_plies() {
        let board = replay_pgn("1. d4 Nf6 2. c4", 3).unwrap();
        assert_eq!(board.side_to_move(), chess::Color::Black);
        assert_eq!(board.piece_on(chess::Square::C4), Some(chess::Piece::Pawn));
        assert_eq!(replay_pgn("e4", 0).unwrap(), chess::Board::default());
    }

    #[test]
    fn test_replay_pgn_too_short() {
        let err = replay_pgn("1. e4 e5", 3).unwrap_err();
        assert!(matches!(err, SourceError::BadPgn { ply: 2, .. }));
    }

    #[test]
    fn test_replay_pgn_bad_san() {
        let err = replay_pgn("1. e4 Ke3", 2).unwrap_err();
        assert!(matches!(err, SourceError::BadPgn { ply: 1, .. }));
    }

    #[test]
    fn test_response_to_puzzle() {
        let puzzle = puzzle_from_response(sample_response()).unwrap();
        assert_eq!(puzzle.id.as_deref(), Some("p1"));
        assert_eq!(puzzle.rating, Some(1500));
        assert_eq!(puzzle.themes, vec!["opening", "short"]);
        assert_eq!(puzzle.len(), 2);
        assert_eq!(puzzle.solution()[0].to_string(), "c7c5");

        // Position after d4 Nf6 c4: black to move.
        let board: chess::Board = puzzle.start_fen().parse().unwrap();
        assert_eq!(board.side_to_move(), chess::Color::Black);
    }

    #[test]
    fn test_response_with_direct_fen() {
        let response: DailyPuzzleResponse = serde_json::from_str(
            r#"{"puzzle": {"id": "test_id",
                "fen": "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                "solution": ["e2e4", "e7e5"]}}"#,
        )
        .unwrap();
        let puzzle = puzzle_from_response(response).unwrap();
        assert_eq!(
            puzzle.start_fen(),
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1"
        );
        assert_eq!(puzzle.id.as_deref(), Some("test_id"));
    }

    #[test]
    fn test_response_missing_sections() {
        let err = puzzle_from_response(DailyPuzzleResponse::default()).unwrap_err();
        assert!(matches!(err, SourceError::InvalidFormat(_)));

        let mut no_game = sample_response();
        no_game.game = None;
        assert!(matches!(
            puzzle_from_response(no_game),
            Err(SourceError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_response_incomplete() {
        let mut no_pgn = sample_response();
        no_pgn.game.as_mut().unwrap().pgn = None;
        assert!(matches!(
            puzzle_from_response(no_pgn),
            Err(SourceError::Incomplete("pgn"))
        ));

        let mut no_ply = sample_response();
        no_ply.puzzle.as_mut().unwrap().initial_ply = None;
        assert!(matches!(
            puzzle_from_response(no_ply),
            Err(SourceError::Incomplete("initialPly"))
        ));

        let mut no_solution = sample_response();
        no_solution.puzzle.as_mut().unwrap().solution.clear();
        assert!(matches!(
            puzzle_from_response(no_solution),
            Err(SourceError::Incomplete("solution"))
        ));
    }

    #[test]
    fn test_response_with_bad_solution_move() {
        let mut bad = sample_response();
        bad.puzzle.as_mut().unwrap().solution = vec!["c7c5".into(), "Nf3".into()];
        assert!(matches!(
            puzzle_from_response(bad),
            Err(SourceError::Malformed(_))
        ));
    }

    #[test]
    fn test_default_url() {
        assert_eq!(LichessDaily::default().describe(), DAILY_PUZZLE_URL);
    }
}
