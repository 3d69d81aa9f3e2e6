//! Puzzle session state machine: move validation, scripted replies, solved detection.

use super::oracle::ChessOracle;
use super::types::{MoveOutcome, Puzzle, PuzzleError, SessionState, UciMove};

/// One active puzzle. Owns the position and the cursor into the solution line.
///
/// Invariant: `position` is the start position advanced by exactly the first
/// `cursor` solution moves. Only [`submit_move`](Self::submit_move) and
/// [`apply_scripted_reply`](Self::apply_scripted_reply) change it.
#[derive(Debug, Clone)]
pub struct PuzzleSession<O: ChessOracle> {
    oracle: O,
    puzzle: Puzzle,
    position: O::Position,
    cursor: usize,
}

impl<O: ChessOracle> PuzzleSession<O> {
    /// Load a puzzle, parsing its start position through the oracle.
    pub fn load(oracle: O, puzzle: Puzzle) -> Result<Self, PuzzleError> {
        if puzzle.is_empty() {
            return Err(PuzzleError::MalformedPuzzle(
                "solution has no moves".to_string(),
            ));
        }
        let position = oracle
            .parse_position(puzzle.start_fen())
            .map_err(|e| PuzzleError::MalformedPuzzle(e.to_string()))?;

        log::info!(
            "Puzzle loaded ({} moves). FEN: {}",
            puzzle.len(),
            puzzle.start_fen()
        );

        Ok(Self {
            oracle,
            puzzle,
            position,
            cursor: 0,
        })
    }

    /// Validate a user-entered move against the solution and play it if it matches.
    ///
    /// Only the `Accepted` path mutates state. An `Err` means the oracle
    /// refused a move from the solution line itself.
    pub fn submit_move(&mut self, input: &str) -> Result<MoveOutcome, PuzzleError> {
        let expected = match self.expected_move() {
            Some(m) => *m,
            None => return Ok(MoveOutcome::AlreadySolved),
        };

        let mv = match input.trim().parse::<UciMove>() {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Rejected move text {:?}: {}", input, e);
                return Ok(MoveOutcome::MalformedInput);
            }
        };

        if mv != expected {
            log::debug!("Incorrect move {}, expected {}", mv, expected);
            return Ok(MoveOutcome::Incorrect { expected });
        }

        self.advance(expected)
    }

    /// Play the next solution move (the opponent's reply) without user input.
    pub fn apply_scripted_reply(&mut self) -> Result<MoveOutcome, PuzzleError> {
        match self.expected_move() {
            Some(m) => {
                let mv = *m;
                self.advance(mv)
            }
            None => Ok(MoveOutcome::AlreadySolved),
        }
    }

    fn advance(&mut self, mv: UciMove) -> Result<MoveOutcome, PuzzleError> {
        let next = self
            .oracle
            .apply_move(&self.position, &mv)
            .map_err(|e| PuzzleError::OracleRejected {
                mv,
                fen: self.oracle.fen(&self.position),
                reason: e.to_string(),
            })?;

        self.position = next;
        self.cursor += 1;

        let solved = self.is_solved();
        log::info!(
            "Played {} ({}/{}). FEN: {}",
            mv,
            self.cursor,
            self.puzzle.len(),
            self.current_fen()
        );
        Ok(MoveOutcome::Accepted { solved })
    }

    pub fn current_position(&self) -> &O::Position {
        &self.position
    }

    pub fn current_fen(&self) -> String {
        self.oracle.fen(&self.position)
    }

    pub fn is_solved(&self) -> bool {
        self.cursor == self.puzzle.len()
    }

    pub fn state(&self) -> SessionState {
        if self.is_solved() {
            SessionState::Solved
        } else {
            SessionState::InProgress
        }
    }

    /// The move the solution expects next, or `None` once solved.
    pub fn expected_move(&self) -> Option<&UciMove> {
        self.puzzle.solution().get(self.cursor)
    }

    /// The most recently played solution move.
    pub fn last_move(&self) -> Option<&UciMove> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.puzzle.solution().get(i))
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn solution_len(&self) -> usize {
        self.puzzle.len()
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::oracle::{ChessRules, OracleError};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    const MOVES: [&str; 4] = ["e2e4", "e7e5", "g1f3", "b8c6"];

    /// Oracle whose position is just the list of moves played so far.
    #[derive(Debug, Clone, Default)]
    struct ScriptOracle {
        reject: Option<UciMove>,
    }

    impl ChessOracle for ScriptOracle {
        type Position = Vec<String>;

        fn parse_position(&self, fen: &str) -> Result<Vec<String>, OracleError> {
            if fen.is_empty() {
                return Err(OracleError::InvalidPosition {
                    fen: fen.to_string(),
                    reason: "empty".to_string(),
                });
            }
            Ok(vec![fen.to_string()])
        }

        fn apply_move(
            &self,
            position: &Vec<String>,
            mv: &UciMove,
        ) -> Result<Vec<String>, OracleError> {
            if self.reject == Some(*mv) {
                return Err(OracleError::InvalidMove {
                    mv: *mv,
                    reason: "scripted".to_string(),
                });
            }
            let mut next = position.clone();
            next.push(mv.to_string());
            Ok(next)
        }

        fn fen(&self, position: &Vec<String>) -> String {
            position.join(" ")
        }
    }

    fn sample_puzzle() -> Puzzle {
        Puzzle::new(START_FEN, &MOVES).unwrap()
    }

    fn chess_session() -> PuzzleSession<ChessRules> {
        PuzzleSession::load(ChessRules, sample_puzzle()).unwrap()
    }

    fn script_session() -> PuzzleSession<ScriptOracle> {
        PuzzleSession::load(ScriptOracle::default(), sample_puzzle()).unwrap()
    }

    fn mv(s: &str) -> UciMove {
        s.parse().unwrap()
    }

    #[test]
    fn test_load_starts_in_progress() {
        let session = chess_session();
        assert_eq!(session.cursor(), 0);
        assert!(!session.is_solved());
        assert_eq!(session.state(), SessionState::InProgress);
        assert_eq!(session.current_position(), &chess::Board::default());
        assert_eq!(session.expected_move(), Some(&mv("e2e4")));
        assert_eq!(session.last_move(), None);
        assert_eq!(session.solution_len(), 4);
    }

    #[test]
    fn test_load_malformed_fen() {
        let puzzle = Puzzle::new("this is not a fen", &MOVES).unwrap();
        let result = PuzzleSession::load(ChessRules, puzzle);
        assert!(matches!(result, Err(PuzzleError::MalformedPuzzle(_))));
    }

    #[test]
    fn test_correct_move_advances() {
        let mut session = chess_session();
        let start = session.current_position().clone();

        let outcome = session.submit_move("e2e4").unwrap();
        assert_eq!(outcome, MoveOutcome::Accepted { solved: false });
        assert_eq!(session.cursor(), 1);
        assert_ne!(session.current_position(), &start);
        assert_eq!(session.last_move(), Some(&mv("e2e4")));
    }

    #[test]
    fn test_repeated_move_is_incorrect() {
        let mut session = chess_session();
        session.submit_move("e2e4").unwrap();
        let position = session.current_position().clone();

        let outcome = session.submit_move("e2e4").unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Incorrect {
                expected: mv("e7e5")
            }
        );
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.current_position(), &position);
    }

    #[test]
    fn test_wrong_first_move() {
        let mut session = chess_session();
        let start = session.current_position().clone();

        let outcome = session.submit_move("d2d4").unwrap();
        assert_eq!(
            outcome,
            MoveOutcome::Incorrect {
                expected: mv("e2e4")
            }
        );
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current_position(), &start);
    }

    #[test]
    fn test_full_solution_solves() {
        let mut session = chess_session();
        for (i, m) in MOVES.iter().enumerate() {
            let outcome = session.submit_move(m).unwrap();
            let last = i == MOVES.len() - 1;
            assert_eq!(outcome, MoveOutcome::Accepted { solved: last });
            assert_eq!(session.cursor(), i + 1);
        }
        assert!(session.is_solved());
        assert_eq!(session.state(), SessionState::Solved);
        assert_eq!(session.expected_move(), None);
        assert_eq!(session.submit_move("anything").unwrap(), MoveOutcome::AlreadySolved);
    }

    #[test]
    fn test_already_solved_leaves_state() {
        let mut session = script_session();
        for m in MOVES {
            session.submit_move(m).unwrap();
        }
        let position = session.current_position().clone();

        for input in ["e2e4", "b8c6", "", "garbage"] {
            assert_eq!(session.submit_move(input).unwrap(), MoveOutcome::AlreadySolved);
        }
        assert_eq!(
            session.apply_scripted_reply().unwrap(),
            MoveOutcome::AlreadySolved
        );
        assert_eq!(session.cursor(), 4);
        assert_eq!(session.current_position(), &position);
    }

    #[test]
    fn test_malformed_input_never_mutates() {
        let mut session = script_session();
        for input in ["", "e2", "xyzw", "e2e4e5", "E2E4", "exit"] {
            assert_eq!(session.submit_move(input).unwrap(), MoveOutcome::MalformedInput);
        }
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current_position(), &vec![START_FEN.to_string()]);
    }

    #[test]
    fn test_input_is_trimmed() {
        let mut session = script_session();
        assert_eq!(
            session.submit_move("  e2e4\n").unwrap(),
            MoveOutcome::Accepted { solved: false }
        );
    }

    #[test]
    fn test_promotion_must_match_exactly() {
        let puzzle = Puzzle::new("x", &["e7e8q", "a2a1"]).unwrap();
        let mut session = PuzzleSession::load(ScriptOracle::default(), puzzle).unwrap();

        assert_eq!(
            session.submit_move("e7e8").unwrap(),
            MoveOutcome::Incorrect {
                expected: mv("e7e8q")
            }
        );
        assert_eq!(
            session.submit_move("e7e8n").unwrap(),
            MoveOutcome::Incorrect {
                expected: mv("e7e8q")
            }
        );
        assert!(session.submit_move("e7e8q").unwrap().is_accepted());
    }

    #[test]
    fn test_scripted_reply_alternates() {
        let mut session = script_session();
        assert_eq!(
            session.submit_move("e2e4").unwrap(),
            MoveOutcome::Accepted { solved: false }
        );
        assert_eq!(
            session.apply_scripted_reply().unwrap(),
            MoveOutcome::Accepted { solved: false }
        );
        assert_eq!(session.cursor(), 2);
        assert_eq!(session.expected_move(), Some(&mv("g1f3")));

        session.submit_move("g1f3").unwrap();
        assert_eq!(
            session.apply_scripted_reply().unwrap(),
            MoveOutcome::Accepted { solved: true }
        );
        assert!(session.is_solved());
    }

    #[test]
    fn test_position_tracks_solution_prefix() {
        let mut session = script_session();
        session.submit_move("d2d4").unwrap();
        session.submit_move("e2e4").unwrap();
        session.submit_move("zz").unwrap();
        session.apply_scripted_reply().unwrap();
        session.submit_move("g1f3").unwrap();

        let mut expected = vec![START_FEN.to_string()];
        expected.extend(MOVES[..session.cursor()].iter().map(|m| m.to_string()));
        assert_eq!(session.current_position(), &expected);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let mut session = chess_session();
        session.submit_move("e2e4").unwrap();

        let fen = session.current_fen();
        let expected = session.expected_move().copied();
        for _ in 0..3 {
            assert_eq!(session.current_fen(), fen);
            assert_eq!(session.expected_move().copied(), expected);
        }
    }

    #[test]
    fn test_oracle_rejection_is_surfaced() {
        let oracle = ScriptOracle {
            reject: Some(mv("e7e5")),
        };
        let mut session = PuzzleSession::load(oracle, sample_puzzle()).unwrap();
        session.submit_move("e2e4").unwrap();

        let err = session.apply_scripted_reply().unwrap_err();
        assert!(matches!(err, PuzzleError::OracleRejected { .. }));
        assert_eq!(session.cursor(), 1);
        assert_eq!(session.expected_move(), Some(&mv("e7e5")));
    }

    #[test]
    fn test_illegal_solution_move_rejected_by_chess_rules() {
        // e2e5 is structurally fine but not playable from the start position.
        let puzzle = Puzzle::new(START_FEN, &["e2e5"]).unwrap();
        let mut session = PuzzleSession::load(ChessRules, puzzle).unwrap();

        let err = session.submit_move("e2e5").unwrap_err();
        assert!(matches!(err, PuzzleError::OracleRejected { .. }));
        assert_eq!(session.cursor(), 0);
        assert_eq!(session.current_position(), &chess::Board::default());
    }
}
