//! Puzzle screen logic: input processing, move submission, scripted replies.

use super::types::{FeedbackKind, PuzzleApp, PuzzleInput, SessionEnd};
use crate::agent::AgentSession;
use crate::puzzle::{square_name, ChessRules, MoveOutcome, Square};

/// Process one input event. Returns false if the input was ignored.
pub fn process_input(app: &mut PuzzleApp, input: PuzzleInput, agent: &mut AgentSession) -> bool {
    if app.is_over() {
        return false;
    }

    match input {
        PuzzleInput::Char(c) => {
            if !c.is_control() {
                app.input.push(c);
            }
        }
        PuzzleInput::Backspace => {
            app.input.pop();
        }
        PuzzleInput::Submit => {
            let text = std::mem::take(&mut app.input);
            submit_text(app, &text, agent);
        }
        PuzzleInput::Up => app.move_cursor(0, 1),
        PuzzleInput::Down => app.move_cursor(0, -1),
        PuzzleInput::Left => app.move_cursor(-1, 0),
        PuzzleInput::Right => app.move_cursor(1, 0),
        PuzzleInput::Pick => process_pick(app, agent),
        PuzzleInput::Cancel => {
            if app.selected_square.is_some() {
                app.selected_square = None;
            } else {
                app.input.clear();
            }
        }
        PuzzleInput::Quit => {
            app.push_feedback("You quit the puzzle.", FeedbackKind::Info);
            app.session_end = Some(SessionEnd::Quit);
        }
        PuzzleInput::Other => return false,
    }
    true
}

/// Handle a line of typed input: `exit` or a move.
pub fn submit_text(app: &mut PuzzleApp, text: &str, agent: &mut AgentSession) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }

    // An agent that has gone away ends the session.
    agent.poll();
    if agent.has_finished() {
        let status = agent.status().to_string();
        app.push_feedback(status.clone(), FeedbackKind::Error);
        app.session_end = Some(SessionEnd::AgentFinished(status));
        return;
    }

    if text.eq_ignore_ascii_case("exit") {
        app.push_feedback("You quit the puzzle.", FeedbackKind::Info);
        app.session_end = Some(SessionEnd::Quit);
        return;
    }

    play_user_move(app, text);
}

/// Submit a user move, then auto-play the opponent's reply if the line continues.
pub fn play_user_move(app: &mut PuzzleApp, text: &str) {
    app.selected_square = None;

    let outcome = match app.session.submit_move(text) {
        Ok(outcome) => outcome,
        Err(e) => return fail(app, e.to_string()),
    };

    match outcome {
        MoveOutcome::Accepted { solved } => {
            app.push_feedback("Correct!", FeedbackKind::Success);
            if solved {
                mark_solved(app);
            } else {
                play_scripted_reply(app);
            }
        }
        MoveOutcome::Incorrect { expected } => {
            let message = if app.reveal_expected {
                format!("Incorrect move. Expected {}. Try again.", expected)
            } else {
                "Incorrect move. Try again.".to_string()
            };
            app.push_feedback(message, FeedbackKind::Error);
        }
        MoveOutcome::MalformedInput => {
            app.push_feedback("Invalid move format.", FeedbackKind::Error);
        }
        MoveOutcome::AlreadySolved => {
            app.push_feedback("Puzzle already solved.", FeedbackKind::Info);
        }
    }
}

fn play_scripted_reply(app: &mut PuzzleApp) {
    match app.session.apply_scripted_reply() {
        Ok(MoveOutcome::Accepted { solved }) => {
            let reply = app
                .session
                .last_move()
                .map(|m| m.to_string())
                .unwrap_or_default();
            app.push_feedback(format!("Opponent plays {}", reply), FeedbackKind::Info);
            if solved {
                mark_solved(app);
            }
        }
        Ok(other) => {
            log::warn!("Unexpected scripted reply outcome: {:?}", other);
        }
        Err(e) => fail(app, e.to_string()),
    }
}

fn mark_solved(app: &mut PuzzleApp) {
    app.push_feedback(
        "Congratulations, you solved the puzzle!",
        FeedbackKind::Success,
    );
    app.session_end = Some(SessionEnd::Solved);
}

fn fail(app: &mut PuzzleApp, message: String) {
    log::error!("Puzzle session failed: {}", message);
    app.push_feedback(message.clone(), FeedbackKind::Error);
    app.session_end = Some(SessionEnd::Failed(message));
}

fn process_pick(app: &mut PuzzleApp, agent: &mut AgentSession) {
    let square = app.cursor;
    match app.selected_square {
        None => {
            if is_own_piece(app, square) {
                app.selected_square = Some(square);
            }
        }
        Some(from) if from == square => {
            app.selected_square = None;
        }
        Some(_) if is_own_piece(app, square) => {
            app.selected_square = Some(square);
        }
        Some(from) => {
            let text = compose_move(app, from, square);
            submit_text(app, &text, agent);
        }
    }
}

fn is_own_piece(app: &PuzzleApp, square: Square) -> bool {
    app.session
        .current_position()
        .color_on(ChessRules::to_chess_square(square))
        == Some(app.player_color)
}

/// Build a UCI string from two picked squares. Pawns reaching the last rank promote to a queen.
pub fn compose_move(app: &PuzzleApp, from: Square, to: Square) -> String {
    let board = app.session.current_position();
    let is_pawn =
        board.piece_on(ChessRules::to_chess_square(from)) == Some(chess::Piece::Pawn);
    let promotes = is_pawn && (to.1 == 7 || to.1 == 0);

    let mut text = format!("{}{}", square_name(from), square_name(to));
    if promotes {
        text.push('q');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::types::Feedback;
    use crate::puzzle::{Puzzle, PuzzleSession};

    const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    fn app() -> PuzzleApp {
        let puzzle = Puzzle::new(START_FEN, &["e2e4", "e7e5", "g1f3", "b8c6"]).unwrap();
        PuzzleApp::new(PuzzleSession::load(ChessRules, puzzle).unwrap(), true)
    }

    fn type_line(app: &mut PuzzleApp, agent: &mut AgentSession, text: &str) {
        for c in text.chars() {
            process_input(app, PuzzleInput::Char(c), agent);
        }
        process_input(app, PuzzleInput::Submit, agent);
    }

    fn last(app: &PuzzleApp) -> &Feedback {
        app.feedback.last().unwrap()
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut app = app();
        let mut agent = AgentSession::none();
        for c in "e2e5".chars() {
            process_input(&mut app, PuzzleInput::Char(c), &mut agent);
        }
        process_input(&mut app, PuzzleInput::Backspace, &mut agent);
        assert_eq!(app.input, "e2e");
        process_input(&mut app, PuzzleInput::Cancel, &mut agent);
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_correct_move_triggers_reply() {
        let mut app = app();
        let mut agent = AgentSession::none();
        type_line(&mut app, &mut agent, "e2e4");

        assert!(app.input.is_empty());
        assert_eq!(app.session.cursor(), 2);
        assert_eq!(app.feedback[0].text, "Correct!");
        assert_eq!(last(&app).text, "Opponent plays e7e5");
        assert!(!app.is_over());
    }

    #[test]
    fn test_incorrect_move_reveals_expected() {
        let mut app = app();
        let mut agent = AgentSession::none();
        type_line(&mut app, &mut agent, "d2d4");

        assert_eq!(app.session.cursor(), 0);
        assert_eq!(last(&app).text, "Incorrect move. Expected e2e4. Try again.");
        assert_eq!(last(&app).kind, FeedbackKind::Error);
    }

    #[test]
    fn test_incorrect_move_hidden_expected() {
        let mut app = app();
        app.reveal_expected = false;
        let mut agent = AgentSession::none();
        type_line(&mut app, &mut agent, "d2d4");
        assert_eq!(last(&app).text, "Incorrect move. Try again.");
    }

    #[test]
    fn test_invalid_input_does_not_crash() {
        let mut app = app();
        let mut agent = AgentSession::none();
        type_line(&mut app, &mut agent, "invalid_move");
        assert_eq!(last(&app).text, "Invalid move format.");
        assert_eq!(last(&app).kind, FeedbackKind::Error);
        assert_eq!(app.session.cursor(), 0);

        type_line(&mut app, &mut agent, "e2e4");
        assert_eq!(app.session.cursor(), 2);
    }

    #[test]
    fn test_solving_ends_session() {
        let mut app = app();
        let mut agent = AgentSession::none();
        type_line(&mut app, &mut agent, "e2e4");
        type_line(&mut app, &mut agent, "g1f3");

        assert!(app.session.is_solved());
        assert_eq!(app.session_end, Some(SessionEnd::Solved));
        assert_eq!(last(&app).text, "Congratulations, you solved the puzzle!");

        // Input is ignored once the session is over.
        assert!(!process_input(&mut app, PuzzleInput::Char('x'), &mut agent));
    }

    #[test]
    fn test_exit_command_quits() {
        let mut app = app();
        let mut agent = AgentSession::none();
        type_line(&mut app, &mut agent, "EXIT");
        assert_eq!(app.session_end, Some(SessionEnd::Quit));
        assert_eq!(app.session.cursor(), 0);
    }

    #[test]
    fn test_quit_key() {
        let mut app = app();
        let mut agent = AgentSession::none();
        assert!(process_input(&mut app, PuzzleInput::Quit, &mut agent));
        assert_eq!(app.session_end, Some(SessionEnd::Quit));
    }

    #[test]
    fn test_empty_submit_is_ignored() {
        let mut app = app();
        let mut agent = AgentSession::none();
        type_line(&mut app, &mut agent, "   ");
        assert!(app.feedback.is_empty());
    }

    #[test]
    fn test_pick_squares_composes_move() {
        let mut app = app();
        let mut agent = AgentSession::none();

        // Empty square: nothing selected.
        app.cursor = (4, 3);
        process_input(&mut app, PuzzleInput::Pick, &mut agent);
        assert!(app.selected_square.is_none());

        // Enemy piece: nothing selected.
        app.cursor = (4, 6);
        process_input(&mut app, PuzzleInput::Pick, &mut agent);
        assert!(app.selected_square.is_none());

        app.cursor = (4, 1);
        process_input(&mut app, PuzzleInput::Pick, &mut agent);
        assert_eq!(app.selected_square, Some((4, 1)));

        process_input(&mut app, PuzzleInput::Up, &mut agent);
        process_input(&mut app, PuzzleInput::Up, &mut agent);
        assert_eq!(app.cursor, (4, 3));
        process_input(&mut app, PuzzleInput::Pick, &mut agent);

        assert!(app.selected_square.is_none());
        assert_eq!(app.session.cursor(), 2);
    }

    #[test]
    fn test_pick_same_square_deselects() {
        let mut app = app();
        let mut agent = AgentSession::none();
        app.cursor = (6, 0);
        process_input(&mut app, PuzzleInput::Pick, &mut agent);
        assert_eq!(app.selected_square, Some((6, 0)));
        process_input(&mut app, PuzzleInput::Pick, &mut agent);
        assert!(app.selected_square.is_none());

        process_input(&mut app, PuzzleInput::Pick, &mut agent);
        process_input(&mut app, PuzzleInput::Cancel, &mut agent);
        assert!(app.selected_square.is_none());
    }

    #[test]
    fn test_compose_move_promotes_pawns() {
        let puzzle = Puzzle::new("8/4P3/8/8/8/8/k7/4K3 w - - 0 1", &["e7e8q"]).unwrap();
        let mut app = PuzzleApp::new(PuzzleSession::load(ChessRules, puzzle).unwrap(), true);
        assert_eq!(compose_move(&app, (4, 6), (4, 7)), "e7e8q");
        assert_eq!(compose_move(&app, (4, 0), (3, 0)), "e1d1");

        let mut agent = AgentSession::none();
        app.cursor = (4, 6);
        process_input(&mut app, PuzzleInput::Pick, &mut agent);
        app.cursor = (4, 7);
        process_input(&mut app, PuzzleInput::Pick, &mut agent);
        assert_eq!(app.session_end, Some(SessionEnd::Solved));
    }

    #[cfg(unix)]
    #[test]
    fn test_finished_agent_ends_session_on_submit() {
        let mut app = app();
        let mut agent = AgentSession::spawn("exit 0", None);
        for _ in 0..250 {
            agent.poll();
            if agent.has_finished() {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(20));
        }

        type_line(&mut app, &mut agent, "e2e4");
        assert_eq!(
            app.session_end,
            Some(SessionEnd::AgentFinished(
                "AI Agent: Finished (Exit Code: 0)".to_string()
            ))
        );
        assert_eq!(app.session.cursor(), 0);
    }
}
