//! Puzzle board UI rendering.

use super::game_common::{
    create_game_layout, render_game_over_banner, render_info_panel_frame, render_status_bar,
    GameResultType,
};
use super::HostStatus;
use crate::app::{FeedbackKind, PuzzleApp, SessionEnd};
use crate::puzzle::{ChessRules, Square};
use crate::status_file::side_name;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

const CELL_WIDTH: u16 = 5;
const BOARD_WIDTH: u16 = 3 + (CELL_WIDTH * 8) + 1;
const BOARD_HEIGHT: u16 = 18;

/// Render the puzzle scene.
pub fn render_puzzle_scene(frame: &mut Frame, area: Rect, app: &PuzzleApp, host: &HostStatus) {
    // 1 progress + 18 board + 1 input + 3 feedback
    let layout = create_game_layout(frame, area, " Daily Puzzle ", Color::LightGreen, 23, 28);

    let content_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),            // Progress line
            Constraint::Length(BOARD_HEIGHT), // Board
            Constraint::Length(1),            // Move input
            Constraint::Min(3),               // Feedback
        ])
        .split(layout.content);

    render_progress(frame, content_chunks[0], app);
    render_board(frame, content_chunks[1], app);
    render_input(frame, content_chunks[2], app);
    render_feedback(frame, content_chunks[3], app);
    render_status(frame, layout.status_bar, app);
    render_info_panel(frame, layout.info_panel, app, host);

    if let Some(end) = &app.session_end {
        let (result_type, title, message) = match end {
            SessionEnd::Solved => (
                GameResultType::Win,
                "PUZZLE SOLVED!",
                format!("{} moves played", app.session.cursor()),
            ),
            SessionEnd::Quit => (GameResultType::Forfeit, "QUIT", "You gave up".to_string()),
            SessionEnd::AgentFinished(status) => {
                (GameResultType::Loss, "AGENT STOPPED", status.clone())
            }
            SessionEnd::Failed(reason) => (GameResultType::Loss, "ERROR", reason.clone()),
        };
        render_game_over_banner(frame, content_chunks[1], result_type, title, &message);
    }
}

fn render_progress(frame: &mut Frame, area: Rect, app: &PuzzleApp) {
    let session = &app.session;
    let title = match &session.puzzle().id {
        Some(id) => format!("Puzzle {} ", id),
        None => "Puzzle ".to_string(),
    };
    let spans = vec![
        Span::styled(title, Style::default().fg(Color::White)),
        Span::styled(
            format!("Move {}/{}", session.cursor(), session.solution_len()),
            Style::default().fg(Color::LightGreen),
        ),
    ];
    let text = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    frame.render_widget(text, area);
}

/// Ranks from top to bottom of the screen.
pub fn display_ranks(flipped: bool) -> [u8; 8] {
    if flipped {
        [0, 1, 2, 3, 4, 5, 6, 7]
    } else {
        [7, 6, 5, 4, 3, 2, 1, 0]
    }
}

/// Files from left to right of the screen.
pub fn display_files(flipped: bool) -> [u8; 8] {
    if flipped {
        [7, 6, 5, 4, 3, 2, 1, 0]
    } else {
        [0, 1, 2, 3, 4, 5, 6, 7]
    }
}

fn grid_line(left: char, mid: char, right: char) -> String {
    let mut line = String::from("  ");
    line.push(left);
    for i in 0..8 {
        line.push_str("\u{2500}\u{2500}\u{2500}\u{2500}");
        if i < 7 {
            line.push(mid);
        }
    }
    line.push(right);
    line
}

fn render_board(frame: &mut Frame, area: Rect, app: &PuzzleApp) {
    if area.width < BOARD_WIDTH || area.height < BOARD_HEIGHT {
        let hint = Paragraph::new("Enlarge the terminal to see the board")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(hint, area);
        return;
    }

    let x_offset = area.x + (area.width.saturating_sub(BOARD_WIDTH)) / 2;
    let y_offset = area.y + (area.height.saturating_sub(BOARD_HEIGHT)) / 2;

    let border_color = Color::Rgb(80, 80, 80);
    let from_move_color = Color::Rgb(180, 140, 80);
    let to_move_color = Color::Rgb(255, 255, 100);

    let last_move = app.session.last_move().map(|m| (m.from, m.to));
    let board = app.session.current_position();
    let flipped = app.is_flipped();

    let top = Paragraph::new(grid_line('\u{250C}', '\u{252C}', '\u{2510}'))
        .style(Style::default().fg(border_color));
    frame.render_widget(top, Rect::new(x_offset, y_offset, BOARD_WIDTH, 1));

    for (row_index, rank) in display_ranks(flipped).into_iter().enumerate() {
        let y = y_offset + 1 + (row_index as u16 * 2);

        let label = Paragraph::new(format!("{} ", rank + 1))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(label, Rect::new(x_offset, y, 2, 1));

        let left_border = Paragraph::new("\u{2502}").style(Style::default().fg(border_color));
        frame.render_widget(left_border, Rect::new(x_offset + 2, y, 1, 1));

        for (col_index, file) in display_files(flipped).into_iter().enumerate() {
            let square: Square = (file, rank);
            let x = x_offset + 3 + (col_index as u16 * CELL_WIDTH);

            let highlight = match last_move {
                Some((from, _)) if from == square => Some(from_move_color),
                Some((_, to)) if to == square => Some(to_move_color),
                _ => None,
            };
            let piece_char = piece_glyph(board, square);

            let (content, fg_color) = if app.cursor == square {
                let color = highlight
                    .or_else(|| piece_char.map(piece_color))
                    .unwrap_or(Color::Rgb(100, 100, 100));
                match piece_char {
                    Some(c) => (format!("[{}]", c), color),
                    None => (" \u{25A1}  ".to_string(), color),
                }
            } else if app.selected_square == Some(square) {
                match piece_char {
                    Some(c) => (format!("<{}>", c), Color::Rgb(100, 200, 100)),
                    None => ("    ".to_string(), Color::Reset),
                }
            } else if let Some(color) = highlight {
                match piece_char {
                    Some(c) => (format!(" {}  ", c), color),
                    None => (" \u{00B7}  ".to_string(), color),
                }
            } else {
                match piece_char {
                    Some(c) => (format!(" {}  ", c), piece_color(c)),
                    None => ("    ".to_string(), Color::Reset),
                }
            };

            let square_widget = Paragraph::new(content).style(Style::default().fg(fg_color));
            frame.render_widget(square_widget, Rect::new(x, y, 4, 1));

            let sep = Paragraph::new("\u{2502}").style(Style::default().fg(border_color));
            frame.render_widget(sep, Rect::new(x + 4, y, 1, 1));
        }

        if row_index < 7 {
            let sep = Paragraph::new(grid_line('\u{251C}', '\u{253C}', '\u{2524}'))
                .style(Style::default().fg(border_color));
            frame.render_widget(sep, Rect::new(x_offset, y + 1, BOARD_WIDTH, 1));
        }
    }

    let bottom = Paragraph::new(grid_line('\u{2514}', '\u{2534}', '\u{2518}'))
        .style(Style::default().fg(border_color));
    frame.render_widget(bottom, Rect::new(x_offset, y_offset + 16, BOARD_WIDTH, 1));

    let mut files = String::from("  ");
    for file in display_files(flipped) {
        files.push_str(&format!("  {}  ", (b'A' + file) as char));
    }
    let file_labels = Paragraph::new(files).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(
        file_labels,
        Rect::new(x_offset, y_offset + 17, BOARD_WIDTH, 1),
    );
}

fn render_input(frame: &mut Frame, area: Rect, app: &PuzzleApp) {
    let line = Line::from(vec![
        Span::styled("Your move: ", Style::default().fg(Color::DarkGray)),
        Span::styled(format!("{}_", app.input), Style::default().fg(Color::White)),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_feedback(frame: &mut Frame, area: Rect, app: &PuzzleApp) {
    let visible = area.height as usize;
    let skip = app.feedback.len().saturating_sub(visible);
    let lines: Vec<Line> = app
        .feedback
        .iter()
        .skip(skip)
        .map(|f| {
            let color = match f.kind {
                FeedbackKind::Info => Color::Gray,
                FeedbackKind::Success => Color::Green,
                FeedbackKind::Error => Color::Red,
            };
            Line::from(Span::styled(f.text.as_str(), Style::default().fg(color)))
        })
        .collect();

    let text = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(text, area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &PuzzleApp) {
    if app.is_over() {
        render_status_bar(frame, area, "Session over", Color::Gray, &[("[Any]", "Exit")]);
        return;
    }

    let (status_text, status_color) = if app.selected_square.is_some() {
        ("Select destination".to_string(), Color::Cyan)
    } else {
        (
            format!("Find the best move for {}", side_name(app.player_color)),
            Color::White,
        )
    };

    let controls: &[(&str, &str)] = if app.selected_square.is_some() {
        &[
            ("[Arrows]", "Move"),
            ("[Space]", "Confirm"),
            ("[Esc]", "Cancel"),
        ]
    } else {
        &[
            ("[Enter]", "Submit"),
            ("[Space]", "Pick"),
            ("[Esc]", "Clear"),
            ("[^Q]", "Quit"),
        ]
    };

    render_status_bar(frame, area, &status_text, status_color, controls);
}

fn render_info_panel(frame: &mut Frame, area: Rect, app: &PuzzleApp, host: &HostStatus) {
    let inner = render_info_panel_frame(frame, area);
    let session = &app.session;
    let puzzle = session.puzzle();

    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::White);

    let mut lines = vec![
        Line::from(Span::styled(
            "PUZZLE",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    if let Some(rating) = puzzle.rating {
        lines.push(Line::from(vec![
            Span::styled("Rating: ", label),
            Span::styled(rating.to_string(), value),
        ]));
    }
    if !puzzle.themes.is_empty() {
        lines.push(Line::from(vec![
            Span::styled("Themes: ", label),
            Span::styled(puzzle.themes.join(", "), Style::default().fg(Color::Gray)),
        ]));
    }

    let to_move = if session.is_solved() {
        "solved".to_string()
    } else {
        side_name(session.current_position().side_to_move()).to_string()
    };
    lines.push(Line::from(vec![
        Span::styled("To move: ", label),
        Span::styled(to_move, Style::default().fg(Color::LightGreen)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("You play: ", label),
        Span::styled(side_name(app.player_color), value),
    ]));

    if let Some(clock) = &host.clock {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("Clock: ", label),
            Span::styled(clock.as_str(), Style::default().fg(Color::Cyan)),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        host.agent.as_str(),
        Style::default().fg(Color::Gray),
    )));

    let text = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(text, inner);
}

/// Get color for a piece character.
fn piece_color(c: char) -> Color {
    if matches!(c, '\u{265A}'..='\u{265F}') {
        Color::White
    } else {
        Color::Rgb(140, 140, 140)
    }
}

/// Get the piece character at a square, using filled glyphs for White.
pub fn piece_glyph(board: &chess::Board, square: Square) -> Option<char> {
    use chess::{Color as ChessColor, Piece};

    let sq = ChessRules::to_chess_square(square);
    let piece = board.piece_on(sq)?;
    let color = board.color_on(sq)?;

    Some(match (color, piece) {
        (ChessColor::White, Piece::King) => '\u{265A}',
        (ChessColor::White, Piece::Queen) => '\u{265B}',
        (ChessColor::White, Piece::Rook) => '\u{265C}',
        (ChessColor::White, Piece::Bishop) => '\u{265D}',
        (ChessColor::White, Piece::Knight) => '\u{265E}',
        (ChessColor::White, Piece::Pawn) => '\u{265F}',
        (ChessColor::Black, Piece::King) => '\u{2654}',
        (ChessColor::Black, Piece::Queen) => '\u{2655}',
        (ChessColor::Black, Piece::Rook) => '\u{2656}',
        (ChessColor::Black, Piece::Bishop) => '\u{2657}',
        (ChessColor::Black, Piece::Knight) => '\u{2658}',
        (ChessColor::Black, Piece::Pawn) => '\u{2659}',
    })
}
