use chess_puzzle_cli::agent::{AgentSession, AgentStatus};
use chess_puzzle_cli::app::{PuzzleApp, SessionEnd};
use chess_puzzle_cli::clock::ClockModel;
use chess_puzzle_cli::input::{handle_key, InputResult};
use chess_puzzle_cli::puzzle::{ChessRules, PuzzleError, PuzzleSession};
use chess_puzzle_cli::source::{FileSource, LichessDaily, PuzzleSource, SourceError};
use chess_puzzle_cli::status_file::{StatusReporter, StatusSnapshot};
use chess_puzzle_cli::ui::{draw_ui, HostStatus};
use chess_puzzle_cli::utils::build_info::VERSION;
use chess_puzzle_cli::utils::persistence::app_path;
use chess_puzzle_cli::utils::{init_logging, AppConfig};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::time::Duration;

const AGENT_LOG_FILE: &str = "agent.log";

/// Solve the daily chess puzzle in your terminal.
#[derive(Parser, Debug)]
#[command(name = "chess-puzzle", version = VERSION, about)]
struct Cli {
    /// Command that starts the AI agent
    #[arg(long)]
    command: Option<String>,

    /// File holding the seconds left on the clock
    #[arg(long)]
    clock_file: Option<PathBuf>,

    /// Write a JSON status snapshot here after every change
    #[arg(long)]
    status_file: Option<PathBuf>,

    /// Load the puzzle from a local JSON file instead of Lichess
    #[arg(long)]
    puzzle_file: Option<PathBuf>,

    /// Daily puzzle endpoint (overrides the config file)
    #[arg(long)]
    url: Option<String>,

    /// Log filter, e.g. "debug" (overrides the config file)
    #[arg(long)]
    log_level: Option<String>,

    /// Do not reveal the expected move after a wrong answer
    #[arg(long)]
    hide_solution: bool,
}

#[derive(thiserror::Error, Debug)]
enum AppError {
    #[error("terminal error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to fetch puzzle: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: cannot load config, using defaults: {}", e);
        AppConfig::default()
    });

    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(e) = init_logging(log_level) {
        eprintln!("Warning: logging disabled: {}", e);
    }
    log::info!("chess-puzzle {}", VERSION);

    if let Some(path) = &cli.clock_file {
        log::info!("Received clock_file: {}", path.display());
    }
    if let Some(path) = &cli.status_file {
        log::info!("Received status_file: {}", path.display());
    }

    let mut agent = match &cli.command {
        Some(command) => {
            let log_path = app_path(AGENT_LOG_FILE).ok();
            AgentSession::spawn(command, log_path.as_deref())
        }
        None => AgentSession::none(),
    };

    let source: Box<dyn PuzzleSource> = match &cli.puzzle_file {
        Some(path) => Box::new(FileSource::new(path)),
        None => Box::new(LichessDaily::new(
            cli.url.clone().unwrap_or_else(|| config.puzzle_url.clone()),
        )),
    };

    let puzzle = match source.fetch() {
        Ok(puzzle) => puzzle,
        Err(e) => {
            log::error!("Cannot fetch puzzle from {}: {}", source.describe(), e);
            agent.terminate();
            return Err(e.into());
        }
    };
    log::info!(
        "Loaded puzzle {} ({} moves)",
        puzzle.id.as_deref().unwrap_or("?"),
        puzzle.len()
    );

    let session = PuzzleSession::load(ChessRules, puzzle)?;
    let reveal = config.reveal_expected_move && !cli.hide_solution;
    let mut app = PuzzleApp::new(session, reveal);

    let mut clock = cli.clock_file.map(ClockModel::new);
    let reporter = StatusReporter::new(cli.status_file);
    let tick_rate = Duration::from_millis(config.tick_rate_ms.max(10));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(
        &mut terminal,
        &mut app,
        &mut agent,
        clock.as_mut(),
        &reporter,
        tick_rate,
    );

    // Cleanup terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    agent.terminate();
    report_status(&reporter, &app, &agent);
    result?;

    print_summary(&app, &agent);
    Ok(())
}

fn event_loop(
    terminal: &mut Tui,
    app: &mut PuzzleApp,
    agent: &mut AgentSession,
    mut clock: Option<&mut ClockModel>,
    reporter: &StatusReporter,
    tick_rate: Duration,
) -> io::Result<()> {
    report_status(reporter, app, agent);
    let mut last_reported = status_key(app, agent);

    loop {
        let host = HostStatus {
            agent: agent.status().to_string(),
            clock: clock.as_deref_mut().map(ClockModel::display),
        };
        terminal.draw(|frame| draw_ui(frame, app, &host))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key_event) = event::read()? {
                if handle_key(key_event, app, agent) == InputResult::Quit {
                    break;
                }
            }
        }

        agent.poll();

        let key = status_key(app, agent);
        if key != last_reported {
            report_status(reporter, app, agent);
            last_reported = key;
        }
    }

    Ok(())
}

/// Fields whose change warrants a new status snapshot.
fn status_key(app: &PuzzleApp, agent: &AgentSession) -> (usize, Option<String>, String) {
    (
        app.session.cursor(),
        app.last_outcome.clone(),
        agent.status().to_string(),
    )
}

fn report_status(reporter: &StatusReporter, app: &PuzzleApp, agent: &AgentSession) {
    if !reporter.is_enabled() {
        return;
    }
    let snapshot =
        StatusSnapshot::capture(&app.session, app.last_outcome.as_deref(), agent.status());
    if let Err(e) = reporter.report(&snapshot) {
        log::warn!("Cannot write status file: {}", e);
    }
}

fn print_summary(app: &PuzzleApp, agent: &AgentSession) {
    match &app.session_end {
        Some(SessionEnd::Solved) => println!("Congratulations, you solved the puzzle!"),
        Some(SessionEnd::Quit) | None => println!(
            "Puzzle not solved ({}/{} moves).",
            app.session.cursor(),
            app.session.solution_len()
        ),
        Some(SessionEnd::AgentFinished(status)) => println!("{}", status),
        Some(SessionEnd::Failed(reason)) => println!("Session ended with an error: {}", reason),
    }
    if agent.status() != &AgentStatus::NotRunning {
        println!("{}", agent.status());
    }
}
