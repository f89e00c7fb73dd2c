//! Blockfall - a falling-block puzzle game for the terminal

mod board;
mod collision;
mod error;
mod game_loop;
mod generator;
mod highscore;
mod input;
mod keymap;
mod piece;
mod rotation;
mod score;
mod session;
mod settings;
mod tetromino;
mod ui;

use crossterm::{
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use game_loop::{GameLoop, MonotonicClock};
use generator::PieceGenerator;
use highscore::{FileHighScoreStore, HighScoreStore, MemoryHighScoreStore};
use input::InputController;
use keymap::{KeyEdge, KeyMap};
use ratatui::{backend::CrosstermBackend, Terminal};
use session::Session;
use settings::Settings;
use std::{
    io::{self, stdout},
    time::Duration,
};
use ui::Presentation;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn open_high_score_store() -> Box<dyn HighScoreStore> {
    match FileHighScoreStore::default_location() {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!("{}, high score will not be kept between runs", e);
            Box::new(MemoryHighScoreStore::default())
        }
    }
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("blockfall=debug")),
        )
        .with_ansi(false)
        .init();

    tracing::info!("Blockfall starting up, session={:08x}, log={}", session_id, log_dir.join(&log_file).display());

    let settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    // Key release events need the kitty keyboard protocol
    let key_releases = supports_keyboard_enhancement().unwrap_or(false);
    if key_releases {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    tracing::debug!("Key release events supported: {}", key_releases);

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut session = Session::new(
        PieceGenerator::new(settings.gameplay.randomizer),
        open_high_score_store(),
    );

    // Run app and capture result
    let result = run_app(&mut terminal, &mut session, &settings, key_releases);

    // Restore terminal
    if key_releases {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if result.is_ok() {
        let score = session.score();
        println!("\nThanks for playing Blockfall!");
        println!("Final Score: {} | Best: {}", score.points, session.high_score());
        println!("Level: {} | Lines: {}", score.level, score.lines);
    }

    tracing::info!("Blockfall shutting down");
    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: &mut Session,
    settings: &Settings,
    key_releases: bool,
) -> io::Result<()> {
    let keymap = KeyMap::from_settings(&settings.keys);
    let release_timeout = match settings.gameplay.key_release_timeout_ms {
        _ if key_releases => None,
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };
    let mut input = InputController::from_settings(&settings.gameplay).with_release_timeout(release_timeout);
    let mut game_loop = GameLoop::new();
    let mut presentation = Presentation::new();
    let clock = MonotonicClock::new();

    loop {
        let now = clock.now_ms();
        presentation.apply(session.drain_events(), now);

        // Render
        terminal.draw(|frame| ui::render_game(frame, session, &presentation, settings, now))?;

        // Handle input
        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                match keymap.edge(&key) {
                    Some(KeyEdge::Quit) => return Ok(()),
                    Some(KeyEdge::Down(game_key)) => {
                        let state = session.state();
                        input.key_down(game_key, clock.now_ms(), session);
                        if session.state() != state {
                            // Keys held across a state change do not carry over
                            input.clear();
                        }
                    }
                    Some(KeyEdge::Up(game_key)) => input.key_up(game_key),
                    None => {}
                }
            }
        }

        game_loop.tick(clock.now_ms(), session, &mut input);
    }
}
