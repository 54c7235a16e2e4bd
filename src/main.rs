//! TERMTRIS - falling blocks in the terminal

mod board;
mod game;
mod input;
mod piece;
mod randomizer;
mod rotation;
mod score;
mod settings;
mod tetromino;
mod ui;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use game::Game;
use input::SharedInput;
use ratatui::{Terminal, backend::CrosstermBackend};
use settings::Settings;
use std::{
    io::{self, stdout},
    path::PathBuf,
    sync::Arc,
    thread,
    time::Duration,
};

/// How long the final frame stays up before the terminal is restored
const GAME_OVER_HOLD: Duration = Duration::from_millis(1500);

/// Get the termtris temp directory, creating it if needed
fn termtris_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("termtris");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> Result<()> {
    let session_id: u32 = rand::random();

    // Log to a file; the terminal belongs to the game
    let log_dir = termtris_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("termtris=debug".parse().context("invalid log directive")?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "TERMTRIS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load().context("could not load settings")?;
    tracing::info!(?settings, "settings loaded");
    let mut game = Game::from_settings(&settings).context("could not create the playfield")?;
    tracing::info!(shape = game.piece().shape.index(), "first piece");

    enable_raw_mode().context("could not enable raw mode")?;
    if let Err(e) = execute!(stdout(), EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("could not enter the alternate screen");
    }

    let result = run(&mut game, &settings);

    // Always restore the terminal, even if the run failed
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;
    result?;

    let score = game.score();
    tracing::info!(score = score.points, lines = score.lines, "session finished");
    println!("Game Over!! Score: {}", score.points);
    Ok(())
}

/// Run the simulation loop until game over or quit
fn run(game: &mut Game, settings: &Settings) -> Result<()> {
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let shared = Arc::new(SharedInput::new());
    let listener =
        input::spawn_listener(Arc::clone(&shared)).context("could not start input thread")?;

    let result = simulate(&mut terminal, game, settings, &shared);

    shared.shutdown();
    if listener.join().is_err() {
        tracing::error!("input thread panicked");
    }
    result
}

fn simulate(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    settings: &Settings,
    shared: &SharedInput,
) -> Result<()> {
    let tick = settings.timing.tick();
    let clear_delay = settings.timing.clear_delay();

    loop {
        thread::sleep(tick);

        if shared.quit_requested() {
            tracing::info!(score = game.score().points, "player quit");
            return Ok(());
        }

        if let Some(event) = game.tick(shared.take()) {
            tracing::debug!(
                points = event.points,
                rows = event.rows.len(),
                game_over = event.game_over,
                "lock resolved"
            );
        }

        let buffer = game.draw_buffer();
        terminal.draw(|frame| ui::render_game(frame, &buffer, game.score(), game.is_over()))?;

        if !game.pending_clear().is_empty() {
            thread::sleep(clear_delay);
            let removed = game.clear_pending_rows();
            tracing::debug!(removed, "rows removed");
        }

        if game.is_over() {
            thread::sleep(GAME_OVER_HOLD);
            return Ok(());
        }
    }
}
