//! Keyboard input on a dedicated thread
//!
//! The listener thread and the simulation loop share one [`SharedInput`]. The
//! listener only raises flags; the simulation loop takes (and lowers) them once
//! per tick, so repeated presses of the same key within a tick collapse into one.

use crate::game::Intents;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, warn};

/// How long the listener waits for a key before checking for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A player intent consumed by the simulation tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    MoveLeft,
    MoveDown,
    MoveRight,
    Rotate,
}

/// What a key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Intent(Intent),
    Quit,
}

/// Flags shared between the input thread and the simulation loop
#[derive(Debug, Default)]
pub struct SharedInput {
    left: AtomicBool,
    down: AtomicBool,
    right: AtomicBool,
    rotate: AtomicBool,
    /// Set by the listener when the player asks to leave
    quit: AtomicBool,
    /// Set by the simulation loop when the listener should stop
    shutdown: AtomicBool,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self, intent: Intent) -> &AtomicBool {
        match intent {
            Intent::MoveLeft => &self.left,
            Intent::MoveDown => &self.down,
            Intent::MoveRight => &self.right,
            Intent::Rotate => &self.rotate,
        }
    }

    /// Raise an intent flag (listener side)
    pub fn request(&self, intent: Intent) {
        self.flag(intent).store(true, Ordering::Release);
    }

    /// Take all pending intents and lower their flags (simulation side)
    pub fn take(&self) -> Intents {
        Intents {
            left: self.left.swap(false, Ordering::AcqRel),
            down: self.down.swap(false, Ordering::AcqRel),
            right: self.right.swap(false, Ordering::AcqRel),
            rotate: self.rotate.swap(false, Ordering::AcqRel),
        }
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Release);
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    /// Ask the listener thread to stop
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Apply a key press
    pub fn handle_key(&self, key: KeyEvent) {
        match map_key(key) {
            Some(Command::Intent(intent)) => self.request(intent),
            Some(Command::Quit) => {
                debug!("quit requested");
                self.request_quit();
            }
            None => {}
        }
    }
}

/// Fixed key map: a/s/d/z or the arrow keys; q, Esc or Ctrl+C to quit
pub fn map_key(key: KeyEvent) -> Option<Command> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Command::Quit);
    }

    let intent = match normalize_key(key.code) {
        KeyCode::Char('a') | KeyCode::Left => Intent::MoveLeft,
        KeyCode::Char('s') | KeyCode::Down => Intent::MoveDown,
        KeyCode::Char('d') | KeyCode::Right => Intent::MoveRight,
        KeyCode::Char('z') | KeyCode::Up => Intent::Rotate,
        KeyCode::Char('q') | KeyCode::Esc => return Some(Command::Quit),
        _ => return None,
    };
    Some(Command::Intent(intent))
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

/// Start the listener thread. It runs until [`SharedInput::shutdown`] is called
/// or the terminal stops delivering events.
pub fn spawn_listener(shared: Arc<SharedInput>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("input".to_string())
        .spawn(move || listen(&shared))
}

fn listen(shared: &SharedInput) {
    while !shared.is_shutdown() {
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => shared.handle_key(key),
                Ok(_) => {}
                Err(e) => {
                    warn!("failed to read terminal event: {}", e);
                    shared.request_quit();
                    return;
                }
            },
            Ok(false) => {}
            Err(e) => {
                warn!("failed to poll terminal events: {}", e);
                shared.request_quit();
                return;
            }
        }
    }
    debug!("input listener stopped");
}
