//! Settings loaded from TOML
//!
//! Read from `~/.config/termtris/settings.toml` (or the platform equivalent),
//! or from the file named by `TERMTRIS_CONFIG`. Every section is optional.

use crate::board::{Board, DEFAULT_HEIGHT, DEFAULT_WIDTH, FieldError};
use crate::score::{DEFAULT_INITIAL_SPEED, DEFAULT_MIN_SPEED, DEFAULT_PIECES_PER_SPEEDUP};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the settings file location
pub const CONFIG_ENV: &str = "TERMTRIS_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Field(#[from] FieldError),
    #[error("invalid setting `{name}`: {reason}")]
    Invalid {
        name: &'static str,
        reason: &'static str,
    },
}

/// Game settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub field: FieldSettings,
    pub timing: TimingSettings,
    pub difficulty: DifficultySettings,
    /// Fixes the piece sequence when set
    pub seed: Option<u64>,
}

/// Playfield size, border included
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub width: usize,
    pub height: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    /// Length of one simulation tick in milliseconds
    pub tick_ms: u64,
    /// How long full rows stay on screen before they are removed
    pub clear_delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DifficultySettings {
    /// Ticks per gravity step at the start
    pub initial_speed: u32,
    /// Fastest gravity, in ticks per step
    pub min_speed: u32,
    /// Locked pieces between speed-ups
    pub pieces_per_speedup: u32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            clear_delay_ms: 400,
        }
    }
}

impl Default for DifficultySettings {
    fn default() -> Self {
        Self {
            initial_speed: DEFAULT_INITIAL_SPEED,
            min_speed: DEFAULT_MIN_SPEED,
            pieces_per_speedup: DEFAULT_PIECES_PER_SPEEDUP,
        }
    }
}

impl TimingSettings {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }
}

impl Settings {
    /// Get the settings file path: `TERMTRIS_CONFIG` if set, else the platform config dir
    pub fn settings_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("com", "termtris", "termtris")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
    }

    /// Load and validate settings. A missing file means defaults.
    pub fn load() -> Result<Self, SettingsError> {
        let settings = match Self::settings_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from `path` without validating them
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| SettingsError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Reject values the game cannot start with
    pub fn validate(&self) -> Result<(), SettingsError> {
        Board::check_dimensions(self.field.width, self.field.height)?;

        let invalid = |name, reason| Err(SettingsError::Invalid { name, reason });
        if self.timing.tick_ms == 0 {
            return invalid("timing.tick_ms", "must be at least 1");
        }
        if self.difficulty.initial_speed == 0 {
            return invalid("difficulty.initial_speed", "must be at least 1");
        }
        if self.difficulty.min_speed == 0 {
            return invalid("difficulty.min_speed", "must be at least 1");
        }
        if self.difficulty.min_speed > self.difficulty.initial_speed {
            return invalid("difficulty.min_speed", "must not exceed initial_speed");
        }
        if self.difficulty.pieces_per_speedup == 0 {
            return invalid("difficulty.pieces_per_speedup", "must be at least 1");
        }
        Ok(())
    }
}
