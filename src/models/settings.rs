//! User settings, persisted as TOML.

use crate::models::engine::{HitWindow, WindowTolerances};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_SETTINGS_PATH: &str = "settings.toml";

pub const SCROLL_SPEED_MIN: f32 = 50.0;
pub const SCROLL_SPEED_MAX: f32 = 500.0;

/// Step used by the volume up/down keys.
pub const VOLUME_STEP: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub master_volume: f32, // 0.0 to 1.0
    pub notes_scroll_speed: f32,
    /// Play a cue when each note reaches its arrival time.
    pub use_assist_sound: bool,
    /// Chart loaded into the setup state at start-up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_track: Option<PathBuf>,
    /// Default log filter; `RUST_LOG` takes precedence.
    pub log_level: String,
    pub keybinds: KeybindSettings,
    /// Custom judgement tolerances in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub judgement: Option<WindowTolerances>,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.5,
            notes_scroll_speed: 200.0,
            use_assist_sound: false,
            default_track: None,
            log_level: "info".to_string(),
            keybinds: KeybindSettings::default(),
            judgement: None,
        }
    }
}

/// Key names bound to each lane. Several keys may drive the same lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindSettings {
    pub left: Vec<String>,
    pub down: Vec<String>,
    pub up: Vec<String>,
    pub right: Vec<String>,
}

impl Default for KeybindSettings {
    fn default() -> Self {
        let keys = |names: &[&str]| -> Vec<String> { names.iter().map(|s| s.to_string()).collect() };
        Self {
            left: keys(&["A", "F", "ArrowLeft"]),
            down: keys(&["S", "G", "ArrowDown"]),
            up: keys(&["W", "J", "ArrowUp"]),
            right: keys(&["D", "K", "ArrowRight"]),
        }
    }
}

impl GameSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads and sanitizes a settings file.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        match toml::from_str::<GameSettings>(&content) {
            Ok(settings) => Ok(settings.sanitized()),
            Err(e) => {
                log::error!("SETTINGS: Failed to parse TOML file {:?}: {}", path, e);
                Err(e.to_string())
            }
        }
    }

    /// Loads `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            log::info!("SETTINGS: {:?} not found, using defaults", path);
            return Self::default();
        }
        match Self::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("SETTINGS: could not load {:?} ({}), using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Writes the settings as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, content).map_err(|e| e.to_string())
    }

    /// Clamps values into their valid ranges.
    pub fn sanitized(mut self) -> Self {
        self.set_master_volume(self.master_volume);
        self.set_notes_scroll_speed(self.notes_scroll_speed);
        self
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.5
        };
    }

    /// Nudges the volume by `steps` increments of [`VOLUME_STEP`].
    pub fn adjust_master_volume(&mut self, steps: i32) {
        self.set_master_volume(self.master_volume + steps as f32 * VOLUME_STEP);
    }

    pub fn set_notes_scroll_speed(&mut self, speed: f32) {
        self.notes_scroll_speed = if speed.is_finite() {
            speed.clamp(SCROLL_SPEED_MIN, SCROLL_SPEED_MAX)
        } else {
            200.0
        };
    }

    /// Tolerances in effect: the override if any, the standard table otherwise.
    pub fn tolerances(&self) -> WindowTolerances {
        self.judgement.unwrap_or_default()
    }

    pub fn hit_window(&self) -> Result<HitWindow, String> {
        HitWindow::from_tolerances(self.tolerances())
    }
}
