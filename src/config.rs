//! Application preferences.
//!
//! The preferences live in a small JSON file at
//! `$XDG_CONFIG_HOME/outlay/config.json`.  Keys use kebab-case so the file
//! stays compatible with the layout users know from other display tools.
//!
//! # Example
//!
//! ```json
//! {
//!   "view-scale": 0.15,
//!   "snap-threshold": 10,
//!   "indicator-timeout": 500,
//!   "custom-mode": ["HDMI-A-1"],
//!   "use-desc": false,
//!   "confirm-timeout": 10
//! }
//! ```
//!
//! Only `view-scale` and `snap-threshold` feed the arrangement model; the
//! remaining keys are carried for the UI layer.

use crate::arrange::ViewSettings;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_VIEW_SCALE: f64 = 0.15;
pub const DEFAULT_SNAP_THRESHOLD: u32 = 10;

/// Keys every persisted config file is expected to contain.
const KEYS: [&str; 6] = [
    "view-scale",
    "snap-threshold",
    "indicator-timeout",
    "custom-mode",
    "use-desc",
    "confirm-timeout",
];

/// Persisted preferences.
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Canvas pixels per logical pixel.
    pub view_scale: f64,
    /// Snap distance; converted to screen pixels by
    /// [`ViewSettings::snap_distance`].
    pub snap_threshold: u32,
    /// How long the on-screen name indicator stays up (ms).
    pub indicator_timeout: u64,
    /// Monitors configured with a mode the compositor does not list.
    pub custom_mode: Vec<String>,
    /// Identify monitors by description instead of connector name.
    pub use_desc: bool,
    /// Seconds to wait for the user to confirm a new layout.
    pub confirm_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            view_scale: DEFAULT_VIEW_SCALE,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            indicator_timeout: 500,
            custom_mode: Vec::new(),
            use_desc: false,
            confirm_timeout: 10,
        }
    }
}

/// Error from loading or saving a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

impl Config {
    /// `$XDG_CONFIG_HOME/outlay/config.json`, falling back to `~/.config`.
    pub fn default_path() -> PathBuf {
        config_dir().join("config.json")
    }

    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let mut config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        config.sanitize();
        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| ConfigError(format!("failed to create {}: {}", dir.display(), e)))?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError(format!("failed to serialize: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| ConfigError(format!("failed to write {}: {}", path.display(), e)))
    }

    /// Load `path`, falling back to defaults when it is missing or corrupt.
    ///
    /// When the file had to be repaired (missing, unparsable or lacking
    /// keys) the repaired version is written back.  Failure to write is
    /// logged, never fatal.
    pub fn load_or_repair(path: &Path) -> Self {
        let (config, repaired) = match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<serde_json::Value>(&text) {
                Ok(value) => {
                    let missing: Vec<&str> = KEYS
                        .iter()
                        .copied()
                        .filter(|k| value.get(*k).is_none())
                        .collect();
                    match serde_json::from_value::<Config>(value) {
                        Ok(mut cfg) => {
                            if !missing.is_empty() {
                                info!("adding missing config keys: {}", missing.join(", "));
                            }
                            let sanitized = cfg.sanitize();
                            (cfg, !missing.is_empty() || sanitized)
                        }
                        Err(e) => {
                            warn!("invalid config {}: {}, using defaults", path.display(), e);
                            (Config::default(), true)
                        }
                    }
                }
                Err(e) => {
                    warn!("corrupt config {}: {}, using defaults", path.display(), e);
                    (Config::default(), true)
                }
            },
            Err(e) => {
                info!("no config file ({}), creating defaults", e);
                (Config::default(), true)
            }
        };

        if repaired {
            match config.save(path) {
                Ok(()) => info!("wrote repaired config to {}", path.display()),
                Err(e) => warn!("{}", e),
            }
        }
        config
    }

    /// Replace out-of-domain values with defaults.  Returns whether
    /// anything changed.
    fn sanitize(&mut self) -> bool {
        if self.view_scale.is_finite() && self.view_scale > 0.0 {
            return false;
        }
        warn!("invalid view-scale {}, using {}", self.view_scale, DEFAULT_VIEW_SCALE);
        self.view_scale = DEFAULT_VIEW_SCALE;
        true
    }

    /// The subset of preferences the arrangement canvas consumes.
    pub fn view_settings(&self) -> ViewSettings {
        ViewSettings {
            view_scale: self.view_scale,
            snap_threshold: self.snap_threshold,
        }
    }

    /// Whether `monitor` is flagged as running a custom mode.
    pub fn has_custom_mode(&self, monitor: &str) -> bool {
        self.custom_mode.iter().any(|m| m == monitor)
    }
}

/// `$XDG_CONFIG_HOME`, falling back to `$HOME/.config`.
pub fn xdg_config_home() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    PathBuf::from(base)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/outlay`).
pub fn config_dir() -> PathBuf {
    xdg_config_home().join("outlay")
}
