//! Named layout profiles.
//!
//! A profile is a JSON file `<dir>/<name>.json` holding the editable state of
//! every monitor at the time it was saved:
//!
//! ```json
//! {
//!   "timestamp": 1767225600,
//!   "displays": [
//!     { "name": "eDP-1", "x": 0, "y": 0, "width": 2256, "height": 1504,
//!       "scale": 1.5, "refresh_rate": 60.0, "transform": "normal" }
//!   ]
//! }
//! ```
//!
//! Applying a profile matches monitors by name; displays that are not
//! connected right now are reported back, not treated as an error.

use crate::monitor::{Monitor, MonitorError, MonitorState};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum ProfileError {
    #[error("invalid profile name {0:?}")]
    InvalidName(String),
    #[error("profile {0:?} does not exist")]
    NotFound(String),
    #[error("profile io error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("profile {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A saved layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Seconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub displays: Vec<MonitorState>,
}

impl Profile {
    /// Capture the current state of `monitors`, stamped with the current time.
    pub fn capture(monitors: &[Monitor]) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            timestamp,
            displays: monitors.iter().map(Monitor::state).collect(),
        }
    }

    /// Write every stored display onto the monitor of the same name.
    ///
    /// Returns the names of stored displays with no matching monitor.  Stops
    /// at the first display whose state is rejected; monitors already
    /// updated keep their new state.
    pub fn apply(&self, monitors: &mut [Monitor]) -> Result<Vec<String>, MonitorError> {
        let mut unmatched = Vec::new();
        for state in &self.displays {
            match monitors.iter_mut().find(|m| m.name() == state.name) {
                Some(m) => {
                    m.apply_state(state)?;
                }
                None => unmatched.push(state.name.clone()),
            }
        }
        if !unmatched.is_empty() {
            warn!("profile displays not connected: {}", unmatched.join(", "));
        }
        Ok(unmatched)
    }
}

/// A directory of `*.json` profiles.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$XDG_CONFIG_HOME/outlay/profiles`.
    pub fn default_dir() -> PathBuf {
        crate::config::config_dir().join("profiles")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, name: &str) -> Result<PathBuf, ProfileError> {
        if name.is_empty() || name.contains('/') || name.starts_with('.') {
            return Err(ProfileError::InvalidName(name.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }

    /// Names of all stored profiles, sorted.  A missing directory is empty.
    pub fn list(&self) -> Result<Vec<String>, ProfileError> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.dir, e)),
        };
        let mut names: Vec<String> = entries
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let file = entry.file_name().into_string().ok()?;
                file.strip_suffix(".json").map(str::to_string)
            })
            .filter(|name| !name.is_empty())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn save(&self, name: &str, profile: &Profile) -> Result<PathBuf, ProfileError> {
        let path = self.path(name)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;
        let json = serde_json::to_string_pretty(profile).map_err(|e| json_error(&path, e))?;
        std::fs::write(&path, json).map_err(|e| io_error(&path, e))?;
        info!("saved profile {} ({} display(s))", name, profile.displays.len());
        Ok(path)
    }

    pub fn load(&self, name: &str) -> Result<Profile, ProfileError> {
        let path = self.path(name)?;
        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ProfileError::NotFound(name.to_string()),
            _ => io_error(&path, e),
        })?;
        let profile: Profile = serde_json::from_str(&text).map_err(|e| json_error(&path, e))?;
        debug!("loaded profile {} from {}", name, path.display());
        Ok(profile)
    }

    /// Remove a profile.  Returns `false` if it did not exist.
    pub fn delete(&self, name: &str) -> Result<bool, ProfileError> {
        let path = self.path(name)?;
        match std::fs::remove_file(&path) {
            Ok(()) => {
                info!("deleted profile {}", name);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ProfileError {
    ProfileError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn json_error(path: &Path, source: serde_json::Error) -> ProfileError {
    ProfileError::Json {
        path: path.display().to_string(),
        source,
    }
}
