//! Compositor session detection and backend selection.
//!
//! Exactly one of `HYPRLAND_INSTANCE_SIGNATURE` and `SWAYSOCK` must be set.
//! Anything else is [`SessionError::Unsupported`], which callers treat as
//! fatal.

use crate::hyprland::monitors::HyprlandMonitorService;
use crate::monitor::Monitor;
use crate::sway::outputs::SwayMonitorService;
use crate::traits::{BackendError, MonitorService};
use std::fmt;
use std::path::{Path, PathBuf};

pub const HYPRLAND_MARKER: &str = "HYPRLAND_INSTANCE_SIGNATURE";
pub const SWAY_MARKER: &str = "SWAYSOCK";

/// The compositor this process runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionType {
    Hyprland,
    Sway,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Hyprland => write!(f, "Hyprland"),
            SessionType::Sway => write!(f, "Sway"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(
        "unsupported session (hyprland marker: {hyprland}, sway marker: {sway}); \
         exactly one of Hyprland or Sway must be running"
    )]
    Unsupported { hyprland: bool, sway: bool },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl SessionType {
    /// Detect the session from the process environment.
    pub fn detect() -> Result<Self, SessionError> {
        Self::detect_with(|key| std::env::var_os(key).is_some_and(|v| !v.is_empty()))
    }

    /// Detect the session given a predicate telling whether an environment
    /// variable is set.
    pub fn detect_with(is_set: impl Fn(&str) -> bool) -> Result<Self, SessionError> {
        let hyprland = is_set(HYPRLAND_MARKER);
        let sway = is_set(SWAY_MARKER);
        match (hyprland, sway) {
            (true, false) => Ok(SessionType::Hyprland),
            (false, true) => Ok(SessionType::Sway),
            _ => Err(SessionError::Unsupported { hyprland, sway }),
        }
    }
}

/// The closed set of monitor services, selected by session type.
#[derive(Debug, Clone)]
pub enum SessionMonitorService {
    Hyprland(HyprlandMonitorService),
    Sway(SwayMonitorService),
}

impl SessionMonitorService {
    /// Detect the session and connect to its compositor.
    pub fn from_env() -> Result<Self, SessionError> {
        Self::for_session(SessionType::detect()?)
    }

    pub fn for_session(session: SessionType) -> Result<Self, SessionError> {
        Ok(match session {
            SessionType::Hyprland => Self::Hyprland(HyprlandMonitorService::from_env()?),
            SessionType::Sway => Self::Sway(SwayMonitorService::from_env()?),
        })
    }

    pub fn session_type(&self) -> SessionType {
        match self {
            Self::Hyprland(_) => SessionType::Hyprland,
            Self::Sway(_) => SessionType::Sway,
        }
    }

    /// Where the generated native config is written, relative to
    /// `config_home` (normally [`xdg_config_home`](crate::config::xdg_config_home)).
    ///
    /// The file is meant to be sourced from the main compositor config.
    pub fn native_config_path(&self, config_home: &Path) -> PathBuf {
        match self {
            Self::Hyprland(_) => config_home.join("hypr").join("monitors.conf"),
            Self::Sway(_) => config_home.join("sway").join("outputs"),
        }
    }

    /// Render `monitors` in this compositor's native config syntax.
    pub fn render_config(&self, monitors: &[Monitor], use_desc: bool) -> String {
        match self {
            Self::Hyprland(_) => crate::hyprland::config::render(monitors, use_desc),
            Self::Sway(_) => crate::sway::config::render(monitors, use_desc),
        }
    }

    /// Write the native config under `config_home` and return its path.
    pub fn save_config(
        &self,
        monitors: &[Monitor],
        use_desc: bool,
        config_home: &Path,
    ) -> std::io::Result<PathBuf> {
        let path = self.native_config_path(config_home);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, self.render_config(monitors, use_desc))?;
        Ok(path)
    }

    /// Ask the compositor to reload its config so a saved layout takes
    /// effect.
    pub fn reload(&self) -> Result<(), BackendError> {
        match self {
            Self::Hyprland(svc) => {
                let reply = svc.ipc().request("reload")?;
                if reply.trim() == "ok" {
                    Ok(())
                } else {
                    Err(BackendError::Protocol(format!("reload: {}", reply.trim())))
                }
            }
            Self::Sway(svc) => svc.ipc().run_command("reload"),
        }
    }
}

impl MonitorService for SessionMonitorService {
    fn list(&self) -> Result<Vec<Monitor>, BackendError> {
        match self {
            Self::Hyprland(svc) => svc.list(),
            Self::Sway(svc) => svc.list(),
        }
    }
}
