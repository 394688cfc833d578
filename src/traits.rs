//! Core traits that decouple the arrangement model from any specific
//! compositor or UI toolkit.
//!
//! * [`MonitorService`]: produces a fresh snapshot of the compositor's
//!   monitors.  Implemented per backend in [`hyprland`](crate::hyprland) and
//!   [`sway`](crate::sway), and by the session-selected
//!   [`SessionMonitorService`](crate::session::SessionMonitorService).
//! * [`MonitorObserver`]: receives typed change events from a
//!   [`Monitor`](crate::monitor::Monitor).

use crate::monitor::{Monitor, MonitorChange};
use std::sync::mpsc;

/// Errors from querying a compositor.
///
/// No partial monitor list is ever returned alongside an error.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("IPC socket not found: {0}")]
    Socket(String),
    #[error("IPC connect to {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IPC io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("IPC response is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("IPC response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IPC protocol error: {0}")]
    Protocol(String),
}

/// Abstraction over a compositor that can report its monitors.
///
/// # Contract
///
/// * [`list`](MonitorService::list) performs a blocking IPC round-trip.  Call
///   it once per session refresh (start-up, hot-plug, explicit reload),
///   never per frame.
/// * Every call returns a complete, new snapshot.  Nothing is cached and the
///   compositor state is never modified.
/// * Monitor names are unique within one snapshot.
pub trait MonitorService {
    /// Query the compositor for all monitors, active or not.
    fn list(&self) -> Result<Vec<Monitor>, BackendError>;
}

/// Receives a notification after every committed change to a monitor.
///
/// Callbacks run synchronously on the thread that performed the mutation.
pub trait MonitorObserver {
    fn property_changed(&self, change: &MonitorChange);
}

/// Forward changes into a channel, so a UI loop can drain them later.
///
/// A disconnected receiver is ignored.
impl MonitorObserver for mpsc::Sender<MonitorChange> {
    fn property_changed(&self, change: &MonitorChange) {
        let _ = self.send(change.clone());
    }
}
