//! Minimal client for Hyprland's request socket.
//!
//! Talks to `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`
//! directly, without spawning `hyprctl`.  Hyprland releases before the
//! socket move (#5788) kept it under `/tmp/hypr/`, which is used as a
//! fallback when `$XDG_RUNTIME_DIR/hypr` does not exist.

use crate::traits::BackendError;
use log::debug;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Handle to one Hyprland instance's request socket.
///
/// No connection is held open; each request connects, writes the command,
/// and reads until Hyprland closes the stream.
#[derive(Debug, Clone)]
pub struct HyprlandIpc {
    socket: PathBuf,
}

impl HyprlandIpc {
    /// Locate the socket of the Hyprland instance this process runs under.
    pub fn from_env() -> Result<Self, BackendError> {
        let signature = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
            .map_err(|_| BackendError::Socket("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
        let runtime_dir = std::env::var_os("XDG_RUNTIME_DIR").map(PathBuf::from);
        Ok(Self::at(socket_path(runtime_dir.as_deref(), &signature)))
    }

    /// Use an explicit socket path.
    pub fn at(socket: impl AsRef<Path>) -> Self {
        Self {
            socket: socket.as_ref().to_path_buf(),
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Send a raw command and return the full response.
    pub fn request(&self, command: &str) -> Result<String, BackendError> {
        debug!("hyprland request {:?}", command);
        let mut stream =
            UnixStream::connect(&self.socket).map_err(|source| BackendError::Connect {
                path: self.socket.display().to_string(),
                source,
            })?;
        stream.write_all(command.as_bytes())?;

        let mut response = Vec::new();
        stream.read_to_end(&mut response)?;
        Ok(String::from_utf8(response)?)
    }

    /// Send a JSON data query (`j/<command>`) and return the raw JSON.
    pub fn json(&self, data_command: &str) -> Result<String, BackendError> {
        self.request(&format!("j/{}", data_command))
    }
}

/// Resolve the request socket for `signature`.
pub fn socket_path(runtime_dir: Option<&Path>, signature: &str) -> PathBuf {
    let hypr_dir = runtime_dir
        .map(|dir| dir.join("hypr"))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| PathBuf::from("/tmp/hypr"));
    hypr_dir.join(signature).join(".socket.sock")
}
