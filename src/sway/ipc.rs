//! Minimal client for the i3/Sway IPC protocol.
//!
//! # Wire format
//!
//! Every message, in both directions, is
//!
//! ```text
//! "i3-ipc" | payload length (u32 LE) | message type (u32 LE) | payload
//! ```
//!
//! The reply to a request carries the same message type.  Only the two
//! request types needed here are defined.

use crate::traits::BackendError;
use log::debug;
use serde::Deserialize;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

const MAGIC: &[u8; 6] = b"i3-ipc";
const HEADER_LEN: usize = MAGIC.len() + 8;
/// Largest payload accepted from the socket.
pub const MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// `RUN_COMMAND`: execute a sway command string.
pub const RUN_COMMAND: u32 = 0;
/// `GET_OUTPUTS`: list outputs as a JSON array.
pub const GET_OUTPUTS: u32 = 3;

/// Handle to the Sway IPC socket named by `$SWAYSOCK`.
#[derive(Debug, Clone)]
pub struct SwayIpc {
    socket: PathBuf,
}

impl SwayIpc {
    pub fn from_env() -> Result<Self, BackendError> {
        let socket = std::env::var_os("SWAYSOCK")
            .ok_or_else(|| BackendError::Socket("SWAYSOCK not set".into()))?;
        Ok(Self::at(PathBuf::from(socket)))
    }

    pub fn at(socket: impl AsRef<Path>) -> Self {
        Self {
            socket: socket.as_ref().to_path_buf(),
        }
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }

    /// Send one message and wait for its reply payload.
    pub fn request(&self, message_type: u32, payload: &str) -> Result<String, BackendError> {
        debug!("sway request type {} ({} bytes)", message_type, payload.len());
        let mut stream =
            UnixStream::connect(&self.socket).map_err(|source| BackendError::Connect {
                path: self.socket.display().to_string(),
                source,
            })?;
        stream.write_all(&encode(message_type, payload.as_bytes()))?;

        let (reply_type, body) = read_message(&mut stream)?;
        if reply_type != message_type {
            return Err(BackendError::Protocol(format!(
                "expected reply type {}, got {}",
                message_type, reply_type
            )));
        }
        Ok(String::from_utf8(body)?)
    }

    /// Run a sway command (`RUN_COMMAND`).  Fails if sway reports any of
    /// the command's parts as unsuccessful.
    pub fn run_command(&self, command: &str) -> Result<(), BackendError> {
        let reply = self.request(RUN_COMMAND, command)?;
        let outcomes: Vec<CommandOutcome> = serde_json::from_str(&reply)?;
        match outcomes.into_iter().find(|o| !o.success) {
            Some(failed) => Err(BackendError::Protocol(format!(
                "sway rejected {:?}: {}",
                command,
                failed.error.unwrap_or_else(|| "unknown error".into())
            ))),
            None => Ok(()),
        }
    }
}

/// One element of a `RUN_COMMAND` reply.
#[derive(Debug, Deserialize)]
struct CommandOutcome {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Frame a message.
pub fn encode(message_type: u32, payload: &[u8]) -> Vec<u8> {
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(MAGIC);
    frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    frame.extend_from_slice(&message_type.to_le_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// Read one framed message, returning its type and payload.
pub fn read_message(reader: &mut impl Read) -> Result<(u32, Vec<u8>), BackendError> {
    let mut header = [0u8; HEADER_LEN];
    reader.read_exact(&mut header)?;
    if &header[..MAGIC.len()] != MAGIC {
        return Err(BackendError::Protocol("bad magic in reply header".into()));
    }
    let len = u32::from_le_bytes([header[6], header[7], header[8], header[9]]) as usize;
    let message_type = u32::from_le_bytes([header[10], header[11], header[12], header[13]]);
    if len > MAX_PAYLOAD {
        return Err(BackendError::Protocol(format!(
            "reply of {} bytes exceeds the {} byte limit",
            len, MAX_PAYLOAD
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body)?;
    Ok((message_type, body))
}
