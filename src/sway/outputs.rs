//! Sway adapter: `GET_OUTPUTS` → [`Monitor`].

use super::ipc::{SwayIpc, GET_OUTPUTS};
use crate::mode::MonitorMode;
use crate::monitor::{build_snapshot, Backend, Monitor, MonitorConfiguration};
use crate::traits::{BackendError, MonitorService};
use crate::transform::TransformMode;
use log::{debug, warn};
use serde::Deserialize;

/// Outputs whose names start with this prefix are sway-internal
/// placeholders, never real monitors.
const INTERNAL_PREFIX: &str = "__";

/// Subset of one `GET_OUTPUTS` record.
#[derive(Debug, Clone, Deserialize)]
pub struct SwayOutputJson {
    pub name: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Disabled outputs report `-1.0`.
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub rect: SwayRect,
    #[serde(default)]
    pub current_mode: Option<SwayMode>,
    #[serde(default)]
    pub modes: Vec<SwayMode>,
    #[serde(default)]
    pub transform: Option<SwayTransform>,
    #[serde(default)]
    pub dpms: Option<bool>,
    /// Replaces `dpms` in sway ≥ 1.8.
    #[serde(default)]
    pub power: Option<bool>,
    #[serde(default)]
    pub adaptive_sync_status: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SwayRect {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
}

/// A mode as sway reports it; `refresh` is in millihertz.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SwayMode {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub refresh: i64,
}

impl From<SwayMode> for MonitorMode {
    fn from(m: SwayMode) -> Self {
        MonitorMode::from_millihertz(m.width, m.height, m.refresh)
    }
}

/// Sway reports the transform as a string, some builds as an integer.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SwayTransform {
    Index(i64),
    Name(String),
}

fn default_true() -> bool {
    true
}

fn parse_transform(name: &str, raw: Option<&SwayTransform>) -> TransformMode {
    let parsed = match raw {
        None => Some(TransformMode::Normal),
        Some(SwayTransform::Index(i)) => TransformMode::from_hyprland(*i),
        Some(SwayTransform::Name(s)) => s.parse().ok(),
    };
    parsed.unwrap_or_else(|| {
        warn!("{}: unknown transform {:?}, using normal", name, raw);
        TransformMode::Normal
    })
}

/// Translate one sway output record.
pub fn from_sway_response(raw: &SwayOutputJson) -> MonitorConfiguration {
    let scale = raw
        .scale
        .filter(|s| s.is_finite() && *s > 0.0)
        .unwrap_or(1.0);

    let available_modes: Vec<MonitorMode> =
        raw.modes.iter().copied().map(MonitorMode::from).collect();

    // Disabled outputs have no current mode.
    let current = raw.current_mode.or_else(|| raw.modes.first().copied());
    let (width, height) = match current {
        Some(m) => (m.width, m.height),
        None => (
            (raw.rect.width.max(0) as f64 * scale).round() as u32,
            (raw.rect.height.max(0) as f64 * scale).round() as u32,
        ),
    };
    let refresh_rate = current
        .filter(|m| m.refresh > 0)
        .map(|m| m.refresh as f64 / 1000.0)
        .unwrap_or(60.0);

    let description = [raw.make.as_str(), raw.model.as_str(), raw.serial.as_str()]
        .iter()
        .filter(|s| !s.is_empty() && **s != "Unknown")
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    MonitorConfiguration {
        name: raw.name.clone(),
        make: raw.make.clone(),
        model: raw.model.clone(),
        serial: raw.serial.clone(),
        description,
        is_active: raw.active,
        x: raw.rect.x,
        y: raw.rect.y,
        physical_width: width.max(1),
        physical_height: height.max(1),
        scale,
        refresh_rate,
        transform: parse_transform(&raw.name, raw.transform.as_ref()),
        available_modes,
        is_adaptive_sync_enabled: raw.adaptive_sync_status.as_deref() == Some("enabled"),
        is_dpms_enabled: raw.dpms.or(raw.power).unwrap_or(true),
        // Sway exposes neither the pixel format nor mirroring.
        is_ten_bit_enabled: false,
        backend: Backend::Sway,
        is_mirror: false,
        is_mirror_of: None,
        display_id: None,
    }
}

/// Parse a complete `GET_OUTPUTS` reply into a monitor snapshot.
pub fn parse_outputs(json: &str) -> Result<Vec<Monitor>, BackendError> {
    let raw: Vec<SwayOutputJson> = serde_json::from_str(json)?;
    debug!("sway reported {} output(s)", raw.len());
    Ok(build_snapshot(
        raw.iter()
            .filter(|o| !o.name.starts_with(INTERNAL_PREFIX))
            .map(from_sway_response),
    ))
}

/// [`MonitorService`] backed by Sway IPC.
#[derive(Debug, Clone)]
pub struct SwayMonitorService {
    ipc: SwayIpc,
}

impl SwayMonitorService {
    pub fn new(ipc: SwayIpc) -> Self {
        Self { ipc }
    }

    pub fn from_env() -> Result<Self, BackendError> {
        Ok(Self::new(SwayIpc::from_env()?))
    }

    pub fn ipc(&self) -> &SwayIpc {
        &self.ipc
    }
}

impl MonitorService for SwayMonitorService {
    fn list(&self) -> Result<Vec<Monitor>, BackendError> {
        let json = self.ipc.request(GET_OUTPUTS, "")?;
        parse_outputs(&json)
    }
}
