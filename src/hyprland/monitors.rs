//! Hyprland adapter: `j/monitors all` → [`Monitor`].

use super::ipc::HyprlandIpc;
use crate::mode::MonitorMode;
use crate::monitor::{build_snapshot, Backend, Monitor, MonitorConfiguration};
use crate::traits::{BackendError, MonitorService};
use crate::transform::TransformMode;
use log::{debug, warn};
use serde::Deserialize;

/// Pixel formats Hyprland reports for 10-bit output.
const TEN_BIT_FORMATS: [&str; 2] = ["XRGB2101010", "XBGR2101010"];

/// Subset of one element of the `j/monitors all` array.
///
/// Everything except `name` is optional so that older Hyprland releases
/// (and disabled monitors, which report fewer fields) still parse.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HyprlandMonitorJson {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub serial: String,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default = "default_scale")]
    pub scale: f64,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default = "default_refresh_rate")]
    pub refresh_rate: f64,
    #[serde(default)]
    pub transform: i64,
    #[serde(default = "default_true")]
    pub dpms_status: bool,
    #[serde(default)]
    pub vrr: bool,
    #[serde(default)]
    pub current_format: String,
    #[serde(default)]
    pub mirror_of: Option<String>,
    #[serde(default)]
    pub available_modes: Vec<String>,
}

fn default_scale() -> f64 {
    1.0
}

fn default_refresh_rate() -> f64 {
    60.0
}

fn default_true() -> bool {
    true
}

/// Translate one Hyprland monitor object.
///
/// Pure and infallible: malformed modes are skipped with a warning and
/// out-of-domain numbers are replaced by their defaults.
pub fn from_hyprland_response(raw: &HyprlandMonitorJson) -> MonitorConfiguration {
    let transform = TransformMode::from_hyprland(raw.transform).unwrap_or_else(|| {
        warn!("{}: unknown transform {}, using normal", raw.name, raw.transform);
        TransformMode::Normal
    });

    let available_modes: Vec<MonitorMode> = raw
        .available_modes
        .iter()
        .filter_map(|s| match s.parse::<MonitorMode>() {
            Ok(mode) => Some(mode),
            Err(e) => {
                warn!("{}: skipping mode: {}", raw.name, e);
                None
            }
        })
        .collect();

    let scale = if raw.scale.is_finite() && raw.scale > 0.0 {
        raw.scale
    } else {
        warn!("{}: invalid scale {}, using 1.0", raw.name, raw.scale);
        default_scale()
    };

    let refresh_rate = if raw.refresh_rate.is_finite() && raw.refresh_rate > 0.0 {
        (raw.refresh_rate * 100.0).round() / 100.0
    } else {
        default_refresh_rate()
    };

    // Disabled monitors may report a 0×0 size; borrow the preferred mode.
    let (physical_width, physical_height) = if raw.width > 0 && raw.height > 0 {
        (raw.width, raw.height)
    } else {
        available_modes
            .first()
            .map(|m| (m.width, m.height))
            .unwrap_or((raw.width.max(1), raw.height.max(1)))
    };

    let is_mirror_of = raw
        .mirror_of
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty() && *m != "none")
        .map(str::to_string);

    MonitorConfiguration {
        name: raw.name.clone(),
        make: raw.make.clone(),
        model: raw.model.clone(),
        serial: raw.serial.clone(),
        description: raw.description.clone(),
        is_active: !raw.disabled,
        x: raw.x,
        y: raw.y,
        physical_width,
        physical_height,
        scale,
        refresh_rate,
        transform,
        available_modes,
        is_adaptive_sync_enabled: raw.vrr,
        is_dpms_enabled: raw.dpms_status,
        is_ten_bit_enabled: TEN_BIT_FORMATS.contains(&raw.current_format.as_str()),
        backend: Backend::Hyprland,
        is_mirror: is_mirror_of.is_some(),
        is_mirror_of,
        display_id: raw.id,
    }
}

/// Parse a complete `j/monitors all` reply into a monitor snapshot.
pub fn parse_monitors(json: &str) -> Result<Vec<Monitor>, BackendError> {
    let raw: Vec<HyprlandMonitorJson> = serde_json::from_str(json)?;
    debug!("hyprland reported {} monitor(s)", raw.len());
    Ok(build_snapshot(raw.iter().map(|m| {
        let mut config = from_hyprland_response(m);
        config.is_mirror_of = config
            .is_mirror_of
            .map(|target| mirror_target_name(&raw, target));
        config
    })))
}

/// Hyprland reports `mirrorOf` as the mirrored monitor's numeric id.  Map
/// it to that monitor's name; anything else is kept as given.
fn mirror_target_name(raw: &[HyprlandMonitorJson], target: String) -> String {
    let Ok(id) = target.parse::<i64>() else {
        return target;
    };
    match raw.iter().find(|m| m.id == Some(id)) {
        Some(m) => m.name.clone(),
        None => target,
    }
}

/// [`MonitorService`] backed by Hyprland IPC.
#[derive(Debug, Clone)]
pub struct HyprlandMonitorService {
    ipc: HyprlandIpc,
}

impl HyprlandMonitorService {
    pub fn new(ipc: HyprlandIpc) -> Self {
        Self { ipc }
    }

    /// Connect to the Hyprland instance named by the environment.
    pub fn from_env() -> Result<Self, BackendError> {
        Ok(Self::new(HyprlandIpc::from_env()?))
    }

    pub fn ipc(&self) -> &HyprlandIpc {
        &self.ipc
    }
}

impl MonitorService for HyprlandMonitorService {
    fn list(&self) -> Result<Vec<Monitor>, BackendError> {
        let json = self.ipc.json("monitors all")?;
        parse_monitors(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hyprland::ipc::tests::serve_once;

    const TWO_MONITORS: &str = r#"[
        {
            "id": 0, "name": "eDP-1", "description": "BOE 0x0BCA",
            "make": "BOE", "model": "0x0BCA", "serial": "",
            "width": 2256, "height": 1504, "refreshRate": 59.99900,
            "x": 0, "y": 0, "scale": 1.5, "transform": 0,
            "disabled": false, "dpmsStatus": true, "vrr": false,
            "currentFormat": "XRGB8888", "mirrorOf": "none",
            "availableModes": ["2256x1504@60.00Hz", "garbage", "1920x1200@59.95Hz"]
        },
        {
            "id": 1, "name": "DP-3", "description": "Dell U2720Q",
            "make": "Dell Inc.", "model": "DELL U2720Q", "serial": "ABC123",
            "width": 3840, "height": 2160, "refreshRate": 60.0,
            "x": 1504, "y": 0, "scale": 2.0, "transform": 1,
            "disabled": false, "dpmsStatus": false, "vrr": true,
            "currentFormat": "XBGR2101010", "mirrorOf": "eDP-1",
            "availableModes": ["3840x2160@60.00Hz", "3840x2160@60.00Hz"]
        }
    ]"#;

    #[test]
    fn parses_full_response() {
        let monitors = parse_monitors(TWO_MONITORS).unwrap();
        assert_eq!(monitors.len(), 2);

        let edp = &monitors[0];
        assert_eq!(edp.name(), "eDP-1");
        assert_eq!(edp.backend(), Backend::Hyprland);
        assert_eq!(edp.refresh_rate(), 60.0);
        assert_eq!(edp.logical_width(), 1504.0);
        assert!((edp.logical_height() - 1002.67).abs() < 0.01);
        assert!(!edp.is_ten_bit_enabled());
        assert!(!edp.is_mirror());
        // The malformed entry is skipped, not fatal.
        assert_eq!(edp.available_modes().len(), 2);
        assert_eq!(edp.display_id(), Some(0));

        let dp = &monitors[1];
        assert_eq!(dp.transform(), TransformMode::Rotate90);
        assert!(dp.is_ten_bit_enabled());
        assert!(dp.is_adaptive_sync_enabled());
        assert!(!dp.is_dpms_enabled());
        assert_eq!(dp.mirror_of(), Some("eDP-1"));
        assert!(dp.is_mirror());
        // Duplicate modes collapse.
        assert_eq!(dp.available_modes().len(), 1);
        // Rotated: logical width comes from the physical height.
        assert_eq!(dp.logical_size(), (1080.0, 1920.0));
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let monitors = parse_monitors(r#"[{"name": "HDMI-A-1", "width": 1920, "height": 1080}]"#).unwrap();
        let m = &monitors[0];
        assert_eq!(m.scale(), 1.0);
        assert_eq!(m.refresh_rate(), 60.0);
        assert!(m.is_active());
        assert!(m.is_dpms_enabled());
        assert_eq!(m.transform(), TransformMode::Normal);
    }

    #[test]
    fn disabled_monitor_borrows_size_from_first_mode() {
        let monitors = parse_monitors(
            r#"[{"name": "DP-2", "disabled": true, "width": 0, "height": 0,
                 "availableModes": ["2560x1440@143.97Hz"]}]"#,
        )
        .unwrap();
        assert!(!monitors[0].is_active());
        assert_eq!((monitors[0].width(), monitors[0].height()), (2560, 1440));
    }

    #[test]
    fn unknown_transform_falls_back_to_normal() {
        let raw: HyprlandMonitorJson =
            serde_json::from_str(r#"{"name": "DP-1", "width": 10, "height": 10, "transform": 9}"#).unwrap();
        assert_eq!(from_hyprland_response(&raw).transform, TransformMode::Normal);
    }

    #[test]
    fn dangling_mirror_is_cleared() {
        let monitors = parse_monitors(
            r#"[{"name": "DP-1", "width": 10, "height": 10, "mirrorOf": "DP-9"}]"#,
        )
        .unwrap();
        assert!(!monitors[0].is_mirror());
    }

    #[test]
    fn numeric_mirror_target_resolves_to_a_name() {
        let monitors = parse_monitors(
            r#"[
                {"id": 1, "name": "HDMI-A-1", "width": 1920, "height": 1080, "mirrorOf": "0"},
                {"id": 0, "name": "eDP-1", "width": 1920, "height": 1080, "mirrorOf": "none"}
            ]"#,
        )
        .unwrap();
        assert_eq!(monitors[0].mirror_of(), Some("eDP-1"));
        assert!(monitors[0].is_mirror());
        assert_eq!(monitors[1].mirror_of(), None);
        assert!(!monitors[1].is_mirror());
    }

    #[test]
    fn unknown_numeric_mirror_target_is_cleared() {
        let monitors = parse_monitors(
            r#"[{"id": 0, "name": "DP-1", "width": 10, "height": 10, "mirrorOf": "7"}]"#,
        )
        .unwrap();
        assert!(!monitors[0].is_mirror());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(parse_monitors("not json"), Err(BackendError::Json(_))));
    }

    #[test]
    fn service_queries_monitors_all() {
        let (path, server) = serve_once(r#"[{"name": "DP-1", "width": 1920, "height": 1080}]"#);
        let svc = HyprlandMonitorService::new(HyprlandIpc::at(&path));
        let monitors = svc.list().unwrap();
        assert_eq!(monitors.len(), 1);
        assert_eq!(server.join().unwrap(), "j/monitors all");
        let _ = std::fs::remove_file(&path);
    }
}
