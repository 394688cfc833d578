//! Render monitors as `hyprland.conf` `monitor=` lines.
//!
//! ```text
//! monitor=DP-1,2560x1440@59.95,0x0,1
//! monitor=DP-2,3840x2160@60.00,2560x0,1.5,transform,1,vrr,1
//! monitor=HDMI-A-1,1920x1080@60.00,0x0,1,mirror,DP-1
//! monitor=eDP-1,disable
//! ```

use crate::monitor::Monitor;
use crate::transform::TransformMode;
use std::fmt::Write;

/// How the monitor is identified in the generated line.
fn selector(monitor: &Monitor, use_desc: bool) -> String {
    if use_desc && !monitor.description().is_empty() {
        format!("desc:{}", monitor.description())
    } else {
        monitor.name().to_string()
    }
}

/// One `monitor=` line.
pub fn monitor_line(monitor: &Monitor, use_desc: bool) -> String {
    let sel = selector(monitor, use_desc);
    if !monitor.is_active() {
        return format!("monitor={},disable", sel);
    }

    let mut line = format!(
        "monitor={},{}x{}@{:.2},{}x{},{}",
        sel,
        monitor.width(),
        monitor.height(),
        monitor.refresh_rate(),
        monitor.x(),
        monitor.y(),
        monitor.scale(),
    );
    if monitor.transform() != TransformMode::Normal {
        let _ = write!(line, ",transform,{}", monitor.transform().to_hyprland());
    }
    if let Some(target) = monitor.mirror_of() {
        let _ = write!(line, ",mirror,{}", target);
    }
    if monitor.is_ten_bit_enabled() {
        line.push_str(",bitdepth,10");
    }
    if monitor.is_adaptive_sync_enabled() {
        line.push_str(",vrr,1");
    }
    line
}

/// A complete `monitors.conf`.
pub fn render(monitors: &[Monitor], use_desc: bool) -> String {
    let mut out = String::from(crate::GENERATED_HEADER);
    out.push('\n');
    for m in monitors {
        out.push_str(&monitor_line(m, use_desc));
        out.push('\n');
    }
    out
}
