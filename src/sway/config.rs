//! Render monitors as sway `output` blocks.
//!
//! ```text
//! output "DP-1" {
//!     mode 2560x1440@59.951Hz
//!     pos 0 0
//!     transform normal
//!     scale 1
//!     adaptive_sync off
//!     dpms on
//! }
//! output "eDP-1" disable
//! ```

use crate::monitor::Monitor;

fn on_off(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

fn selector(monitor: &Monitor, use_desc: bool) -> &str {
    if use_desc && !monitor.description().is_empty() {
        monitor.description()
    } else {
        monitor.name()
    }
}

/// One `output` block (or single `disable` line).
pub fn output_block(monitor: &Monitor, use_desc: bool) -> String {
    let sel = selector(monitor, use_desc);
    if !monitor.is_active() {
        return format!("output \"{}\" disable\n", sel);
    }
    format!(
        "output \"{}\" {{\n    mode {}x{}@{}Hz\n    pos {} {}\n    transform {}\n    scale {}\n    adaptive_sync {}\n    dpms {}\n}}\n",
        sel,
        monitor.width(),
        monitor.height(),
        monitor.refresh_rate(),
        monitor.x(),
        monitor.y(),
        monitor.transform(),
        monitor.scale(),
        on_off(monitor.is_adaptive_sync_enabled()),
        on_off(monitor.is_dpms_enabled()),
    )
}

/// A complete sway `outputs` include file.
pub fn render(monitors: &[Monitor], use_desc: bool) -> String {
    let mut out = String::from(crate::GENERATED_HEADER);
    out.push('\n');
    for m in monitors {
        out.push('\n');
        out.push_str(&output_block(m, use_desc));
    }
    out
}
