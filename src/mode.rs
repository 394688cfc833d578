//! Display modes: one resolution + refresh-rate combination.
//!
//! Hyprland reports modes as strings (`"1920x1080@60.00Hz"`), Sway as
//! structured records with the refresh rate in millihertz.  Both end up as
//! a [`MonitorMode`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A resolution and refresh rate supported by a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorMode {
    /// Horizontal resolution in physical pixels.
    pub width: u32,
    /// Vertical resolution in physical pixels.
    pub height: u32,
    /// Refresh rate in Hz.
    pub refresh_rate: f64,
}

/// A mode string from the compositor that could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed mode string {input:?}: {reason}")]
pub struct ModeParseError {
    pub input: String,
    pub reason: &'static str,
}

impl MonitorMode {
    pub fn new(width: u32, height: u32, refresh_rate: f64) -> Self {
        Self {
            width,
            height,
            refresh_rate,
        }
    }

    /// Build a mode from Sway's representation, where `refresh` is given in
    /// millihertz.
    pub fn from_millihertz(width: u32, height: u32, refresh: i64) -> Self {
        Self::new(width, height, refresh as f64 / 1000.0)
    }
}

impl FromStr for MonitorMode {
    type Err = ModeParseError;

    /// Parse `"<W>x<H>@<R>Hz"`.  The `Hz` suffix is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ModeParseError {
            input: s.to_string(),
            reason,
        };

        let trimmed = s.trim();
        let (size, rate) = trimmed.split_once('@').ok_or_else(|| err("missing '@'"))?;
        let (w, h) = size.split_once('x').ok_or_else(|| err("missing 'x'"))?;

        let width: u32 = w.trim().parse().map_err(|_| err("bad width"))?;
        let height: u32 = h.trim().parse().map_err(|_| err("bad height"))?;
        let rate = rate.trim();
        let rate = rate.strip_suffix("Hz").unwrap_or(rate);
        let refresh_rate: f64 = rate.trim().parse().map_err(|_| err("bad refresh rate"))?;

        if width == 0 || height == 0 {
            return Err(err("zero dimension"));
        }
        if !refresh_rate.is_finite() || refresh_rate <= 0.0 {
            return Err(err("refresh rate must be positive"));
        }

        Ok(Self::new(width, height, refresh_rate))
    }
}

impl fmt::Display for MonitorMode {
    /// Two decimals, or as many as it takes to parse back to the same rate
    /// (Sway rates come in millihertz).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let two = format!("{:.2}", self.refresh_rate);
        if two.parse::<f64>() == Ok(self.refresh_rate) {
            write!(f, "{}x{}@{}Hz", self.width, self.height, two)
        } else {
            write!(f, "{}x{}@{}Hz", self.width, self.height, self.refresh_rate)
        }
    }
}

/// Collect modes in order, dropping exact duplicates (first occurrence wins).
pub fn dedup_modes(modes: impl IntoIterator<Item = MonitorMode>) -> Vec<MonitorMode> {
    let mut out: Vec<MonitorMode> = Vec::new();
    for mode in modes {
        if !out.contains(&mode) {
            out.push(mode);
        }
    }
    out
}
