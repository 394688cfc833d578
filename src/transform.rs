//! Output rotation and flip states.
//!
//! Hyprland encodes a transform as an integer `0..=7`, Sway as a string
//! (`"normal"`, `"90"`, `"flipped-270"`, …).  Both map onto
//! [`TransformMode`]; the integer table is [`HYPRLAND_TRANSFORMS`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rotation / flip applied to an output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TransformMode {
    #[default]
    #[serde(rename = "normal")]
    Normal,
    #[serde(rename = "90")]
    Rotate90,
    #[serde(rename = "180")]
    Rotate180,
    #[serde(rename = "270")]
    Rotate270,
    #[serde(rename = "flipped")]
    Flipped,
    #[serde(rename = "flipped-90")]
    FlippedRotate90,
    #[serde(rename = "flipped-180")]
    FlippedRotate180,
    #[serde(rename = "flipped-270")]
    FlippedRotate270,
}

/// Hyprland's `transform` integer, indexed by value.
///
/// The order must match Hyprland's `wl_output_transform` numbering exactly.
pub const HYPRLAND_TRANSFORMS: [TransformMode; 8] = [
    TransformMode::Normal,
    TransformMode::Rotate90,
    TransformMode::Rotate180,
    TransformMode::Rotate270,
    TransformMode::Flipped,
    TransformMode::FlippedRotate90,
    TransformMode::FlippedRotate180,
    TransformMode::FlippedRotate270,
];

/// A transform name the compositor sent that we do not recognise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown transform: {0:?}")]
pub struct TransformParseError(pub String);

impl TransformMode {
    /// Map Hyprland's integer encoding.  Returns `None` outside `0..=7`.
    pub fn from_hyprland(value: i64) -> Option<Self> {
        usize::try_from(value)
            .ok()
            .and_then(|i| HYPRLAND_TRANSFORMS.get(i).copied())
    }

    /// Inverse of [`from_hyprland`](Self::from_hyprland).
    pub fn to_hyprland(self) -> u8 {
        HYPRLAND_TRANSFORMS
            .iter()
            .position(|t| *t == self)
            .unwrap_or(0) as u8
    }

    /// The string Sway uses in IPC replies and `output … transform` commands.
    pub fn as_sway_str(self) -> &'static str {
        match self {
            TransformMode::Normal => "normal",
            TransformMode::Rotate90 => "90",
            TransformMode::Rotate180 => "180",
            TransformMode::Rotate270 => "270",
            TransformMode::Flipped => "flipped",
            TransformMode::FlippedRotate90 => "flipped-90",
            TransformMode::FlippedRotate180 => "flipped-180",
            TransformMode::FlippedRotate270 => "flipped-270",
        }
    }

    /// Whether this transform swaps the logical width and height.
    pub fn is_rotated(self) -> bool {
        matches!(
            self,
            TransformMode::Rotate90
                | TransformMode::Rotate270
                | TransformMode::FlippedRotate90
                | TransformMode::FlippedRotate270
        )
    }

    /// Human-readable label for UI lists.
    pub fn label(self) -> &'static str {
        match self {
            TransformMode::Normal => "Normal",
            TransformMode::Rotate90 => "Rotate 90",
            TransformMode::Rotate180 => "Rotate 180",
            TransformMode::Rotate270 => "Rotate 270",
            TransformMode::Flipped => "Flipped",
            TransformMode::FlippedRotate90 => "Flipped Rotate 90",
            TransformMode::FlippedRotate180 => "Flipped Rotate 180",
            TransformMode::FlippedRotate270 => "Flipped Rotate 270",
        }
    }
}

impl FromStr for TransformMode {
    type Err = TransformParseError;

    /// Parse Sway's string form.  Bare integers are accepted too and read
    /// with the Hyprland table, since some Sway versions report them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(t) = HYPRLAND_TRANSFORMS
            .iter()
            .find(|t| t.as_sway_str().eq_ignore_ascii_case(s))
        {
            return Ok(*t);
        }
        s.parse::<i64>()
            .ok()
            .and_then(TransformMode::from_hyprland)
            .ok_or_else(|| TransformParseError(s.to_string()))
    }
}

impl fmt::Display for TransformMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sway_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn hyprland_table_matches_documented_order() {
        let expected = [
            (0, TransformMode::Normal),
            (1, TransformMode::Rotate90),
            (2, TransformMode::Rotate180),
            (3, TransformMode::Rotate270),
            (4, TransformMode::Flipped),
            (5, TransformMode::FlippedRotate90),
            (6, TransformMode::FlippedRotate180),
            (7, TransformMode::FlippedRotate270),
        ];
        for (i, t) in expected {
            assert_eq!(TransformMode::from_hyprland(i), Some(t), "index {i}");
            assert_eq!(t.to_hyprland() as i64, i);
        }
    }

    #[test]
    fn hyprland_table_is_a_bijection() {
        let mapped: HashSet<TransformMode> =
            (0..8).filter_map(TransformMode::from_hyprland).collect();
        assert_eq!(mapped.len(), 8);
    }

    #[test]
    fn out_of_range_hyprland_values() {
        assert_eq!(TransformMode::from_hyprland(-1), None);
        assert_eq!(TransformMode::from_hyprland(8), None);
    }

    #[test]
    fn sway_strings_parse() {
        assert_eq!("normal".parse(), Ok(TransformMode::Normal));
        assert_eq!("270".parse(), Ok(TransformMode::Rotate270));
        assert_eq!("flipped-90".parse(), Ok(TransformMode::FlippedRotate90));
        assert_eq!("0".parse(), Ok(TransformMode::Normal));
        assert_eq!("5".parse(), Ok(TransformMode::FlippedRotate90));
        assert!("sideways".parse::<TransformMode>().is_err());
    }

    #[test]
    fn rotated_variants_swap_axes() {
        let rotated: Vec<_> = HYPRLAND_TRANSFORMS
            .iter()
            .filter(|t| t.is_rotated())
            .copied()
            .collect();
        assert_eq!(
            rotated,
            vec![
                TransformMode::Rotate90,
                TransformMode::Rotate270,
                TransformMode::FlippedRotate90,
                TransformMode::FlippedRotate270,
            ]
        );
    }

    #[test]
    fn serde_uses_sway_names() {
        let json = serde_json::to_string(&TransformMode::FlippedRotate180).unwrap();
        assert_eq!(json, r#""flipped-180""#);
        let back: TransformMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TransformMode::FlippedRotate180);
    }
}
