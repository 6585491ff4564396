//! Colors, marker shapes and line dashes shared by the scene model and the renderer.
//!
//! Design:
//! - Groups take palette colors by first-seen position (stable across panels).
//! - Statistics of ungrouped data are written in a neutral black.
//! - Outlier rows get a marker shape chosen by row index, so the same row is
//!   recognisable in every panel.

use serde::{Deserialize, Serialize};

/// 8-bit RGB color, serializable so computed annotations can be exported.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Hex string like `#4c72b0`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color of statistics drawn without an active grouping.
pub const NEUTRAL: Rgb = Rgb::new(0, 0, 0);

/// Ten-color categorical palette ("deep").
/// Order: Blue, Orange, Green, Red, Purple, Brown, Pink, Gray, Olive, Cyan.
const DEEP10: [Rgb; 10] = [
    Rgb::new(76, 114, 176),  // blue   (#4C72B0)
    Rgb::new(221, 132, 82),  // orange (#DD8452)
    Rgb::new(85, 168, 104),  // green  (#55A868)
    Rgb::new(196, 78, 82),   // red    (#C44E52)
    Rgb::new(129, 114, 179), // purple (#8172B3)
    Rgb::new(147, 120, 96),  // brown  (#937860)
    Rgb::new(218, 139, 195), // pink   (#DA8BC3)
    Rgb::new(140, 140, 140), // gray   (#8C8C8C)
    Rgb::new(204, 185, 116), // olive  (#CCB974)
    Rgb::new(100, 181, 205), // cyan   (#64B5CD)
];

/// Palette color for the group at `idx` (wraps after ten groups).
#[inline]
pub fn group_color(idx: usize) -> Rgb {
    DEEP10[idx % DEEP10.len()]
}

/// Color used for every series when no hue is active.
pub fn default_color() -> Rgb {
    DEEP10[0]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerShape {
    Circle,
    Square,
    Triangle,
    Diamond,
    Cross,
    X,
}

const MARKER_CYCLE: [MarkerShape; 6] = [
    MarkerShape::Circle,
    MarkerShape::X,
    MarkerShape::Square,
    MarkerShape::Cross,
    MarkerShape::Diamond,
    MarkerShape::Triangle,
];

/// Marker for the outlier row at `row_index` of the dataset.
pub fn outlier_marker(row_index: usize) -> MarkerShape {
    MARKER_CYCLE[row_index % MARKER_CYCLE.len()]
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineDash {
    Solid,
    Dot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_and_formats_hex() {
        assert_eq!(group_color(0), group_color(10));
        assert_ne!(group_color(0), group_color(1));
        assert_eq!(group_color(0).to_hex(), "#4c72b0");
        assert_eq!(NEUTRAL.to_hex(), "#000000");
    }

    #[test]
    fn outlier_markers_are_stable_per_row() {
        assert_eq!(outlier_marker(3), outlier_marker(3));
        assert_eq!(outlier_marker(0), outlier_marker(6));
        assert_ne!(outlier_marker(0), outlier_marker(1));
    }
}
