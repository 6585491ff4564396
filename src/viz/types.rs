//! Public types and constants for the visualization module.

use serde::{Deserialize, Serialize};

/// Image size and number formatting of a rendered grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    /// Locale tag for tick labels (`en`, `de`, `fr`, ...).
    pub locale: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 1000,
            locale: "en".to_string(),
        }
    }
}

/// Font size of statistic labels inside panels.
pub const ANNOTATION_FONT_PX: u32 = 10;
/// Font size of tick labels.
pub const TICK_FONT_PX: u32 = 10;
/// Font size of variable names along the grid edges.
pub const AXIS_LABEL_FONT_PX: u32 = 12;
/// Font size of legend entries.
pub const LEGEND_FONT_PX: u32 = 14;
