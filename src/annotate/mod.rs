//! Annotation layout: where each statistic label goes, in which color, for
//! which group.
//!
//! Positions are axes-relative (0 = left/bottom, 1 = right/top). Every group
//! owns one line, at its position in the ordered group list, so labels of
//! different groups never overlap whatever order they are drawn in.

pub mod format;
pub mod providers;
pub mod warnings;

use serde::Serialize;

use crate::error::StatisticUnavailable;
use crate::style::{LineDash, NEUTRAL, Rgb};

pub use providers::{Correlation, MeanSd, MutualInformation, NormalityTest};
pub use warnings::{SuppressWarnings, report_unavailable, warnings_suppressed};

/// Vertical gap between stacked annotations.
pub const LINE_HEIGHT: f64 = 0.07;
/// Baseline of top-anchored annotations.
pub const TOP_BASE: f64 = 0.98;
/// Baseline of bottom-anchored annotations.
pub const BOTTOM_BASE: f64 = 0.02;
/// Left margin shared by every annotation.
pub const LEFT_MARGIN: f64 = 0.03;

/// Corner an annotation hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Anchor {
    TopLeft,
    BottomLeft,
}

/// Vertical data-coordinate marker drawn alongside a statistic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceLine {
    pub value: f64,
    pub dash: LineDash,
    pub color: Rgb,
    pub alpha: f64,
}

/// A positioned statistic label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    pub statistic: &'static str,
    pub text: String,
    /// Axes-relative position of the anchor corner.
    pub x: f64,
    pub y: f64,
    pub color: Rgb,
    pub anchor: Anchor,
    pub stack_index: usize,
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_lines: Vec<ReferenceLine>,
}

/// Inputs of one provider call: the data of one group in one subplot.
#[derive(Debug, Clone, Copy)]
pub struct AnnotationContext<'a> {
    pub x: &'a [f64],
    pub y: Option<&'a [f64]>,
    /// Plot color of the current group.
    pub color: Rgb,
    /// Current group; `None` when no grouping is active.
    pub label: Option<&'a str>,
    /// Every group label in order; empty when no grouping is active.
    pub all_labels: &'a [String],
    pub x_name: &'a str,
    pub y_name: Option<&'a str>,
}

impl<'a> AnnotationContext<'a> {
    pub fn new(x: &'a [f64], color: Rgb, label: Option<&'a str>, all_labels: &'a [String]) -> Self {
        Self {
            x,
            y: None,
            color,
            label,
            all_labels,
            x_name: "x",
            y_name: None,
        }
    }

    pub fn with_y(mut self, y: &'a [f64]) -> Self {
        self.y = Some(y);
        self
    }

    pub fn named(mut self, x_name: &'a str, y_name: Option<&'a str>) -> Self {
        self.x_name = x_name;
        self.y_name = y_name;
        self
    }

    pub fn stack_index(&self) -> usize {
        stacking_index(self.label, self.all_labels)
    }

    /// Build the annotation for `text` at this group's slot under `anchor`.
    pub fn place(&self, statistic: &'static str, anchor: Anchor, text: String) -> Annotation {
        let index = self.stack_index();
        Annotation {
            statistic,
            text,
            x: LEFT_MARGIN,
            y: vertical_offset(anchor, index, self.all_labels.len()),
            color: annotation_color(self.color, self.label, self.all_labels),
            anchor,
            stack_index: index,
            group: self.label.map(str::to_string),
            reference_lines: Vec::new(),
        }
    }
}

/// Line reserved for `label`: its first position in `all_labels` when more
/// than one group exists, otherwise 0. Unknown labels fall back to 0.
pub fn stacking_index(label: Option<&str>, all_labels: &[String]) -> usize {
    if all_labels.len() > 1 {
        label
            .and_then(|l| all_labels.iter().position(|a| a == l))
            .unwrap_or(0)
    } else {
        0
    }
}

/// The group's color with more than one group, black otherwise.
pub fn annotation_color(color: Rgb, label: Option<&str>, all_labels: &[String]) -> Rgb {
    if label.is_some() && all_labels.len() > 1 {
        color
    } else {
        NEUTRAL
    }
}

/// Axes-relative y of the anchor corner for the `index`-th group.
///
/// Bottom-anchored labels stack upward so the last group sits nearest the axis.
pub fn vertical_offset(anchor: Anchor, index: usize, group_count: usize) -> f64 {
    match anchor {
        Anchor::TopLeft => TOP_BASE - LINE_HEIGHT * index as f64,
        Anchor::BottomLeft => {
            BOTTOM_BASE + LINE_HEIGHT * group_count.saturating_sub(1) as f64
                - LINE_HEIGHT * index as f64
        }
    }
}

/// A statistic that can annotate a subplot for one group.
pub trait StatisticProvider {
    /// Short name used in warnings and exports.
    fn name(&self) -> &'static str;

    /// `Ok(None)` when the provider does not apply to this group or sample,
    /// `Err` when the statistic could not be computed.
    fn compute(
        &self,
        ctx: &AnnotationContext<'_>,
    ) -> Result<Option<Annotation>, StatisticUnavailable>;
}

/// Run a provider, turning failures into a warning and no annotation.
pub fn annotate(provider: &dyn StatisticProvider, ctx: &AnnotationContext<'_>) -> Option<Annotation> {
    match provider.compute(ctx) {
        Ok(annotation) => annotation,
        Err(err) => {
            report_unavailable(&err, ctx);
            None
        }
    }
}
