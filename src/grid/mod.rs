//! Pair-grid orchestration: builds a renderer-independent scene of panels,
//! layers and annotations from a [`Dataset`].
//!
//! Layout:
//! - Diagonal panels: per-group 1-D density, mean/SD and normality labels.
//! - Upper triangle: scatter, per-group regression line with 95 % band,
//!   correlation labels.
//! - Lower triangle: scatter, per-group density contours, mutual-information
//!   labels.
//! - Off-diagonal panels also highlight `outlier` rows with larger markers.

pub mod contour;

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::annotate::{
    Annotation, AnnotationContext, Correlation, MeanSd, MutualInformation, NormalityTest,
    StatisticProvider, SuppressWarnings, annotate,
};
use crate::models::{Dataset, Group, derive_groups};
use crate::stats::kde::{gaussian_kde_1d, gaussian_kde_2d, iso_proportion_levels, iso_proportions};
use crate::stats::regression::ols;
use crate::style::{MarkerShape, Rgb, default_color, outlier_marker};

use contour::{Segment, iso_segments};

/// Grid resolution of the diagonal density curves.
pub const KDE_GRIDSIZE: usize = 200;
/// Grid resolution of the contour density estimate.
pub const KDE_GRIDSIZE_2D: usize = 100;
/// Bandwidths the density grid extends past the data.
pub const KDE_CUT: f64 = 3.0;
/// Lowest iso-proportion drawn as a contour.
pub const KDE_THRESH: f64 = 0.05;
/// Confidence level of the regression band.
pub const REGRESSION_CI: f64 = 0.95;
/// Points along each regression line.
pub const REGRESSION_POINTS: usize = 100;
/// Most legend columns before wrapping to another row.
pub const MAX_LEGEND_COLUMNS: usize = 5;
/// Autoscale margin as a fraction of the data span.
const AXIS_MARGIN: f64 = 0.05;

/// Knobs of [`build_pair_grid`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairGridOptions {
    /// Compute and place statistic labels.
    pub annotate: bool,
    /// Relabel legend entries as `"<label> (N=<count>)"`.
    pub show_counts: bool,
    /// Number of contour levels in the lower triangle.
    pub kde_levels: usize,
    /// Groups smaller than this demote statistic warnings to debug.
    pub min_group_for_warnings: usize,
}

impl Default for PairGridOptions {
    fn default() -> Self {
        Self {
            annotate: true,
            show_counts: true,
            kde_levels: 7,
            min_group_for_warnings: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PanelKind {
    Diagonal,
    /// Column index greater than row index.
    Upper,
    /// Column index less than row index.
    Lower,
}

impl PanelKind {
    pub fn of(row: usize, col: usize) -> Self {
        match col.cmp(&row) {
            std::cmp::Ordering::Equal => PanelKind::Diagonal,
            std::cmp::Ordering::Greater => PanelKind::Upper,
            std::cmp::Ordering::Less => PanelKind::Lower,
        }
    }
}

/// Closed axis interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Limits {
    pub lo: f64,
    pub hi: f64,
}

impl Limits {
    pub fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn union(self, other: Limits) -> Limits {
        Limits::new(self.lo.min(other.lo), self.hi.max(other.hi))
    }

    fn including(self, v: f64) -> Limits {
        Limits::new(self.lo.min(v), self.hi.max(v))
    }

    fn of(values: impl IntoIterator<Item = f64>) -> Option<Limits> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<Limits>, v| match acc {
                None => Some(Limits::new(v, v)),
                Some(l) => Some(l.including(v)),
            })
    }

    /// Widen by `frac` of the span on both sides; a degenerate interval gets
    /// a unit-scale margin instead.
    fn padded(self, frac: f64) -> Limits {
        let span = self.span();
        let pad = if span > 0.0 {
            span * frac
        } else if self.lo != 0.0 {
            self.lo.abs() * frac
        } else {
            0.5
        };
        Limits::new(self.lo - pad, self.hi + pad)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits::new(0.0, 1.0)
    }
}

/// A highlighted outlier row in one panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OutlierMarker {
    pub x: f64,
    pub y: f64,
    /// Row index in the dataset.
    pub row: usize,
    pub shape: MarkerShape,
}

/// One drawable layer of a panel, in data coordinates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Layer {
    /// 1-D density curve of one group.
    Density {
        group: Option<String>,
        color: Rgb,
        points: Vec<(f64, f64)>,
    },
    Scatter {
        group: Option<String>,
        color: Rgb,
        points: Vec<(f64, f64)>,
    },
    /// Fitted line with its confidence band, as `(x, fit, lower, upper)`.
    Regression {
        group: Option<String>,
        color: Rgb,
        band: Vec<(f64, f64, f64, f64)>,
    },
    /// Density iso-lines of one group, innermost level last.
    Contours {
        group: Option<String>,
        color: Rgb,
        levels: Vec<Vec<Segment>>,
    },
    Outliers {
        color: Rgb,
        markers: Vec<OutlierMarker>,
    },
}

impl Layer {
    fn extent(&self) -> (Option<Limits>, Option<Limits>) {
        match self {
            Layer::Density { points, .. } => (
                Limits::of(points.iter().map(|p| p.0)),
                Limits::of(points.iter().map(|p| p.1).chain([0.0])),
            ),
            Layer::Scatter { points, .. } => (
                Limits::of(points.iter().map(|p| p.0)),
                Limits::of(points.iter().map(|p| p.1)),
            ),
            Layer::Regression { band, .. } => (
                Limits::of(band.iter().map(|b| b.0)),
                Limits::of(band.iter().flat_map(|b| [b.2, b.3])),
            ),
            Layer::Contours { levels, .. } => {
                let pts = || levels.iter().flatten().flatten();
                (
                    Limits::of(pts().map(|p| p.0)),
                    Limits::of(pts().map(|p| p.1)),
                )
            }
            Layer::Outliers { markers, .. } => (
                Limits::of(markers.iter().map(|m| m.x)),
                Limits::of(markers.iter().map(|m| m.y)),
            ),
        }
    }
}

fn merge(a: Option<Limits>, b: Option<Limits>) -> Option<Limits> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.union(b)),
        (a, b) => a.or(b),
    }
}

/// One cell of the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub row: usize,
    pub col: usize,
    /// Variable on the horizontal axis (the column variable).
    pub x_var: String,
    /// Variable on the vertical axis (the row variable).
    pub y_var: String,
    pub kind: PanelKind,
    pub layers: Vec<Layer>,
    pub annotations: Vec<Annotation>,
    x_extent: Option<Limits>,
    y_extent: Option<Limits>,
    x_fixed: Option<Limits>,
    y_fixed: Option<Limits>,
}

impl Panel {
    pub fn new(row: usize, col: usize, x_var: &str, y_var: &str) -> Self {
        Self {
            row,
            col,
            x_var: x_var.to_string(),
            y_var: y_var.to_string(),
            kind: PanelKind::of(row, col),
            layers: Vec::new(),
            annotations: Vec::new(),
            x_extent: None,
            y_extent: None,
            x_fixed: None,
            y_fixed: None,
        }
    }

    /// Add a layer; unless fixed, the axes grow to include it.
    pub fn add_layer(&mut self, layer: Layer) {
        let (x, y) = layer.extent();
        self.x_extent = merge(self.x_extent, x);
        self.y_extent = merge(self.y_extent, y);
        self.layers.push(layer);
    }

    /// Add an overlay without letting it move the vertical view. The view is
    /// fixed at its current limits from then on.
    pub fn overlay_preserving_ylim(&mut self, layer: Layer) {
        let before = self.y_limits();
        self.add_layer(layer);
        self.y_fixed = Some(before);
    }

    pub fn x_limits(&self) -> Limits {
        self.x_fixed
            .or_else(|| self.x_extent.map(|l| l.padded(AXIS_MARGIN)))
            .unwrap_or_default()
    }

    pub fn y_limits(&self) -> Limits {
        self.y_fixed
            .or_else(|| self.y_extent.map(|l| l.padded(AXIS_MARGIN)))
            .unwrap_or_default()
    }

    pub fn set_x_limits(&mut self, limits: Limits) {
        self.x_fixed = Some(limits);
    }

    pub fn set_y_limits(&mut self, limits: Limits) {
        self.y_fixed = Some(limits);
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// An entry of the legend below the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendItem {
    pub label: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub items: Vec<LegendItem>,
    pub columns: usize,
}

/// The complete scene: `n x n` panels in row-major order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairGrid {
    pub variables: Vec<String>,
    pub groups: Vec<Group>,
    pub panels: Vec<Panel>,
    pub legend: Option<Legend>,
}

impl PairGrid {
    pub fn size(&self) -> usize {
        self.variables.len()
    }

    pub fn panel(&self, row: usize, col: usize) -> Option<&Panel> {
        let n = self.size();
        if row < n && col < n {
            self.panels.get(row * n + col)
        } else {
            None
        }
    }

    /// Every annotation with the variables of its panel, in panel order.
    pub fn annotations(&self) -> impl Iterator<Item = (&Panel, &Annotation)> {
        self.panels
            .iter()
            .flat_map(|p| p.annotations.iter().map(move |a| (p, a)))
    }
}

/// Rows of one hue group (or of the whole dataset when ungrouped).
struct Series<'a> {
    /// `None` when the dataset has no hue.
    group: Option<&'a Group>,
    color: Rgb,
    rows: Vec<usize>,
}

impl Series<'_> {
    fn values(&self, dataset: &Dataset, var: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|&r| dataset.rows()[r].values[var])
            .collect()
    }

    fn key(&self) -> Option<&str> {
        self.group.map(|g| g.key.as_str())
    }

    fn label(&self) -> Option<String> {
        self.key().map(str::to_string)
    }

    fn is_outlier(&self) -> bool {
        self.group.is_some_and(Group::is_outlier)
    }
}

fn split_series<'a>(dataset: &Dataset, groups: &'a [Group]) -> Vec<Series<'a>> {
    if dataset.hue().is_none() {
        return vec![Series {
            group: None,
            color: default_color(),
            rows: (0..dataset.len()).collect(),
        }];
    }
    groups
        .iter()
        .map(|g| Series {
            group: Some(g),
            color: g.color,
            rows: dataset
                .rows()
                .iter()
                .enumerate()
                .filter(|(_, r)| r.group.as_deref() == Some(g.key.as_str()))
                .map(|(i, _)| i)
                .collect(),
        })
        .collect()
}

/// Build the annotated pair grid of every variable in `dataset`.
pub fn build_pair_grid(dataset: &Dataset, options: &PairGridOptions) -> Result<PairGrid> {
    let n = dataset.variables().len();
    if n == 0 {
        return Err(anyhow!("dataset has no numeric variables"));
    }
    if dataset.is_empty() {
        return Err(anyhow!("dataset has no rows"));
    }

    let groups = if dataset.hue().is_some() {
        derive_groups(dataset, options.show_counts)
    } else {
        Vec::new()
    };
    let all_labels: Vec<String> = groups.iter().map(|g| g.key.clone()).collect();
    let series = split_series(dataset, &groups);

    let smallest = groups.iter().map(|g| g.count).min().unwrap_or(0);
    let _quiet = (!groups.is_empty() && smallest < options.min_group_for_warnings).then(|| {
        log::debug!(
            "smallest group has {smallest} rows; demoting statistic warnings to debug"
        );
        SuppressWarnings::acquire()
    });

    log::debug!(
        "building {n}x{n} pair grid over {} rows and {} groups",
        dataset.len(),
        groups.len()
    );

    let vars = dataset.variables();
    let mut panels = Vec::with_capacity(n * n);
    for row in 0..n {
        for col in 0..n {
            let mut panel = Panel::new(row, col, &vars[col], &vars[row]);
            match panel.kind {
                PanelKind::Diagonal => draw_diagonal(&mut panel, dataset, &series),
                PanelKind::Upper => {
                    draw_scatter(&mut panel, dataset, &series);
                    draw_regressions(&mut panel, dataset, &series);
                    draw_outliers(&mut panel, dataset, &series);
                }
                PanelKind::Lower => {
                    draw_scatter(&mut panel, dataset, &series);
                    draw_contours(&mut panel, dataset, &series, options.kde_levels);
                    draw_outliers(&mut panel, dataset, &series);
                }
            }
            if options.annotate {
                annotate_panel(&mut panel, dataset, &series, &all_labels);
            }
            panels.push(panel);
        }
    }
    share_axes(&mut panels, n);

    let legend = (!groups.is_empty()).then(|| Legend {
        items: groups
            .iter()
            .map(|g| LegendItem {
                label: g.legend.clone(),
                color: g.color,
            })
            .collect(),
        columns: groups.len().min(MAX_LEGEND_COLUMNS),
    });

    Ok(PairGrid {
        variables: vars.to_vec(),
        groups,
        panels,
        legend,
    })
}

fn draw_diagonal(panel: &mut Panel, dataset: &Dataset, series: &[Series<'_>]) {
    let total = dataset.len() as f64;
    for s in series {
        let x = s.values(dataset, panel.col);
        match gaussian_kde_1d(&x, KDE_GRIDSIZE, KDE_CUT) {
            Ok(curve) => {
                let share = x.len() as f64 / total;
                panel.add_layer(Layer::Density {
                    group: s.label(),
                    color: s.color,
                    points: curve.into_iter().map(|(x, d)| (x, d * share)).collect(),
                });
            }
            Err(e) => log::debug!("skipping density of {} for {:?}: {e}", panel.x_var, s.key()),
        }
    }
}

fn draw_scatter(panel: &mut Panel, dataset: &Dataset, series: &[Series<'_>]) {
    for s in series {
        let x = s.values(dataset, panel.col);
        let y = s.values(dataset, panel.row);
        panel.add_layer(Layer::Scatter {
            group: s.label(),
            color: s.color,
            points: x.into_iter().zip(y).collect(),
        });
    }
}

fn draw_regressions(panel: &mut Panel, dataset: &Dataset, series: &[Series<'_>]) {
    for s in series.iter().filter(|s| !s.is_outlier()) {
        let x = s.values(dataset, panel.col);
        let y = s.values(dataset, panel.row);
        let fit = match ols(&x, &y) {
            Ok(fit) => fit,
            Err(e) => {
                log::debug!(
                    "skipping regression of {} on {} for {:?}: {e}",
                    panel.y_var,
                    panel.x_var,
                    s.key()
                );
                continue;
            }
        };
        let Some(span) = Limits::of(x.iter().copied()) else {
            continue;
        };
        let xs: Vec<f64> = (0..REGRESSION_POINTS)
            .map(|i| span.lo + span.span() * i as f64 / (REGRESSION_POINTS - 1) as f64)
            .collect();
        panel.overlay_preserving_ylim(Layer::Regression {
            group: s.label(),
            color: s.color,
            band: fit.confidence_band(&xs, REGRESSION_CI),
        });
    }
}

fn draw_contours(panel: &mut Panel, dataset: &Dataset, series: &[Series<'_>], levels: usize) {
    let proportions = iso_proportions(levels, KDE_THRESH);
    for s in series.iter().filter(|s| !s.is_outlier()) {
        let x = s.values(dataset, panel.col);
        let y = s.values(dataset, panel.row);
        let grid = match gaussian_kde_2d(&x, &y, KDE_GRIDSIZE_2D, KDE_CUT) {
            Ok(grid) => grid,
            Err(e) => {
                log::debug!(
                    "skipping contours of {} vs {} for {:?}: {e}",
                    panel.x_var,
                    panel.y_var,
                    s.key()
                );
                continue;
            }
        };
        let segments: Vec<Vec<Segment>> = iso_proportion_levels(&grid, &proportions)
            .into_iter()
            .map(|level| iso_segments(&grid, level))
            .collect();
        panel.overlay_preserving_ylim(Layer::Contours {
            group: s.label(),
            color: s.color,
            levels: segments,
        });
    }
}

fn draw_outliers(panel: &mut Panel, dataset: &Dataset, series: &[Series<'_>]) {
    for s in series.iter().filter(|s| s.is_outlier()) {
        let markers: Vec<OutlierMarker> = s
            .rows
            .iter()
            .map(|&r| {
                let values = &dataset.rows()[r].values;
                OutlierMarker {
                    x: values[panel.col],
                    y: values[panel.row],
                    row: r,
                    shape: outlier_marker(r),
                }
            })
            .collect();
        if !markers.is_empty() {
            panel.add_layer(Layer::Outliers {
                color: s.color,
                markers,
            });
        }
    }
}

fn annotate_panel(
    panel: &mut Panel,
    dataset: &Dataset,
    series: &[Series<'_>],
    all_labels: &[String],
) {
    const DIAGONAL: &[&dyn StatisticProvider] = &[&MeanSd, &NormalityTest];
    const UPPER: &[&dyn StatisticProvider] = &[&Correlation];
    const LOWER: &[&dyn StatisticProvider] = &[&MutualInformation];

    let providers = match panel.kind {
        PanelKind::Diagonal => DIAGONAL,
        PanelKind::Upper => UPPER,
        PanelKind::Lower => LOWER,
    };
    let pairwise = panel.kind != PanelKind::Diagonal;

    let mut found = Vec::new();
    for s in series {
        let x = s.values(dataset, panel.col);
        let y = s.values(dataset, panel.row);
        let mut ctx = AnnotationContext::new(&x, s.color, s.key(), all_labels)
            .named(&panel.x_var, pairwise.then_some(panel.y_var.as_str()));
        if pairwise {
            ctx = ctx.with_y(&y);
        }
        found.extend(providers.iter().filter_map(|p| annotate(*p, &ctx)));
    }
    panel.annotations.extend(found);
}

/// Share x-limits down each column and off-diagonal y-limits along each row.
fn share_axes(panels: &mut [Panel], n: usize) {
    for col in 0..n {
        let shared = (0..n)
            .map(|row| panels[row * n + col].x_limits())
            .reduce(Limits::union);
        if let Some(limits) = shared {
            for row in 0..n {
                panels[row * n + col].set_x_limits(limits);
            }
        }
    }
    for row in 0..n {
        let shared = (0..n)
            .filter(|&col| col != row)
            .map(|col| panels[row * n + col].y_limits())
            .reduce(Limits::union);
        if let Some(limits) = shared {
            for col in (0..n).filter(|&col| col != row) {
                panels[row * n + col].set_y_limits(limits);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_kind_by_position() {
        assert_eq!(PanelKind::of(1, 1), PanelKind::Diagonal);
        assert_eq!(PanelKind::of(0, 2), PanelKind::Upper);
        assert_eq!(PanelKind::of(2, 0), PanelKind::Lower);
    }

    #[test]
    fn overlay_keeps_vertical_view() {
        let mut p = Panel::new(0, 1, "a", "b");
        p.add_layer(Layer::Scatter {
            group: None,
            color: default_color(),
            points: vec![(0.0, 0.0), (10.0, 10.0)],
        });
        let before = p.y_limits();
        p.overlay_preserving_ylim(Layer::Regression {
            group: None,
            color: default_color(),
            band: vec![(0.0, 0.0, -50.0, 50.0), (10.0, 10.0, -40.0, 60.0)],
        });
        assert_eq!(p.y_limits(), before);
        // later layers no longer move a fixed view
        p.add_layer(Layer::Scatter {
            group: None,
            color: default_color(),
            points: vec![(0.0, 500.0)],
        });
        assert_eq!(p.y_limits(), before);
    }

    #[test]
    fn autoscale_pads_data_span() {
        let mut p = Panel::new(0, 1, "a", "b");
        p.add_layer(Layer::Scatter {
            group: None,
            color: default_color(),
            points: vec![(0.0, 5.0), (10.0, 5.0)],
        });
        let x = p.x_limits();
        assert!((x.lo + 0.5).abs() < 1e-12 && (x.hi - 10.5).abs() < 1e-12);
        let y = p.y_limits();
        assert!(y.lo < 5.0 && y.hi > 5.0);
    }
}
