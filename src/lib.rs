//! enhanced_pairplot
//!
//! A Rust library for rendering pair-plot grids annotated with descriptive and
//! inferential statistics. Pairs with the `pairplot` CLI.
//!
//! ### Features
//! - Diagonal density curves with mean/SD and a KS normality test
//! - Upper-triangle regression fits with Pearson correlation
//! - Lower-triangle density contours with mutual information
//! - Per-group labels stacked so they never overlap
//! - Highlighted `outlier` rows, SVG/PNG output, CSV/JSON export of labels
//!
//! ### Example
//! ```no_run
//! use enhanced_pairplot::{PairGridOptions, RenderOptions};
//!
//! let data = enhanced_pairplot::storage::load_csv("iris.csv", Some("species"))?;
//! let grid = enhanced_pairplot::enhanced_pair_plot(
//!     &data,
//!     &PairGridOptions::default(),
//!     &RenderOptions::default(),
//!     "iris.svg",
//! )?;
//! enhanced_pairplot::storage::save_annotations_json(&grid, "iris_stats.json")?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod annotate;
pub mod error;
pub mod grid;
pub mod models;
pub mod stats;
pub mod storage;
pub mod style;
pub mod viz;
pub mod viz_plotters_adapter;

use std::path::Path;

pub use annotate::{Anchor, Annotation, AnnotationContext, StatisticProvider, SuppressWarnings};
pub use error::{DatasetError, Reason, StatisticUnavailable};
pub use grid::{PairGrid, PairGridOptions, Panel, build_pair_grid};
pub use models::{Dataset, Group, OUTLIER_LABEL};
pub use viz::{RenderOptions, render_pair_grid};

/// Build the annotated grid for `dataset` and write it to `out_path`.
/// Returns the scene so its annotations can be inspected or exported.
pub fn enhanced_pair_plot<P: AsRef<Path>>(
    dataset: &Dataset,
    options: &PairGridOptions,
    render: &RenderOptions,
    out_path: P,
) -> anyhow::Result<PairGrid> {
    let grid = build_pair_grid(dataset, options)?;
    render_pair_grid(&grid, out_path, render)?;
    Ok(grid)
}
