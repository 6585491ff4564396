//! Visualization: render a [`PairGrid`] scene to **SVG** or **PNG**.
//!
//! - One panel per cell of an `n x n` split, with frame, layers, reference
//!   lines and statistic labels on a translucent box
//! - Locale-aware tick labels on the left column and the bottom row
//! - Variable names along the bottom and left edges
//! - Legend band below the grid
//!
//! Text is drawn as positioned elements only, so the SVG path never needs a
//! font file. The bitmap path registers a system sans-serif font once.

pub mod legend;
pub mod text;
pub mod types;
pub mod util;

pub use types::RenderOptions;

use anyhow::{Result, anyhow};
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::{AreaSeries, LineSeries};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontFamily, FontTransform};

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::Once;

use crate::annotate::{Anchor, Annotation};
use crate::grid::{Layer, PairGrid, Panel};
use crate::viz_plotters_adapter::{
    PanelArea, PanelChart, draw_marker, draw_vertical_line, fill_style, line_style,
};

use legend::{draw_legend_panel, estimate_legend_height_px};
use text::{estimate_text_width_px, truncate_to_width};
use types::{ANNOTATION_FONT_PX, AXIS_LABEL_FONT_PX, TICK_FONT_PX};
use util::{format_tick, nice_ticks, rgb};

const MARGIN: i32 = 16;
/// Room left of the grid for tick labels and the rotated variable names.
const LEFT_GUTTER: i32 = 72;
/// Room below the grid for tick labels and the variable names.
const BOTTOM_GUTTER: i32 = 48;
/// Gap between neighbouring panels.
const CELL_GAP: u32 = 4;
const SCATTER_RADIUS: i32 = 2;
const OUTLIER_SIZE: i32 = 6;
const TICK_LEN: i32 = 4;
const TICKS_PER_AXIS: usize = 4;

static INIT_FONTS: Once = Once::new();

/// Well-known locations of a sans-serif TTF on common systems.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// One-time registration of a "sans-serif" font for the `ab_glyph` text path,
/// which does not discover OS fonts on its own.
fn ensure_fonts_registered() {
    INIT_FONTS.call_once(|| {
        for path in FONT_CANDIDATES {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            // plotters keeps a 'static reference to the registered font data
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if plotters::style::register_font(
                "sans-serif",
                plotters::style::FontStyle::Normal,
                bytes,
            )
            .is_ok()
            {
                log::debug!("registered font {path}");
                return;
            }
        }
        log::warn!("no system sans-serif font found; bitmap text may fail to render");
    });
}

/// Render `grid` to `out_path`. The extension picks the backend: `.svg`
/// writes SVG, anything else a bitmap (PNG by default).
pub fn render_pair_grid<P: AsRef<Path>>(
    grid: &PairGrid,
    out_path: P,
    options: &RenderOptions,
) -> Result<()> {
    if grid.size() == 0 {
        return Err(anyhow!("nothing to render: grid has no variables"));
    }
    if options.width < 100 || options.height < 100 {
        return Err(anyhow!(
            "image of {}x{} px is too small for a pair grid",
            options.width,
            options.height
        ));
    }
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().to_string();
    let size = (options.width, options.height);

    if out_path.extension().and_then(|s| s.to_str()) == Some("svg") {
        let root = SVGBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_grid(root, grid, &options.locale)?;
    } else {
        ensure_fonts_registered();
        let root = BitMapBackend::new(path_string.as_str(), size).into_drawing_area();
        draw_grid(root, grid, &options.locale)?;
    }
    log::info!("wrote {}x{} pair grid to {}", grid.size(), grid.size(), out_path.display());
    Ok(())
}

fn draw_grid<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    grid: &PairGrid,
    locale: &str,
) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let (w, h) = root.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);
    let grid_left = MARGIN + LEFT_GUTTER;

    // ----------------------------
    // 1) Split off the legend band
    // ----------------------------
    let legend_items: Vec<(String, RGBColor)> = grid
        .legend
        .iter()
        .flat_map(|l| l.items.iter().map(|i| (i.label.clone(), rgb(i.color))))
        .collect();
    let legend_columns = grid.legend.as_ref().map(|l| l.columns).unwrap_or(1);
    let legend_h = if legend_items.is_empty() {
        0
    } else {
        let labels: Vec<String> = legend_items.iter().map(|(l, _)| l.clone()).collect();
        estimate_legend_height_px(&labels, grid_left, w, legend_columns).min(h / 3)
    };
    let (plot_area, legend_area) = root.split_vertically(h - legend_h);

    // ----------------------------
    // 2) One cell per panel
    // ----------------------------
    let n = grid.size();
    let cells_area = plot_area.margin(MARGIN, MARGIN + BOTTOM_GUTTER, grid_left, MARGIN);
    let cells = cells_area.split_evenly((n, n));

    for (panel, cell) in grid.panels.iter().zip(cells.iter()) {
        draw_panel(&root, cell, panel, n, locale)?;
    }

    // ----------------------------
    // 3) Legend and present
    // ----------------------------
    if legend_h > 0 {
        draw_legend_panel(&legend_area, &legend_items, grid_left, legend_columns)?;
    }
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    cell: &DrawingArea<DB, Shift>,
    panel: &Panel,
    n: usize,
    locale: &str,
) -> Result<()> {
    let xl = panel.x_limits();
    let yl = panel.y_limits();
    let mut chart = ChartBuilder::on(cell)
        .margin(CELL_GAP)
        .build_cartesian_2d(xl.lo..xl.hi, yl.lo..yl.hi)
        .map_err(|e| anyhow!("{:?}", e))?;

    chart
        .plotting_area()
        .draw(&Rectangle::new(
            [(xl.lo, yl.lo), (xl.hi, yl.hi)],
            RGBColor(200, 200, 200).stroke_width(1),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;

    for layer in &panel.layers {
        draw_layer(&mut chart, layer)?;
    }

    let area = chart.plotting_area();
    for line in panel.annotations.iter().flat_map(|a| &a.reference_lines) {
        draw_vertical_line(
            area,
            line.value,
            (yl.lo, yl.hi),
            line_style(line.color, line.alpha, 2),
            line.dash,
        )?;
    }
    for annotation in &panel.annotations {
        draw_annotation(root, area, annotation)?;
    }

    if panel.col == 0 {
        draw_y_axis(root, panel, area, locale)?;
    }
    if panel.row + 1 == n {
        draw_x_axis(root, panel, area, locale)?;
    }
    Ok(())
}

fn draw_layer<DB: DrawingBackend>(chart: &mut PanelChart<'_, DB>, layer: &Layer) -> Result<()> {
    match layer {
        Layer::Density { color, points, .. } => {
            chart
                .draw_series(
                    AreaSeries::new(points.iter().copied(), 0.0, fill_style(*color, 0.25))
                        .border_style(line_style(*color, 1.0, 2)),
                )
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        Layer::Scatter { color, points, .. } => {
            chart
                .draw_series(
                    points
                        .iter()
                        .map(|&p| Circle::new(p, SCATTER_RADIUS, fill_style(*color, 0.8))),
                )
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        Layer::Regression { color, band, .. } => {
            let outline: Vec<(f64, f64)> = band
                .iter()
                .map(|b| (b.0, b.3))
                .chain(band.iter().rev().map(|b| (b.0, b.2)))
                .collect();
            chart
                .draw_series(std::iter::once(Polygon::new(outline, fill_style(*color, 0.15))))
                .map_err(|e| anyhow!("{:?}", e))?;
            chart
                .draw_series(LineSeries::new(
                    band.iter().map(|b| (b.0, b.1)),
                    line_style(*color, 1.0, 2),
                ))
                .map_err(|e| anyhow!("{:?}", e))?;
        }
        Layer::Contours { color, levels, .. } => {
            for segments in levels {
                chart
                    .draw_series(
                        segments
                            .iter()
                            .map(|s| PathElement::new(vec![s[0], s[1]], line_style(*color, 0.9, 1))),
                    )
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
        }
        Layer::Outliers { color, markers } => {
            for m in markers {
                draw_marker(
                    chart.plotting_area(),
                    (m.x, m.y),
                    OUTLIER_SIZE,
                    fill_style(*color, 1.0),
                    m.shape,
                )?;
            }
        }
    }
    Ok(())
}

/// Statistic label on a translucent white box at its axes-relative anchor.
fn draw_annotation<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    area: &PanelArea<DB>,
    annotation: &Annotation,
) -> Result<()> {
    let (px, py) = area.get_pixel_range();
    let x = px.start + ((px.end - px.start) as f64 * annotation.x).round() as i32;
    // axes-relative y grows upward, pixels grow downward
    let y = py.end - ((py.end - py.start) as f64 * annotation.y).round() as i32;
    let (ox, oy) = root_offset(root);
    let (x, y) = (x - ox, y - oy);

    let text_w = estimate_text_width_px(&annotation.text, ANNOTATION_FONT_PX) as i32;
    let text_h = ANNOTATION_FONT_PX as i32 + 2;
    let (v_pos, box_top) = match annotation.anchor {
        Anchor::TopLeft => (VPos::Top, y - 1),
        Anchor::BottomLeft => (VPos::Bottom, y - text_h - 1),
    };
    root.draw(&Rectangle::new(
        [(x - 2, box_top), (x + text_w + 2, box_top + text_h + 2)],
        WHITE.mix(0.7).filled(),
    ))
    .map_err(|e| anyhow!("{:?}", e))?;

    let color = rgb(annotation.color);
    let style = TextStyle::from((FontFamily::SansSerif, ANNOTATION_FONT_PX))
        .color(&color)
        .pos(Pos::new(HPos::Left, v_pos));
    root.draw(&Text::new(annotation.text.as_str(), (x, y), style))
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Pixel offset of `root` inside the backend (zero for the full canvas).
fn root_offset<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>) -> (i32, i32) {
    let (x, y) = root.get_pixel_range();
    (x.start, y.start)
}

fn draw_y_axis<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panel: &Panel,
    area: &PanelArea<DB>,
    locale: &str,
) -> Result<()> {
    let (xl, yl) = (panel.x_limits(), panel.y_limits());
    let (ticks, step) = nice_ticks(yl.lo, yl.hi, TICKS_PER_AXIS);
    let (px, py) = area.get_pixel_range();
    let (ox, oy) = root_offset(root);
    let lx = px.start - ox;
    let tick_style = TextStyle::from((FontFamily::SansSerif, TICK_FONT_PX))
        .pos(Pos::new(HPos::Right, VPos::Center));
    for t in ticks {
        let ty = area.map_coordinate(&(xl.lo, t)).1 - oy;
        root.draw(&PathElement::new(
            vec![(lx - TICK_LEN, ty), (lx, ty)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        root.draw(&Text::new(
            format_tick(t, step, locale),
            (lx - TICK_LEN - 2, ty),
            tick_style.clone(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    let name_style = TextStyle::from((FontFamily::SansSerif, AXIS_LABEL_FONT_PX))
        .pos(Pos::new(HPos::Center, VPos::Center))
        .transform(FontTransform::Rotate270);
    let max_w = (py.end - py.start).max(20) as u32;
    root.draw(&Text::new(
        truncate_to_width(&panel.y_var, AXIS_LABEL_FONT_PX, max_w),
        (MARGIN + AXIS_LABEL_FONT_PX as i32 / 2, (py.start + py.end) / 2 - oy),
        name_style,
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_x_axis<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    panel: &Panel,
    area: &PanelArea<DB>,
    locale: &str,
) -> Result<()> {
    let (xl, yl) = (panel.x_limits(), panel.y_limits());
    let (ticks, step) = nice_ticks(xl.lo, xl.hi, TICKS_PER_AXIS);
    let (px, py) = area.get_pixel_range();
    let (ox, oy) = root_offset(root);
    let by = py.end - oy;
    let tick_style = TextStyle::from((FontFamily::SansSerif, TICK_FONT_PX))
        .pos(Pos::new(HPos::Center, VPos::Top));
    for t in ticks {
        let tx = area.map_coordinate(&(t, yl.lo)).0 - ox;
        root.draw(&PathElement::new(
            vec![(tx, by), (tx, by + TICK_LEN)],
            BLACK.stroke_width(1),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
        root.draw(&Text::new(
            format_tick(t, step, locale),
            (tx, by + TICK_LEN + 2),
            tick_style.clone(),
        ))
        .map_err(|e| anyhow!("{:?}", e))?;
    }

    let name_style = TextStyle::from((FontFamily::SansSerif, AXIS_LABEL_FONT_PX))
        .pos(Pos::new(HPos::Center, VPos::Top));
    let max_w = (px.end - px.start).max(20) as u32;
    root.draw(&Text::new(
        truncate_to_width(&panel.x_var, AXIS_LABEL_FONT_PX, max_w),
        ((px.start + px.end) / 2 - ox, by + TICK_LEN + TICK_FONT_PX as i32 + 10),
        name_style,
    ))
    .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
