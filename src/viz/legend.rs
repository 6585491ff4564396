//! Legend band below the grid.

use anyhow::Result;
use plotters::backend::DrawingBackend;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::text::{estimate_text_width_px, wrap_text_to_width};
use super::types::LEGEND_FONT_PX;

// Layout constants, shared by the estimator and the drawing pass.
const ROW_GAP: i32 = 4;
const PAD_SMALL: i32 = 6;
const PAD_BAND: i32 = 8;
const MARKER_RADIUS: i32 = 4;
const MARKER_TO_TEXT_GAP: i32 = 12;
const TRAILING_GAP: i32 = 12;
const MIN_SLOT_W: i32 = 60;

fn line_h() -> i32 {
    LEGEND_FONT_PX as i32 + 2
}

/// Table layout of the legend: item rows, column x offsets and text caps.
struct Table {
    rows: Vec<Vec<usize>>,
    col_x: Vec<i32>,
    text_cap: Vec<u32>,
}

fn layout(labels: &[String], start_x: i32, total_w: i32, max_columns: usize) -> Table {
    let usable_w = total_w - PAD_SMALL;
    let k = max_columns.clamp(1, labels.len().max(1));
    let rows: Vec<Vec<usize>> = (0..labels.len())
        .collect::<Vec<_>>()
        .chunks(k)
        .map(<[usize]>::to_vec)
        .collect();

    // Column widths from the longest single-line label; uniform slots if too wide.
    let mut col_w = vec![MIN_SLOT_W; k];
    for row in &rows {
        for (ci, &item) in row.iter().enumerate() {
            let text_w = estimate_text_width_px(&labels[item], LEGEND_FONT_PX) as i32;
            col_w[ci] = col_w[ci].max(MARKER_TO_TEXT_GAP + MARKER_RADIUS + text_w + TRAILING_GAP);
        }
    }
    if start_x + col_w.iter().sum::<i32>() > usable_w {
        let uniform = ((usable_w - start_x) / k as i32).max(MIN_SLOT_W);
        col_w = vec![uniform; k];
    }

    let col_x = col_w
        .iter()
        .scan(start_x, |acc, w| {
            let x = *acc;
            *acc += w;
            Some(x)
        })
        .collect();
    let text_cap = col_w
        .iter()
        .map(|w| (w - (MARKER_TO_TEXT_GAP + MARKER_RADIUS + TRAILING_GAP)).max(40) as u32)
        .collect();
    Table {
        rows,
        col_x,
        text_cap,
    }
}

fn row_height(labels: &[String], row: &[usize], table: &Table) -> i32 {
    row.iter()
        .enumerate()
        .map(|(ci, &item)| {
            let lines = wrap_text_to_width(&labels[item], LEGEND_FONT_PX, table.text_cap[ci]);
            lines.len().max(1) as i32 * line_h()
        })
        .max()
        .unwrap_or(line_h())
}

/// Height in pixels the legend band needs for `labels` laid out in at most
/// `max_columns` columns starting at `start_x`.
pub fn estimate_legend_height_px(
    labels: &[String],
    start_x: i32,
    total_w: i32,
    max_columns: usize,
) -> i32 {
    if labels.is_empty() {
        return 0;
    }
    let table = layout(labels, start_x, total_w, max_columns);
    let body: i32 = table
        .rows
        .iter()
        .map(|row| row_height(labels, row, &table) + ROW_GAP)
        .sum();
    PAD_BAND + 8 + body + PAD_BAND
}

/// Draw legend entries (marker and label) as a table into `legend_area`.
pub fn draw_legend_panel<DB: DrawingBackend>(
    legend_area: &DrawingArea<DB, Shift>,
    items: &[(String, RGBColor)],
    start_x: i32,
    max_columns: usize,
) -> Result<()> {
    legend_area
        .fill(&WHITE)
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    if items.is_empty() {
        return Ok(());
    }

    let (w, _) = legend_area.dim_in_pixel();
    let labels: Vec<String> = items.iter().map(|(l, _)| l.clone()).collect();
    let table = layout(&labels, start_x, w as i32, max_columns);
    let label_style: TextStyle = TextStyle::from((FontFamily::SansSerif, LEGEND_FONT_PX))
        .pos(Pos::new(HPos::Left, VPos::Center));

    let mut y_top = PAD_BAND + 8;
    for row in &table.rows {
        let row_h = row_height(&labels, row, &table);
        let y_center = y_top + row_h / 2;

        for (ci, &item) in row.iter().enumerate() {
            let (label, color) = &items[item];
            let text_x = table.col_x[ci];
            let dot_x = (text_x - MARKER_TO_TEXT_GAP).max(0);
            legend_area
                .draw(&Circle::new((dot_x, y_center), MARKER_RADIUS, color.filled()))
                .map_err(|e| anyhow::anyhow!("{:?}", e))?;

            let lines = wrap_text_to_width(label, LEGEND_FONT_PX, table.text_cap[ci]);
            let top = y_center - lines.len().max(1) as i32 * line_h() / 2;
            for (i, ln) in lines.iter().enumerate() {
                let line_center_y = top + i as i32 * line_h() + line_h() / 2;
                legend_area
                    .draw(&Text::new(
                        ln.as_str(),
                        (text_x, line_center_y),
                        label_style.clone(),
                    ))
                    .map_err(|e| anyhow::anyhow!("{:?}", e))?;
            }
        }
        y_top += row_h + ROW_GAP;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("group {i} (N=10)")).collect()
    }

    #[test]
    fn rows_hold_at_most_max_columns() {
        let l = labels(7);
        let table = layout(&l, 80, 1000, 5);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].len(), 5);
        assert_eq!(table.rows[1], vec![5, 6]);
    }

    #[test]
    fn more_rows_need_more_height() {
        let one = estimate_legend_height_px(&labels(3), 80, 1000, 5);
        let two = estimate_legend_height_px(&labels(8), 80, 1000, 5);
        assert!(two > one);
        assert_eq!(estimate_legend_height_px(&[], 80, 1000, 5), 0);
    }
}
