//! Adapter helpers between the scene styles and the plotters crate.

use anyhow::{Result, anyhow};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::style::{LineDash, MarkerShape, Rgb};
use crate::viz::util::rgb;

/// Plot area of one panel, in data coordinates.
pub type PanelArea<DB> = DrawingArea<DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;
/// Chart of one panel, in data coordinates.
pub type PanelChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Stroke style of a line in `color`, faded by `alpha`.
pub fn line_style(color: Rgb, alpha: f64, width: u32) -> ShapeStyle {
    rgb(color).mix(alpha).stroke_width(width)
}

/// Filled style in `color`, faded by `alpha`.
pub fn fill_style(color: Rgb, alpha: f64) -> ShapeStyle {
    rgb(color).mix(alpha).filled()
}

/// Draw one marker of `shape` centred on a data coordinate, `size` pixels from
/// center to edge.
pub fn draw_marker<DB: DrawingBackend>(
    area: &PanelArea<DB>,
    at: (f64, f64),
    size: i32,
    style: ShapeStyle,
    shape: MarkerShape,
) -> Result<()> {
    let s = size;
    let drawn = match shape {
        MarkerShape::Circle => {
            area.draw(&(EmptyElement::at(at) + Circle::new((0, 0), s, style.filled())))
        }
        MarkerShape::Square => {
            area.draw(&(EmptyElement::at(at) + Rectangle::new([(-s, -s), (s, s)], style.filled())))
        }
        MarkerShape::Triangle => area.draw(
            &(EmptyElement::at(at) + Polygon::new(vec![(0, -s), (-s, s), (s, s)], style.filled())),
        ),
        MarkerShape::Diamond => area.draw(
            &(EmptyElement::at(at)
                + Polygon::new(vec![(0, -s), (-s, 0), (0, s), (s, 0)], style.filled())),
        ),
        MarkerShape::Cross => area.draw(
            &(EmptyElement::at(at)
                + PathElement::new(vec![(-s, 0), (s, 0)], style.stroke_width(3))
                + PathElement::new(vec![(0, -s), (0, s)], style.stroke_width(3))),
        ),
        MarkerShape::X => area.draw(
            &(EmptyElement::at(at)
                + PathElement::new(vec![(-s, -s), (s, s)], style.stroke_width(3))
                + PathElement::new(vec![(-s, s), (s, -s)], style.stroke_width(3))),
        ),
    };
    drawn.map_err(|e| anyhow!("{:?}", e))
}

/// Vertical line at data `x` spanning `[y_lo, y_hi]`, solid or dotted.
pub fn draw_vertical_line<DB: DrawingBackend>(
    area: &PanelArea<DB>,
    x: f64,
    (y_lo, y_hi): (f64, f64),
    style: ShapeStyle,
    dash: LineDash,
) -> Result<()> {
    match dash {
        LineDash::Solid => area
            .draw(&PathElement::new(vec![(x, y_lo), (x, y_hi)], style))
            .map_err(|e| anyhow!("{:?}", e)),
        LineDash::Dot => {
            // Plotters has no portable dash pattern; emit short strokes instead.
            const PIECES: usize = 40;
            let step = (y_hi - y_lo) / (2 * PIECES) as f64;
            for i in 0..PIECES {
                let a = y_lo + step * (2 * i) as f64;
                area.draw(&PathElement::new(vec![(x, a), (x, a + step)], style))
                    .map_err(|e| anyhow!("{:?}", e))?;
            }
            Ok(())
        }
    }
}
