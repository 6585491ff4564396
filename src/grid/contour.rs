//! Marching squares over a [`DensityGrid`].

use crate::stats::kde::DensityGrid;

/// A straight piece of an iso-line, in data coordinates.
pub type Segment = [(f64, f64); 2];

/// Iso-line segments of `grid` at `level`.
///
/// Ambiguous saddle cells are resolved by the mean of their four corners.
pub fn iso_segments(grid: &DensityGrid, level: f64) -> Vec<Segment> {
    let (nx, ny) = (grid.xs.len(), grid.ys.len());
    let mut out = Vec::new();
    if nx < 2 || ny < 2 || grid.values.len() < ny {
        return out;
    }

    for j in 0..ny - 1 {
        for i in 0..nx - 1 {
            // corners counter-clockwise from bottom-left
            let corners = [
                (grid.xs[i], grid.ys[j], grid.values[j][i]),
                (grid.xs[i + 1], grid.ys[j], grid.values[j][i + 1]),
                (grid.xs[i + 1], grid.ys[j + 1], grid.values[j + 1][i + 1]),
                (grid.xs[i], grid.ys[j + 1], grid.values[j + 1][i]),
            ];
            let case = corners
                .iter()
                .enumerate()
                .fold(0u8, |acc, (k, c)| acc | (u8::from(c.2 >= level) << k));

            // edge k joins corner k and corner k + 1
            let edge = |k: usize| -> (f64, f64) {
                let a = corners[k];
                let b = corners[(k + 1) % 4];
                let t = (level - a.2) / (b.2 - a.2);
                (a.0 + t * (b.0 - a.0), a.1 + t * (b.1 - a.1))
            };
            let center_inside = corners.iter().map(|c| c.2).sum::<f64>() / 4.0 >= level;

            let pairs: &[(usize, usize)] = match case {
                0 | 15 => &[],
                1 | 14 => &[(3, 0)],
                2 | 13 => &[(0, 1)],
                3 | 12 => &[(3, 1)],
                4 | 11 => &[(1, 2)],
                6 | 9 => &[(0, 2)],
                7 | 8 => &[(3, 2)],
                5 if center_inside => &[(0, 1), (2, 3)],
                5 => &[(3, 0), (1, 2)],
                10 if center_inside => &[(3, 0), (1, 2)],
                10 => &[(0, 1), (2, 3)],
                _ => &[],
            };
            out.extend(pairs.iter().map(|&(a, b)| [edge(a), edge(b)]));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cone(n: usize) -> DensityGrid {
        let axis: Vec<f64> = (0..n).map(|i| -2.0 + 4.0 * i as f64 / (n - 1) as f64).collect();
        let values = axis
            .iter()
            .map(|&y| axis.iter().map(|&x| -(x * x + y * y).sqrt()).collect())
            .collect();
        DensityGrid {
            xs: axis.clone(),
            ys: axis,
            values,
        }
    }

    #[test]
    fn circle_level_lies_on_radius() {
        let segs = iso_segments(&cone(41), -1.0);
        assert!(!segs.is_empty());
        for seg in &segs {
            for (x, y) in seg {
                let r = (x * x + y * y).sqrt();
                assert!((r - 1.0).abs() < 0.05, "point at radius {r}");
            }
        }
    }

    #[test]
    fn level_outside_range_has_no_segments() {
        assert!(iso_segments(&cone(11), 1.0).is_empty());
        assert!(iso_segments(&cone(11), -10.0).is_empty());
    }
}
