//! Gaussian kernel density estimates for the diagonal curves and the
//! lower-triangle contour overlays.

use crate::error::{StatisticUnavailable, finite};
use crate::stats::std_sample;

const NAME_1D: &str = "kde";
const NAME_2D: &str = "bivariate kde";

/// Gaussian normalisation constant 1 / sqrt(2 pi).
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Density curve sampled on `gridsize` evenly spaced points.
///
/// Bandwidth follows Scott's rule (`sd * n^(-1/5)`), and the grid extends
/// `cut` bandwidths beyond the data on each side.
pub fn gaussian_kde_1d(
    data: &[f64],
    gridsize: usize,
    cut: f64,
) -> Result<Vec<(f64, f64)>, StatisticUnavailable> {
    let n = data.len();
    if n < 2 {
        return Err(StatisticUnavailable::insufficient(NAME_1D, 2, n));
    }
    let nf = n as f64;
    let sd = std_sample(data).map_err(|e| StatisticUnavailable::new(NAME_1D, e.reason))?;
    if sd == 0.0 {
        return Err(StatisticUnavailable::zero_variance(NAME_1D));
    }
    let bw = finite(NAME_1D, sd * nf.powf(-0.2))?;

    let lo = data.iter().copied().fold(f64::INFINITY, f64::min) - cut * bw;
    let hi = data.iter().copied().fold(f64::NEG_INFINITY, f64::max) + cut * bw;
    let steps = gridsize.max(2);
    let dx = (hi - lo) / (steps - 1) as f64;

    Ok((0..steps)
        .map(|i| {
            let x = lo + dx * i as f64;
            let d: f64 = data
                .iter()
                .map(|v| {
                    let u = (x - v) / bw;
                    (-0.5 * u * u).exp()
                })
                .sum::<f64>()
                * INV_SQRT_2PI
                / (nf * bw);
            (x, d)
        })
        .collect())
}

/// Density of a bivariate KDE evaluated on a regular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    /// `values[j][i]` is the density at `(xs[i], ys[j])`.
    pub values: Vec<Vec<f64>>,
}

/// Bivariate Gaussian KDE with a full covariance bandwidth (Scott factor
/// `n^(-1/6)`) on a `gridsize x gridsize` grid padded by `cut` bandwidths.
pub fn gaussian_kde_2d(
    x: &[f64],
    y: &[f64],
    gridsize: usize,
    cut: f64,
) -> Result<DensityGrid, StatisticUnavailable> {
    let n = x.len().min(y.len());
    if n < 3 {
        return Err(StatisticUnavailable::insufficient(NAME_2D, 3, n));
    }
    let nf = n as f64;
    let (x, y) = (&x[..n], &y[..n]);
    let mx = x.iter().sum::<f64>() / nf;
    let my = y.iter().sum::<f64>() / nf;
    let (mut cxx, mut cyy, mut cxy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        cxx += (a - mx) * (a - mx);
        cyy += (b - my) * (b - my);
        cxy += (a - mx) * (b - my);
    }
    let factor2 = nf.powf(-1.0 / 3.0);
    let (sxx, syy, sxy) = (
        cxx / (nf - 1.0) * factor2,
        cyy / (nf - 1.0) * factor2,
        cxy / (nf - 1.0) * factor2,
    );
    let det = sxx * syy - sxy * sxy;
    if !det.is_finite() || det <= 1e-12 * sxx * syy {
        return Err(StatisticUnavailable::zero_variance(NAME_2D));
    }
    let (ixx, iyy, ixy) = (syy / det, sxx / det, -sxy / det);
    let norm = 1.0 / (nf * 2.0 * std::f64::consts::PI * det.sqrt());

    let (bx, by) = (sxx.sqrt(), syy.sqrt());
    let axis = |v: &[f64], bw: f64| -> Vec<f64> {
        let lo = v.iter().copied().fold(f64::INFINITY, f64::min) - cut * bw;
        let hi = v.iter().copied().fold(f64::NEG_INFINITY, f64::max) + cut * bw;
        let steps = gridsize.max(2);
        (0..steps)
            .map(|i| lo + (hi - lo) * i as f64 / (steps - 1) as f64)
            .collect()
    };
    let xs = axis(x, bx);
    let ys = axis(y, by);

    let values = ys
        .iter()
        .map(|&gy| {
            xs.iter()
                .map(|&gx| {
                    x.iter()
                        .zip(y)
                        .map(|(a, b)| {
                            let (dx, dy) = (gx - a, gy - b);
                            let q = dx * dx * ixx + 2.0 * dx * dy * ixy + dy * dy * iyy;
                            (-0.5 * q).exp()
                        })
                        .sum::<f64>()
                        * norm
                })
                .collect()
        })
        .collect();

    Ok(DensityGrid { xs, ys, values })
}

/// Density thresholds whose superlevel sets hold `1 - p` of the mass, for each
/// iso-proportion `p`.
pub fn iso_proportion_levels(grid: &DensityGrid, proportions: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = grid.values.iter().flatten().copied().collect();
    sorted.sort_by(|a, b| b.total_cmp(a));
    let total: f64 = sorted.iter().sum();
    if sorted.is_empty() || total <= 0.0 {
        return Vec::new();
    }
    let mut cumulative = Vec::with_capacity(sorted.len());
    let mut acc = 0.0;
    for v in &sorted {
        acc += v;
        cumulative.push(acc / total);
    }
    proportions
        .iter()
        .map(|p| {
            let target = 1.0 - p;
            let idx = cumulative.partition_point(|c| *c < target);
            sorted[idx.min(sorted.len() - 1)]
        })
        .collect()
}

/// `levels` evenly spaced iso-proportions from `thresh` to 1.
pub fn iso_proportions(levels: usize, thresh: f64) -> Vec<f64> {
    match levels {
        0 => Vec::new(),
        1 => vec![thresh],
        _ => (0..levels)
            .map(|i| thresh + (1.0 - thresh) * i as f64 / (levels - 1) as f64)
            .collect(),
    }
}
