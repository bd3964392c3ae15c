use crate::moments::{mean, pearson, sample_std};
use serde::Serialize;
use std::f64::consts::PI;

/// Added to the covariance diagonal before inversion so a perfectly
/// correlated pair still yields a finite density.
const COVARIANCE_JITTER: f64 = 1e-12;

/// The bivariate normal fitted to a pair of return series by moment estimators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BivariateGaussian {
    pub mean_x: f64,
    pub mean_y: f64,
    pub std_x: f64,
    pub std_y: f64,
    pub rho: f64,
}

impl BivariateGaussian {
    /// `None` when either series is constant or shorter than two points.
    pub fn fit(x: &[f64], y: &[f64]) -> Option<Self> {
        let rho = pearson(x, y)?;
        Some(Self {
            mean_x: mean(x),
            mean_y: mean(y),
            std_x: sample_std(x),
            std_y: sample_std(y),
            rho,
        })
    }

    pub fn covariance(&self) -> f64 {
        self.rho * self.std_x * self.std_y
    }

    /// Probability density at `(x, y)`.
    pub fn density(&self, x: f64, y: f64) -> f64 {
        let var_x = self.std_x * self.std_x + COVARIANCE_JITTER;
        let var_y = self.std_y * self.std_y + COVARIANCE_JITTER;
        let cov = self.covariance();
        let det = var_x * var_y - cov * cov;
        if det <= 0.0 || !det.is_finite() {
            return 0.0;
        }

        let (dx, dy) = (x - self.mean_x, y - self.mean_y);
        let quad = (var_y * dx * dx - 2.0 * cov * dx * dy + var_x * dy * dy) / det;
        (-0.5 * quad).exp() / (2.0 * PI * det.sqrt())
    }
}

/// Density of the fitted bivariate normal on an evenly spaced grid.
///
/// `z[i][j]` is the density at `(x[j], y[i])`: rows follow the y axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointSurface {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<f64>>,
    pub params: BivariateGaussian,
}

impl JointSurface {
    /// `None` when the fit is undefined or the grid would be empty.
    pub fn build(x: &[f64], y: &[f64], grid_points: usize, std_padding: f64) -> Option<Self> {
        if grid_points < 2 {
            return None;
        }
        let params = BivariateGaussian::fit(x, y)?;

        let x_axis = padded_axis(x, params.std_x, std_padding, grid_points)?;
        let y_axis = padded_axis(y, params.std_y, std_padding, grid_points)?;

        let z = y_axis
            .iter()
            .map(|&yv| x_axis.iter().map(|&xv| params.density(xv, yv)).collect())
            .collect();

        Some(Self {
            x: x_axis,
            y: y_axis,
            z,
            params,
        })
    }

    pub fn correlation(&self) -> f64 {
        self.params.rho
    }
}

/// `points` evenly spaced values over `[min - k*std, max + k*std]`.
fn padded_axis(values: &[f64], std: f64, k: f64, points: usize) -> Option<Vec<f64>> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lo, hi) = (min - k * std, max + k * std);
    if !(lo.is_finite() && hi.is_finite()) || hi <= lo {
        return None;
    }
    Some(linspace(lo, hi, points))
}

pub fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points)
                .map(|i| {
                    if i == points - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Pearson correlation of trailing windows, one row per window size.
///
/// Every row has one entry per return index; entries before the window fits,
/// or over a flat window, are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollingCorrelationSurface {
    pub x_index: Vec<usize>,
    pub windows: Vec<usize>,
    pub z: Vec<Vec<Option<f64>>>,
}

impl RollingCorrelationSurface {
    /// Keeps only the windows that fit the series; `None` if none do.
    pub fn build(x: &[f64], y: &[f64], windows: &[usize]) -> Option<Self> {
        let n = x.len().min(y.len());
        let fitting: Vec<usize> = windows.iter().copied().filter(|&w| w >= 2 && w <= n).collect();
        if fitting.is_empty() {
            return None;
        }

        let z = fitting
            .iter()
            .map(|&w| {
                (0..n)
                    .map(|t| {
                        if t + 1 < w {
                            None
                        } else {
                            pearson(&x[t + 1 - w..=t], &y[t + 1 - w..=t])
                        }
                    })
                    .collect()
            })
            .collect();

        Some(Self {
            x_index: (0..n).collect(),
            windows: fitting,
            z,
        })
    }

    /// Mean of every defined cell.
    pub fn mean_correlation(&self) -> Option<f64> {
        let defined: Vec<f64> = self.z.iter().flatten().flatten().copied().collect();
        if defined.is_empty() {
            None
        } else {
            Some(mean(&defined))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wave(n: usize, phase: f64) -> Vec<f64> {
        (0..n).map(|i| ((i as f64) * 0.37 + phase).sin() * 0.02).collect()
    }

    #[test]
    fn density_peaks_at_the_mean() {
        let g = BivariateGaussian {
            mean_x: 0.0,
            mean_y: 0.0,
            std_x: 1.0,
            std_y: 1.0,
            rho: 0.0,
        };
        let peak = g.density(0.0, 0.0);
        assert!((peak - 1.0 / (2.0 * PI)).abs() < 1e-9);
        assert!(g.density(1.0, 1.0) < peak);
    }

    #[test]
    fn grid_spans_padded_range() {
        let x = wave(100, 0.0);
        let y = wave(100, 0.4);
        let surface = JointSurface::build(&x, &y, 50, 3.0).unwrap();

        assert_eq!(surface.x.len(), 50);
        assert_eq!(surface.y.len(), 50);
        assert_eq!(surface.z.len(), 50);
        assert!(surface.z.iter().all(|row| row.len() == 50));

        let min_x = x.iter().copied().fold(f64::INFINITY, f64::min);
        let expected_lo = min_x - 3.0 * sample_std(&x);
        assert!((surface.x[0] - expected_lo).abs() < 1e-12);
        assert!(surface.z.iter().flatten().all(|d| d.is_finite() && *d >= 0.0));
    }

    #[test]
    fn joint_surface_is_omitted_for_constant_series() {
        let x = vec![0.01; 40];
        let y = wave(40, 0.0);
        assert!(JointSurface::build(&x, &y, 50, 3.0).is_none());
    }

    #[test]
    fn perfectly_correlated_pair_still_has_finite_density() {
        let x = wave(60, 0.0);
        let y: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        let surface = JointSurface::build(&x, &y, 10, 3.0).unwrap();
        assert!((surface.correlation() - 1.0).abs() < 1e-12);
        assert!(surface.z.iter().flatten().all(|d| d.is_finite()));
    }

    #[test]
    fn rolling_rows_pad_before_window_fits() {
        let x = wave(70, 0.0);
        let y = wave(70, 0.3);
        let surface = RollingCorrelationSurface::build(&x, &y, &[30, 60, 90]).unwrap();

        assert_eq!(surface.windows, vec![30, 60]);
        assert_eq!(surface.x_index.len(), 70);
        for (row, &w) in surface.z.iter().zip(&surface.windows) {
            assert_eq!(row.len(), 70);
            assert!(row[..w - 1].iter().all(Option::is_none));
            assert!(row[w - 1..].iter().all(Option::is_some));
        }
    }

    #[test]
    fn rolling_surface_is_omitted_when_no_window_fits() {
        let x = wave(10, 0.0);
        assert!(RollingCorrelationSurface::build(&x, &x, &[30, 60, 90]).is_none());
    }

    #[test]
    fn linspace_hits_both_ends() {
        let axis = linspace(-1.0, 1.0, 5);
        assert_eq!(axis, vec![-1.0, -0.5, 0.0, 0.5, 1.0]);
    }
}
