use crate::report::{AnalysisReport, MetricRow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePlot {
    pub dates: Vec<String>,
    pub series1: Vec<Option<f64>>,
    pub series2: Vec<Option<f64>>,
    pub ticker1: String,
    pub ticker2: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScorePlot {
    pub dates: Vec<String>,
    pub zscores: Vec<Option<f64>>,
}

/// Density grid with `z[row][col]` evaluated at `(x[col], y[row])`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Joint3d {
    pub x: Vec<Option<f64>>,
    pub y: Vec<Option<f64>>,
    pub z: Vec<Vec<Option<f64>>>,
    pub corr: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingCorrSurface {
    pub x_index: Vec<usize>,
    pub windows: Vec<usize>,
    pub z: Vec<Vec<Option<f64>>>,
}

/// The JSON body of the summary endpoint.
///
/// The two surfaces are left out entirely when the date range is too short
/// to estimate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub price_plot: PricePlot,
    pub zscore_plot: ZScorePlot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joint_3d: Option<Joint3d>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rolling_corr_surface: Option<RollingCorrSurface>,
    pub backtest: Vec<MetricRow>,
}

impl SummaryResponse {
    pub fn metric(&self, name: &str) -> Option<&str> {
        self.backtest
            .iter()
            .find(|row| row.metric == name)
            .map(|row| row.value.as_str())
    }
}

impl From<&AnalysisReport> for SummaryResponse {
    fn from(report: &AnalysisReport) -> Self {
        let prices = &report.prices;
        let stats = &report.statistics;

        let joint_3d = stats.joint.as_ref().map(|joint| Joint3d {
            x: finite_all(&joint.x),
            y: finite_all(&joint.y),
            z: joint.z.iter().map(|row| finite_all(row)).collect(),
            corr: finite(joint.correlation()),
        });

        let rolling_corr_surface = stats.rolling.as_ref().map(|rolling| RollingCorrSurface {
            x_index: rolling.x_index.clone(),
            windows: rolling.windows.clone(),
            z: rolling
                .z
                .iter()
                .map(|row| row.iter().map(|c| c.and_then(finite)).collect())
                .collect(),
        });

        Self {
            price_plot: PricePlot {
                dates: prices.dates.iter().map(ToString::to_string).collect(),
                series1: finite_all(&prices.prices1),
                series2: finite_all(&prices.prices2),
                ticker1: prices.ticker1.clone(),
                ticker2: prices.ticker2.clone(),
            },
            zscore_plot: ZScorePlot {
                dates: stats.returns.dates.iter().map(ToString::to_string).collect(),
                zscores: stats.zscores.iter().map(|z| z.and_then(finite)).collect(),
            },
            joint_3d,
            rolling_corr_surface,
            backtest: report.metrics(),
        }
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

fn finite_all(values: &[f64]) -> Vec<Option<f64>> {
    values.iter().copied().map(finite).collect()
}
