use crate::error::StatisticsError;
use crate::moments::pearson;
use crate::returns::PairReturns;
use crate::surfaces::{JointSurface, RollingCorrelationSurface};
use crate::zscore::rolling_zscore;
use configuration::StatisticsParams;
use core_types::AlignedPrices;

/// Everything the statistics engine derives from one aligned pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairStatistics {
    pub returns: PairReturns,
    /// `r1 - r2`, one entry per return.
    pub spread: Vec<f64>,
    /// Rolling z-score of the spread, aligned to `returns.dates`.
    pub zscores: Vec<Option<f64>>,
    /// Pearson correlation of the full return series.
    pub correlation: Option<f64>,
    pub joint: Option<JointSurface>,
    pub rolling: Option<RollingCorrelationSurface>,
}

/// A stateless calculator for the signals and surfaces of a ticker pair.
#[derive(Debug, Clone)]
pub struct StatisticsEngine {
    params: StatisticsParams,
}

impl StatisticsEngine {
    pub fn new(params: StatisticsParams) -> Self {
        Self { params }
    }

    /// Derives returns, spread, z-scores and both surfaces.
    ///
    /// Surfaces that need more history than the pair has are left out rather
    /// than failing the whole analysis.
    pub fn analyze(&self, prices: &AlignedPrices) -> Result<PairStatistics, StatisticsError> {
        let returns = PairReturns::from_prices(prices)?;
        let spread = returns.spread();
        let zscores = rolling_zscore(&spread, self.params.zscore_lookback);

        if zscores.iter().flatten().any(|z| !z.is_finite()) {
            return Err(StatisticsError::NonFinite("spread z-score".to_string()));
        }

        let correlation = pearson(&returns.first, &returns.second);

        let joint = if returns.len() >= self.params.min_joint_observations {
            JointSurface::build(
                &returns.first,
                &returns.second,
                self.params.grid_points,
                self.params.grid_std_padding,
            )
        } else {
            None
        };
        if let Some(surface) = &joint {
            if surface.z.iter().flatten().any(|d| !d.is_finite()) {
                return Err(StatisticsError::NonFinite("joint density".to_string()));
            }
        }

        let rolling =
            RollingCorrelationSurface::build(&returns.first, &returns.second, &self.params.rolling_windows);

        tracing::debug!(
            returns = returns.len(),
            correlation = ?correlation,
            joint = joint.is_some(),
            rolling_windows = ?rolling.as_ref().map(|r| r.windows.clone()),
            "Computed pair statistics."
        );

        Ok(PairStatistics {
            returns,
            spread,
            zscores,
            correlation,
            joint,
            rolling,
        })
    }
}
