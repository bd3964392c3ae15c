use crate::error::StrategyError;
use crate::{ExitReason, Signal, SpreadObservation, Strategy};
use configuration::BacktestParams;
use core_types::{PositionState, SpreadDirection};

/// The spread mean-reversion strategy.
///
/// Opens a spread position when the z-score moves beyond `±entry_z`, betting
/// on a return to the mean:
/// 1. `z > entry_z`: the first ticker outran the second, so short it and buy the second.
/// 2. `z < -entry_z`: the reverse.
///
/// The position closes once `|z| <= exit_z`, or on the last observation.
pub struct ZScoreReversion {
    entry_z: f64,
    exit_z: f64,
}

impl ZScoreReversion {
    /// Creates a new `ZScoreReversion` instance.
    pub fn new(params: &BacktestParams) -> Result<Self, StrategyError> {
        if !(params.entry_z.is_finite() && params.exit_z.is_finite()) {
            return Err(StrategyError::InvalidParameters(
                "Thresholds must be finite".to_string(),
            ));
        }
        if params.exit_z < 0.0 || params.exit_z >= params.entry_z {
            return Err(StrategyError::InvalidParameters(format!(
                "Exit threshold {} must be in [0, entry threshold {})",
                params.exit_z, params.entry_z
            )));
        }

        Ok(Self {
            entry_z: params.entry_z,
            exit_z: params.exit_z,
        })
    }
}

impl Strategy for ZScoreReversion {
    fn evaluate(
        &mut self,
        observation: &SpreadObservation,
        position: PositionState,
    ) -> Result<Option<Signal>, StrategyError> {
        if let Some(z) = observation.zscore {
            if !z.is_finite() {
                return Err(StrategyError::NonFiniteSignal(observation.index));
            }
        }

        let signal = match position {
            PositionState::LongShort(_) if observation.is_last => {
                Some(Signal::Exit(ExitReason::EndOfData))
            }
            PositionState::LongShort(_) => match observation.zscore {
                Some(z) if z.abs() <= self.exit_z => Some(Signal::Exit(ExitReason::Reverted)),
                _ => None,
            },
            // Opening on the last bar would be closed on the same bar.
            PositionState::Flat if observation.is_last => None,
            PositionState::Flat => match observation.zscore {
                Some(z) if z > self.entry_z => {
                    Some(Signal::Enter(SpreadDirection::ShortFirstLongSecond))
                }
                Some(z) if z < -self.entry_z => {
                    Some(Signal::Enter(SpreadDirection::LongFirstShortSecond))
                }
                _ => None,
            },
        };

        if let Some(signal) = &signal {
            tracing::debug!(
                index = observation.index,
                date = %observation.date,
                zscore = ?observation.zscore,
                ?signal,
                "ZScoreReversion: signal."
            );
        }

        Ok(signal)
    }
}
