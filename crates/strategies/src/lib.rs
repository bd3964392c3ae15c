//! # Pairscope Strategy Library
//!
//! This crate contains the signal logic of the pairs backtest. It defines a
//! universal `Strategy` trait and provides the z-score mean-reversion
//! implementation.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** This crate has no knowledge of data sources or reports.
//!   It depends only on `core-types` and `configuration`.
//! - **Strategy Agnostic Engine:** By using the `Strategy` trait, the
//!   `backtester` can drive any spread strategy without knowing its internals.
//!
//! ## Public API
//!
//! - `Strategy`: The core trait all strategies implement.
//! - `Signal`, `ExitReason`, `SpreadObservation`: what a strategy sees and says.
//! - `ZScoreReversion`: the entry/exit threshold strategy.

// Declare all the modules that constitute this crate.
pub mod error;
pub mod zscore_reversion;

// Re-export the key components to create a clean, public-facing API.
pub use error::StrategyError;
pub use zscore_reversion::ZScoreReversion;

use chrono::NaiveDate;
use core_types::{PositionState, SpreadDirection};
use serde::{Deserialize, Serialize};

/// One step of the spread signal as seen by a strategy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadObservation {
    /// Position in the return series.
    pub index: usize,
    pub date: NaiveDate,
    /// `None` while the z-score lookback is still filling.
    pub zscore: Option<f64>,
    /// True for the final observation of the series.
    pub is_last: bool,
}

/// Why an open spread position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    /// The z-score came back inside the exit band.
    Reverted,
    /// The data ran out while the position was open.
    EndOfData,
}

/// An instruction from a strategy to the backtester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signal {
    Enter(SpreadDirection),
    Exit(ExitReason),
}

/// The core trait that all spread strategies must implement.
///
/// The `&mut self` in `evaluate` lets strategies keep their own internal
/// state between observations. The `Send + Sync` bounds let a backtest run
/// inside any request task.
pub trait Strategy: Send + Sync {
    /// Evaluates the strategy for a new spread observation.
    ///
    /// # Arguments
    ///
    /// * `observation` - The latest z-score and its position in the series.
    /// * `position` - The backtester's current position state.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(Signal))` - if the position should change.
    /// * `Ok(None)` - if no action should be taken.
    /// * `Err(StrategyError)` - if the observation cannot be evaluated.
    fn evaluate(
        &mut self,
        observation: &SpreadObservation,
        position: PositionState,
    ) -> Result<Option<Signal>, StrategyError>;
}
