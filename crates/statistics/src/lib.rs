//! # Pairscope Statistics Engine
//!
//! Pure numeric code: simple returns, the return-differential spread, its
//! rolling z-score, Pearson correlation, the fitted joint-return density
//! surface and the rolling-correlation surface.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O. Depends only on `core-types` and `configuration`.
//! - **Explicit parameters:** window sizes and grid settings arrive as a
//!   `StatisticsParams` value, never as hard-coded constants.
//! - **Soft degradation:** surfaces that need more history than is available
//!   are `None`, not errors.

pub mod engine;
pub mod error;
pub mod moments;
pub mod returns;
pub mod surfaces;
pub mod zscore;

pub use engine::{PairStatistics, StatisticsEngine};
pub use error::StatisticsError;
pub use returns::PairReturns;
pub use surfaces::{BivariateGaussian, JointSurface, RollingCorrelationSurface};
