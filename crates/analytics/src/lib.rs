//! # Pairscope Analytics Engine
//!
//! This crate turns the raw output of a pairs backtest into performance
//! metrics. It acts as the "unbiased judge" of the strategy.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** No knowledge of data sources or transports. It depends
//!   only on `core-types`.
//! - **Stateless Calculation:** The `AnalyticsEngine` takes closed trades and
//!   an equity curve and produces a `PerformanceReport`.
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: The main struct that contains the calculation logic.
//! - `PerformanceReport`: The standardized struct that holds the metrics.
//! - `AnalyticsError`: The specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod error;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use report::PerformanceReport;
