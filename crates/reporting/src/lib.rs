//! # Pairscope Report Assembler
//!
//! Collects the aligned prices, statistics and backtest of one request into an
//! `AnalysisReport`, then renders it as the JSON `SummaryResponse` or as an
//! XLSX or CSV `ExportFile`. Every rendering reads the same report, so their
//! numbers always agree.

pub mod error;
pub mod export;
pub mod report;
pub mod summary;
pub mod xlsx;

pub use error::ReportError;
pub use export::{
    CSV_CONTENT_TYPE, ExportFile, ExportFormat, XLSX_CONTENT_TYPE, render_csv, render_export,
    time_period,
};
pub use report::{AnalysisReport, DETAIL_KEYS, METRIC_KEYS, MetricRow, Performer};
pub use xlsx::render_xlsx;
pub use summary::SummaryResponse;
