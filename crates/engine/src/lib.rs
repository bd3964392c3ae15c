use backtester::Backtester;
use configuration::{BacktestParams, Config, ValidationRules};
use core_types::AnalysisRequest;
use market_data::MarketDataLoader;
use reporting::{AnalysisReport, ExportFile, ExportFormat, SummaryResponse};
use statistics::StatisticsEngine;
use std::time::Instant;
use strategies::ZScoreReversion;

pub mod error;
pub mod request;

pub use error::AnalysisError;
pub use request::{DEFAULT_INITIAL_INVEST, RawAnalysisRequest};

/// The central orchestrator of a pairs analysis.
///
/// Runs validation, loading, statistics, the backtest and report assembly
/// strictly in that order. Cloning is cheap and every clone shares the same
/// loader, so a single instance can serve all requests.
#[derive(Clone)]
pub struct PairsAnalyzer {
    // --- Shared Components ---
    loader: MarketDataLoader,
    statistics: StatisticsEngine,

    // --- Configuration ---
    backtest: BacktestParams,
    rules: ValidationRules,
}

impl PairsAnalyzer {
    /// Creates a new `PairsAnalyzer` over an existing loader.
    pub fn new(loader: MarketDataLoader, config: &Config) -> Self {
        Self {
            loader,
            statistics: StatisticsEngine::new(config.statistics.clone()),
            backtest: config.backtest.clone(),
            rules: config.validation.clone(),
        }
    }

    /// Builds the analyzer and its loader from the configuration.
    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        let loader = MarketDataLoader::from_config(&config.data_source)?;
        Ok(Self::new(loader, config))
    }

    /// Runs the whole pipeline and returns the assembled report.
    pub async fn analyze(&self, raw: &RawAnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        let started = Instant::now();
        let request = raw.validate(&self.rules)?;

        tracing::info!(
            ticker1 = %request.ticker1,
            ticker2 = %request.ticker2,
            start = %request.start_date,
            end = %request.end_date,
            "Analysis requested."
        );

        let result = self.run_pipeline(request).await;
        match &result {
            Ok(report) => tracing::info!(
                pair = %report.pair_label(),
                days = report.prices.len(),
                trades = report.backtest.trades.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Analysis complete."
            ),
            Err(AnalysisError::InternalComputation(detail)) => {
                tracing::error!(%detail, "Analysis failed.")
            }
            Err(e) => tracing::warn!(code = e.code(), detail = %e, "Analysis rejected."),
        }
        result
    }

    /// Produces the JSON summary payload.
    pub async fn run_summary(&self, raw: &RawAnalysisRequest) -> Result<SummaryResponse, AnalysisError> {
        let report = self.analyze(raw).await?;
        Ok(SummaryResponse::from(&report))
    }

    /// Produces the exported file. A workbook that fails to render falls back
    /// to CSV.
    pub async fn run_export(
        &self,
        raw: &RawAnalysisRequest,
        format: ExportFormat,
    ) -> Result<ExportFile, AnalysisError> {
        let report = self.analyze(raw).await?;
        let file = match reporting::render_export(&report, format) {
            Ok(file) => file,
            Err(e) if format == ExportFormat::Xlsx => {
                tracing::warn!(error = %e, "Workbook export failed, falling back to CSV.");
                reporting::render_csv(&report)?
            }
            Err(e) => return Err(e.into()),
        };
        Ok(file)
    }

    async fn run_pipeline(&self, request: AnalysisRequest) -> Result<AnalysisReport, AnalysisError> {
        // 1. Load and align both series.
        let prices = self
            .loader
            .load_pair(&request.ticker1, &request.ticker2, request.start_date, request.end_date)
            .await?;

        // 2. Derive returns, spread, signal and surfaces.
        let stats = self.statistics.analyze(&prices)?;

        // 3. Simulate the strategy over the signal.
        let strategy = ZScoreReversion::new(&self.backtest)?;
        let mut backtester = Backtester::new(Box::new(strategy), self.backtest.clone());
        let backtest = backtester.run(&prices, &stats.zscores, request.initial_capital)?;

        // 4. Assemble the single source of truth for both renderings.
        Ok(AnalysisReport::assemble(request, prices, stats, backtest)?)
    }
}
