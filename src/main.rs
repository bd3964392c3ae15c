use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use configuration::{Config, DataProvider};
use engine::{DEFAULT_INITIAL_INVEST, PairsAnalyzer, RawAnalysisRequest};
use indicatif::{ProgressBar, ProgressStyle};
use reporting::{AnalysisReport, ExportFormat, SummaryResponse};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// The main entry point for the Pairscope application.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load PAIRSCOPE__* overrides from a .env file, if there is one.
    dotenvy::dotenv().ok();

    // Parse command-line arguments
    let cli = Cli::parse();

    let mut config = configuration::load_config().context("failed to load configuration")?;
    if let Some(provider) = cli.provider {
        config.data_source.provider = provider;
    }
    let _guard = configuration::init_tracing(&config.logging)?;
    tracing::debug!(provider = ?config.data_source.provider, "Configuration loaded.");

    // Execute the appropriate command
    match cli.command {
        Commands::Serve(args) => handle_serve(args, config).await,
        Commands::Analyze(args) => handle_analyze(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Pairs-trading analytics: z-score signals, return surfaces and a long/short backtest.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Price source to use instead of the configured one.
    #[arg(long, global = true, value_enum)]
    provider: Option<DataProvider>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve(ServeArgs),
    /// Analyze one ticker pair and print the backtest metrics.
    Analyze(AnalyzeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Overrides `server.host`.
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`.
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Args)]
struct AnalyzeArgs {
    /// The first ticker of the pair (e.g., "NVDA").
    #[arg(long)]
    ticker1: String,

    /// The second ticker of the pair (e.g., "AMD").
    #[arg(long)]
    ticker2: String,

    /// The first day of the analysis (format: YYYY-MM-DD).
    #[arg(long)]
    from: NaiveDate,

    /// The day after the last day of the analysis (format: YYYY-MM-DD).
    #[arg(long)]
    to: NaiveDate,

    /// Starting capital of the backtest.
    #[arg(long, default_value_t = DEFAULT_INITIAL_INVEST)]
    capital: f64,

    /// Use the offline synthetic price source, whatever `--provider` says.
    #[arg(long)]
    offline: bool,

    /// Print the full JSON payload instead of the metric table.
    #[arg(long)]
    json: bool,

    /// Also write the export to this path. A `.csv` extension writes CSV,
    /// anything else an XLSX workbook.
    #[arg(long)]
    export: Option<PathBuf>,
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("server host and port do not form a socket address")?;
    let analyzer = PairsAnalyzer::from_config(&config)?;

    web_server::run_server(addr, analyzer).await
}

async fn handle_analyze(args: AnalyzeArgs, mut config: Config) -> anyhow::Result<()> {
    if args.offline {
        config.data_source.provider = DataProvider::Synthetic;
    }
    let analyzer = PairsAnalyzer::from_config(&config)?;

    let raw = RawAnalysisRequest {
        ticker1: args.ticker1,
        ticker2: args.ticker2,
        start_date: args.from.to_string(),
        end_date: args.to.to_string(),
        initial_invest: args.capital,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    spinner.set_message(format!("Analyzing {} / {}...", raw.ticker1, raw.ticker2));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = analyzer.analyze(&raw).await;
    spinner.finish_and_clear();
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&SummaryResponse::from(&report))?);
    } else {
        print_report(&report);
    }

    if let Some(path) = args.export {
        let format = export_format(&path);
        let file = reporting::render_export(&report, format)?;
        tokio::fs::write(&path, &file.bytes)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Export written to {}", path.display());
    }

    Ok(())
}

fn print_report(report: &AnalysisReport) {
    println!(
        "{} | {} to {} | {} aligned trading days",
        report.pair_label(),
        report.request.start_date,
        report.request.end_date,
        report.prices.len()
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);
    for row in report.metrics().into_iter().chain(report.detail_metrics()) {
        table.add_row(vec![row.metric, row.value]);
    }
    println!("{table}");

    if let Some(rolling) = &report.statistics.rolling {
        if let Some(mean) = rolling.mean_correlation() {
            println!("Mean rolling correlation over windows {:?}: {mean:.2}", rolling.windows);
        }
    }
}

fn export_format(path: &Path) -> ExportFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => ExportFormat::Csv,
        _ => ExportFormat::Xlsx,
    }
}
