use crate::error::ReportError;
use crate::report::{AnalysisReport, MetricRow, format_decimal};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// The file formats a report can be exported to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => XLSX_CONTENT_TYPE,
            ExportFormat::Csv => CSV_CONTENT_TYPE,
        }
    }
}

/// A rendered file ready to be sent as an attachment or written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub(crate) fn new(report: &AnalysisReport, format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            filename: format!(
                "backtest_{}_{}.{}",
                report.prices.ticker1,
                report.prices.ticker2,
                format.extension()
            ),
            content_type: format.content_type(),
            bytes,
        }
    }
}

/// Renders the report in the requested format.
pub fn render_export(report: &AnalysisReport, format: ExportFormat) -> Result<ExportFile, ReportError> {
    match format {
        ExportFormat::Xlsx => crate::xlsx::render_xlsx(report),
        ExportFormat::Csv => render_csv(report),
    }
}

/// Every metric row of an exported file: the pair and period, the summary
/// metrics, then the backtest detail.
pub(crate) fn export_rows(report: &AnalysisReport) -> Vec<MetricRow> {
    let mut rows = vec![
        MetricRow::new("Stock Pair", report.pair_label()),
        MetricRow::new(
            "Time Period",
            time_period(report.request.start_date, report.request.end_date),
        ),
    ];
    rows.extend(report.metrics());
    rows.extend(report.detail_metrics());
    rows
}

/// Renders the report as CSV: a `Metric,Value` block, a blank line, then one
/// row per trading day.
pub fn render_csv(report: &AnalysisReport) -> Result<ExportFile, ReportError> {
    let mut bytes = metric_section(&export_rows(report))?;
    bytes.push(b'\n');
    bytes.extend(daily_section(report)?);

    Ok(ExportFile::new(report, ExportFormat::Csv, bytes))
}

fn metric_section(rows: &[MetricRow]) -> Result<Vec<u8>, ReportError> {
    let mut wtr = writer();
    wtr.write_record(["Metric", "Value"])?;
    for row in rows {
        wtr.write_record([row.metric.as_str(), row.value.as_str()])?;
    }
    into_bytes(wtr)
}

fn daily_section(report: &AnalysisReport) -> Result<Vec<u8>, ReportError> {
    let prices = &report.prices;
    let stats = &report.statistics;

    let mut wtr = writer();
    wtr.write_record([
        "date",
        prices.ticker1.as_str(),
        prices.ticker2.as_str(),
        "spread",
        "zscore",
        "position",
        "equity",
    ])?;

    for (i, snapshot) in report.backtest.snapshots.iter().enumerate() {
        // Price index i carries return index i - 1; the first day has none.
        let spread = i.checked_sub(1).and_then(|t| stats.spread.get(t)).map(f64::to_string);
        let zscore = snapshot.zscore.map(|z| z.to_string());

        wtr.write_record([
            prices.dates[i].to_string(),
            prices.prices1[i].to_string(),
            prices.prices2[i].to_string(),
            spread.unwrap_or_default(),
            zscore.unwrap_or_default(),
            snapshot.position.label().to_string(),
            format_decimal(snapshot.equity),
        ])?;
    }
    into_bytes(wtr)
}

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn into_bytes(mut wtr: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ReportError> {
    wtr.flush().map_err(|e| ReportError::Buffer(e.to_string()))?;
    wtr.into_inner().map_err(|e| ReportError::Buffer(e.to_string()))
}

/// Whole years and months between two dates, e.g. "1 year, 2 months".
pub fn time_period(start: NaiveDate, end: NaiveDate) -> String {
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    let months = months.max(0);
    let (years, months) = (months / 12, months % 12);

    let plural = |n: i32, unit: &str| format!("{n} {unit}{}", if n == 1 { "" } else { "s" });
    match (years, months) {
        (0, m) => plural(m, "month"),
        (y, 0) => plural(y, "year"),
        (y, m) => format!("{}, {}", plural(y, "year"), plural(m, "month")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn time_period_counts_whole_months() {
        assert_eq!(time_period(date(2023, 1, 1), date(2024, 1, 1)), "1 year");
        assert_eq!(time_period(date(2020, 1, 15), date(2023, 3, 20)), "3 years, 2 months");
        assert_eq!(time_period(date(2023, 1, 31), date(2023, 3, 1)), "1 month");
        assert_eq!(time_period(date(2023, 5, 1), date(2023, 5, 11)), "0 months");
        assert_eq!(time_period(date(2022, 6, 1), date(2023, 7, 1)), "1 year, 1 month");
    }

    #[test]
    fn format_names_match_query_values() {
        let parsed: ExportFormat = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(parsed, ExportFormat::Csv);
        assert_eq!(ExportFormat::default(), ExportFormat::Xlsx);
        assert_eq!(ExportFormat::Xlsx.content_type(), XLSX_CONTENT_TYPE);
    }
}
