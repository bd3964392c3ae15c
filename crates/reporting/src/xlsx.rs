use crate::error::ReportError;
use crate::export::{ExportFile, ExportFormat, export_rows};
use crate::report::AnalysisReport;
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

const ACCENT: Color = Color::RGB(0x00C9A7);
const FONT: &str = "Calibri";
/// Added to the longest cell of a column to get its width.
const WIDTH_PADDING: usize = 4;

/// Renders the report as a workbook with two sheets.
///
/// "Backtest Report" holds a merged title row, a styled `Metric`/`Value`
/// header and every metric row, all with thin borders. "Daily" holds one row
/// per trading day.
pub fn render_xlsx(report: &AnalysisReport) -> Result<ExportFile, ReportError> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(report_sheet(report)?);
    workbook.push_worksheet(daily_sheet(report)?);
    let bytes = workbook.save_to_buffer()?;

    Ok(ExportFile::new(report, ExportFormat::Xlsx, bytes))
}

fn report_sheet(report: &AnalysisReport) -> Result<Worksheet, ReportError> {
    let title_format = Format::new()
        .set_bold()
        .set_font_name(FONT)
        .set_font_size(14.0)
        .set_font_color(Color::White)
        .set_background_color(ACCENT)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = Format::new()
        .set_bold()
        .set_font_name(FONT)
        .set_font_size(12.0)
        .set_font_color(Color::White)
        .set_background_color(ACCENT)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);
    let body_format = Format::new()
        .set_font_name(FONT)
        .set_font_size(11.0)
        .set_text_wrap()
        .set_align(FormatAlign::VerticalCenter)
        .set_border(FormatBorder::Thin);

    let mut sheet = Worksheet::new();
    sheet.set_name("Backtest Report")?;

    let title = format!("Pairs Trading Report ({})", report.pair_label());
    sheet.merge_range(0, 0, 0, 1, &title, &title_format)?;

    let header = ["Metric", "Value"];
    for (col, name) in (0u16..).zip(header) {
        sheet.write_string_with_format(1, col, name, &header_format)?;
    }

    let rows = export_rows(report);
    for (row, metric) in (2u32..).zip(&rows) {
        sheet.write_string_with_format(row, 0, &metric.metric, &body_format)?;
        sheet.write_string_with_format(row, 1, &metric.value, &body_format)?;
    }

    // The merged title is left out of the widths.
    let metric_width = rows.iter().map(|r| r.metric.len()).chain([header[0].len()]).max();
    let value_width = rows.iter().map(|r| r.value.len()).chain([header[1].len()]).max();
    for (col, width) in (0u16..).zip([metric_width, value_width]) {
        sheet.set_column_width(col, (width.unwrap_or_default() + WIDTH_PADDING) as f64)?;
    }

    Ok(sheet)
}

fn daily_sheet(report: &AnalysisReport) -> Result<Worksheet, ReportError> {
    let prices = &report.prices;
    let stats = &report.statistics;
    let header_format = Format::new()
        .set_bold()
        .set_font_name(FONT)
        .set_font_color(Color::White)
        .set_background_color(ACCENT)
        .set_border(FormatBorder::Thin);
    let money_format = Format::new().set_num_format("0.00");

    let mut sheet = Worksheet::new();
    sheet.set_name("Daily")?;

    let header = [
        "date",
        prices.ticker1.as_str(),
        prices.ticker2.as_str(),
        "spread",
        "zscore",
        "position",
        "equity",
    ];
    for (col, name) in (0u16..).zip(header) {
        sheet.write_string_with_format(0, col, name, &header_format)?;
        sheet.set_column_width(col, (name.len().max(10) + WIDTH_PADDING) as f64)?;
    }

    for ((row, snapshot), i) in (1u32..).zip(&report.backtest.snapshots).zip(0usize..) {
        sheet.write_string(row, 0, prices.dates[i].to_string())?;
        sheet.write_number(row, 1, prices.prices1[i])?;
        sheet.write_number(row, 2, prices.prices2[i])?;
        // Price index i carries return index i - 1; the first day has none.
        if let Some(spread) = i.checked_sub(1).and_then(|t| stats.spread.get(t)) {
            sheet.write_number(row, 3, *spread)?;
        }
        if let Some(zscore) = snapshot.zscore.filter(|z| z.is_finite()) {
            sheet.write_number(row, 4, zscore)?;
        }
        sheet.write_string(row, 5, snapshot.position.label())?;
        let equity = snapshot.equity.to_f64().ok_or_else(|| {
            ReportError::Buffer(format!("equity {} does not fit in a cell", snapshot.equity))
        })?;
        sheet.write_number_with_format(row, 6, equity, &money_format)?;
    }

    Ok(sheet)
}
