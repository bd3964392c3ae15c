use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Pipeline outputs do not line up: {0}")]
    Misaligned(String),

    #[error("CSV encoding error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet encoding error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("Export buffer error: {0}")]
    Buffer(String),
}
