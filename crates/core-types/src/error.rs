use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Price series for {ticker} is not strictly increasing at {date}")]
    UnorderedDates { ticker: String, date: String },

    #[error("Price series for {ticker} has a non-positive or non-finite price on {date}")]
    InvalidPrice { ticker: String, date: String },
}
