use crate::error::AnalysisError;
use chrono::NaiveDate;
use configuration::ValidationRules;
use core_types::AnalysisRequest;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};

pub const DEFAULT_INITIAL_INVEST: f64 = 1000.0;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Capital is kept in whole cents.
const CAPITAL_SCALE: u32 = 2;

fn default_initial_invest() -> f64 {
    DEFAULT_INITIAL_INVEST
}

/// An analysis request as it arrives from a caller, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAnalysisRequest {
    pub ticker1: String,
    pub ticker2: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_initial_invest")]
    pub initial_invest: f64,
}

impl RawAnalysisRequest {
    /// Normalizes the tickers and checks every field against `rules`.
    pub fn validate(&self, rules: &ValidationRules) -> Result<AnalysisRequest, AnalysisError> {
        let ticker1 = normalize_ticker(&self.ticker1, "ticker1", rules)?;
        let ticker2 = normalize_ticker(&self.ticker2, "ticker2", rules)?;
        if ticker1 == ticker2 {
            return Err(AnalysisError::invalid(format!(
                "ticker1 and ticker2 must differ, both are {ticker1}"
            )));
        }

        let start_date = parse_date(&self.start_date, "start_date")?;
        let end_date = parse_date(&self.end_date, "end_date")?;
        if start_date >= end_date {
            return Err(AnalysisError::invalid(format!(
                "start_date {start_date} must be before end_date {end_date}"
            )));
        }

        let capital = self.initial_invest;
        if !capital.is_finite() || capital <= 0.0 {
            return Err(AnalysisError::invalid(
                "initial_invest must be a positive number",
            ));
        }
        if capital > rules.max_capital {
            return Err(AnalysisError::invalid(format!(
                "initial_invest must not exceed {}",
                rules.max_capital
            )));
        }
        let initial_capital = Decimal::from_f64(capital)
            .map(|c| c.round_dp(CAPITAL_SCALE))
            .filter(|c| *c > Decimal::ZERO)
            .ok_or_else(|| AnalysisError::invalid("initial_invest must be at least 0.01"))?;

        Ok(AnalysisRequest {
            ticker1,
            ticker2,
            start_date,
            end_date,
            initial_capital,
        })
    }
}

fn normalize_ticker(raw: &str, field: &str, rules: &ValidationRules) -> Result<String, AnalysisError> {
    let ticker = raw.trim().to_ascii_uppercase();
    if ticker.is_empty() {
        return Err(AnalysisError::invalid(format!("{field} must not be empty")));
    }
    if ticker.len() > rules.max_ticker_len {
        return Err(AnalysisError::invalid(format!(
            "{field} must be at most {} characters",
            rules.max_ticker_len
        )));
    }
    if !ticker
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(AnalysisError::invalid(format!(
            "{field} may only contain letters, digits, '.' and '-'"
        )));
    }
    Ok(ticker)
}

fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, AnalysisError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| AnalysisError::invalid(format!("{field} must be a YYYY-MM-DD date, got '{raw}'")))
}
