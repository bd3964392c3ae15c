use crate::enums::SpreadDirection;
use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }
}

/// The daily price history of one ticker, ordered by strictly increasing date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Builds a series, rejecting out-of-order dates and unusable prices.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, CoreError> {
        let ticker = ticker.into();

        for (i, point) in points.iter().enumerate() {
            if !point.price.is_finite() || point.price <= 0.0 {
                return Err(CoreError::InvalidPrice {
                    ticker,
                    date: point.date.to_string(),
                });
            }
            if i > 0 && points[i - 1].date >= point.date {
                return Err(CoreError::UnorderedDates {
                    ticker,
                    date: point.date.to_string(),
                });
            }
        }

        Ok(Self { ticker, points })
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Two price series inner-joined on trading day.
///
/// `dates`, `prices1` and `prices2` always have the same length; index `i` of
/// each vector refers to the same trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedPrices {
    pub ticker1: String,
    pub ticker2: String,
    pub dates: Vec<NaiveDate>,
    pub prices1: Vec<f64>,
    pub prices2: Vec<f64>,
}

impl AlignedPrices {
    /// Keeps only the dates present in both series.
    pub fn inner_join(first: &PriceSeries, second: &PriceSeries) -> Self {
        let capacity = first.len().min(second.len());
        let mut dates = Vec::with_capacity(capacity);
        let mut prices1 = Vec::with_capacity(capacity);
        let mut prices2 = Vec::with_capacity(capacity);

        let (a, b) = (first.points(), second.points());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].date.cmp(&b[j].date) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dates.push(a[i].date);
                    prices1.push(a[i].price);
                    prices2.push(b[j].price);
                    i += 1;
                    j += 1;
                }
            }
        }

        Self {
            ticker1: first.ticker.clone(),
            ticker2: second.ticker.clone(),
            dates,
            prices1,
            prices2,
        }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Buy-and-hold return of each ticker over the whole aligned period.
    pub fn total_returns(&self) -> (f64, f64) {
        if self.len() < 2 {
            return (0.0, 0.0);
        }
        let last = self.len() - 1;
        (
            self.prices1[last] / self.prices1[0] - 1.0,
            self.prices2[last] / self.prices2[0] - 1.0,
        )
    }
}

/// A validated analysis request. Tickers are upper-case and distinct,
/// `start_date < end_date` and `initial_capital > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub ticker1: String,
    pub ticker2: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_capital: Decimal,
}

/// A closed round trip of the pair: one long leg and one short leg opened and
/// closed on the same days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairTrade {
    pub direction: SpreadDirection,
    /// Price indices into the `AlignedPrices` the trade was simulated on.
    pub entry_index: usize,
    pub exit_index: usize,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_prices: (f64, f64),
    pub exit_prices: (f64, f64),
    /// Notional of each leg.
    pub leg_notional: Decimal,
    pub pnl: Decimal,
}

impl PairTrade {
    pub fn holding_days(&self) -> i64 {
        (self.exit_date - self.entry_date).num_days()
    }

    pub fn is_winner(&self) -> bool {
        self.pnl > Decimal::ZERO
    }
}
