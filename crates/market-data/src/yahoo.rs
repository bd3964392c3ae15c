use crate::PriceSource;
use crate::error::DataError;
use crate::responses::ChartResponse;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use core_types::{PricePoint, PriceSeries};
use reqwest::StatusCode;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// A `PriceSource` backed by the Yahoo Finance v8 chart API.
///
/// Prices are split/dividend adjusted when the API provides an adjusted close
/// column and fall back to the raw close column otherwise. One column is used
/// for the whole series.
#[derive(Debug, Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DataError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn build_url(&self, ticker: &str) -> String {
        format!("{}/{}", self.base_url, ticker)
    }
}

#[async_trait]
impl PriceSource for YahooClient {
    async fn fetch_daily(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceSeries, DataError> {
        let period1 = start.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp());
        let period2 = end.and_hms_opt(0, 0, 0).map(|t| t.and_utc().timestamp());
        let (Some(period1), Some(period2)) = (period1, period2) else {
            return Err(DataError::InvalidData {
                ticker: ticker.to_string(),
                reason: "date range cannot be expressed as timestamps".to_string(),
            });
        };

        tracing::debug!(ticker, %start, %end, "Requesting daily chart.");

        let transport = |e: reqwest::Error| DataError::Transport {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .get(self.build_url(ticker))
            .query(&[
                ("period1", period1.to_string()),
                ("period2", period2.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        parse_chart(ticker, status, &text)
    }
}

/// Turns a raw chart API response into a `PriceSeries`.
pub fn parse_chart(ticker: &str, status: StatusCode, text: &str) -> Result<PriceSeries, DataError> {
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        return Err(DataError::Transport {
            ticker: ticker.to_string(),
            reason: format!("HTTP {}", status),
        });
    }

    let not_found = |reason: String| DataError::NotFound {
        ticker: ticker.to_string(),
        reason,
    };

    let response: ChartResponse = serde_json::from_str(text).map_err(|e| {
        if status.is_success() {
            DataError::InvalidData {
                ticker: ticker.to_string(),
                reason: format!("Failed to deserialize chart response: {}", e),
            }
        } else {
            not_found(format!("HTTP {}", status))
        }
    })?;

    if let Some(error) = response.chart.error {
        return Err(not_found(format!("{}: {}", error.code, error.description)));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| not_found("empty chart result".to_string()))?;

    let timestamps = result
        .timestamp
        .filter(|ts| !ts.is_empty())
        .ok_or_else(|| not_found("no trading days in the requested range".to_string()))?;

    let adjusted = result
        .indicators
        .adjclose
        .as_ref()
        .and_then(|blocks| blocks.first())
        .map(|b| b.adjclose.as_slice())
        .filter(|column| column.iter().any(Option::is_some));
    let prices = match adjusted {
        Some(column) => column,
        None => result
            .indicators
            .quote
            .first()
            .map(|q| q.close.as_slice())
            .unwrap_or_default(),
    };

    let offset = result.meta.gmtoffset;
    let mut points: Vec<PricePoint> = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let price = prices.get(i).copied().flatten();

        // Skip bars with no usable price (halts, partial rows).
        let Some(price) = price.filter(|p| p.is_finite() && *p > 0.0) else {
            continue;
        };
        let Some(date) = DateTime::from_timestamp(ts + offset, 0).map(|t| t.date_naive()) else {
            continue;
        };

        match points.last().map(|p| p.date) {
            // The API occasionally repeats the latest session; keep the newest bar.
            Some(last) if last == date => {
                if let Some(point) = points.last_mut() {
                    point.price = price;
                }
            }
            Some(last) if last > date => continue,
            _ => points.push(PricePoint::new(date, price)),
        }
    }

    if points.is_empty() {
        return Err(not_found("no prices in the requested range".to_string()));
    }

    PriceSeries::new(ticker, points).map_err(|e| DataError::InvalidData {
        ticker: ticker.to_string(),
        reason: e.to_string(),
    })
}
