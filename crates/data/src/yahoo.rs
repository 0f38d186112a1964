//! Yahoo Finance price source.

use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime};
use exposure_primitives::{Date, PriceObservation, PriceTable, Symbol};
use exposure_traits::{PriceSource, SourceError};
use time::OffsetDateTime;
use tokio::{
    runtime::{Builder, Runtime},
    time::sleep,
};
use tracing::{debug, warn};
use yahoo_finance_api as yahoo;

/// Adjusted closes from Yahoo Finance with a fixed delay between requests.
///
/// Owns a tokio runtime so callers stay synchronous.
pub struct YahooPriceSource {
    connector: yahoo::YahooConnector,
    runtime: Runtime,
    rate_limit_delay: Duration,
}

impl std::fmt::Debug for YahooPriceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooPriceSource")
            .field("rate_limit_delay", &self.rate_limit_delay)
            .finish_non_exhaustive()
    }
}

impl YahooPriceSource {
    /// Create a source with a 250ms delay between requests.
    ///
    /// # Errors
    /// [`SourceError::Unavailable`] if the HTTP client or runtime cannot be built.
    pub fn new() -> Result<Self, SourceError> {
        Self::with_rate_limit(Duration::from_millis(250))
    }

    /// Create a source with a custom delay between requests.
    ///
    /// # Errors
    /// [`SourceError::Unavailable`] if the HTTP client or runtime cannot be built.
    pub fn with_rate_limit(rate_limit_delay: Duration) -> Result<Self, SourceError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| SourceError::Unavailable(e.to_string()))?;
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        Ok(Self { connector, runtime, rate_limit_delay })
    }

    async fn fetch_recent(&self, symbols: &[Symbol]) -> Result<Vec<PriceObservation>, SourceError> {
        let mut observations = Vec::new();
        let mut failure = None;
        for symbol in symbols {
            let result = self
                .connector
                .get_quote_range(symbol.as_str(), "1d", "5d")
                .await
                .and_then(|response| response.quotes());
            match result {
                Ok(quotes) => {
                    debug!(%symbol, bars = quotes.len(), "fetched recent quotes");
                    observations.extend(to_observations(symbol, &quotes));
                }
                Err(e) => {
                    let err = fetch_error(symbol, &e);
                    warn!(error = %err, "recent price fetch failed");
                    failure = Some(err);
                }
            }
            sleep(self.rate_limit_delay).await;
        }

        require_any(observations, symbols, failure, || "no recent prices for any symbol".to_string())
    }

    async fn fetch_monthly(
        &self,
        symbols: &[Symbol],
        start: Date,
        end: Date,
    ) -> Result<PriceTable, SourceError> {
        let from = to_offset_date_time(start)?;
        let to = to_offset_date_time(end.checked_add_days(Days::new(1)).unwrap_or(end))?;

        let mut observations = Vec::new();
        let mut failure = None;
        for symbol in symbols {
            let result = self
                .connector
                .get_quote_history_interval(symbol.as_str(), from, to, "1mo")
                .await
                .and_then(|response| response.quotes());
            match result {
                Ok(quotes) => {
                    debug!(%symbol, bars = quotes.len(), "fetched monthly quotes");
                    observations.extend(to_observations(symbol, &quotes));
                }
                Err(e) => {
                    let err = fetch_error(symbol, &e);
                    warn!(error = %err, "price history fetch failed, column left empty");
                    failure = Some(err);
                }
            }
            sleep(self.rate_limit_delay).await;
        }

        let observations = require_any(observations, symbols, failure, || {
            format!("no monthly prices between {start} and {end}")
        })?;
        Ok(PriceTable::from_observations(symbols.to_vec(), observations)?)
    }
}

impl PriceSource for YahooPriceSource {
    fn recent_prices(&self, symbols: &[Symbol]) -> Result<Vec<PriceObservation>, SourceError> {
        self.runtime.block_on(self.fetch_recent(symbols))
    }

    fn monthly_prices(
        &self,
        symbols: &[Symbol],
        start: Date,
        end: Date,
    ) -> Result<PriceTable, SourceError> {
        if start > end {
            return Err(SourceError::InvalidDateRange { start, end });
        }
        self.runtime.block_on(self.fetch_monthly(symbols, start, end))
    }
}

fn fetch_error(symbol: &Symbol, err: &yahoo::YahooError) -> SourceError {
    SourceError::Fetch { symbol: symbol.clone(), reason: err.to_string() }
}

/// Per-symbol failures are tolerated as long as something came back. When
/// nothing did, the last fetch failure is reported, else `NoData`.
fn require_any(
    observations: Vec<PriceObservation>,
    symbols: &[Symbol],
    failure: Option<SourceError>,
    no_data: impl FnOnce() -> String,
) -> Result<Vec<PriceObservation>, SourceError> {
    if observations.is_empty() && !symbols.is_empty() {
        return Err(failure.unwrap_or_else(|| SourceError::NoData(no_data())));
    }
    Ok(observations)
}

/// Midnight UTC of `date`.
fn to_offset_date_time(date: Date) -> Result<OffsetDateTime, SourceError> {
    let timestamp = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    OffsetDateTime::from_unix_timestamp(timestamp)
        .map_err(|e| SourceError::Unavailable(format!("time conversion failed: {e}")))
}

fn to_observations<'a>(
    symbol: &'a Symbol,
    quotes: &'a [yahoo::Quote],
) -> impl Iterator<Item = PriceObservation> + 'a {
    quotes.iter().filter_map(move |q| {
        let date = quote_date(q.timestamp)?;
        Some(PriceObservation::new(symbol.clone(), date, adjusted_close(q.adjclose)))
    })
}

/// Yahoo reports a missing bar as a zero or NaN close.
fn adjusted_close(value: f64) -> Option<f64> {
    Some(value).filter(|p| p.is_finite() && *p > 0.0)
}

fn quote_date(timestamp: i64) -> Option<Date> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.date_naive())
}
