//! Market data source trait definitions.

use exposure_primitives::{Date, PriceObservation, PriceTable, Symbol, ValidationError};

/// Errors raised by a market data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The request for one symbol failed.
    #[error("failed to fetch {symbol}: {reason}")]
    Fetch {
        /// Requested symbol.
        symbol: Symbol,
        /// Underlying failure.
        reason: String,
    },

    /// The source returned nothing usable for any symbol.
    #[error("no data returned: {0}")]
    NoData(String),

    /// The requested window is empty.
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start of the window.
        start: Date,
        /// End of the window.
        end: Date,
    },

    /// The source could not be initialised.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Returned data violated a table invariant.
    #[error("invalid price data: {0}")]
    Validation(#[from] ValidationError),
}

/// A provider of adjusted close prices.
///
/// Calls are synchronous from the caller's point of view; timeouts and
/// retries belong to the implementation.
pub trait PriceSource {
    /// Recent daily observations for each symbol, used to value positions.
    ///
    /// Implementations may return several observations per symbol and may
    /// include observations whose price is missing. Symbols the source knows
    /// nothing about are simply absent.
    ///
    /// # Errors
    /// Returns `SourceError` when the source as a whole fails.
    fn recent_prices(&self, symbols: &[Symbol]) -> Result<Vec<PriceObservation>, SourceError>;

    /// Month-end adjusted closes for each symbol over `[start, end]`.
    ///
    /// # Errors
    /// Returns `SourceError` when the source as a whole fails or the window
    /// is empty.
    fn monthly_prices(
        &self,
        symbols: &[Symbol],
        start: Date,
        end: Date,
    ) -> Result<PriceTable, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_error_display() {
        let err = SourceError::Fetch { symbol: Symbol::new("aapl"), reason: "timeout".to_string() };
        assert_eq!(err.to_string(), "failed to fetch AAPL: timeout");
    }
}
