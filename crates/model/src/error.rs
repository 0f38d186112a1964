//! Error types for the exposure pipeline.

use exposure_primitives::{Symbol, ValidationError};
use exposure_traits::{EstimatorError, SourceError};

/// Errors that can occur while building weights, returns or the regression.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Input rejected by a primitive invariant.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No usable price for one or more held symbols.
    #[error("missing price for: {}", join(.0))]
    MissingPrice(Vec<Symbol>),

    /// A resolved price is zero, negative or not finite.
    #[error("invalid price for {symbol}: {price}")]
    InvalidPrice {
        /// Offending symbol.
        symbol: Symbol,
        /// Offending price.
        price: f64,
    },

    /// Portfolio market value is not strictly positive.
    #[error("total portfolio value must be positive, got {0}")]
    NonPositiveTotalValue(f64),

    /// Weighted symbols absent from the price history.
    #[error("no price history for: {}", join(.0))]
    MissingPriceHistory(Vec<Symbol>),

    /// Too few aligned periods to fit the regression.
    #[error("insufficient data: need at least {required} aligned periods, got {actual}")]
    InsufficientData {
        /// Required number of periods.
        required: usize,
        /// Periods available after alignment.
        actual: usize,
    },

    /// Estimator error.
    #[error("estimator error: {0}")]
    Estimator(EstimatorError),

    /// Market data source error.
    #[error("price source error: {0}")]
    Source(#[from] SourceError),
}

impl From<EstimatorError> for ModelError {
    fn from(err: EstimatorError) -> Self {
        match err {
            EstimatorError::InsufficientData { required, actual } => {
                Self::InsufficientData { required, actual }
            }
            other => Self::Estimator(other),
        }
    }
}

impl ModelError {
    /// Returns whether this error is recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingPrice(_) | Self::MissingPriceHistory(_) | Self::InsufficientData { .. }
        )
    }
}

fn join(symbols: &[Symbol]) -> String {
    symbols.iter().map(Symbol::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::MissingPrice(vec![Symbol::new("aaa"), Symbol::new("bbb")]);
        assert_eq!(err.to_string(), "missing price for: AAA, BBB");
    }

    #[test]
    fn insufficient_data_lifted_from_estimator() {
        let err = ModelError::from(EstimatorError::InsufficientData { required: 4, actual: 1 });
        assert!(matches!(err, ModelError::InsufficientData { required: 4, actual: 1 }));

        let err = ModelError::from(EstimatorError::RankDeficient("column 2".to_string()));
        assert!(matches!(err, ModelError::Estimator(EstimatorError::RankDeficient(_))));
    }

    #[test]
    fn error_is_recoverable() {
        let err = ModelError::InsufficientData { required: 4, actual: 0 };
        assert!(err.is_recoverable());

        let err = ModelError::NonPositiveTotalValue(0.0);
        assert!(!err.is_recoverable());
    }
}
