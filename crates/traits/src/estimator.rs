//! Factor regression trait definitions.

use exposure_primitives::{FactorTable, ReturnSeries};

/// Errors that can occur during estimation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EstimatorError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Insufficient data for estimation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Rank deficiency in design matrix.
    #[error("rank deficient design matrix: {0}")]
    RankDeficient(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

impl EstimatorError {
    /// Returns whether this error is recoverable.
    ///
    /// More history or a different sample window can cure these; the rest
    /// indicate bad input.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::RankDeficient(_))
    }
}

/// Trait for regressing a portfolio return series on a factor table.
pub trait FactorModel: Send + Sync {
    /// Configuration type for this model.
    type Config: Default + Clone + Send + Sync;

    /// Fitted result type.
    type Output;

    /// Create a new model with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Minimum number of aligned observations the model accepts.
    fn min_observations(&self) -> usize;

    /// Fit the model.
    ///
    /// # Arguments
    /// * `portfolio` - Portfolio simple returns by period
    /// * `factors` - Factor returns and risk-free rate by period
    ///
    /// # Errors
    /// Returns `EstimatorError` if too few periods overlap or the fit is
    /// degenerate.
    fn fit(
        &self,
        portfolio: &ReturnSeries,
        factors: &FactorTable,
    ) -> Result<Self::Output, EstimatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_error_is_recoverable() {
        let err = EstimatorError::InsufficientData { required: 4, actual: 0 };
        assert!(err.is_recoverable());

        let err = EstimatorError::InvalidConfig("test".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn estimator_error_display() {
        let err = EstimatorError::DimensionMismatch {
            expected: 100,
            actual: 50,
            context: "returns".to_string(),
        };
        assert_eq!(err.to_string(), "dimension mismatch for returns: expected 100, got 50");

        let err = EstimatorError::InsufficientData { required: 4, actual: 2 };
        assert_eq!(err.to_string(), "insufficient data: need at least 4 observations, got 2");
    }
}
