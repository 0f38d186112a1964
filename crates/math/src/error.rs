//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MathError {
    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Fewer observations than parameters.
    #[error("underdetermined system: {observations} observations for {parameters} parameters")]
    Underdetermined {
        /// Number of observations.
        observations: usize,
        /// Number of parameters.
        parameters: usize,
    },

    /// Singular or nearly singular matrix.
    #[error("matrix is singular or nearly singular (pivot {pivot:e} at column {column})")]
    Singular {
        /// Column at which elimination broke down.
        column: usize,
        /// Magnitude of the failing pivot.
        pivot: f64,
    },

    /// Non-square matrix where a square one is required.
    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare {
        /// Row count.
        rows: usize,
        /// Column count.
        cols: usize,
    },

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Numerical instability (NaN or Inf).
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MathError::Underdetermined { observations: 3, parameters: 4 };
        assert!(err.to_string().contains('3') && err.to_string().contains('4'));

        let err = MathError::DimensionMismatch { expected: 10, actual: 5 };
        assert!(err.to_string().contains("10") && err.to_string().contains('5'));
    }
}
