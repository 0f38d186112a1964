//! Validation errors raised by primitive constructors.

use crate::{Period, Symbol};

/// Errors raised when an input violates a primitive's invariants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The position set has no rows.
    #[error("positions dataset is empty")]
    EmptyPositions,

    /// A position has an empty ticker after normalization.
    #[error("empty ticker at row {0}")]
    EmptySymbol(usize),

    /// The same ticker appears more than once.
    #[error("duplicate tickers found: {}", join(.0))]
    DuplicateSymbols(Vec<Symbol>),

    /// One or more positions hold a negative share count.
    #[error("negative shares found: {}", join(.0))]
    NegativeShares(Vec<Symbol>),

    /// One or more positions hold a NaN or infinite share count.
    #[error("non-finite shares found: {}", join(.0))]
    NonFiniteShares(Vec<Symbol>),

    /// A weight mapping has no entries.
    #[error("weight mapping is empty")]
    EmptyWeights,

    /// A single weight lies outside `[0, 1]`.
    #[error("weight for {symbol} is out of range: {weight}")]
    WeightOutOfRange {
        /// Offending symbol.
        symbol: Symbol,
        /// Offending weight.
        weight: f64,
    },

    /// Weights do not sum to one.
    #[error("weights must sum to 1 (got {sum}, tolerance {tolerance})")]
    WeightSum {
        /// Observed sum.
        sum: f64,
        /// Allowed absolute deviation.
        tolerance: f64,
    },

    /// A table row has the wrong number of cells.
    #[error("row for {period} has {actual} prices, expected {expected}")]
    RowWidth {
        /// Period of the row.
        period: Period,
        /// Number of columns in the table.
        expected: usize,
        /// Number of cells in the row.
        actual: usize,
    },

    /// Two rows share the same period.
    #[error("duplicate period: {0}")]
    DuplicatePeriod(Period),

    /// A price is zero, negative, NaN or infinite.
    #[error("invalid price for {symbol} at {period}: {price}")]
    InvalidPrice {
        /// Symbol of the column.
        symbol: Symbol,
        /// Period of the row.
        period: Period,
        /// Offending price.
        price: f64,
    },

    /// A value that must be finite is NaN or infinite.
    #[error("non-finite value for {what} at {period}")]
    NonFinite {
        /// Name of the offending column.
        what: String,
        /// Period of the row.
        period: Period,
    },
}

fn join(symbols: &[Symbol]) -> String {
    symbols.iter().map(Symbol::as_str).collect::<Vec<_>>().join(", ")
}
