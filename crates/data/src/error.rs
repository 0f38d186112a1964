//! Error types for data access.

use std::path::PathBuf;

use exposure_primitives::ValidationError;

/// Errors raised while reading, parsing or writing data files.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The factor file does not exist.
    #[error("factor file not found at {}", .0.display())]
    FactorFileNotFound(PathBuf),

    /// No monthly rows survived filtering.
    #[error("factor data is empty after filtering")]
    EmptyFactorTable,

    /// A six-digit key that is not a valid year-month.
    #[error("invalid year-month key: {0}")]
    InvalidPeriodKey(String),

    /// The spreadsheet export has no header and data rows.
    #[error("sheet appears empty (no header + rows)")]
    EmptySheet,

    /// The column mapping lacks required keys.
    #[error("config mapping missing required keys: {}", .0.join(", "))]
    MissingMappingKeys(Vec<String>),

    /// The sheet lacks columns referenced by the mapping.
    #[error(
        "sheet is missing column(s) referenced in mapping: {}. Available columns: {}",
        missing.join(", "),
        available.join(", ")
    )]
    MissingColumns {
        /// Referenced but absent.
        missing: Vec<String>,
        /// Header of the sheet.
        available: Vec<String>,
    },

    /// A share count cell does not parse as a number.
    #[error("invalid share count {value:?} at row {row}")]
    InvalidShares {
        /// One-based sheet row.
        row: usize,
        /// Raw cell text.
        value: String,
    },

    /// Data violated a domain invariant.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Filesystem error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parse error.
    #[error("config parse error: {0}")]
    Config(#[from] toml::de::Error),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Returns whether this error is recoverable.
    ///
    /// Only a missing factor file can be fixed without changing any input
    /// data, by downloading it.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::FactorFileNotFound(_))
    }
}
