//! Factor-related type definitions.

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{Period, ValidationError};

/// Columns of the three-factor dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
pub enum FactorName {
    /// Market return minus the risk-free rate.
    #[display("Mkt-RF")]
    MarketExcess,
    /// Small minus big.
    #[display("SMB")]
    Size,
    /// High minus low book-to-market.
    #[display("HML")]
    Value,
    /// Risk-free rate.
    #[display("RF")]
    RiskFree,
}

impl FactorName {
    /// Every column, in source file order.
    pub const ALL: [Self; 4] = [Self::MarketExcess, Self::Size, Self::Value, Self::RiskFree];

    /// The explanatory factors used as regressors (everything but the risk-free rate).
    pub const REGRESSORS: [Self; 3] = [Self::MarketExcess, Self::Size, Self::Value];

    /// Column header used by the factor source file.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::MarketExcess => "Mkt-RF",
            Self::Size => "SMB",
            Self::Value => "HML",
            Self::RiskFree => "RF",
        }
    }

    /// Look up a factor by its source file header, ignoring surrounding whitespace.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|f| f.label().eq_ignore_ascii_case(label))
    }
}

/// Factor returns for a single period, in decimal units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorRow {
    /// Period of the returns.
    pub period: Period,
    /// Market excess return.
    pub market_excess: f64,
    /// Size premium.
    pub size: f64,
    /// Value premium.
    pub value: f64,
    /// Risk-free rate.
    pub risk_free: f64,
}

impl FactorRow {
    /// Create a new row.
    #[must_use]
    pub const fn new(period: Period, market_excess: f64, size: f64, value: f64, risk_free: f64) -> Self {
        Self { period, market_excess, size, value, risk_free }
    }

    /// Get the return for a specific factor.
    #[must_use]
    pub const fn get(&self, name: FactorName) -> f64 {
        match name {
            FactorName::MarketExcess => self.market_excess,
            FactorName::Size => self.size,
            FactorName::Value => self.value,
            FactorName::RiskFree => self.risk_free,
        }
    }

    fn is_finite(&self) -> bool {
        FactorName::ALL.iter().all(|f| self.get(*f).is_finite())
    }
}

/// Period-indexed factor returns.
///
/// Rows are strictly ascending by period and all values finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorTable {
    rows: Vec<FactorRow>,
}

impl FactorTable {
    /// Build a table from rows in any order.
    ///
    /// # Errors
    /// Returns an error on a duplicate period or a non-finite value.
    pub fn new(mut rows: Vec<FactorRow>) -> Result<Self, ValidationError> {
        rows.sort_by_key(|r| r.period);
        if let Some(w) = rows.windows(2).find(|w| w[0].period == w[1].period) {
            return Err(ValidationError::DuplicatePeriod(w[0].period));
        }
        if let Some(row) = rows.iter().find(|r| !r.is_finite()) {
            return Err(ValidationError::NonFinite { what: "factor".to_string(), period: row.period });
        }
        Ok(Self { rows })
    }

    /// Rows in ascending period order.
    #[must_use]
    pub fn rows(&self) -> &[FactorRow] {
        &self.rows
    }

    /// Row for `period`, if present.
    #[must_use]
    pub fn get(&self, period: Period) -> Option<&FactorRow> {
        self.rows.binary_search_by_key(&period, |r| r.period).ok().map(|i| &self.rows[i])
    }

    /// First period covered.
    #[must_use]
    pub fn first_period(&self) -> Option<Period> {
        self.rows.first().map(|r| r.period)
    }

    /// Last period covered.
    #[must_use]
    pub fn last_period(&self) -> Option<Period> {
        self.rows.last().map(|r| r.period)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
