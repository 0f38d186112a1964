//! Return type definitions.

use serde::{Deserialize, Serialize};

use crate::{Period, Symbol, ValidationError};

/// Name given to the portfolio-level return series.
///
/// Distinct from every [`FactorName`](crate::FactorName) label so the two
/// never collide when joined.
pub const PORTFOLIO_RETURN: &str = "portfolio_return";

/// Simple returns of each asset for a single period.
///
/// A return is `None` when the price at the period or the period before it
/// is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReturns {
    /// Period of the returns.
    pub period: Period,
    /// Asset symbols.
    pub symbols: Vec<Symbol>,
    /// Return values.
    pub returns: Vec<Option<f64>>,
}

impl AssetReturns {
    /// Create new asset returns.
    #[must_use]
    pub fn new(period: Period, symbols: Vec<Symbol>, returns: Vec<Option<f64>>) -> Self {
        debug_assert_eq!(symbols.len(), returns.len());
        Self { period, symbols, returns }
    }

    /// Number of assets.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Check if empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Get return for a specific symbol. `None` if unknown or undefined.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.symbols.iter().position(|s| s == symbol).and_then(|i| self.returns[i])
    }
}

/// A named, period-indexed series of decimal returns.
///
/// Periods are strictly ascending and values finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    name: String,
    periods: Vec<Period>,
    values: Vec<f64>,
}

impl ReturnSeries {
    /// Build a series from `(period, return)` points in any order.
    ///
    /// # Errors
    /// Returns an error on a duplicate period or a non-finite value.
    pub fn new(
        name: impl Into<String>,
        points: impl IntoIterator<Item = (Period, f64)>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        let mut points: Vec<(Period, f64)> = points.into_iter().collect();
        points.sort_by_key(|(p, _)| *p);

        if let Some(w) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ValidationError::DuplicatePeriod(w[0].0));
        }
        if let Some((period, _)) = points.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ValidationError::NonFinite { what: name, period: *period });
        }

        let (periods, values): (Vec<Period>, Vec<f64>) = points.into_iter().unzip();
        Ok(Self { name, periods, values })
    }

    /// Series name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Periods in ascending order.
    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    /// Values aligned with [`periods`](Self::periods).
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at `period`, if present.
    #[must_use]
    pub fn get(&self, period: Period) -> Option<f64> {
        self.periods.binary_search(&period).ok().map(|i| self.values[i])
    }

    /// Iterate over `(period, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (Period, f64)> + '_ {
        self.periods.iter().copied().zip(self.values.iter().copied())
    }

    /// Number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    #[test]
    fn asset_returns_get() {
        let returns = AssetReturns::new(
            p(2024, 1),
            vec![Symbol::new("AAPL"), Symbol::new("GOOG")],
            vec![Some(0.01), None],
        );

        assert_eq!(returns.get(&Symbol::new("AAPL")), Some(0.01));
        assert_eq!(returns.get(&Symbol::new("GOOG")), None);
        assert_eq!(returns.get(&Symbol::new("MSFT")), None);
    }

    #[test]
    fn series_sorted_on_construction() {
        let series =
            ReturnSeries::new(PORTFOLIO_RETURN, vec![(p(2024, 2), 0.02), (p(2024, 1), 0.01)])
                .unwrap();

        assert_eq!(series.name(), "portfolio_return");
        assert_eq!(series.periods(), &[p(2024, 1), p(2024, 2)]);
        assert_eq!(series.get(p(2024, 2)), Some(0.02));
        assert_eq!(series.get(p(2024, 3)), None);
    }

    #[test]
    fn series_rejects_duplicates_and_nan() {
        let err = ReturnSeries::new("x", vec![(p(2024, 1), 0.01), (p(2024, 1), 0.02)]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicatePeriod(p(2024, 1)));

        let err = ReturnSeries::new("x", vec![(p(2024, 1), f64::NAN)]).unwrap_err();
        assert!(matches!(err, ValidationError::NonFinite { .. }));
    }
}
