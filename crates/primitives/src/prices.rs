//! Price observations and period-by-symbol price tables.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Date, Period, Symbol, ValidationError};

/// A single dated price for one symbol, as returned by a market data source.
///
/// `price` is `None` when the source reported the bar without a usable close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Ticker symbol.
    pub symbol: Symbol,
    /// Observation date.
    pub date: Date,
    /// Adjusted close, if available.
    pub price: Option<f64>,
}

impl PriceObservation {
    /// Create a new observation.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, date: Date, price: Option<f64>) -> Self {
        Self { symbol: symbol.into(), date, price }
    }
}

/// One row of a [`PriceTable`]: the prices of every column for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    /// Period of the row.
    pub period: Period,
    /// Price per column, `None` where missing.
    pub prices: Vec<Option<f64>>,
}

impl PriceRow {
    /// Create a new row.
    #[must_use]
    pub const fn new(period: Period, prices: Vec<Option<f64>>) -> Self {
        Self { period, prices }
    }
}

/// Adjusted prices keyed by period (rows) and symbol (columns).
///
/// Rows are sorted ascending by period with no duplicates. Rows in which
/// every price is missing are dropped on construction. Present prices are
/// finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    symbols: Vec<Symbol>,
    rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Build a table from column symbols and rows.
    ///
    /// # Errors
    /// Returns an error if a row's width differs from the column count, two
    /// rows share a period, or a present price is not finite and positive.
    pub fn new(symbols: Vec<Symbol>, mut rows: Vec<PriceRow>) -> Result<Self, ValidationError> {
        for row in &rows {
            if row.prices.len() != symbols.len() {
                return Err(ValidationError::RowWidth {
                    period: row.period,
                    expected: symbols.len(),
                    actual: row.prices.len(),
                });
            }
            for (symbol, price) in symbols.iter().zip(&row.prices) {
                if let Some(p) = *price
                    && !(p.is_finite() && p > 0.0)
                {
                    return Err(ValidationError::InvalidPrice {
                        symbol: symbol.clone(),
                        period: row.period,
                        price: p,
                    });
                }
            }
        }

        rows.sort_by_key(|r| r.period);
        if let Some(w) = rows.windows(2).find(|w| w[0].period == w[1].period) {
            return Err(ValidationError::DuplicatePeriod(w[0].period));
        }

        // Drop rows with no prices at all
        rows.retain(|r| r.prices.iter().any(Option::is_some));

        Ok(Self { symbols, rows })
    }

    /// Build a table from dated observations.
    ///
    /// Observations are bucketed by calendar month. Within a month the most
    /// recent non-missing observation for each symbol wins, so a partial
    /// month bar reported alongside a month-start bar resolves to the later
    /// one. Symbols with no observations at all still get a column.
    ///
    /// # Errors
    /// Propagates the validation errors of [`PriceTable::new`].
    pub fn from_observations(
        symbols: Vec<Symbol>,
        observations: impl IntoIterator<Item = PriceObservation>,
    ) -> Result<Self, ValidationError> {
        let width = symbols.len();
        let latest = {
            let index: BTreeMap<&Symbol, usize> =
                symbols.iter().enumerate().map(|(i, s)| (s, i)).collect();

            let mut latest: BTreeMap<Period, Vec<Option<(Date, f64)>>> = BTreeMap::new();
            for obs in observations {
                let (Some(&col), Some(price)) = (index.get(&obs.symbol), obs.price) else {
                    continue;
                };
                let row = latest
                    .entry(Period::from_date(obs.date))
                    .or_insert_with(|| vec![None; width]);
                match row[col] {
                    Some((date, _)) if date > obs.date => {}
                    _ => row[col] = Some((obs.date, price)),
                }
            }
            latest
        };

        let rows = latest
            .into_iter()
            .map(|(period, cells)| {
                PriceRow::new(period, cells.into_iter().map(|c| c.map(|(_, p)| p)).collect())
            })
            .collect();

        Self::new(symbols, rows)
    }

    /// Column symbols.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Rows in ascending period order.
    #[must_use]
    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    /// Periods in ascending order.
    #[must_use]
    pub fn periods(&self) -> Vec<Period> {
        self.rows.iter().map(|r| r.period).collect()
    }

    /// Column index of a symbol.
    #[must_use]
    pub fn column(&self, symbol: &Symbol) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    /// Price of `symbol` at `period`, if both exist and the price is present.
    #[must_use]
    pub fn price(&self, period: Period, symbol: &Symbol) -> Option<f64> {
        let col = self.column(symbol)?;
        let row = self.rows.binary_search_by_key(&period, |r| r.period).ok()?;
        self.rows[row].prices[col]
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

#[cfg(test)]
mod tests {
    use super::*;

    fn p(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    fn d(year: i32, month: u32, day: u32) -> Date {
        Date::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn rows_sorted_and_all_missing_dropped() {
        let table = PriceTable::new(
            vec![Symbol::new("A"), Symbol::new("B")],
            vec![
                PriceRow::new(p(2024, 3), vec![Some(3.0), None]),
                PriceRow::new(p(2024, 2), vec![None, None]),
                PriceRow::new(p(2024, 1), vec![Some(1.0), Some(2.0)]),
            ],
        )
        .unwrap();

        assert_eq!(table.periods(), vec![p(2024, 1), p(2024, 3)]);
        assert_eq!(table.price(p(2024, 3), &Symbol::new("A")), Some(3.0));
        assert_eq!(table.price(p(2024, 3), &Symbol::new("B")), None);
    }

    #[test]
    fn duplicate_period_rejected() {
        let err = PriceTable::new(
            vec![Symbol::new("A")],
            vec![PriceRow::new(p(2024, 1), vec![Some(1.0)]), PriceRow::new(p(2024, 1), vec![None])],
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicatePeriod(p(2024, 1)));
    }

    #[test]
    fn non_positive_price_rejected() {
        let err = PriceTable::new(
            vec![Symbol::new("A")],
            vec![PriceRow::new(p(2024, 1), vec![Some(0.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPrice { .. }));
    }

    #[test]
    fn row_width_checked() {
        let err = PriceTable::new(
            vec![Symbol::new("A"), Symbol::new("B")],
            vec![PriceRow::new(p(2024, 1), vec![Some(1.0)])],
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::RowWidth { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn from_observations_keeps_latest_in_month() {
        let table = PriceTable::from_observations(
            vec![Symbol::new("A"), Symbol::new("B")],
            vec![
                PriceObservation::new("A", d(2024, 1, 1), Some(10.0)),
                PriceObservation::new("A", d(2024, 1, 19), Some(10.5)),
                PriceObservation::new("A", d(2024, 1, 25), None),
                PriceObservation::new("B", d(2024, 1, 1), Some(30.0)),
                PriceObservation::new("A", d(2024, 2, 1), Some(11.0)),
                PriceObservation::new("ZZZ", d(2024, 2, 1), Some(99.0)),
            ],
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.price(p(2024, 1), &Symbol::new("A")), Some(10.5));
        assert_eq!(table.price(p(2024, 1), &Symbol::new("B")), Some(30.0));
        assert_eq!(table.price(p(2024, 2), &Symbol::new("B")), None);
    }
}
