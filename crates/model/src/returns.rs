//! Per-asset and portfolio simple returns.

use exposure_primitives::{AssetReturns, PORTFOLIO_RETURN, PriceTable, ReturnSeries, WeightMapping};
use tracing::{debug, warn};

use crate::ModelError;

/// Simple returns of every column between consecutive rows of `prices`.
///
/// `r[t] = price[t] / price[t-1] - 1`. The first row has no predecessor and
/// produces no entry. A return is `None` when either price is missing.
#[must_use]
pub fn asset_returns(prices: &PriceTable) -> Vec<AssetReturns> {
    prices
        .rows()
        .windows(2)
        .map(|pair| {
            let (prev, curr) = (&pair[0], &pair[1]);
            let returns = prev
                .prices
                .iter()
                .zip(&curr.prices)
                .map(|(p0, p1)| match (p0, p1) {
                    (Some(p0), Some(p1)) => Some(p1 / p0 - 1.0),
                    _ => None,
                })
                .collect();
            AssetReturns::new(curr.period, prices.symbols().to_vec(), returns)
        })
        .collect()
}

/// Static-weight portfolio return series named [`PORTFOLIO_RETURN`].
///
/// The return at `t` is `Σ weight(s) * r_s[t]` over every symbol in
/// `weights`. Price columns outside `weights` are ignored. A period in which
/// any weighted symbol has an undefined return is dropped.
///
/// # Errors
/// Returns [`ModelError::MissingPriceHistory`] if a weighted symbol has no
/// column in `prices`.
pub fn portfolio_returns(
    prices: &PriceTable,
    weights: &WeightMapping,
) -> Result<ReturnSeries, ModelError> {
    let mut columns = Vec::with_capacity(weights.len());
    let mut absent = Vec::new();
    for (symbol, weight) in weights.iter() {
        match prices.column(symbol) {
            Some(col) => columns.push((col, weight)),
            None => absent.push(symbol.clone()),
        }
    }
    if !absent.is_empty() {
        return Err(ModelError::MissingPriceHistory(absent));
    }

    let mut points = Vec::new();
    let mut dropped = Vec::new();
    for period_returns in asset_returns(prices) {
        let total = columns
            .iter()
            .map(|&(col, weight)| period_returns.returns[col].map(|r| weight * r))
            .sum::<Option<f64>>();
        match total {
            Some(r) => points.push((period_returns.period, r)),
            None => dropped.push(period_returns.period),
        }
    }

    if !dropped.is_empty() {
        let periods: Vec<String> = dropped.iter().map(ToString::to_string).collect();
        warn!(
            count = dropped.len(),
            periods = %periods.join(", "),
            "dropped periods with undefined returns"
        );
    }
    debug!(periods = points.len(), "built portfolio return series");

    Ok(ReturnSeries::new(PORTFOLIO_RETURN, points)?)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use exposure_primitives::{DEFAULT_WEIGHT_TOLERANCE, Period, PriceRow, Symbol};
    use rstest::rstest;

    use super::*;

    fn p(year: i32, month: u32) -> Period {
        Period::new(year, month).unwrap()
    }

    fn table(symbols: &[&str], rows: Vec<(Period, Vec<Option<f64>>)>) -> PriceTable {
        PriceTable::new(
            symbols.iter().map(Symbol::new).collect(),
            rows.into_iter().map(|(period, prices)| PriceRow::new(period, prices)).collect(),
        )
        .unwrap()
    }

    fn weights(pairs: &[(&str, f64)]) -> WeightMapping {
        WeightMapping::new(pairs.iter().map(|(s, w)| (Symbol::new(s), *w)), DEFAULT_WEIGHT_TOLERANCE)
            .unwrap()
    }

    #[test]
    fn two_asset_portfolio_return() {
        let prices = table(
            &["AAA", "BBB"],
            vec![(p(2024, 1), vec![Some(10.0), Some(30.0)]), (p(2024, 2), vec![Some(11.0), Some(33.0)])],
        );
        let series = portfolio_returns(&prices, &weights(&[("AAA", 0.25), ("BBB", 0.75)])).unwrap();

        assert_eq!(series.name(), PORTFOLIO_RETURN);
        assert_eq!(series.periods(), &[p(2024, 2)]);
        assert_relative_eq!(series.values()[0], 0.10, epsilon = 1e-12);
    }

    #[rstest]
    #[case(1.0)]
    #[case(42.5)]
    #[case(1e-4)]
    fn constant_price_gives_zero_return(#[case] price: f64) {
        let prices = table(
            &["AAA"],
            (1..=6).map(|m| (p(2023, m), vec![Some(price)])).collect(),
        );
        for period_returns in asset_returns(&prices) {
            assert_eq!(period_returns.get(&Symbol::new("AAA")), Some(0.0));
        }
        let series = portfolio_returns(&prices, &weights(&[("AAA", 1.0)])).unwrap();
        assert_eq!(series.len(), 5);
        assert!(series.values().iter().all(|r| *r == 0.0));
    }

    #[test]
    fn missing_price_drops_both_adjacent_periods() {
        let prices = table(
            &["AAA", "BBB"],
            vec![
                (p(2024, 1), vec![Some(10.0), Some(20.0)]),
                (p(2024, 2), vec![Some(11.0), Some(21.0)]),
                (p(2024, 3), vec![None, Some(22.0)]),
                (p(2024, 4), vec![Some(12.0), Some(23.0)]),
                (p(2024, 5), vec![Some(13.0), Some(24.0)]),
            ],
        );
        let series = portfolio_returns(&prices, &weights(&[("AAA", 0.5), ("BBB", 0.5)])).unwrap();

        assert_eq!(series.periods(), &[p(2024, 2), p(2024, 5)]);
        assert!(series.get(p(2024, 3)).is_none());
        assert!(series.get(p(2024, 4)).is_none());
    }

    #[test]
    fn unweighted_columns_ignored() {
        let prices = table(
            &["AAA", "ZZZ"],
            vec![(p(2024, 1), vec![Some(10.0), None]), (p(2024, 2), vec![Some(12.0), Some(5.0)])],
        );
        let series = portfolio_returns(&prices, &weights(&[("AAA", 1.0)])).unwrap();
        assert_relative_eq!(series.get(p(2024, 2)).unwrap(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn weighted_symbol_without_history_rejected() {
        let prices = table(&["AAA"], vec![(p(2024, 1), vec![Some(1.0)])]);
        let w = weights(&[("AAA", 0.5), ("BBB", 0.5)]);
        let err = portfolio_returns(&prices, &w).unwrap_err();
        assert!(matches!(err, ModelError::MissingPriceHistory(s) if s == vec![Symbol::new("BBB")]));
    }

    #[test]
    fn single_row_gives_empty_series() {
        let prices = table(&["AAA"], vec![(p(2024, 1), vec![Some(1.0)])]);
        assert!(asset_returns(&prices).is_empty());
        assert!(portfolio_returns(&prices, &weights(&[("AAA", 1.0)])).unwrap().is_empty());
    }
}
