//! Value weights from positions and a price snapshot.

use std::collections::BTreeMap;

use exposure_primitives::{
    DEFAULT_WEIGHT_TOLERANCE, Date, Holding, PositionSet, PriceObservation, Symbol, WeightMapping,
};
use tracing::debug;

use crate::ModelError;

/// Most recent non-missing price per symbol.
///
/// Observations whose price is missing or not finite are skipped, so a symbol
/// whose latest bar has no close falls back to the bar before it. Symbols
/// with no usable observation are absent from the result.
pub fn latest_prices(
    observations: impl IntoIterator<Item = PriceObservation>,
) -> BTreeMap<Symbol, f64> {
    let mut latest: BTreeMap<Symbol, (Date, f64)> = BTreeMap::new();
    for obs in observations {
        let Some(price) = obs.price.filter(|p| p.is_finite()) else { continue };
        match latest.get_mut(&obs.symbol) {
            Some(entry) if entry.0 > obs.date => {}
            Some(entry) => *entry = (obs.date, price),
            None => {
                latest.insert(obs.symbol, (obs.date, price));
            }
        }
    }
    latest.into_iter().map(|(symbol, (_, price))| (symbol, price)).collect()
}

/// Weights and the holdings table produced by [`WeightNormalizer::normalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedWeights {
    /// Symbol to weight.
    pub weights: WeightMapping,
    /// One row per position, in position order.
    pub holdings: Vec<Holding>,
}

impl NormalizedWeights {
    /// Total market value of the portfolio.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.holdings.iter().map(|h| h.value).sum()
    }
}

/// Converts a position set and a price lookup into value weights.
#[derive(Debug, Clone, Copy)]
pub struct WeightNormalizer {
    tolerance: f64,
}

impl WeightNormalizer {
    /// Create a normalizer with the default sum-to-one tolerance.
    #[must_use]
    pub const fn new() -> Self {
        Self { tolerance: DEFAULT_WEIGHT_TOLERANCE }
    }

    /// Create a normalizer with a custom sum-to-one tolerance.
    #[must_use]
    pub const fn with_tolerance(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Tolerance applied to the weight sum.
    #[must_use]
    pub const fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Value each position at its price and divide by the total.
    ///
    /// # Errors
    /// - [`ModelError::MissingPrice`] naming every symbol without a price
    /// - [`ModelError::InvalidPrice`] if a price is zero, negative or not finite
    /// - [`ModelError::NonPositiveTotalValue`] if the portfolio is worth nothing
    pub fn normalize(
        &self,
        positions: &PositionSet,
        prices: &BTreeMap<Symbol, f64>,
        as_of: Date,
    ) -> Result<NormalizedWeights, ModelError> {
        let missing: Vec<Symbol> = positions
            .iter()
            .filter(|p| !prices.contains_key(&p.symbol))
            .map(|p| p.symbol.clone())
            .collect();
        if !missing.is_empty() {
            return Err(ModelError::MissingPrice(missing));
        }

        let mut valued = Vec::with_capacity(positions.len());
        for position in positions.iter() {
            let price = prices[&position.symbol];
            if !(price.is_finite() && price > 0.0) {
                return Err(ModelError::InvalidPrice { symbol: position.symbol.clone(), price });
            }
            valued.push((position, price, position.shares * price));
        }

        let total: f64 = valued.iter().map(|(_, _, value)| value).sum();
        if total.is_nan() || total <= 0.0 {
            return Err(ModelError::NonPositiveTotalValue(total));
        }
        debug!(positions = valued.len(), total_value = total, "valued positions");

        let holdings: Vec<Holding> = valued
            .into_iter()
            .map(|(position, price, value)| Holding {
                ticker: position.symbol.clone(),
                shares: position.shares,
                price,
                value,
                weight: value / total,
                as_of,
            })
            .collect();

        let weights =
            WeightMapping::new(holdings.iter().map(|h| (h.ticker.clone(), h.weight)), self.tolerance)?;

        Ok(NormalizedWeights { weights, holdings })
    }
}

impl Default for WeightNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use exposure_primitives::Position;
    use rstest::rstest;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    fn positions(pairs: &[(&str, f64)]) -> PositionSet {
        PositionSet::new(pairs.iter().map(|(s, n)| Position::new(*s, *n)).collect()).unwrap()
    }

    fn prices(pairs: &[(&str, f64)]) -> BTreeMap<Symbol, f64> {
        pairs.iter().map(|(s, p)| (Symbol::new(s), *p)).collect()
    }

    #[test]
    fn two_asset_weights() {
        let result = WeightNormalizer::new()
            .normalize(
                &positions(&[("AAA", 10.0), ("BBB", 10.0)]),
                &prices(&[("AAA", 10.0), ("BBB", 30.0)]),
                date(2024, 6, 28),
            )
            .unwrap();

        assert_relative_eq!(result.weights.get(&Symbol::new("AAA")).unwrap(), 0.25, epsilon = 1e-12);
        assert_relative_eq!(result.weights.get(&Symbol::new("BBB")).unwrap(), 0.75, epsilon = 1e-12);
        assert_relative_eq!(result.total_value(), 400.0, epsilon = 1e-9);

        let bbb = &result.holdings[1];
        assert_eq!(bbb.ticker.as_str(), "BBB");
        assert_relative_eq!(bbb.value, 300.0, epsilon = 1e-9);
        assert_eq!(bbb.as_of, date(2024, 6, 28));
    }

    #[rstest]
    #[case(0.001)]
    #[case(3.0)]
    #[case(12_345.0)]
    fn weights_invariant_to_share_scaling(#[case] scale: f64) {
        let px = prices(&[("A", 17.3), ("B", 240.1), ("C", 5.5)]);
        let base = WeightNormalizer::new()
            .normalize(&positions(&[("A", 12.0), ("B", 3.0), ("C", 90.0)]), &px, date(2024, 1, 2))
            .unwrap();
        let scaled = WeightNormalizer::new()
            .normalize(
                &positions(&[("A", 12.0 * scale), ("B", 3.0 * scale), ("C", 90.0 * scale)]),
                &px,
                date(2024, 1, 2),
            )
            .unwrap();

        assert_relative_eq!(scaled.weights.sum(), 1.0, epsilon = 1e-6);
        for (symbol, w) in base.weights.iter() {
            assert_relative_eq!(scaled.weights.get(symbol).unwrap(), w, epsilon = 1e-12);
        }
    }

    #[test]
    fn missing_prices_all_named() {
        let err = WeightNormalizer::new()
            .normalize(
                &positions(&[("AAA", 1.0), ("BBB", 1.0), ("CCC", 1.0)]),
                &prices(&[("BBB", 5.0)]),
                date(2024, 1, 2),
            )
            .unwrap_err();

        match err {
            ModelError::MissingPrice(symbols) => {
                assert_eq!(symbols, vec![Symbol::new("AAA"), Symbol::new("CCC")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn zero_total_value_rejected() {
        let err = WeightNormalizer::new()
            .normalize(
                &positions(&[("AAA", 0.0), ("BBB", 0.0)]),
                &prices(&[("AAA", 10.0), ("BBB", 20.0)]),
                date(2024, 1, 2),
            )
            .unwrap_err();
        assert!(matches!(err, ModelError::NonPositiveTotalValue(v) if v == 0.0));
    }

    #[test]
    fn non_positive_price_rejected() {
        let err = WeightNormalizer::new()
            .normalize(&positions(&[("AAA", 1.0)]), &prices(&[("AAA", 0.0)]), date(2024, 1, 2))
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidPrice { .. }));
    }

    #[test]
    fn latest_price_skips_missing_bars() {
        let obs = vec![
            PriceObservation::new("AAA", date(2024, 6, 24), Some(10.0)),
            PriceObservation::new("AAA", date(2024, 6, 26), Some(11.0)),
            PriceObservation::new("AAA", date(2024, 6, 28), None),
            PriceObservation::new("AAA", date(2024, 6, 25), Some(9.0)),
            PriceObservation::new("BBB", date(2024, 6, 28), Some(f64::NAN)),
        ];
        let latest = latest_prices(obs);

        assert_eq!(latest.get(&Symbol::new("AAA")), Some(&11.0));
        assert!(!latest.contains_key(&Symbol::new("BBB")));
    }
}
