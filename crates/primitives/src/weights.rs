//! Weight type definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Date, Symbol, ValidationError};

/// Allowed absolute deviation of the weight sum from one.
pub const DEFAULT_WEIGHT_TOLERANCE: f64 = 1e-6;

/// Value weights per symbol.
///
/// Every weight lies in `[0, 1]` and the weights sum to one within the
/// tolerance given at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightMapping {
    weights: BTreeMap<Symbol, f64>,
}

impl WeightMapping {
    /// Validate and wrap a set of weights.
    ///
    /// # Errors
    /// Returns an error if the set is empty, a symbol repeats, a weight is
    /// outside `[0, 1]`, or the sum deviates from one by more than `tolerance`.
    pub fn new(
        weights: impl IntoIterator<Item = (Symbol, f64)>,
        tolerance: f64,
    ) -> Result<Self, ValidationError> {
        let mut map = BTreeMap::new();
        let mut dupes = Vec::new();
        for (symbol, weight) in weights {
            if !(weight.is_finite() && (0.0..=1.0 + tolerance).contains(&weight)) {
                return Err(ValidationError::WeightOutOfRange { symbol, weight });
            }
            if map.insert(symbol.clone(), weight).is_some() {
                dupes.push(symbol);
            }
        }

        if !dupes.is_empty() {
            dupes.sort();
            dupes.dedup();
            return Err(ValidationError::DuplicateSymbols(dupes));
        }
        if map.is_empty() {
            return Err(ValidationError::EmptyWeights);
        }

        let sum: f64 = map.values().sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(ValidationError::WeightSum { sum, tolerance });
        }

        Ok(Self { weights: map })
    }

    /// Weight of `symbol`, if held.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<f64> {
        self.weights.get(symbol).copied()
    }

    /// Held symbols in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.weights.keys()
    }

    /// Iterate over `(symbol, weight)` in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, f64)> {
        self.weights.iter().map(|(s, w)| (s, *w))
    }

    /// Sum of all weights.
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Number of symbols.
    #[must_use]
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always false for a constructed mapping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// One row of the weight table handed to the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol.
    pub ticker: Symbol,
    /// Share count.
    pub shares: f64,
    /// Price used for valuation.
    pub price: f64,
    /// `shares * price`.
    pub value: f64,
    /// `value / total value`.
    pub weight: f64,
    /// Valuation date.
    pub as_of: Date,
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn w(pairs: &[(&str, f64)]) -> Result<WeightMapping, ValidationError> {
        WeightMapping::new(
            pairs.iter().map(|(s, w)| (Symbol::new(s), *w)),
            DEFAULT_WEIGHT_TOLERANCE,
        )
    }

    #[test]
    fn weights_sum_to_one() {
        let weights = w(&[("A", 0.25), ("B", 0.75)]).unwrap();
        assert_relative_eq!(weights.sum(), 1.0, epsilon = 1e-12);
        assert_eq!(weights.get(&Symbol::new("b")), Some(0.75));
        assert_eq!(weights.len(), 2);
    }

    #[test]
    fn weights_within_tolerance_accepted() {
        assert!(w(&[("A", 0.5), ("B", 0.5000005)]).is_ok());
    }

    #[test]
    fn weights_bad_sum_rejected() {
        let err = w(&[("A", 0.5), ("B", 0.4)]).unwrap_err();
        assert!(matches!(err, ValidationError::WeightSum { .. }));
    }

    #[test]
    fn weights_out_of_range_rejected() {
        let err = w(&[("A", 1.5), ("B", -0.5)]).unwrap_err();
        assert!(matches!(err, ValidationError::WeightOutOfRange { .. }));
    }

    #[test]
    fn weights_duplicates_rejected() {
        let err = w(&[("A", 0.5), ("a", 0.5)]).unwrap_err();
        assert_eq!(err, ValidationError::DuplicateSymbols(vec![Symbol::new("A")]));
    }

    #[test]
    fn weights_empty_rejected() {
        assert_eq!(w(&[]).unwrap_err(), ValidationError::EmptyWeights);
    }
}
