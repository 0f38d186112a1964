//! Ticker symbols and share positions.

use std::collections::{BTreeMap, BTreeSet};

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{Date, ValidationError};

/// Stock ticker symbol, normalized to trimmed uppercase.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Create a new symbol, trimming whitespace and uppercasing.
    #[must_use]
    pub fn new(s: impl AsRef<str>) -> Self {
        Self(s.as_ref().trim().to_uppercase())
    }

    /// Get the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the symbol is empty after normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.0
    }
}

/// A holding of some number of shares in one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Ticker symbol.
    #[serde(rename = "ticker")]
    pub symbol: Symbol,
    /// Share count.
    pub shares: f64,
    /// Date the position was recorded.
    #[serde(default)]
    pub as_of: Option<Date>,
    /// Optional security name.
    #[serde(default)]
    pub name: Option<String>,
    /// Optional sector classification.
    #[serde(default)]
    pub sector: Option<String>,
}

impl Position {
    /// Create a position with just a symbol and share count.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, shares: f64) -> Self {
        Self { symbol: symbol.into(), shares, as_of: None, name: None, sector: None }
    }

    /// Attach an as-of date.
    #[must_use]
    pub const fn with_as_of(mut self, as_of: Date) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

/// A validated set of positions.
///
/// Symbols are non-empty and unique, share counts finite and non-negative,
/// and the set is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSet {
    positions: Vec<Position>,
}

impl PositionSet {
    /// Validate and wrap a list of positions.
    ///
    /// # Errors
    /// Returns the first class of violation found: empty set, empty symbol,
    /// duplicate symbols, non-finite shares, then negative shares. Each
    /// multi-symbol variant lists every offending symbol.
    pub fn new(positions: Vec<Position>) -> Result<Self, ValidationError> {
        if positions.is_empty() {
            return Err(ValidationError::EmptyPositions);
        }

        if let Some(idx) = positions.iter().position(|p| p.symbol.is_empty()) {
            return Err(ValidationError::EmptySymbol(idx));
        }

        let mut counts: BTreeMap<&Symbol, usize> = BTreeMap::new();
        for p in &positions {
            *counts.entry(&p.symbol).or_default() += 1;
        }
        let dupes: Vec<Symbol> =
            counts.into_iter().filter(|(_, n)| *n > 1).map(|(s, _)| s.clone()).collect();
        if !dupes.is_empty() {
            return Err(ValidationError::DuplicateSymbols(dupes));
        }

        let non_finite: Vec<Symbol> =
            positions.iter().filter(|p| !p.shares.is_finite()).map(|p| p.symbol.clone()).collect();
        if !non_finite.is_empty() {
            return Err(ValidationError::NonFiniteShares(non_finite));
        }

        let negative: Vec<Symbol> =
            positions.iter().filter(|p| p.shares < 0.0).map(|p| p.symbol.clone()).collect();
        if !negative.is_empty() {
            return Err(ValidationError::NegativeShares(negative));
        }

        Ok(Self { positions })
    }

    /// Positions in input order.
    #[must_use]
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Symbols in sorted order.
    #[must_use]
    pub fn symbols(&self) -> Vec<Symbol> {
        self.positions.iter().map(|p| p.symbol.clone()).collect::<BTreeSet<_>>().into_iter().collect()
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Always false for a constructed set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterate over positions.
    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.iter()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn symbol_normalized() {
        let sym: Symbol = "  aapl ".into();
        assert_eq!(sym.as_str(), "AAPL");
        assert_eq!(sym.to_string(), "AAPL");
    }

    #[test]
    fn position_set_accepts_valid() {
        let set = PositionSet::new(vec![Position::new("msft", 5.0), Position::new("AAPL", 0.0)])
            .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.symbols(), vec![Symbol::new("AAPL"), Symbol::new("MSFT")]);
    }

    #[test]
    fn position_set_rejects_empty() {
        assert_eq!(PositionSet::new(vec![]), Err(ValidationError::EmptyPositions));
    }

    #[test]
    fn position_set_rejects_duplicates_after_normalization() {
        let err = PositionSet::new(vec![
            Position::new("aapl", 1.0),
            Position::new("AAPL ", 2.0),
            Position::new("MSFT", 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateSymbols(vec![Symbol::new("AAPL")]));
    }

    #[rstest]
    #[case(-1.0)]
    #[case(-0.5)]
    fn position_set_rejects_negative_shares(#[case] shares: f64) {
        let err =
            PositionSet::new(vec![Position::new("A", 1.0), Position::new("B", shares)]).unwrap_err();
        assert_eq!(err, ValidationError::NegativeShares(vec![Symbol::new("B")]));
    }

    #[test]
    fn position_set_rejects_empty_symbol() {
        let err = PositionSet::new(vec![Position::new("A", 1.0), Position::new("  ", 1.0)])
            .unwrap_err();
        assert_eq!(err, ValidationError::EmptySymbol(1));
    }

    #[test]
    fn position_set_rejects_nan_shares() {
        let err = PositionSet::new(vec![Position::new("A", f64::NAN)]).unwrap_err();
        assert_eq!(err, ValidationError::NonFiniteShares(vec![Symbol::new("A")]));
    }
}
