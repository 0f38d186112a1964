//! End-to-end exposure pipeline over a price source.

use chrono::Months;
use exposure_primitives::{Date, FactorTable, PositionSet, WeightMapping};
use exposure_traits::PriceSource;
use tracing::info;

use crate::{
    ModelError, NormalizedWeights, RegressionResult, ThreeFactorModel, WeightNormalizer,
    latest_prices, portfolio_returns,
};

/// `[end - years, end]`, clamped to a valid day when the anniversary does not
/// exist. A span reaching past the calendar starts at [`Date::MIN`].
#[must_use]
pub fn history_window(end: Date, years: u32) -> (Date, Date) {
    let start = years
        .checked_mul(12)
        .and_then(|months| end.checked_sub_months(Months::new(months)))
        .unwrap_or(Date::MIN);
    (start, end)
}

/// Runs weight normalization and the factor regression against a
/// [`PriceSource`].
///
/// Each stage runs to completion before the next starts; a failing stage
/// stops the run.
#[derive(Debug)]
pub struct ExposurePipeline<'a, S> {
    source: &'a S,
    normalizer: WeightNormalizer,
    model: ThreeFactorModel,
}

impl<'a, S: PriceSource> ExposurePipeline<'a, S> {
    /// Create a pipeline with default normalizer and model.
    #[must_use]
    pub fn new(source: &'a S) -> Self {
        Self { source, normalizer: WeightNormalizer::new(), model: ThreeFactorModel::new() }
    }

    /// Replace the weight normalizer.
    #[must_use]
    pub const fn with_normalizer(mut self, normalizer: WeightNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Replace the regression model.
    #[must_use]
    pub fn with_model(mut self, model: ThreeFactorModel) -> Self {
        self.model = model;
        self
    }

    /// Value `positions` at the latest available prices.
    ///
    /// # Errors
    /// Source failures, missing prices and degenerate totals.
    pub fn holdings(
        &self,
        positions: &PositionSet,
        as_of: Date,
    ) -> Result<NormalizedWeights, ModelError> {
        let symbols = positions.symbols();
        let observations = self.source.recent_prices(&symbols)?;
        let prices = latest_prices(observations);
        info!(requested = symbols.len(), priced = prices.len(), "resolved latest prices");
        self.normalizer.normalize(positions, &prices, as_of)
    }

    /// Regress the static-weight portfolio on `factors` over `[start, end]`.
    ///
    /// # Errors
    /// Source failures, weighted symbols without history, too few aligned
    /// periods and degenerate designs.
    pub fn regress(
        &self,
        weights: &WeightMapping,
        factors: &FactorTable,
        start: Date,
        end: Date,
    ) -> Result<RegressionResult, ModelError> {
        let symbols: Vec<_> = weights.symbols().cloned().collect();
        let prices = self.source.monthly_prices(&symbols, start, end)?;
        info!(symbols = symbols.len(), periods = prices.len(), %start, %end, "loaded price history");
        let series = portfolio_returns(&prices, weights)?;
        self.model.regress(&series, factors)
    }

    /// Both stages: weights as of `as_of`, then the regression over the
    /// `history_years` preceding it.
    ///
    /// # Errors
    /// Any error from [`Self::holdings`] or [`Self::regress`].
    pub fn run(
        &self,
        positions: &PositionSet,
        factors: &FactorTable,
        as_of: Date,
        history_years: u32,
    ) -> Result<(NormalizedWeights, RegressionResult), ModelError> {
        let normalized = self.holdings(positions, as_of)?;
        let (start, end) = history_window(as_of, history_years);
        let result = self.regress(&normalized.weights, factors, start, end)?;
        Ok((normalized, result))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case((2024, 6, 28), 5, (2019, 6, 28))]
    #[case((2024, 2, 29), 1, (2023, 2, 28))]
    #[case((2024, 1, 31), 0, (2024, 1, 31))]
    fn window_spans_whole_years(
        #[case] end: (i32, u32, u32),
        #[case] years: u32,
        #[case] start: (i32, u32, u32),
    ) {
        let end = Date::from_ymd_opt(end.0, end.1, end.2).unwrap();
        let expected = Date::from_ymd_opt(start.0, start.1, start.2).unwrap();
        assert_eq!(history_window(end, years), (expected, end));
    }

    #[rstest]
    #[case(u32::MAX)]
    #[case(u32::MAX / 12 + 1)]
    #[case(1_000_000)]
    fn oversized_window_starts_at_calendar_min(#[case] years: u32) {
        let end = Date::from_ymd_opt(2024, 6, 28).unwrap();
        assert_eq!(history_window(end, years), (Date::MIN, end));
    }
}
