//! Alignment of the portfolio series with the factor table.

use std::cmp::Ordering;

use exposure_primitives::{FactorName, FactorRow, FactorTable, Period, ReturnSeries};
use ndarray::{Array1, Array2};
use tracing::debug;

/// One period present in both the portfolio series and the factor table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedObservation {
    /// Shared period.
    pub period: Period,
    /// Portfolio simple return.
    pub portfolio_return: f64,
    /// Factor returns for the period.
    pub factors: FactorRow,
    /// `portfolio_return - risk_free`.
    pub excess_return: f64,
}

/// The inner join of a portfolio series with a factor table, ascending by period.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedSample {
    observations: Vec<AlignedObservation>,
}

impl AlignedSample {
    /// Aligned observations in period order.
    #[must_use]
    pub fn observations(&self) -> &[AlignedObservation] {
        &self.observations
    }

    /// Number of aligned periods.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.observations.len()
    }

    /// Check if no period overlaps.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// First aligned period.
    #[must_use]
    pub fn first_period(&self) -> Option<Period> {
        self.observations.first().map(|o| o.period)
    }

    /// Last aligned period.
    #[must_use]
    pub fn last_period(&self) -> Option<Period> {
        self.observations.last().map(|o| o.period)
    }

    /// Excess returns as the regression target.
    #[must_use]
    pub fn excess_returns(&self) -> Array1<f64> {
        self.observations.iter().map(|o| o.excess_return).collect()
    }

    /// Design matrix with a leading column of ones followed by one column per
    /// entry of `factors`.
    #[must_use]
    pub fn design_matrix(&self, factors: &[FactorName]) -> Array2<f64> {
        Array2::from_shape_fn((self.len(), 1 + factors.len()), |(i, j)| {
            if j == 0 { 1.0 } else { self.observations[i].factors.get(factors[j - 1]) }
        })
    }
}

/// Inner-join `portfolio` with `factors` on period and compute excess returns.
///
/// Periods present on only one side are dropped; nothing is filled.
#[must_use]
pub fn align(portfolio: &ReturnSeries, factors: &FactorTable) -> AlignedSample {
    let mut left = portfolio.iter().peekable();
    let mut right = factors.rows().iter().peekable();
    let mut observations = Vec::new();

    while let (Some(&(period, ret)), Some(&row)) = (left.peek(), right.peek()) {
        match period.cmp(&row.period) {
            Ordering::Less => {
                left.next();
            }
            Ordering::Greater => {
                right.next();
            }
            Ordering::Equal => {
                observations.push(AlignedObservation {
                    period,
                    portfolio_return: ret,
                    factors: *row,
                    excess_return: ret - row.risk_free,
                });
                left.next();
                right.next();
            }
        }
    }

    debug!(
        portfolio_periods = portfolio.len(),
        factor_periods = factors.len(),
        aligned = observations.len(),
        "aligned portfolio returns with factors"
    );

    AlignedSample { observations }
}
