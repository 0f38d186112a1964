//! Three-factor OLS regression of portfolio excess returns.

use derive_more::Display;
use exposure_math::{MathError, ordinary_least_squares};
use exposure_primitives::{FactorName, FactorTable, Period, ReturnSeries};
use exposure_traits::{EstimatorError, FactorModel};
use tracing::info;

use crate::{ModelError, align};

/// A right-hand-side term of the regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Term {
    /// The constant; its coefficient is the monthly alpha.
    #[display("const")]
    Intercept,
    /// A factor loading.
    #[display("{_0}")]
    Factor(FactorName),
}

/// Estimate and inference statistics for one term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermEstimate {
    /// The term.
    pub term: Term,
    /// Estimated coefficient.
    pub coefficient: f64,
    /// Standard error, `None` without residual degrees of freedom.
    pub std_error: Option<f64>,
    /// t-statistic.
    pub t_stat: Option<f64>,
    /// Two-sided p-value.
    pub p_value: Option<f64>,
}

/// Fitted three-factor regression.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionResult {
    /// Estimates in order: intercept, market, size, value.
    pub estimates: Vec<TermEstimate>,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Adjusted R².
    pub adj_r_squared: Option<f64>,
    /// Residual standard error.
    pub residual_std_error: Option<f64>,
    /// Number of aligned periods.
    pub n_obs: usize,
    /// Residual degrees of freedom.
    pub df_resid: usize,
    /// First period of the sample.
    pub first_period: Period,
    /// Last period of the sample.
    pub last_period: Period,
}

impl RegressionResult {
    /// Estimate for `term`.
    #[must_use]
    pub fn estimate(&self, term: Term) -> Option<&TermEstimate> {
        self.estimates.iter().find(|e| e.term == term)
    }

    /// Coefficient for `term`.
    #[must_use]
    pub fn coefficient(&self, term: Term) -> Option<f64> {
        self.estimate(term).map(|e| e.coefficient)
    }

    /// Monthly alpha.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.coefficient(Term::Intercept).unwrap_or(f64::NAN)
    }

    /// Loading on `factor`, `None` for the risk-free rate.
    #[must_use]
    pub fn loading(&self, factor: FactorName) -> Option<f64> {
        self.coefficient(Term::Factor(factor))
    }

    /// Monthly alpha scaled to a year.
    #[must_use]
    pub fn annualized_alpha(&self) -> f64 {
        12.0 * self.intercept()
    }
}

/// Configuration for [`ThreeFactorModel`].
#[derive(Debug, Clone)]
pub struct RegressionConfig {
    /// Minimum number of aligned periods. Never below the parameter count.
    pub min_observations: usize,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self { min_observations: ThreeFactorModel::N_PARAMS }
    }
}

/// OLS of excess portfolio return on an intercept plus market, size and value.
#[derive(Debug, Clone, Default)]
pub struct ThreeFactorModel {
    config: RegressionConfig,
}

impl ThreeFactorModel {
    /// Intercept plus three loadings.
    pub const N_PARAMS: usize = 1 + FactorName::REGRESSORS.len();

    /// Create a model with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RegressionConfig {
        &self.config
    }

    /// Align and fit, lifting errors into [`ModelError`].
    ///
    /// # Errors
    /// [`ModelError::InsufficientData`] when fewer periods overlap than the
    /// configured minimum, or an estimator error for a degenerate design.
    pub fn regress(
        &self,
        portfolio: &ReturnSeries,
        factors: &FactorTable,
    ) -> Result<RegressionResult, ModelError> {
        self.fit(portfolio, factors).map_err(ModelError::from)
    }
}

impl FactorModel for ThreeFactorModel {
    type Config = RegressionConfig;
    type Output = RegressionResult;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn min_observations(&self) -> usize {
        self.config.min_observations.max(Self::N_PARAMS)
    }

    fn fit(
        &self,
        portfolio: &ReturnSeries,
        factors: &FactorTable,
    ) -> Result<RegressionResult, EstimatorError> {
        let sample = align(portfolio, factors);
        let required = self.min_observations();
        let (Some(first_period), Some(last_period)) = (sample.first_period(), sample.last_period())
        else {
            return Err(EstimatorError::InsufficientData { required, actual: 0 });
        };
        if sample.len() < required {
            return Err(EstimatorError::InsufficientData { required, actual: sample.len() });
        }

        let y = sample.excess_returns();
        let x = sample.design_matrix(&FactorName::REGRESSORS);
        let fit = ordinary_least_squares(&y, &x).map_err(|e| match e {
            MathError::Singular { .. } => EstimatorError::RankDeficient(e.to_string()),
            other => EstimatorError::LinearAlgebra(other.to_string()),
        })?;

        let terms = std::iter::once(Term::Intercept)
            .chain(FactorName::REGRESSORS.iter().copied().map(Term::Factor));
        let t_stats = fit.t_stats();
        let p_values = fit.p_values();
        let estimates = terms
            .enumerate()
            .map(|(i, term)| TermEstimate {
                term,
                coefficient: fit.coefficients[i],
                std_error: fit.std_errors.as_ref().map(|se| se[i]),
                t_stat: t_stats[i],
                p_value: p_values[i],
            })
            .collect();

        info!(
            n_obs = fit.n_obs,
            r_squared = fit.r_squared,
            first = %first_period,
            last = %last_period,
            "fitted three-factor regression"
        );

        Ok(RegressionResult {
            estimates,
            r_squared: fit.r_squared,
            adj_r_squared: fit.adj_r_squared(),
            residual_std_error: fit.residual_variance().map(f64::sqrt),
            n_obs: fit.n_obs,
            df_resid: fit.df_resid,
            first_period,
            last_period,
        })
    }
}
