//! Linear algebra operations for factor regressions.

use ndarray::{Array1, Array2};
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::MathError;

/// Pivots smaller than this fraction of the largest matrix entry are treated as zero.
const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Result of an ordinary least squares fit.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column.
    pub coefficients: Array1<f64>,
    /// Standard errors of the coefficients.
    ///
    /// `None` when there are no residual degrees of freedom.
    pub std_errors: Option<Array1<f64>>,
    /// Residuals `y - X * beta`.
    pub residuals: Array1<f64>,
    /// R-squared, `1 - ssr / sst`. Zero when the response has no variance.
    pub r_squared: f64,
    /// Residual sum of squares.
    pub ssr: f64,
    /// Total sum of squares around the mean.
    pub sst: f64,
    /// Number of observations.
    pub n_obs: usize,
    /// Residual degrees of freedom, `n_obs - n_params`.
    pub df_resid: usize,
}

impl OlsFit {
    /// Number of estimated parameters.
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }

    /// Unbiased residual variance `ssr / df_resid`.
    #[must_use]
    pub fn residual_variance(&self) -> Option<f64> {
        (self.df_resid > 0).then(|| self.ssr / self.df_resid as f64)
    }

    /// R-squared adjusted for the number of parameters.
    #[must_use]
    pub fn adj_r_squared(&self) -> Option<f64> {
        if self.df_resid == 0 || self.n_obs == 0 {
            return None;
        }
        let scale = (self.n_obs - 1) as f64 / self.df_resid as f64;
        Some(1.0 - (1.0 - self.r_squared) * scale)
    }

    /// Coefficient t-statistics.
    ///
    /// An entry is `None` when its standard error is unavailable or zero.
    #[must_use]
    pub fn t_stats(&self) -> Vec<Option<f64>> {
        match &self.std_errors {
            None => vec![None; self.n_params()],
            Some(se) => self
                .coefficients
                .iter()
                .zip(se.iter())
                .map(|(b, s)| (*s > 0.0).then(|| b / s))
                .collect(),
        }
    }

    /// Two-sided p-values of the t-statistics under Student's t with `df_resid` degrees of freedom.
    #[must_use]
    pub fn p_values(&self) -> Vec<Option<f64>> {
        let dist = StudentsT::new(0.0, 1.0, self.df_resid as f64).ok();
        self.t_stats()
            .into_iter()
            .map(|t| {
                let (t, dist) = (t?, dist.as_ref()?);
                Some(2.0 * dist.sf(t.abs()))
            })
            .collect()
    }
}

/// Fit `y = X * beta + e` by ordinary least squares.
///
/// Solves the normal equations `X'X beta = X'y` by Gaussian elimination
/// with partial pivoting. The design matrix must already contain an
/// intercept column if one is wanted.
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x p)
///
/// # Errors
/// Returns an error if dimensions mismatch, there are fewer observations
/// than parameters, an input is not finite, or `X'X` is singular.
pub fn ordinary_least_squares(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsFit, MathError> {
    let n = y.len();
    let p = x.ncols();

    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if n == 0 || p == 0 {
        return Err(MathError::EmptyData);
    }
    if n < p {
        return Err(MathError::Underdetermined { observations: n, parameters: p });
    }
    if !y.iter().chain(x.iter()).all(|v| v.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite input to regression".to_string()));
    }

    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);

    let coefficients = solve_linear_system(&xtx, &xty)?;
    let xtx_inv = invert(&xtx)?;

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;

    let y_mean = y.mean().unwrap_or(0.0);
    let sst: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let ssr: f64 = residuals.iter().map(|r| r.powi(2)).sum();
    let r_squared = if sst > 0.0 { 1.0 - ssr / sst } else { 0.0 };

    let df_resid = n - p;
    let std_errors = (df_resid > 0).then(|| {
        let sigma2 = ssr / df_resid as f64;
        xtx_inv.diag().mapv(|v| (sigma2 * v).max(0.0).sqrt())
    });

    Ok(OlsFit { coefficients, std_errors, residuals, r_squared, ssr, sst, n_obs: n, df_resid })
}

fn check_square(a: &Array2<f64>) -> Result<usize, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::NotSquare { rows: n, cols: a.ncols() });
    }
    Ok(n)
}

fn pivot_threshold(a: &Array2<f64>) -> f64 {
    a.iter().fold(0.0_f64, |m, v| m.max(v.abs())) * SINGULAR_TOLERANCE
}

/// Solve a linear system Ax = b using Gaussian elimination with partial pivoting.
///
/// # Errors
/// Returns an error if `a` is not square, `b` has the wrong length, or `a`
/// is singular relative to its largest entry.
pub fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let n = check_square(a)?;
    if b.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: b.len() });
    }
    let threshold = pivot_threshold(a);

    // Augmented matrix [A | b]
    let mut aug = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = aug[[col, col]].abs();
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > max_val {
                max_val = aug[[row, col]].abs();
                max_row = row;
            }
        }

        if max_val <= threshold {
            return Err(MathError::Singular { column: col, pivot: max_val });
        }

        if max_row != col {
            for j in 0..=n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        for row in (col + 1)..n {
            let factor = aug[[row, col]] / aug[[col, col]];
            for j in col..=n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    // Back substitution
    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = aug[[i, n]];
        for j in (i + 1)..n {
            sum -= aug[[i, j]] * x[j];
        }
        x[i] = sum / aug[[i, i]];
    }

    Ok(x)
}

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting.
///
/// # Errors
/// Returns an error if `a` is not square or is singular relative to its
/// largest entry.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = check_square(a)?;
    let threshold = pivot_threshold(a);

    // Augmented matrix [A | I]
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = aug[[col, col]].abs();
        for row in (col + 1)..n {
            if aug[[row, col]].abs() > max_val {
                max_val = aug[[row, col]].abs();
                max_row = row;
            }
        }

        if max_val <= threshold {
            return Err(MathError::Singular { column: col, pivot: max_val });
        }

        if max_row != col {
            for j in 0..2 * n {
                aug.swap([col, j], [max_row, j]);
            }
        }

        let pivot = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[[row, col]];
            if factor != 0.0 {
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Ok(inv)
}
