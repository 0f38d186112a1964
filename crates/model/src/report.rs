//! Plain-text rendering of a fitted regression.

use std::fmt;

use crate::RegressionResult;

const RULE: &str =
    "================================================================================";
const THIN_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Loadings table and fit diagnostics for a [`RegressionResult`].
#[derive(Debug, Clone, Copy)]
pub struct RegressionReport<'a> {
    result: &'a RegressionResult,
}

impl<'a> RegressionReport<'a> {
    /// Wrap a result for display.
    #[must_use]
    pub const fn new(result: &'a RegressionResult) -> Self {
        Self { result }
    }

    /// Print the report to stdout.
    pub fn print_summary(&self) {
        println!("{self}");
    }
}

struct Opt(Option<f64>, usize);

impl fmt::Display for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = f.width().unwrap_or(0);
        match self.0 {
            Some(v) => write!(f, "{v:>width$.prec$}", prec = self.1),
            None => write!(f, "{:>width$}", "-"),
        }
    }
}

impl fmt::Display for RegressionReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.result;
        writeln!(f, "\n{RULE}")?;
        writeln!(f, "FAMA-FRENCH THREE-FACTOR REGRESSION")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Dep. Variable: excess portfolio return (monthly)")?;
        writeln!(f, "Sample: {} to {} ({} months)", r.first_period, r.last_period, r.n_obs)?;
        writeln!(f, "{THIN_RULE}")?;
        writeln!(f, "{:<12} {:>12} {:>12} {:>10} {:>10}", "Term", "Coef", "Std Err", "t", "P>|t|")?;
        writeln!(f, "{:-<12} {:-^12} {:-^12} {:-^10} {:-^10}", "", "", "", "", "")?;
        for e in &r.estimates {
            writeln!(
                f,
                "{:<12} {:>12.6} {:>12} {:>10} {:>10}",
                e.term.to_string(),
                e.coefficient,
                Opt(e.std_error, 6),
                Opt(e.t_stat, 3),
                Opt(e.p_value, 3),
            )?;
        }
        writeln!(f, "{THIN_RULE}")?;
        writeln!(f, "R-squared:             {:>10.4}", r.r_squared)?;
        writeln!(f, "Adj. R-squared:        {:>10}", Opt(r.adj_r_squared, 4))?;
        writeln!(f, "Residual Std Error:    {:>10}", Opt(r.residual_std_error, 6))?;
        writeln!(f, "Observations:          {:>10}", r.n_obs)?;
        writeln!(f, "Df Residuals:          {:>10}", r.df_resid)?;
        writeln!(f, "Annualized Alpha:      {:>+9.2}%", r.annualized_alpha() * 100.0)?;
        write!(f, "{RULE}")
    }
}
