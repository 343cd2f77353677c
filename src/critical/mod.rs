//! Critical-value sources for the F and chi-squared reference distributions.
//!
//! Tests never look critical values up themselves; they are handed a
//! [`CriticalValueSource`] at construction. [`QuantileSource`] computes exact
//! quantiles, [`CriticalValueTable`] answers from caller-supplied tables.

pub mod quantile;
pub mod table;

pub use quantile::QuantileSource;
pub use table::CriticalValueTable;

use crate::error::{Result, StatError};

/// Upper-tail critical values indexed by degrees of freedom and significance.
///
/// `alpha` is always the upper-tail probability: implementations return the
/// `x` such that `P(X > x) = alpha`. Smaller `alpha` must never produce a
/// smaller critical value.
pub trait CriticalValueSource {
    /// Critical value of the Fisher-Snedecor distribution F(df1, df2).
    fn f_critical(&self, df1: f64, df2: f64, alpha: f64) -> Result<f64>;

    /// Critical value of the chi-squared distribution with `df` degrees of freedom.
    fn chi_squared_critical(&self, df: f64, alpha: f64) -> Result<f64>;
}

impl<T: CriticalValueSource + ?Sized> CriticalValueSource for &T {
    fn f_critical(&self, df1: f64, df2: f64, alpha: f64) -> Result<f64> {
        (**self).f_critical(df1, df2, alpha)
    }

    fn chi_squared_critical(&self, df: f64, alpha: f64) -> Result<f64> {
        (**self).chi_squared_critical(df, alpha)
    }
}

/// Degrees of freedom must be finite and strictly positive.
pub(crate) fn check_degrees_of_freedom(df: f64, name: &str) -> Result<()> {
    if !(df.is_finite() && df > 0.0) {
        return Err(StatError::UnsupportedDegreesOfFreedom(format!(
            "{} = {} (must be positive)",
            name, df
        )));
    }
    Ok(())
}
