use super::{check_degrees_of_freedom, CriticalValueSource};
use crate::error::{Result, StatError};
use crate::validation::validate_significance;
use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor};

/// Critical values computed as distribution quantiles.
///
/// The critical value for upper-tail probability `alpha` is the
/// `(1 - alpha)`-quantile: `inverse_cdf(p)` finds `x` with `P(X <= x) = p`,
/// and `P(X > x) = alpha` is the same as `P(X <= x) = 1 - alpha`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuantileSource;

impl QuantileSource {
    pub fn new() -> Self {
        Self
    }
}

impl CriticalValueSource for QuantileSource {
    fn f_critical(&self, df1: f64, df2: f64, alpha: f64) -> Result<f64> {
        validate_significance(alpha)?;
        check_degrees_of_freedom(df1, "df1")?;
        check_degrees_of_freedom(df2, "df2")?;

        let dist = FisherSnedecor::new(df1, df2).map_err(|e| {
            StatError::UnsupportedDegreesOfFreedom(format!("F({}, {}): {}", df1, df2, e))
        })?;
        Ok(dist.inverse_cdf(1.0 - alpha))
    }

    fn chi_squared_critical(&self, df: f64, alpha: f64) -> Result<f64> {
        validate_significance(alpha)?;
        check_degrees_of_freedom(df, "df")?;

        let dist = ChiSquared::new(df).map_err(|e| {
            StatError::UnsupportedDegreesOfFreedom(format!("chi-squared({}): {}", df, e))
        })?;
        Ok(dist.inverse_cdf(1.0 - alpha))
    }
}
