use crate::critical::{CriticalValueSource, QuantileSource};
use crate::descriptive::unbiased_variance;
use crate::error::Result;
use crate::types::{TestResult, Verdict};
use crate::validation::{validate_sample, validate_significance};
use log::debug;

/// Result of the F test for equality of two variances
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VarianceRatioResult {
    /// F = larger variance / smaller variance (always >= 1)
    pub statistic: f64,
    /// Upper critical value of F(df_numerator, df_denominator) at significance / 2
    pub critical_value: f64,
    /// Degrees of freedom of the sample in the numerator (n - 1)
    pub df_numerator: f64,
    /// Degrees of freedom of the sample in the denominator (n - 1)
    pub df_denominator: f64,
    /// Unbiased variance of the first sample
    pub variance_x: f64,
    /// Unbiased variance of the second sample
    pub variance_y: f64,
    /// Two-sided significance level the test was run at
    pub significance: f64,
    pub verdict: Verdict,
}

impl VarianceRatioResult {
    /// `true` when equal variances are plausible.
    pub fn is_plausible(&self) -> bool {
        !self.verdict.is_rejected()
    }
}

impl From<&VarianceRatioResult> for TestResult {
    fn from(r: &VarianceRatioResult) -> Self {
        TestResult {
            statistic: r.statistic,
            critical_value: r.critical_value,
            verdict: r.verdict,
        }
    }
}

/// Which sample supplies the numerator of the ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Numerator {
    X,
    Y,
}

/// Pick the larger variance as numerator. On a tie the larger sample goes on
/// top so that the choice does not depend on argument order.
fn choose_numerator(var_x: f64, var_y: f64, n_x: usize, n_y: usize) -> Numerator {
    if var_x > var_y || (var_x == var_y && n_x >= n_y) {
        Numerator::X
    } else {
        Numerator::Y
    }
}

/// Ratio of the larger to the smaller variance.
///
/// Two zero variances are equal (F = 1); a single zero variance gives F = +inf.
fn variance_ratio(larger: f64, smaller: f64) -> f64 {
    if smaller > 0.0 {
        larger / smaller
    } else if larger > 0.0 {
        f64::INFINITY
    } else {
        1.0
    }
}

/// Two-sided F test of `Var(X) = Var(Y)`.
///
/// The ratio is always formed as larger / smaller, so only the upper tail is
/// consulted and the significance is halved to keep the two-sided error rate.
#[derive(Debug, Clone, Default)]
pub struct VarianceEqualityTest<C = QuantileSource> {
    source: C,
}

impl VarianceEqualityTest<QuantileSource> {
    /// Test backed by exact F quantiles.
    pub fn new() -> Self {
        Self {
            source: QuantileSource::new(),
        }
    }
}

impl<C: CriticalValueSource> VarianceEqualityTest<C> {
    /// Test backed by a caller-supplied critical-value source.
    pub fn with_source(source: C) -> Self {
        Self { source }
    }

    /// Decide whether the two samples plausibly share a variance.
    ///
    /// # Arguments
    /// * `x` - First sample (at least 2 observations)
    /// * `y` - Second sample (at least 2 observations)
    /// * `significance` - Two-sided significance level in (0, 1)
    ///
    /// # Returns
    /// * `VarianceRatioResult` with the F statistic, critical value and verdict
    pub fn evaluate(&self, x: &[f64], y: &[f64], significance: f64) -> Result<VarianceRatioResult> {
        validate_significance(significance)?;
        validate_sample(x, 2, "sample x")?;
        validate_sample(y, 2, "sample y")?;

        let variance_x = unbiased_variance(x)?;
        let variance_y = unbiased_variance(y)?;

        let (larger, smaller, n_num, n_den) =
            match choose_numerator(variance_x, variance_y, x.len(), y.len()) {
                Numerator::X => (variance_x, variance_y, x.len(), y.len()),
                Numerator::Y => (variance_y, variance_x, y.len(), x.len()),
            };
        let df_numerator = (n_num - 1) as f64;
        let df_denominator = (n_den - 1) as f64;

        let statistic = variance_ratio(larger, smaller);
        let critical_value =
            self.source
                .f_critical(df_numerator, df_denominator, significance / 2.0)?;
        let verdict = Verdict::from_upper_tail(statistic, critical_value);

        debug!(
            "variance equality: F = {} vs F_crit({}, {}) = {} at alpha = {}: {}",
            statistic, df_numerator, df_denominator, critical_value, significance, verdict
        );

        Ok(VarianceRatioResult {
            statistic,
            critical_value,
            df_numerator,
            df_denominator,
            variance_x,
            variance_y,
            significance,
            verdict,
        })
    }
}

/// Perform the F test for equality of variances using exact F quantiles.
///
/// # Arguments
/// * `x` - First sample
/// * `y` - Second sample
/// * `significance` - Two-sided significance level (e.g., 0.05)
pub fn variance_equality_test(x: &[f64], y: &[f64], significance: f64) -> Result<VarianceRatioResult> {
    VarianceEqualityTest::new().evaluate(x, y, significance)
}
