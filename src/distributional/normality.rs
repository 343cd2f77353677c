use super::buckets::{PairedBucket, PairedBuckets};
use super::normal_fit::NormalFit;
use super::ranges::{bin_observations, validate_ranges, ValueRange};
use crate::critical::{check_degrees_of_freedom, CriticalValueSource, QuantileSource};
use crate::error::{Result, StatError};
use crate::types::{TestResult, Verdict};
use crate::validation::{validate_aligned, validate_frequencies, validate_sample, validate_significance};
use log::debug;

/// Parameters (mean and standard deviation) estimated when fitting a Normal.
const NORMAL_PARAMETERS: usize = 2;

/// Tuning for the chi-squared normality test.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalityConfig {
    /// Buckets expecting fewer observations than this are merged with a neighbour
    pub min_expected_frequency: f64,
    /// Parameters estimated from the data when theoretical frequencies are
    /// supplied directly. Fitting from ranges always estimates two.
    pub fitted_parameters: usize,
    /// Extend the outermost ranges to ±inf when computing theoretical
    /// frequencies, so they sum to the number of observations. On by default.
    pub open_tails: bool,
}

impl Default for NormalityConfig {
    fn default() -> Self {
        Self {
            min_expected_frequency: 5.0,
            fitted_parameters: 0,
            open_tails: true,
        }
    }
}

impl NormalityConfig {
    pub fn with_min_expected_frequency(mut self, min_expected_frequency: f64) -> Self {
        self.min_expected_frequency = min_expected_frequency;
        self
    }

    pub fn with_fitted_parameters(mut self, fitted_parameters: usize) -> Self {
        self.fitted_parameters = fitted_parameters;
        self
    }

    pub fn with_open_tails(mut self, open_tails: bool) -> Self {
        self.open_tails = open_tails;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.min_expected_frequency.is_finite() && self.min_expected_frequency >= 0.0) {
            return Err(StatError::InvalidParameter(format!(
                "min_expected_frequency must be finite and non-negative, got {}",
                self.min_expected_frequency
            )));
        }
        Ok(())
    }
}

/// Theoretical side of the comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Theoretical<'a> {
    /// Expected frequencies given directly, aligned with the empirical buckets
    Frequencies(&'a [f64]),
    /// Value ranges of the empirical buckets; a Normal is fitted to derive
    /// the expected frequencies
    Ranges(&'a [ValueRange]),
}

/// Result of the chi-squared goodness-of-fit test for normality
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GoodnessOfFitResult {
    /// Pearson's chi-squared statistic over the merged buckets
    pub statistic: f64,
    /// Upper critical value of chi-squared(df) at the significance level
    pub critical_value: f64,
    /// Degrees of freedom: merged buckets - 1 - estimated parameters
    pub df: f64,
    /// Number of distribution parameters estimated from the data
    pub estimated_parameters: usize,
    pub significance: f64,
    pub verdict: Verdict,
    /// Buckets the statistic was computed over, after merging
    pub buckets: Vec<PairedBucket>,
    /// Number of buckets before merging
    pub input_buckets: usize,
    /// Fitted distribution, when one was estimated from ranges
    pub fit: Option<NormalFit>,
}

impl GoodnessOfFitResult {
    /// `true` when normality is plausible.
    pub fn is_plausible(&self) -> bool {
        !self.verdict.is_rejected()
    }

    /// `true` when sparse buckets had to be merged.
    pub fn was_merged(&self) -> bool {
        self.buckets.len() != self.input_buckets
    }
}

impl From<&GoodnessOfFitResult> for TestResult {
    fn from(r: &GoodnessOfFitResult) -> Self {
        TestResult {
            statistic: r.statistic,
            critical_value: r.critical_value,
            verdict: r.verdict,
        }
    }
}

/// Chi-squared goodness-of-fit test of the hypothesis that a sample is Normal.
#[derive(Debug, Clone, Default)]
pub struct NormalityTest<C = QuantileSource> {
    source: C,
    config: NormalityConfig,
}

impl NormalityTest<QuantileSource> {
    /// Test backed by exact chi-squared quantiles and the default config.
    pub fn new() -> Self {
        Self {
            source: QuantileSource::new(),
            config: NormalityConfig::default(),
        }
    }
}

impl<C: CriticalValueSource> NormalityTest<C> {
    /// Test backed by a caller-supplied critical-value source.
    pub fn with_source(source: C) -> Self {
        Self {
            source,
            config: NormalityConfig::default(),
        }
    }

    pub fn with_config(mut self, config: NormalityConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &NormalityConfig {
        &self.config
    }

    /// Decide whether the empirical frequencies plausibly come from a Normal.
    ///
    /// # Arguments
    /// * `empirical` - Observed count per bucket
    /// * `theoretical` - Expected counts, or the bucket ranges to fit a Normal over
    /// * `significance` - Upper-tail significance level in (0, 1)
    ///
    /// # Returns
    /// * `GoodnessOfFitResult` with the chi-squared statistic, critical value and verdict
    pub fn evaluate(
        &self,
        empirical: &[f64],
        theoretical: Theoretical<'_>,
        significance: f64,
    ) -> Result<GoodnessOfFitResult> {
        match theoretical {
            Theoretical::Frequencies(expected) => {
                self.evaluate_frequencies(empirical, expected, significance)
            }
            Theoretical::Ranges(ranges) => self.evaluate_ranges(empirical, ranges, significance),
        }
    }

    /// Compare against theoretical frequencies supplied directly.
    pub fn evaluate_frequencies(
        &self,
        empirical: &[f64],
        expected: &[f64],
        significance: f64,
    ) -> Result<GoodnessOfFitResult> {
        validate_significance(significance)?;
        self.config.validate()?;

        let buckets = PairedBuckets::new(empirical, expected)?;
        self.decide(buckets, self.config.fitted_parameters, significance, None)
    }

    /// Fit a Normal to grouped counts over `ranges` and compare against it.
    pub fn evaluate_ranges(
        &self,
        empirical: &[f64],
        ranges: &[ValueRange],
        significance: f64,
    ) -> Result<GoodnessOfFitResult> {
        validate_significance(significance)?;
        self.config.validate()?;
        validate_frequencies(empirical, "observed")?;
        validate_aligned(empirical.len(), ranges.len())?;
        validate_ranges(ranges)?;

        let fit = NormalFit::from_grouped(ranges, empirical)?;
        self.compare_with_fit(empirical, ranges, fit, significance)
    }

    /// Count raw observations into `ranges`, fit a Normal to the raw values and
    /// compare the counts against it.
    pub fn evaluate_observations(
        &self,
        values: &[f64],
        ranges: &[ValueRange],
        significance: f64,
    ) -> Result<GoodnessOfFitResult> {
        validate_significance(significance)?;
        self.config.validate()?;
        validate_sample(values, 2, "observations")?;
        validate_ranges(ranges)?;

        let counts = bin_observations(values, ranges)?;
        let fit = NormalFit::from_observations(values)?;
        self.compare_with_fit(&counts, ranges, fit, significance)
    }

    fn compare_with_fit(
        &self,
        counts: &[f64],
        ranges: &[ValueRange],
        fit: NormalFit,
        significance: f64,
    ) -> Result<GoodnessOfFitResult> {
        let total: f64 = counts.iter().sum();
        let expected = fit.expected_frequencies(ranges, total, self.config.open_tails)?;
        let buckets = PairedBuckets::with_ranges(counts, &expected, ranges)?;
        self.decide(buckets, NORMAL_PARAMETERS, significance, Some(fit))
    }

    fn decide(
        &self,
        buckets: PairedBuckets,
        estimated_parameters: usize,
        significance: f64,
        fit: Option<NormalFit>,
    ) -> Result<GoodnessOfFitResult> {
        let input_buckets = buckets.len();
        let buckets = buckets.merge_sparse(self.config.min_expected_frequency)?;
        let statistic = buckets.chi_squared_statistic()?;

        let df = buckets.len() as f64 - 1.0 - estimated_parameters as f64;
        check_degrees_of_freedom(df, "df").map_err(|_| {
            StatError::UnsupportedDegreesOfFreedom(format!(
                "{} buckets after merging leave df = {} with {} estimated parameters",
                buckets.len(),
                df,
                estimated_parameters
            ))
        })?;

        let critical_value = self.source.chi_squared_critical(df, significance)?;
        let verdict = Verdict::from_upper_tail(statistic, critical_value);

        debug!(
            "normality: chi2 = {} vs chi2_crit({}) = {} at alpha = {} over {} buckets: {}",
            statistic,
            df,
            critical_value,
            significance,
            buckets.len(),
            verdict
        );

        Ok(GoodnessOfFitResult {
            statistic,
            critical_value,
            df,
            estimated_parameters,
            significance,
            verdict,
            buckets: buckets.into_vec(),
            input_buckets,
            fit,
        })
    }
}

/// Perform the chi-squared normality test with exact quantiles and default config.
///
/// # Arguments
/// * `empirical` - Observed count per bucket
/// * `theoretical` - Expected counts, or the bucket ranges to fit a Normal over
/// * `significance` - Significance level (e.g., 0.05)
pub fn normality_test(
    empirical: &[f64],
    theoretical: Theoretical<'_>,
    significance: f64,
) -> Result<GoodnessOfFitResult> {
    NormalityTest::new().evaluate(empirical, theoretical, significance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::critical::CriticalValueTable;
    use crate::distributional::normal_fit::FitSource;
    use crate::distributional::ranges::ranges_from_edges;
    use crate::error::ErrorKind;
    use rand::distributions::Distribution;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use statrs::distribution::{ContinuousCDF, Exp, Normal};

    const EMPIRICAL: [f64; 8] = [7.0, 12.0, 49.0, 66.0, 83.0, 67.0, 23.0, 13.0];
    const THEORETICAL: [f64; 8] = [5.0, 9.0, 46.0, 60.0, 89.0, 81.0, 19.0, 11.0];

    /// Evenly spaced quantiles of N(0, 1): a sample that is as Normal as it gets.
    fn normal_quantile_sample(n: usize) -> Vec<f64> {
        let normal = Normal::new(0.0, 1.0).unwrap();
        (0..n)
            .map(|i| normal.inverse_cdf((i as f64 + 0.5) / n as f64))
            .collect()
    }

    fn symmetric_ranges() -> Vec<ValueRange> {
        ranges_from_edges(&[
            f64::NEG_INFINITY,
            -1.5,
            -1.0,
            -0.5,
            0.0,
            0.5,
            1.0,
            1.5,
            f64::INFINITY,
        ])
        .unwrap()
    }

    #[test]
    fn test_frequencies_close_fit() {
        let empirical = [5.0, 12.0, 18.0, 10.0, 5.0];
        let theoretical = [5.2, 11.9, 17.6, 10.2, 5.1];
        let result = normality_test(&empirical, Theoretical::Frequencies(&theoretical), 0.05).unwrap();

        assert!(!result.was_merged());
        assert_eq!(result.df, 4.0);
        assert_eq!(result.estimated_parameters, 0);
        assert!(result.statistic < 0.1, "chi2 = {}", result.statistic);
        assert!((result.critical_value - 9.488).abs() < 1e-2);
        assert!(result.is_plausible());
        assert!(result.fit.is_none());
    }

    #[test]
    fn test_frequencies_with_fitted_parameters() {
        let test = NormalityTest::new().with_config(NormalityConfig::default().with_fitted_parameters(2));
        let result = test
            .evaluate_frequencies(&EMPIRICAL, &THEORETICAL, 0.05)
            .unwrap();

        let expected: f64 = EMPIRICAL
            .iter()
            .zip(THEORETICAL.iter())
            .map(|(e, t)| (e - t).powi(2) / t)
            .sum();
        assert!((result.statistic - expected).abs() < 1e-12);
        assert_eq!(result.df, 5.0);
        assert!((result.critical_value - 11.070).abs() < 1e-2);
        assert!(result.is_plausible());
    }

    #[test]
    fn test_frequencies_far_off_rejected() {
        let empirical = [30.0, 5.0, 5.0, 5.0, 30.0];
        let theoretical = [5.0, 15.0, 30.0, 15.0, 10.0];
        let result = normality_test(&empirical, Theoretical::Frequencies(&theoretical), 0.05).unwrap();
        assert!(result.verdict.is_rejected());
    }

    #[test]
    fn test_length_mismatch() {
        let err = normality_test(&[1.0, 2.0, 3.0], Theoretical::Frequencies(&[1.0, 2.0]), 0.05)
            .unwrap_err();
        assert_eq!(
            err,
            StatError::LengthMismatch {
                expected: 3,
                actual: 2
            }
        );

        let ranges = ranges_from_edges(&[0.0, 1.0, 2.0]).unwrap();
        let err = normality_test(&[1.0, 2.0, 3.0], Theoretical::Ranges(&ranges), 0.05).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_zero_expected_everywhere() {
        let err = normality_test(&[1.0, 2.0], Theoretical::Frequencies(&[0.0, 0.0]), 0.05)
            .unwrap_err();
        assert_eq!(err, StatError::ZeroExpectedFrequency { bucket: 0 });
    }

    #[test]
    fn test_sparse_buckets_merged_before_statistic() {
        let empirical = [1.0, 3.0, 20.0, 25.0, 20.0, 4.0, 2.0];
        let theoretical = [2.0, 4.0, 21.0, 22.0, 21.0, 4.0, 1.0];
        let result = normality_test(&empirical, Theoretical::Frequencies(&theoretical), 0.05).unwrap();

        assert!(result.was_merged());
        assert_eq!(result.input_buckets, 7);
        let spans: Vec<_> = result.buckets.iter().map(|b| b.indices.clone()).collect();
        assert_eq!(spans, vec![0..2, 2..3, 3..4, 4..5, 5..7]);
        assert_eq!(result.df, 4.0);
        assert!(result.statistic.is_finite());
    }

    #[test]
    fn test_too_few_buckets_after_merging() {
        let ranges = ranges_from_edges(&[0.0, 1.0, 2.0, 3.0]).unwrap();
        let err = normality_test(&[2.0, 6.0, 2.0], Theoretical::Ranges(&ranges), 0.05).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedDegreesOfFreedom);
    }

    #[test]
    fn test_ranges_degrees_of_freedom_without_merging() {
        let ranges = ranges_from_edges(&[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        let empirical = [100.0, 240.0, 360.0, 200.0, 100.0];
        let result = normality_test(&empirical, Theoretical::Ranges(&ranges), 0.05).unwrap();

        assert!(!result.was_merged());
        assert_eq!(result.estimated_parameters, 2);
        assert_eq!(result.df, (ranges.len() - 3) as f64);

        let fit = result.fit.unwrap();
        assert_eq!(fit.source, FitSource::GroupedMidpoints);
        assert!((fit.mean - 4.92).abs() < 1e-12);
    }

    #[test]
    fn test_ranges_and_frequencies_agree() {
        let ranges = ranges_from_edges(&[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        let empirical = [100.0, 240.0, 360.0, 200.0, 100.0];
        let fitted = normality_test(&empirical, Theoretical::Ranges(&ranges), 0.05).unwrap();

        let expected: Vec<f64> = fitted.buckets.iter().map(|b| b.expected).collect();
        let direct = NormalityTest::new()
            .with_config(NormalityConfig::default().with_fitted_parameters(2))
            .evaluate(&empirical, Theoretical::Frequencies(&expected), 0.05)
            .unwrap();

        assert!((fitted.statistic - direct.statistic).abs() < 1e-12);
        assert_eq!(fitted.df, direct.df);
        assert_eq!(fitted.critical_value, direct.critical_value);
        assert_eq!(fitted.verdict, direct.verdict);
    }

    #[test]
    fn test_default_expected_sum_to_total() {
        let ranges = ranges_from_edges(&[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        let empirical = [100.0, 240.0, 360.0, 200.0, 100.0];

        let open = normality_test(&empirical, Theoretical::Ranges(&ranges), 0.05).unwrap();
        let closed = NormalityTest::new()
            .with_config(NormalityConfig::default().with_open_tails(false))
            .evaluate_ranges(&empirical, &ranges, 0.05)
            .unwrap();

        let open_total: f64 = open.buckets.iter().map(|b| b.expected).sum();
        let closed_total: f64 = closed.buckets.iter().map(|b| b.expected).sum();
        assert!((open_total - 1000.0).abs() < 1e-6);
        assert!(closed_total < 1000.0);
        assert!(open.statistic < closed.statistic);
    }

    #[test]
    fn test_small_scenario_expected_sum_to_total() {
        let ranges = ranges_from_edges(&[0.0, 2.0, 4.0, 6.0, 8.0, 10.0]).unwrap();
        let empirical = [5.0, 12.0, 18.0, 10.0, 5.0];
        let result = NormalityTest::new()
            .with_config(NormalityConfig::default().with_min_expected_frequency(0.0))
            .evaluate_ranges(&empirical, &ranges, 0.05)
            .unwrap();

        let total: f64 = result.buckets.iter().map(|b| b.expected).sum();
        assert!((total - 50.0).abs() < 1e-9);
        assert!(result.statistic < 0.5, "chi2 = {}", result.statistic);
    }

    #[test]
    fn test_ranges_with_gap_rejected() {
        let ranges = [
            ValueRange::new(0.0, 1.0).unwrap(),
            ValueRange::new(5.0, 6.0).unwrap(),
            ValueRange::new(6.0, 7.0).unwrap(),
            ValueRange::new(7.0, 8.0).unwrap(),
            ValueRange::new(8.0, 20.0).unwrap(),
        ];
        let values = [0.5, 5.5, 6.2, 6.5, 6.8, 7.1, 7.5, 7.9, 9.0, 12.0];

        let err = NormalityTest::new()
            .evaluate_observations(&values, &ranges, 0.05)
            .unwrap_err();
        assert!(matches!(err, StatError::InvalidParameter(_)));

        let err = NormalityTest::new()
            .evaluate_ranges(&[1.0, 1.0, 3.0, 3.0, 2.0], &ranges, 0.05)
            .unwrap_err();
        assert!(matches!(err, StatError::InvalidParameter(_)));
    }

    #[test]
    fn test_normal_observations_plausible() {
        let sample = normal_quantile_sample(400);
        let result = NormalityTest::new()
            .evaluate_observations(&sample, &symmetric_ranges(), 0.05)
            .unwrap();

        assert_eq!(result.fit.unwrap().source, FitSource::RawObservations);
        let counted: f64 = result.buckets.iter().map(|b| b.observed).sum();
        assert_eq!(counted, 400.0);
        assert!(result.is_plausible(), "chi2 = {}", result.statistic);
    }

    #[test]
    fn test_exponential_observations_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let exp = Exp::new(1.0).unwrap();
        let sample: Vec<f64> = (0..1000).map(|_| exp.sample(&mut rng)).collect();
        let ranges =
            ranges_from_edges(&[f64::NEG_INFINITY, 0.0, 0.5, 1.0, 1.5, 2.0, 3.0, f64::INFINITY])
                .unwrap();

        let result = NormalityTest::new()
            .evaluate_observations(&sample, &ranges, 0.05)
            .unwrap();
        assert!(result.verdict.is_rejected(), "chi2 = {}", result.statistic);
    }

    #[test]
    fn test_seeded_normal_sample_is_reproducible() {
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let normal = Normal::new(50.0, 5.0).unwrap();
            (0..300).map(|_| normal.sample(&mut rng)).collect::<Vec<f64>>()
        };
        let ranges = ranges_from_edges(&[
            f64::NEG_INFINITY,
            42.0,
            46.0,
            50.0,
            54.0,
            58.0,
            f64::INFINITY,
        ])
        .unwrap();

        let test = NormalityTest::new();
        let first = test.evaluate_observations(&draw(7), &ranges, 0.05).unwrap();
        let second = test.evaluate_observations(&draw(7), &ranges, 0.05).unwrap();
        assert_eq!(first, second);
        assert!((first.fit.unwrap().mean - 50.0).abs() < 1.5);
    }

    #[test]
    fn test_observation_outside_ranges() {
        let ranges = ranges_from_edges(&[0.0, 1.0, 2.0]).unwrap();
        let err = NormalityTest::new()
            .evaluate_observations(&[0.5, 1.5, 2.5], &ranges, 0.05)
            .unwrap_err();
        assert!(matches!(err, StatError::InvalidParameter(_)));
    }

    #[test]
    fn test_table_source() {
        let test = NormalityTest::with_source(CriticalValueTable::chi_squared_standard());
        let empirical = [5.0, 12.0, 18.0, 10.0, 5.0];
        let theoretical = [5.2, 11.9, 17.6, 10.2, 5.1];

        let result = test
            .evaluate(&empirical, Theoretical::Frequencies(&theoretical), 0.05)
            .unwrap();
        assert_eq!(result.critical_value, 9.488);

        let err = test
            .evaluate(&empirical, Theoretical::Frequencies(&theoretical), 0.1)
            .unwrap_err();
        assert_eq!(err, StatError::UnsupportedSignificance(0.1));
    }

    #[test]
    fn test_tighter_alpha_never_rejects_more() {
        let empirical = [30.0, 5.0, 5.0, 5.0, 30.0];
        let theoretical = [10.0, 15.0, 25.0, 15.0, 10.0];
        let alphas = [0.001, 0.01, 0.05, 0.1];
        let results: Vec<_> = alphas
            .iter()
            .map(|&a| normality_test(&empirical, Theoretical::Frequencies(&theoretical), a).unwrap())
            .collect();

        for pair in results.windows(2) {
            assert!(pair[0].critical_value > pair[1].critical_value);
            if pair[0].verdict.is_rejected() {
                assert!(pair[1].verdict.is_rejected());
            }
        }
    }

    #[test]
    fn test_invalid_config() {
        let test = NormalityTest::new()
            .with_config(NormalityConfig::default().with_min_expected_frequency(f64::NAN));
        let err = test
            .evaluate_frequencies(&[1.0, 2.0], &[1.0, 2.0], 0.05)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_invalid_significance() {
        let err = normality_test(&[5.0, 5.0], Theoretical::Frequencies(&[5.0, 5.0]), 1.0)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_into_test_result() {
        let empirical = [5.0, 12.0, 18.0, 10.0, 5.0];
        let theoretical = [5.2, 11.9, 17.6, 10.2, 5.1];
        let result = normality_test(&empirical, Theoretical::Frequencies(&theoretical), 0.05).unwrap();
        let summary = TestResult::from(&result);
        assert_eq!(summary.verdict, Verdict::NotRejected);
        assert_eq!(summary.statistic, result.statistic);
    }
}
