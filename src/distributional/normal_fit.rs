use super::ranges::{midpoints, validate_ranges, ValueRange};
use crate::descriptive::{grouped_moments, mean, population_variance};
use crate::error::{Result, StatError};
use crate::validation::{validate_aligned, validate_frequencies, validate_sample};
use log::trace;
use statrs::distribution::{ContinuousCDF, Normal};

/// Where the fitted parameters were estimated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitSource {
    /// Bucket midpoints weighted by observed counts
    GroupedMidpoints,
    /// The raw observations themselves
    RawObservations,
}

/// Normal distribution fitted to observed data by maximum likelihood.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalFit {
    pub mean: f64,
    pub std_dev: f64,
    /// Number of observations the fit is based on
    pub n: f64,
    pub source: FitSource,
}

impl NormalFit {
    fn checked(mean: f64, variance: f64, n: f64, source: FitSource) -> Result<Self> {
        let std_dev = variance.sqrt();
        if !(std_dev.is_finite() && std_dev > 0.0) {
            return Err(StatError::InvalidParameter(format!(
                "fitted standard deviation must be positive, got {}",
                std_dev
            )));
        }
        trace!(
            "fitted normal: mean = {}, std_dev = {}, n = {} ({:?})",
            mean,
            std_dev,
            n,
            source
        );
        Ok(Self {
            mean,
            std_dev,
            n,
            source,
        })
    }

    /// Fit from grouped counts, placing each observation at its bucket midpoint.
    ///
    /// # Arguments
    /// * `ranges` - Ordered, non-overlapping bucket ranges
    /// * `counts` - Observed count per range
    pub fn from_grouped(ranges: &[ValueRange], counts: &[f64]) -> Result<Self> {
        validate_ranges(ranges)?;
        validate_aligned(ranges.len(), counts.len())?;
        validate_frequencies(counts, "observed")?;

        let mids = midpoints(ranges)?;
        let g = grouped_moments(&mids, counts)?;
        Self::checked(g.mean, g.variance, g.n, FitSource::GroupedMidpoints)
    }

    /// Fit from raw observations (divisor-n variance).
    pub fn from_observations(values: &[f64]) -> Result<Self> {
        validate_sample(values, 2, "observations")?;
        let m = mean(values)?;
        let variance = population_variance(values)?;
        Self::checked(m, variance, values.len() as f64, FitSource::RawObservations)
    }

    fn distribution(&self) -> Result<Normal> {
        Normal::new(self.mean, self.std_dev)
            .map_err(|e| StatError::InvalidParameter(format!("invalid normal fit: {}", e)))
    }

    /// P(X < x) under the fitted distribution; 0 at `-inf`, 1 at `+inf`.
    pub fn cdf(&self, x: f64) -> Result<f64> {
        Ok(self.distribution()?.cdf(x))
    }

    /// Probability mass the fitted distribution assigns to `range`.
    pub fn probability(&self, range: &ValueRange) -> Result<f64> {
        let normal = self.distribution()?;
        Ok(mass(&normal, range))
    }

    /// Expected frequency of each range: `total · (Φ(upper) − Φ(lower))`.
    ///
    /// With `open_tails` the first range is extended to `-inf` and the last to
    /// `+inf`, so the expected frequencies sum to `total`.
    pub fn expected_frequencies(
        &self,
        ranges: &[ValueRange],
        total: f64,
        open_tails: bool,
    ) -> Result<Vec<f64>> {
        let normal = self.distribution()?;
        let last = ranges.len().saturating_sub(1);
        Ok(ranges
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let mut r = *r;
                if open_tails && i == 0 {
                    r.lower = f64::NEG_INFINITY;
                }
                if open_tails && i == last {
                    r.upper = f64::INFINITY;
                }
                total * mass(&normal, &r)
            })
            .collect())
    }
}

fn mass(normal: &Normal, range: &ValueRange) -> f64 {
    (normal.cdf(range.upper) - normal.cdf(range.lower)).max(0.0)
}
