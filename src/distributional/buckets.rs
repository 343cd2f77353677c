use super::ranges::ValueRange;
use crate::error::{Result, StatError};
use crate::validation::{validate_aligned, validate_frequencies};
use log::trace;
use std::ops::Range;

/// One observed/expected pair, covering one or more consecutive input buckets.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PairedBucket {
    /// Positions of the input buckets this bucket covers
    pub indices: Range<usize>,
    /// Value range covered, when the buckets were built from ranges
    pub range: Option<ValueRange>,
    pub observed: f64,
    pub expected: f64,
}

impl PairedBucket {
    /// Combine with the bucket immediately to the right.
    fn absorb(self, right: PairedBucket) -> PairedBucket {
        let range = match (self.range, right.range) {
            (Some(l), Some(r)) => Some(ValueRange {
                lower: l.lower,
                upper: r.upper,
            }),
            _ => None,
        };
        PairedBucket {
            indices: self.indices.start..right.indices.end,
            range,
            observed: self.observed + right.observed,
            expected: self.expected + right.expected,
        }
    }

    fn is_usable(&self, min_expected: f64) -> bool {
        self.expected > 0.0 && self.expected >= min_expected
    }

    /// `(observed - expected)² / expected`; callers guarantee `expected > 0`.
    fn contribution(&self) -> f64 {
        (self.observed - self.expected).powi(2) / self.expected
    }
}

/// Ordered, bucket-aligned observed and expected frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedBuckets {
    buckets: Vec<PairedBucket>,
}

impl PairedBuckets {
    /// Pair observed and expected frequencies bucket by bucket.
    pub fn new(observed: &[f64], expected: &[f64]) -> Result<Self> {
        validate_frequencies(observed, "observed")?;
        validate_aligned(observed.len(), expected.len())?;
        validate_frequencies(expected, "expected")?;

        let buckets = observed
            .iter()
            .zip(expected.iter())
            .enumerate()
            .map(|(i, (&o, &e))| PairedBucket {
                indices: i..i + 1,
                range: None,
                observed: o,
                expected: e,
            })
            .collect();
        Ok(Self { buckets })
    }

    /// Pair observed and expected frequencies and label each bucket with its range.
    pub fn with_ranges(observed: &[f64], expected: &[f64], ranges: &[ValueRange]) -> Result<Self> {
        validate_aligned(observed.len(), ranges.len())?;
        let mut paired = Self::new(observed, expected)?;
        for (bucket, range) in paired.buckets.iter_mut().zip(ranges.iter()) {
            bucket.range = Some(*range);
        }
        Ok(paired)
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PairedBucket> {
        self.buckets.iter()
    }

    pub fn as_slice(&self) -> &[PairedBucket] {
        &self.buckets
    }

    pub fn into_vec(self) -> Vec<PairedBucket> {
        self.buckets
    }

    pub fn total_observed(&self) -> f64 {
        self.buckets.iter().map(|b| b.observed).sum()
    }

    pub fn total_expected(&self) -> f64 {
        self.buckets.iter().map(|b| b.expected).sum()
    }

    /// Merge buckets whose expected frequency is below `min_expected` (or zero).
    ///
    /// Scanning left to right, a deficient bucket absorbs its right neighbours
    /// until the running expected count is usable. A deficient run left at the
    /// end is folded into the last usable bucket. Observed and expected values
    /// always move together.
    ///
    /// # Errors
    /// * `ZeroExpectedFrequency` when the total expected frequency is zero
    pub fn merge_sparse(self, min_expected: f64) -> Result<Self> {
        if !(min_expected.is_finite() && min_expected >= 0.0) {
            return Err(StatError::InvalidParameter(format!(
                "minimum expected frequency must be finite and non-negative, got {}",
                min_expected
            )));
        }

        let input_len = self.buckets.len();
        let mut merged: Vec<PairedBucket> = Vec::with_capacity(input_len);
        let mut pending: Option<PairedBucket> = None;

        for bucket in self.buckets {
            let candidate = match pending.take() {
                Some(run) => run.absorb(bucket),
                None => bucket,
            };
            if candidate.is_usable(min_expected) {
                merged.push(candidate);
            } else {
                pending = Some(candidate);
            }
        }

        if let Some(rest) = pending {
            match merged.pop() {
                Some(last) => merged.push(last.absorb(rest)),
                None if rest.expected > 0.0 => merged.push(rest),
                None => {
                    return Err(StatError::ZeroExpectedFrequency {
                        bucket: rest.indices.start,
                    })
                }
            }
        }

        if merged.len() != input_len {
            trace!(
                "merged {} buckets into {} (min expected frequency {})",
                input_len,
                merged.len(),
                min_expected
            );
        }

        Ok(Self { buckets: merged })
    }

    /// Pearson's chi-squared statistic: Σ (observed - expected)² / expected.
    ///
    /// # Errors
    /// * `ZeroExpectedFrequency` if any bucket still expects nothing
    pub fn chi_squared_statistic(&self) -> Result<f64> {
        if self.buckets.is_empty() {
            return Err(StatError::EmptyData);
        }
        if let Some(b) = self.buckets.iter().find(|b| b.expected <= 0.0) {
            return Err(StatError::ZeroExpectedFrequency {
                bucket: b.indices.start,
            });
        }
        Ok(self.buckets.iter().map(PairedBucket::contribution).sum())
    }
}

impl<'a> IntoIterator for &'a PairedBuckets {
    type Item = &'a PairedBucket;
    type IntoIter = std::slice::Iter<'a, PairedBucket>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}
