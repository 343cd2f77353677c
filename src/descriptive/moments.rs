use crate::error::{Result, StatError};
use crate::validation::validate_aligned;

/// Arithmetic mean of a sample.
pub fn mean(data: &[f64]) -> Result<f64> {
    if data.is_empty() {
        return Err(StatError::EmptyData);
    }
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Sum of squared deviations from the sample mean.
fn sum_of_squares(data: &[f64], mean: f64) -> f64 {
    data.iter().map(|x| (x - mean).powi(2)).sum()
}

/// Unbiased sample variance: S² = Σ(x - x̄)² / (n - 1).
///
/// # Arguments
/// * `data` - The sample; needs at least two observations
pub fn unbiased_variance(data: &[f64]) -> Result<f64> {
    if data.len() < 2 {
        return Err(StatError::InsufficientData {
            required: 2,
            actual: data.len(),
        });
    }
    let m = mean(data)?;
    Ok(sum_of_squares(data, m) / (data.len() as f64 - 1.0))
}

/// Maximum-likelihood (divisor n) variance of a sample.
pub fn population_variance(data: &[f64]) -> Result<f64> {
    let m = mean(data)?;
    Ok(sum_of_squares(data, m) / data.len() as f64)
}

/// Moments of data only known as counts per bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupedMoments {
    /// Total number of observations (sum of counts)
    pub n: f64,
    /// Weighted mean of the bucket midpoints
    pub mean: f64,
    /// Maximum-likelihood variance of the midpoints (divisor n)
    pub variance: f64,
}

/// Mean and variance reconstructed from bucket midpoints weighted by counts.
///
/// # Arguments
/// * `midpoints` - Representative value of each bucket
/// * `counts` - Number of observations in each bucket
///
/// # Returns
/// * `GroupedMoments` with the pooled mean and divisor-n variance
pub fn grouped_moments(midpoints: &[f64], counts: &[f64]) -> Result<GroupedMoments> {
    validate_aligned(midpoints.len(), counts.len())?;
    let n: f64 = counts.iter().sum();
    if n <= 0.0 {
        return Err(StatError::EmptyData);
    }

    let mean = midpoints
        .iter()
        .zip(counts.iter())
        .map(|(x, c)| x * c)
        .sum::<f64>()
        / n;
    let variance = midpoints
        .iter()
        .zip(counts.iter())
        .map(|(x, c)| c * (x - mean).powi(2))
        .sum::<f64>()
        / n;

    Ok(GroupedMoments { n, mean, variance })
}
