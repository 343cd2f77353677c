use crate::error::{Result, StatError};

/// Half-open value interval `[lower, upper)` describing one frequency bucket.
///
/// `lower` may be `-inf` and `upper` may be `+inf` for open tail buckets.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValueRange {
    pub lower: f64,
    pub upper: f64,
}

impl ValueRange {
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if lower.is_nan() || upper.is_nan() || lower >= upper || lower == f64::INFINITY {
            return Err(StatError::InvalidParameter(format!(
                "invalid range [{}, {})",
                lower, upper
            )));
        }
        Ok(Self { lower, upper })
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower && x < self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn is_bounded(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }
}

/// Build contiguous ranges from bucket edges: `n + 1` edges give `n` ranges.
///
/// # Arguments
/// * `edges` - Strictly increasing edges; the first may be `-inf`, the last `+inf`
pub fn ranges_from_edges(edges: &[f64]) -> Result<Vec<ValueRange>> {
    if edges.len() < 2 {
        return Err(StatError::InsufficientData {
            required: 2,
            actual: edges.len(),
        });
    }
    edges
        .windows(2)
        .map(|w| ValueRange::new(w[0], w[1]))
        .collect()
}

/// Validate ranges are individually well-formed and contiguous: each range
/// starts exactly where the previous one ends.
pub(crate) fn validate_ranges(ranges: &[ValueRange]) -> Result<()> {
    if ranges.is_empty() {
        return Err(StatError::EmptyData);
    }
    for r in ranges {
        ValueRange::new(r.lower, r.upper)?;
    }
    for (i, pair) in ranges.windows(2).enumerate() {
        if pair[1].lower != pair[0].upper {
            return Err(StatError::InvalidParameter(format!(
                "range {} starts at {} but range {} ends at {}",
                i + 1,
                pair[1].lower,
                i,
                pair[0].upper
            )));
        }
    }
    Ok(())
}

/// Representative value of each range, used when only grouped counts are known.
///
/// Bounded ranges use their centre. A tail range open to infinity is given the
/// width of its bounded neighbour.
pub(crate) fn midpoints(ranges: &[ValueRange]) -> Result<Vec<f64>> {
    let neighbour_width = |i: usize| -> Result<f64> {
        let neighbour = if i == 0 { ranges.get(1) } else { ranges.get(i - 1) };
        neighbour
            .filter(|r| r.is_bounded())
            .map(|r| r.width())
            .ok_or_else(|| {
                StatError::InvalidParameter(format!(
                    "open range {} has no bounded neighbour to place its midpoint",
                    i
                ))
            })
    };

    ranges
        .iter()
        .enumerate()
        .map(|(i, r)| {
            if r.is_bounded() {
                Ok((r.lower + r.upper) / 2.0)
            } else if r.upper.is_finite() {
                Ok(r.upper - neighbour_width(i)? / 2.0)
            } else if r.lower.is_finite() {
                Ok(r.lower + neighbour_width(i)? / 2.0)
            } else {
                Err(StatError::InvalidParameter(
                    "range (-inf, +inf) has no midpoint".to_string(),
                ))
            }
        })
        .collect()
}

/// Count observations per range.
///
/// A value equal to the finite upper edge of the last range is counted in it.
///
/// # Errors
/// * `InvalidParameter` if a value falls outside every range
pub(crate) fn bin_observations(values: &[f64], ranges: &[ValueRange]) -> Result<Vec<f64>> {
    if ranges.is_empty() {
        return Err(StatError::EmptyData);
    }
    let mut counts = vec![0.0; ranges.len()];
    let last = ranges.len() - 1;

    for &v in values {
        let idx = ranges
            .iter()
            .position(|r| r.contains(v))
            .or_else(|| (v == ranges[last].upper).then_some(last))
            .ok_or_else(|| {
                StatError::InvalidParameter(format!("value {} is outside every range", v))
            })?;
        counts[idx] += 1.0;
    }

    Ok(counts)
}
