use crate::error::{Result, StatError};

/// Validate a significance level lies in the open interval (0, 1).
pub(crate) fn validate_significance(alpha: f64) -> Result<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(StatError::InvalidParameter(format!(
            "significance must be in (0, 1), got {}",
            alpha
        )));
    }
    Ok(())
}

/// Validate a sample has at least `required` finite observations.
pub(crate) fn validate_sample(sample: &[f64], required: usize, name: &str) -> Result<()> {
    if sample.is_empty() {
        return Err(StatError::EmptyData);
    }
    if sample.len() < required {
        return Err(StatError::InsufficientData {
            required,
            actual: sample.len(),
        });
    }
    if let Some(i) = sample.iter().position(|v| !v.is_finite()) {
        return Err(StatError::InvalidParameter(format!(
            "{} contains a non-finite value at position {}",
            name, i
        )));
    }
    Ok(())
}

/// Validate frequency counts are finite and non-negative.
pub(crate) fn validate_frequencies(frequencies: &[f64], name: &str) -> Result<()> {
    if frequencies.is_empty() {
        return Err(StatError::EmptyData);
    }
    for (i, &f) in frequencies.iter().enumerate() {
        if !f.is_finite() || f < 0.0 {
            return Err(StatError::InvalidParameter(format!(
                "{} frequency at bucket {} must be finite and non-negative, got {}",
                name, i, f
            )));
        }
    }
    Ok(())
}

/// Validate two bucket-aligned inputs have the same length.
pub(crate) fn validate_aligned(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(StatError::LengthMismatch { expected, actual });
    }
    Ok(())
}
