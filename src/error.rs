use thiserror::Error;

/// Errors produced by the hypothesis tests and critical-value sources.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatError {
    #[error("empty data provided")]
    EmptyData,

    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("length mismatch: expected {expected} buckets, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A bucket's expected frequency is zero and no neighbour could absorb it.
    #[error("expected frequency of bucket {bucket} is zero and cannot be merged away")]
    ZeroExpectedFrequency { bucket: usize },

    #[error("unsupported degrees of freedom: {0}")]
    UnsupportedDegreesOfFreedom(String),

    #[error("no critical values available for significance {0}")]
    UnsupportedSignificance(f64),
}

/// Coarse classification of [`StatError`] for callers that only need to know
/// whether to fix their input or their critical-value source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed, mismatched or insufficient input.
    InvalidInput,
    /// The critical-value source cannot answer for the requested parameters.
    UnsupportedDegreesOfFreedom,
}

impl StatError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StatError::UnsupportedDegreesOfFreedom(_) | StatError::UnsupportedSignificance(_) => {
                ErrorKind::UnsupportedDegreesOfFreedom
            }
            _ => ErrorKind::InvalidInput,
        }
    }
}

pub type Result<T> = std::result::Result<T, StatError>;
