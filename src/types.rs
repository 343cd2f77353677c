use std::fmt;

/// Outcome of comparing a test statistic with its critical value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Verdict {
    /// The null hypothesis is plausible at the chosen significance.
    NotRejected,
    /// The statistic exceeds the critical value.
    Rejected,
}

impl Verdict {
    /// Upper-tail decision rule. A statistic equal to the critical value is
    /// not rejected.
    pub fn from_upper_tail(statistic: f64, critical_value: f64) -> Self {
        if statistic <= critical_value {
            Verdict::NotRejected
        } else {
            Verdict::Rejected
        }
    }

    pub fn is_rejected(self) -> bool {
        self == Verdict::Rejected
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NotRejected => write!(f, "not rejected"),
            Verdict::Rejected => write!(f, "rejected"),
        }
    }
}

/// Common record returned by every test: the statistic, the critical value
/// it was compared against and the resulting verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TestResult {
    pub statistic: f64,
    pub critical_value: f64,
    pub verdict: Verdict,
}

impl TestResult {
    pub fn new(statistic: f64, critical_value: f64) -> Self {
        Self {
            statistic,
            critical_value,
            verdict: Verdict::from_upper_tail(statistic, critical_value),
        }
    }

    /// `true` when the null hypothesis is not rejected.
    pub fn is_plausible(&self) -> bool {
        !self.verdict.is_rejected()
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmp = if self.verdict.is_rejected() { ">" } else { "<=" };
        write!(
            f,
            "{} {} {} ({})",
            self.statistic, cmp, self.critical_value, self.verdict
        )
    }
}
