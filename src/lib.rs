//! hypotest: two classical hypothesis tests with injectable critical values.
//!
//! * [`VarianceEqualityTest`] - two-sided F test of `Var(X) = Var(Y)`
//! * [`NormalityTest`] - chi-squared goodness-of-fit test against a Normal,
//!   from theoretical frequencies or from value ranges with a fitted Normal
//!
//! Critical values come from a [`CriticalValueSource`]: exact quantiles
//! ([`QuantileSource`], the default) or tabulated values
//! ([`CriticalValueTable`]).
//!
//! ```
//! use hypotest::{normality_test, variance_equality_test, Theoretical};
//!
//! let x = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
//! let y = [3.0, 3.0, 4.0, 4.0, 5.0, 6.0, 7.0, 8.0];
//! let f = variance_equality_test(&x, &y, 0.05).unwrap();
//! assert!(f.is_plausible());
//!
//! let empirical = [5.0, 12.0, 18.0, 10.0, 5.0];
//! let theoretical = [5.2, 11.9, 17.6, 10.2, 5.1];
//! let chi2 = normality_test(&empirical, Theoretical::Frequencies(&theoretical), 0.05).unwrap();
//! assert!(chi2.is_plausible());
//! ```

pub mod critical;
pub mod descriptive;
pub mod distributional;
pub mod error;
pub mod parametric;
pub mod types;

mod validation;

pub use critical::{CriticalValueSource, CriticalValueTable, QuantileSource};
pub use distributional::{
    normality_test, ranges_from_edges, GoodnessOfFitResult, NormalFit, NormalityConfig,
    NormalityTest, PairedBucket, PairedBuckets, Theoretical, ValueRange,
};
pub use error::{ErrorKind, Result, StatError};
pub use parametric::{variance_equality_test, VarianceEqualityTest, VarianceRatioResult};
pub use types::{TestResult, Verdict};
