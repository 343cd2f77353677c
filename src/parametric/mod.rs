pub mod variance_ratio;

pub use variance_ratio::{variance_equality_test, VarianceEqualityTest, VarianceRatioResult};
