pub mod buckets;
pub mod normal_fit;
pub mod normality;
pub mod ranges;

pub use buckets::{PairedBucket, PairedBuckets};
pub use normal_fit::{FitSource, NormalFit};
pub use normality::{normality_test, GoodnessOfFitResult, NormalityConfig, NormalityTest, Theoretical};
pub use ranges::{ranges_from_edges, ValueRange};
