pub mod moments;

pub use moments::{grouped_moments, mean, population_variance, unbiased_variance, GroupedMoments};
