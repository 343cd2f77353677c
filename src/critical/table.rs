use super::{check_degrees_of_freedom, CriticalValueSource};
use crate::error::{Result, StatError};
use crate::validation::validate_significance;

const ALPHA_TOLERANCE: f64 = 1e-9;

/// Classic upper-tail chi-squared critical values, df = 1..=30.
const CHI_SQUARED_05: [f64; 30] = [
    3.841, 5.991, 7.815, 9.488, 11.070, 12.592, 14.067, 15.507, 16.919, 18.307, 19.675, 21.026,
    22.362, 23.685, 24.996, 26.296, 27.587, 28.869, 30.144, 31.410, 32.671, 33.924, 35.172, 36.415,
    37.652, 38.885, 40.113, 41.337, 42.557, 43.773,
];

const CHI_SQUARED_01: [f64; 30] = [
    6.635, 9.210, 11.345, 13.277, 15.086, 16.812, 18.475, 20.090, 21.666, 23.209, 24.725, 26.217,
    27.688, 29.141, 30.578, 32.000, 33.409, 34.805, 36.191, 37.566, 38.932, 40.289, 41.638, 42.980,
    44.314, 45.642, 46.963, 48.278, 49.588, 50.892,
];

/// One chi-squared column: critical values for a single alpha, keyed by df.
#[derive(Debug, Clone, PartialEq)]
struct ChiSquaredColumn {
    alpha: f64,
    df: Vec<f64>,
    values: Vec<f64>,
}

/// One F page: critical values for a single alpha on a df1 x df2 grid.
#[derive(Debug, Clone, PartialEq)]
struct FPage {
    alpha: f64,
    df1: Vec<f64>,
    df2: Vec<f64>,
    /// `values[i][j]` is the critical value for `df1[i]`, `df2[j]`
    values: Vec<Vec<f64>>,
}

/// Critical values answered from tabulated data.
///
/// Lookups between tabulated degrees of freedom are linearly interpolated
/// (bilinearly for F). Degrees of freedom outside the tabulated range fail with
/// [`StatError::UnsupportedDegreesOfFreedom`]; a significance with no table
/// fails with [`StatError::UnsupportedSignificance`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriticalValueTable {
    chi_squared: Vec<ChiSquaredColumn>,
    f: Vec<FPage>,
}

/// Validate a grid axis is non-empty, positive and strictly increasing.
fn validate_axis(axis: &[f64], name: &str) -> Result<()> {
    if axis.is_empty() {
        return Err(StatError::InvalidParameter(format!("{} axis is empty", name)));
    }
    for &df in axis {
        check_degrees_of_freedom(df, name)
            .map_err(|_| StatError::InvalidParameter(format!("{} axis holds {}", name, df)))?;
    }
    if axis.windows(2).any(|w| w[1] <= w[0]) {
        return Err(StatError::InvalidParameter(format!(
            "{} axis must be strictly increasing",
            name
        )));
    }
    Ok(())
}

fn validate_values(values: &[f64]) -> Result<()> {
    if let Some(v) = values.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
        return Err(StatError::InvalidParameter(format!(
            "critical values must be finite and positive, got {}",
            v
        )));
    }
    Ok(())
}

/// Locate `x` on `axis`: the bracketing indices and the interpolation weight of the upper one.
fn bracket(axis: &[f64], x: f64, name: &str) -> Result<(usize, usize, f64)> {
    let first = axis[0];
    let last = axis[axis.len() - 1];
    if x < first || x > last {
        return Err(StatError::UnsupportedDegreesOfFreedom(format!(
            "{} = {} outside tabulated range [{}, {}]",
            name, x, first, last
        )));
    }

    let upper = axis.iter().position(|&d| d >= x).unwrap_or(axis.len() - 1);
    if axis[upper] == x || upper == 0 {
        return Ok((upper, upper, 0.0));
    }
    let lower = upper - 1;
    let weight = (x - axis[lower]) / (axis[upper] - axis[lower]);
    Ok((lower, upper, weight))
}

#[inline]
fn lerp(a: f64, b: f64, weight: f64) -> f64 {
    a + (b - a) * weight
}

fn alpha_matches(tabulated: f64, alpha: f64) -> bool {
    (tabulated - alpha).abs() < ALPHA_TOLERANCE
}

impl CriticalValueTable {
    /// An empty table; every lookup fails until columns are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// The classic chi-squared table for alpha 0.05 and 0.01, df 1 to 30.
    pub fn chi_squared_standard() -> Self {
        let df: Vec<f64> = (1..=30).map(|d| d as f64).collect();
        Self {
            chi_squared: vec![
                ChiSquaredColumn {
                    alpha: 0.05,
                    df: df.clone(),
                    values: CHI_SQUARED_05.to_vec(),
                },
                ChiSquaredColumn {
                    alpha: 0.01,
                    df,
                    values: CHI_SQUARED_01.to_vec(),
                },
            ],
            f: Vec::new(),
        }
    }

    /// Add (or replace) the chi-squared column for `alpha`.
    ///
    /// # Arguments
    /// * `alpha` - Upper-tail probability the column is for
    /// * `rows` - `(df, critical value)` pairs in strictly increasing df order
    pub fn with_chi_squared(mut self, alpha: f64, rows: &[(f64, f64)]) -> Result<Self> {
        validate_significance(alpha)?;
        let df: Vec<f64> = rows.iter().map(|r| r.0).collect();
        let values: Vec<f64> = rows.iter().map(|r| r.1).collect();
        validate_axis(&df, "df")?;
        validate_values(&values)?;

        self.chi_squared.retain(|c| !alpha_matches(c.alpha, alpha));
        self.chi_squared.push(ChiSquaredColumn { alpha, df, values });
        Ok(self)
    }

    /// Add (or replace) the F page for `alpha`.
    ///
    /// # Arguments
    /// * `alpha` - Upper-tail probability the page is for
    /// * `df1` - Numerator degrees of freedom, strictly increasing
    /// * `df2` - Denominator degrees of freedom, strictly increasing
    /// * `values` - One row per `df1` entry, each with one value per `df2` entry
    pub fn with_f(
        mut self,
        alpha: f64,
        df1: &[f64],
        df2: &[f64],
        values: Vec<Vec<f64>>,
    ) -> Result<Self> {
        validate_significance(alpha)?;
        validate_axis(df1, "df1")?;
        validate_axis(df2, "df2")?;
        if values.len() != df1.len() {
            return Err(StatError::LengthMismatch {
                expected: df1.len(),
                actual: values.len(),
            });
        }
        for row in &values {
            if row.len() != df2.len() {
                return Err(StatError::LengthMismatch {
                    expected: df2.len(),
                    actual: row.len(),
                });
            }
            validate_values(row)?;
        }

        self.f.retain(|p| !alpha_matches(p.alpha, alpha));
        self.f.push(FPage {
            alpha,
            df1: df1.to_vec(),
            df2: df2.to_vec(),
            values,
        });
        Ok(self)
    }
}

impl CriticalValueSource for CriticalValueTable {
    fn f_critical(&self, df1: f64, df2: f64, alpha: f64) -> Result<f64> {
        validate_significance(alpha)?;
        check_degrees_of_freedom(df1, "df1")?;
        check_degrees_of_freedom(df2, "df2")?;

        let page = self
            .f
            .iter()
            .find(|p| alpha_matches(p.alpha, alpha))
            .ok_or(StatError::UnsupportedSignificance(alpha))?;

        let (i0, i1, wi) = bracket(&page.df1, df1, "df1")?;
        let (j0, j1, wj) = bracket(&page.df2, df2, "df2")?;

        let low = lerp(page.values[i0][j0], page.values[i0][j1], wj);
        let high = lerp(page.values[i1][j0], page.values[i1][j1], wj);
        Ok(lerp(low, high, wi))
    }

    fn chi_squared_critical(&self, df: f64, alpha: f64) -> Result<f64> {
        validate_significance(alpha)?;
        check_degrees_of_freedom(df, "df")?;

        let column = self
            .chi_squared
            .iter()
            .find(|c| alpha_matches(c.alpha, alpha))
            .ok_or(StatError::UnsupportedSignificance(alpha))?;

        let (i0, i1, w) = bracket(&column.df, df, "df")?;
        Ok(lerp(column.values[i0], column.values[i1], w))
    }
}
