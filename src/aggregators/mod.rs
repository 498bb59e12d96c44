mod percentile;

use crate::error::{CarbonaraError, CarbonaraResult};
use percentile::{median, percentile, sample_std_dev};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of aggregation methods a bucket can be reduced with.
/// Reductions are always recomputed from the full set of raw values
/// currently in the bucket rather than updated incrementally, so that a
/// method like a percentile never accumulates the error an incremental
/// approximation would introduce.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum AggregationMethod {
    Mean,
    Sum,
    Min,
    Max,
    Median,
    Std,
    Count,
    First,
    Last,
    /// `Npct`, N held verbatim so invalid percentiles (outside `(0,100)`)
    /// are rejected lazily, the first time the method is exercised against
    /// data, rather than at parse time.
    Percentile(i32),
}

impl AggregationMethod {
    pub fn parse(name: &str) -> Option<Self> {
        if let Some(m) = hashify::tiny_map_ignore_case! {
            name.as_bytes(),
            "mean" => AggregationMethod::Mean,
            "avg" => AggregationMethod::Mean,
            "sum" => AggregationMethod::Sum,
            "min" => AggregationMethod::Min,
            "max" => AggregationMethod::Max,
            "median" => AggregationMethod::Median,
            "std" => AggregationMethod::Std,
            "count" => AggregationMethod::Count,
            "first" => AggregationMethod::First,
            "last" => AggregationMethod::Last,
        } {
            return Some(m);
        }
        let lower = name.to_ascii_lowercase();
        let digits = lower.strip_suffix("pct")?;
        let n: i32 = digits.parse().ok()?;
        Some(AggregationMethod::Percentile(n))
    }

    pub fn name(&self) -> String {
        match self {
            AggregationMethod::Mean => "mean".to_string(),
            AggregationMethod::Sum => "sum".to_string(),
            AggregationMethod::Min => "min".to_string(),
            AggregationMethod::Max => "max".to_string(),
            AggregationMethod::Median => "median".to_string(),
            AggregationMethod::Std => "std".to_string(),
            AggregationMethod::Count => "count".to_string(),
            AggregationMethod::First => "first".to_string(),
            AggregationMethod::Last => "last".to_string(),
            AggregationMethod::Percentile(n) => format!("{n}pct"),
        }
    }

    /// Reduce the raw values currently in a bucket to a single aggregate.
    /// `values` need not be sorted; callers pass a private scratch buffer.
    pub fn reduce(&self, values: &mut [f64]) -> CarbonaraResult<f64> {
        debug_assert!(!values.is_empty(), "buckets with zero samples never exist");
        let result = match self {
            AggregationMethod::Mean => values.iter().sum::<f64>() / values.len() as f64,
            AggregationMethod::Sum => values.iter().sum(),
            AggregationMethod::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
            AggregationMethod::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            AggregationMethod::Median => median(values),
            AggregationMethod::Std => sample_std_dev(values),
            AggregationMethod::Count => values.len() as f64,
            AggregationMethod::First => values[0],
            AggregationMethod::Last => values[values.len() - 1],
            AggregationMethod::Percentile(n) => {
                if *n <= 0 || *n >= 100 {
                    return Err(CarbonaraError::InvalidAggregationMethod {
                        name: format!("{n}pct"),
                    });
                }
                percentile(values, *n as f64)
            }
        };
        Ok(result)
    }
}

impl fmt::Display for AggregationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<&str> for AggregationMethod {
    type Error = CarbonaraError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        AggregationMethod::parse(value).ok_or_else(|| CarbonaraError::InvalidAggregationMethod {
            name: value.to_string(),
        })
    }
}
