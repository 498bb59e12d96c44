use crate::error::{CarbonaraError, CarbonaraResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The bucket width of an aggregated series, held as a whole number of
/// nanoseconds rather than a binary float. Fractional-second inputs such as
/// `0.2s` are multiplied up front, never divided at alignment time, so bucket
/// boundaries never drift.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Granularity(i64);

impl Granularity {
    pub fn from_nanos(nanos: i64) -> CarbonaraResult<Self> {
        if nanos <= 0 {
            return Err(CarbonaraError::InvalidDuration {
                input: format!("{nanos}ns"),
            });
        }
        Ok(Granularity(nanos))
    }

    pub fn from_seconds_f64(seconds: f64) -> CarbonaraResult<Self> {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(CarbonaraError::InvalidDuration {
                input: format!("{seconds}"),
            });
        }
        let nanos = (seconds * 1_000_000_000.0).round() as i64;
        Granularity::from_nanos(nanos)
    }

    pub fn nanos(&self) -> i64 {
        self.0
    }

    pub fn seconds_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }
}

impl fmt::Debug for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.seconds_f64())
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.seconds_f64();
        if secs.fract() == 0.0 {
            write!(f, "{}s", secs as i64)
        } else {
            write!(f, "{secs}s")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive() {
        assert!(Granularity::from_seconds_f64(0.0).is_err());
        assert!(Granularity::from_seconds_f64(-1.0).is_err());
    }

    #[test]
    fn preserves_fractional_seconds_exactly() {
        let g = Granularity::from_seconds_f64(0.5).unwrap();
        assert_eq!(g.nanos(), 500_000_000);
    }
}
