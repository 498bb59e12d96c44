use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A point in time with nanosecond resolution, stored as a signed count of
/// nanoseconds since the Unix epoch. Kept as an integer (never a binary
/// float) so that bucket alignment against a `Granularity` is exact.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const MIN: Timestamp = Timestamp(i64::MIN);
    pub const MAX: Timestamp = Timestamp(i64::MAX);

    pub fn from_nanos(nanos: i64) -> Self {
        Timestamp(nanos)
    }

    pub fn nanos(&self) -> i64 {
        self.0
    }

    pub fn from_seconds_f64(seconds: f64) -> Self {
        Timestamp((seconds * 1_000_000_000.0).round() as i64)
    }

    pub fn seconds_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// The start of the bucket of width `granularity` that contains `self`.
    pub fn bucket_start(&self, granularity: Granularity) -> Timestamp {
        let g = granularity.nanos();
        let n = self.0;
        let rem = n.rem_euclid(g);
        Timestamp(n - rem)
    }

    pub fn to_naive_datetime(&self) -> NaiveDateTime {
        let secs = self.0.div_euclid(1_000_000_000);
        let nanos = self.0.rem_euclid(1_000_000_000) as u32;
        DateTime::<Utc>::from_timestamp(secs, nanos)
            .expect("timestamp out of range")
            .naive_utc()
    }

    pub fn from_naive_datetime(dt: NaiveDateTime) -> Self {
        let secs = dt.and_utc().timestamp();
        let nanos = dt.and_utc().timestamp_subsec_nanos();
        Timestamp(secs * 1_000_000_000 + nanos as i64)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_naive_datetime())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dt = self.to_naive_datetime();
        if self.0 % 1_000_000_000 == 0 {
            write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
        } else if self.0 % 1_000_000 == 0 {
            write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.3f"))
        } else {
            write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.6f"))
        }
    }
}

impl Add<Granularity> for Timestamp {
    type Output = Timestamp;
    fn add(self, rhs: Granularity) -> Timestamp {
        Timestamp(self.0 + rhs.nanos())
    }
}

impl Sub<Granularity> for Timestamp {
    type Output = Timestamp;
    fn sub(self, rhs: Granularity) -> Timestamp {
        Timestamp(self.0 - rhs.nanos())
    }
}

use crate::common::Granularity;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_start_aligns_down() {
        let g = Granularity::from_seconds_f64(60.0).unwrap();
        let ts = Timestamp::from_seconds_f64(125.0);
        assert_eq!(ts.bucket_start(g).seconds_f64(), 120.0);
    }

    #[test]
    fn bucket_start_exact_on_fractional_granularity() {
        let g = Granularity::from_seconds_f64(0.2).unwrap();
        let ts = Timestamp::from_nanos(600_000_000);
        assert_eq!(ts.bucket_start(g).nanos(), 600_000_000);
    }

    #[test]
    fn display_renders_matching_precision() {
        let ts = Timestamp::from_naive_datetime(
            chrono::NaiveDate::from_ymd_opt(2014, 1, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        assert_eq!(format!("{}", ts), "2014-01-01 12:00:00");
    }
}
