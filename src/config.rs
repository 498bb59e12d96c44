//! Ambient defaults for the few knobs the engine exposes to a caller. This
//! crate has no configuration *registration* surface of its own (that lives
//! in whatever service embeds it); these are just the constants a caller
//! reaches for when building an archive or calling the cross-archive
//! operator without overriding anything.

use crate::aggregators::AggregationMethod;

/// Aggregation method used when a caller does not specify one.
pub const DEFAULT_AGGREGATION_METHOD: AggregationMethod = AggregationMethod::Mean;

/// `back_window` used by `BoundTimeSerie::new` when a caller does not
/// specify one directly (note `TimeSerieArchive::from_definitions` always
/// derives `0` itself; this constant is for direct `BoundTimeSerie` use).
pub const DEFAULT_BACK_WINDOW: u32 = 0;

/// Minimum percent overlap required by the cross-archive `aggregated`
/// operator when a caller does not specify a threshold.
pub const DEFAULT_NEEDED_PERCENT_OF_OVERLAP: f64 = 100.0;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_behavior() {
        assert_eq!(DEFAULT_AGGREGATION_METHOD, AggregationMethod::Mean);
        assert_eq!(DEFAULT_BACK_WINDOW, 0);
        assert_eq!(DEFAULT_NEEDED_PERCENT_OF_OVERLAP, 100.0);
    }
}
