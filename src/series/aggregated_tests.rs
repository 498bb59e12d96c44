use super::*;
use crate::aggregators::AggregationMethod;
use chrono::NaiveDate;

fn ts(h: u32, m: u32, s: u32) -> Timestamp {
    Timestamp::from_naive_datetime(
        NaiveDate::from_ymd_opt(2014, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap(),
    )
}

fn gran(secs: f64) -> Granularity {
    Granularity::from_seconds_f64(secs).unwrap()
}

#[test]
fn max_size_evicts_oldest_bucket() {
    let mut series = AggregatedTimeSerie::new(gran(1.0), AggregationMethod::Mean, Some(2));
    series
        .set_values([
            (ts(12, 0, 0), [3.0].as_slice()),
            (ts(12, 0, 4), [5.0].as_slice()),
            (ts(12, 0, 9), [6.0].as_slice()),
        ])
        .unwrap();
    assert_eq!(series.len(), 2);
    let fetched = series.fetch(None, None);
    assert_eq!(fetched, vec![(ts(12, 0, 4), 5.0), (ts(12, 0, 9), 6.0)]);
}

#[test]
fn down_samples_into_one_bucket() {
    let mut series = AggregatedTimeSerie::new(gran(300.0), AggregationMethod::Mean, None);
    series
        .set_values([(ts(12, 0, 0), [3.0, 5.0, 7.0].as_slice())])
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series.fetch(None, None), vec![(ts(12, 0, 0), 5.0)]);
}

#[test]
fn down_sampling_with_max_size() {
    let mut series = AggregatedTimeSerie::new(gran(60.0), AggregationMethod::Mean, Some(2));
    series
        .set_values([
            (ts(12, 0, 0), [3.0].as_slice()),
            (ts(12, 1, 0), [5.0, 7.0].as_slice()),
            (ts(12, 2, 0), [1.0].as_slice()),
        ])
        .unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(
        series.fetch(None, None),
        vec![(ts(12, 1, 0), 6.0), (ts(12, 2, 0), 1.0)]
    );
}

#[test]
fn down_sampling_with_max_and_method_max() {
    let mut series = AggregatedTimeSerie::new(gran(60.0), AggregationMethod::Max, Some(2));
    series
        .set_values([
            (ts(12, 0, 0), [3.0].as_slice()),
            (ts(12, 1, 0), [5.0, 70.0].as_slice()),
            (ts(12, 2, 0), [1.0].as_slice()),
        ])
        .unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(
        series.fetch(None, None),
        vec![(ts(12, 1, 0), 70.0), (ts(12, 2, 0), 1.0)]
    );
}

#[test]
fn percentile_74_matches_reference() {
    let mut series =
        AggregatedTimeSerie::new(gran(60.0), AggregationMethod::Percentile(74), None);
    series
        .set_values([(ts(12, 0, 0), [3.0, 5.0, 6.0].as_slice())])
        .unwrap();
    assert_eq!(series.fetch(None, None), vec![(ts(12, 0, 0), 5.48)]);
}

#[test]
fn percentile_95_matches_reference() {
    let mut series =
        AggregatedTimeSerie::new(gran(60.0), AggregationMethod::Percentile(95), None);
    series
        .set_values([(ts(12, 0, 0), [3.0, 5.0, 6.0].as_slice())])
        .unwrap();
    let got = series.fetch(None, None);
    assert_eq!(got.len(), 1);
    assert!((got[0].1 - 5.9000000000000004).abs() < 1e-9);
}

#[test]
fn invalid_percentile_rejected_lazily() {
    let mut series =
        AggregatedTimeSerie::new(gran(60.0), AggregationMethod::Percentile(0), None);
    let err = series
        .set_values([(ts(12, 0, 0), [3.0, 5.0, 6.0].as_slice())])
        .unwrap_err();
    assert!(matches!(
        err,
        crate::error::CarbonaraError::InvalidAggregationMethod { .. }
    ));
}
