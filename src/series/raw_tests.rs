use super::*;
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
fn construction_alone_does_not_panic() {
    let series = BoundTimeSerie::new(
        vec![
            Sample::new(ts(12, 0, 0), 3.0),
            Sample::new(ts(12, 0, 4), 5.0),
            Sample::new(ts(12, 0, 9), 6.0),
        ],
        None,
        0,
    )
    .unwrap();
    assert_eq!(series.len(), 3);
}

#[test]
fn block_size_prunes_to_current_block() {
    let mut series = BoundTimeSerie::new(
        vec![
            Sample::new(ts(12, 0, 0), 3.0),
            Sample::new(ts(12, 0, 4), 5.0),
            Sample::new(ts(12, 0, 9), 6.0),
        ],
        Some(gran(5.0)),
        0,
    )
    .unwrap();
    assert_eq!(series.len(), 1);

    series
        .set_values(&[Sample::new(ts(12, 0, 10), 3.0), Sample::new(ts(12, 0, 11), 4.0)])
        .unwrap();
    assert_eq!(series.len(), 2);
}

#[test]
fn back_window_retains_one_extra_block() {
    let mut series = BoundTimeSerie::new(
        vec![
            Sample::new(ts(12, 0, 0), 3.0),
            Sample::new(ts(12, 0, 4), 5.0),
            Sample::new(ts(12, 0, 9), 6.0),
        ],
        Some(gran(5.0)),
        1,
    )
    .unwrap();
    assert_eq!(series.len(), 3);

    series
        .set_values(&[Sample::new(ts(12, 0, 10), 3.0), Sample::new(ts(12, 0, 11), 4.0)])
        .unwrap();
    assert_eq!(series.len(), 3);
}

#[test]
fn set_values_accepts_unordered_batches() {
    let mut series = BoundTimeSerie::new(
        vec![
            Sample::new(ts(12, 0, 0), 10.0),
            Sample::new(ts(12, 0, 9), 5.0),
            Sample::new(ts(12, 0, 5), 23.0),
        ],
        Some(gran(5.0)),
        0,
    )
    .unwrap();
    assert_eq!(series.len(), 2);

    series
        .set_values(&[Sample::new(ts(12, 0, 11), 3.0), Sample::new(ts(12, 0, 10), 4.0)])
        .unwrap();
    assert_eq!(series.len(), 2);
}

#[test]
fn from_data_rejects_mismatched_lengths() {
    let timestamps = [ts(12, 0, 0), ts(12, 0, 1)];
    let values = [1.0];
    let err = BoundTimeSerie::from_data(&timestamps, &values, None, 0).unwrap_err();
    match err {
        CarbonaraError::LengthMismatch { timestamps, values } => {
            assert_eq!(timestamps, 2);
            assert_eq!(values, 1);
        }
        other => panic!("expected LengthMismatch, got {other:?}"),
    }
}

#[test]
fn from_data_pairs_timestamps_and_values_in_order() {
    let timestamps = [ts(12, 0, 0), ts(12, 0, 5)];
    let values = [1.0, 2.0];
    let series = BoundTimeSerie::from_data(&timestamps, &values, None, 0).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.first().unwrap().value, 1.0);
    assert_eq!(series.last().unwrap().value, 2.0);
}

#[test]
fn back_window_violation_reports_exact_timestamps() {
    let mut series = BoundTimeSerie::new(vec![], Some(gran(1.0)), 0).unwrap();
    series
        .set_values(&[
            Sample::new(
                Timestamp::from_nanos(ts(12, 0, 1).nanos() + 2_300_000),
                1.0,
            ),
            Sample::new(
                Timestamp::from_nanos(ts(12, 0, 1).nanos() + 4_600_000),
                2.0,
            ),
            Sample::new(
                Timestamp::from_nanos(ts(12, 0, 2).nanos() + 4_500_000),
                3.0,
            ),
            Sample::new(
                Timestamp::from_nanos(ts(12, 0, 2).nanos() + 7_800_000),
                4.0,
            ),
            Sample::new(Timestamp::from_nanos(ts(12, 0, 3).nanos() + 8_000), 2.5),
        ])
        .unwrap();

    let bad = Timestamp::from_nanos(ts(12, 0, 2).nanos() + 99_000);
    let err = series.set_values(&[Sample::new(bad, 9.0)]).unwrap_err();
    match err {
        CarbonaraError::BackWindowViolation {
            bad_timestamp,
            first_timestamp,
        } => {
            assert_eq!(bad_timestamp, bad);
            assert_eq!(first_timestamp, ts(12, 0, 3));
        }
        other => panic!("expected BackWindowViolation, got {other:?}"),
    }
}
