use chrono::{TimeZone, Utc};
use quotefeed_rs::{Frequency, QfError, SampleIndex};

#[test]
fn business_days_skip_weekends() {
    // Fri 2013-05-31 .. Tue 2013-06-04
    let idx = SampleIndex::date_range(
        Utc.with_ymd_and_hms(2013, 5, 31, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2013, 6, 4, 0, 0, 0).unwrap(),
        Frequency::business_daily(),
    )
    .unwrap();
    assert_eq!(idx.len(), 3);
    assert_eq!(idx.span_days(), 4);
    assert_eq!(idx.last(), Utc.with_ymd_and_hms(2013, 6, 4, 0, 0, 0).unwrap());
}

#[test]
fn minute_range_is_inclusive() {
    let idx = SampleIndex::date_range(
        Utc.with_ymd_and_hms(2013, 5, 31, 13, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2013, 5, 31, 14, 30, 0).unwrap(),
        Frequency::minutes(5),
    )
    .unwrap();
    assert_eq!(idx.len(), 13);
    assert_eq!(idx.span_days(), 0);
}

#[test]
fn rejects_empty_and_unordered_grids() {
    let t0 = Utc.with_ymd_and_hms(2013, 1, 2, 0, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2013, 1, 3, 0, 0, 0).unwrap();
    assert!(matches!(
        SampleIndex::new(vec![], Frequency::daily()),
        Err(QfError::InvalidParams(_))
    ));
    assert!(matches!(
        SampleIndex::new(vec![t1, t0], Frequency::daily()),
        Err(QfError::InvalidParams(_))
    ));
    assert!(matches!(
        SampleIndex::date_range(t1, t0, Frequency::daily()),
        Err(QfError::InvalidParams(_))
    ));
}

#[test]
fn zero_step_range_is_rejected() {
    let start = Utc.with_ymd_and_hms(2013, 5, 31, 13, 30, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2013, 5, 31, 14, 30, 0).unwrap();
    for freq in [Frequency::minutes(0), Frequency::new(0, "D")] {
        match SampleIndex::date_range(start, end, freq.clone()) {
            Err(QfError::InvalidParams(_)) => {}
            other => panic!("expected InvalidParams for {freq}, got {other:?}"),
        }
    }
}
