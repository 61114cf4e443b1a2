use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use rungraph_core::types::RawRecord;
use rungraph_core::{
    extract_heart_rates, AggregateMode, HeartRateSample, HeartRateSeries, HrAggregate,
    RunGraphError, RunWindow,
};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 11, 11).unwrap()
}

fn sample(h: u32, m: u32, value: f64) -> HeartRateSample {
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    HeartRateSample {
        timestamp: tz.with_ymd_and_hms(2021, 11, 11, h, m, 0).unwrap(),
        value,
        unit: "count/min".to_string(),
    }
}

fn window(start: (u32, u32), end: (u32, u32)) -> RunWindow {
    RunWindow {
        date: day(),
        start: NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap(),
        end: NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap(),
    }
}

fn series() -> HeartRateSeries {
    HeartRateSeries::from_samples(vec![
        sample(11, 1, 175.0),
        sample(10, 0, 110.0),
        sample(10, 30, 150.0),
        sample(9, 59, 100.0),
        sample(11, 0, 170.0),
    ])
}

#[test]
fn only_samples_strictly_inside_window_count() {
    let hr = series();
    let w = window((10, 0), (11, 0));

    for mode in [AggregateMode::Max, AggregateMode::Mean, AggregateMode::Median] {
        assert_eq!(hr.find_hr(&w, mode), HrAggregate::Value(150.0), "{mode:?}");
    }
    match hr.find_hr(&w, AggregateMode::All) {
        HrAggregate::Samples(s) => {
            assert_eq!(s.len(), 1);
            assert_eq!(s[0].value, 150.0);
        }
        other => panic!("forventet prøver, fikk {other:?}"),
    }
}

#[test]
fn empty_window_gives_nan() {
    let hr = series();
    let w = window((12, 0), (13, 0));
    assert!(hr.find_hr(&w, AggregateMode::Max).value().unwrap().is_nan());
    assert!(hr.find_hr(&w, AggregateMode::Mean).value().unwrap().is_nan());
    assert!(hr.find_hr(&w, AggregateMode::Median).value().unwrap().is_nan());
}

#[test]
fn median_averages_middle_pair() {
    let hr = HeartRateSeries::from_samples(vec![
        sample(10, 10, 120.0),
        sample(10, 20, 140.0),
        sample(10, 30, 160.0),
        sample(10, 40, 100.0),
    ]);
    let w = window((10, 0), (11, 0));
    assert_eq!(hr.find_hr(&w, AggregateMode::Median).value(), Some(130.0));
    assert_eq!(hr.find_hr(&w, AggregateMode::Mean).value(), Some(130.0));
    assert_eq!(hr.find_hr(&w, AggregateMode::Max).value(), Some(160.0));
}

#[test]
fn window_crossing_midnight_reaches_next_date() {
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    let late = HeartRateSample {
        timestamp: tz.with_ymd_and_hms(2021, 11, 11, 23, 50, 0).unwrap(),
        value: 130.0,
        unit: "count/min".into(),
    };
    let after_midnight = HeartRateSample {
        timestamp: tz.with_ymd_and_hms(2021, 11, 12, 0, 10, 0).unwrap(),
        value: 150.0,
        unit: "count/min".into(),
    };
    let hr = HeartRateSeries::from_samples(vec![late, after_midnight]);
    let w = window((23, 40), (0, 20));
    assert!(w.crosses_midnight());
    assert_eq!(hr.find_hr(&w, AggregateMode::Max).value(), Some(150.0));
    assert_eq!(hr.find_hr(&w, AggregateMode::Mean).value(), Some(140.0));
}

#[test]
fn invalid_mode_is_rejected() {
    let err = "average".parse::<AggregateMode>().unwrap_err();
    assert!(matches!(err, RunGraphError::InvalidArgument(ref m) if m == "average"));
    assert_eq!("median".parse::<AggregateMode>().unwrap(), AggregateMode::Median);
}

fn record(pairs: &[(&str, &str)]) -> RawRecord {
    RawRecord {
        attributes: pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

#[test]
fn extraction_sorts_and_keeps_wall_clock() {
    let records = vec![
        record(&[("endDate", "2021-11-11 08:15:00 -0500"), ("value", "140"), ("unit", "count/min")]),
        record(&[("endDate", "2021-11-11 08:05:00 -0500"), ("value", "120"), ("unit", "count/min")]),
    ];
    let hr = extract_heart_rates(&records).unwrap();
    let values: Vec<f64> = hr.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![120.0, 140.0]);
    assert_eq!(hr.as_slice()[0].local().time(), NaiveTime::from_hms_opt(8, 5, 0).unwrap());
}

#[test]
fn missing_value_is_malformed_record() {
    let records = vec![record(&[("endDate", "2021-11-11 08:15:00 -0500"), ("unit", "count/min")])];
    let err = extract_heart_rates(&records).unwrap_err();
    assert!(matches!(err, RunGraphError::MalformedRecord { ref field, .. } if field == "value"));
}

#[test]
fn non_numeric_value_is_parse_error() {
    let records = vec![record(&[
        ("endDate", "2021-11-11 08:15:00 -0500"),
        ("value", "fast"),
        ("unit", "count/min"),
    ])];
    assert!(matches!(
        extract_heart_rates(&records),
        Err(RunGraphError::Parse { .. })
    ));
}
