use std::fs;

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use rungraph_core::cache::{merge_heart_rates, merge_runs};
use rungraph_core::storage::{runs_from_table, runs_to_table};
use rungraph_core::{
    check_cache, CacheState, CacheStore, HeartRateSample, HeartRateSeries, Run, RunGraphError,
    Schema,
};

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 11, day).unwrap()
}

fn run(day: u32, hour: u32, distance: f64) -> Run {
    Run {
        date: d(day),
        start: NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(hour, 27, 30).unwrap(),
        distance,
        duration: 27.5,
        pace: 27.5 / distance,
        speed: 60.0 * distance / 27.5,
        avg_hr: 141.3,
        max_hr: 166.0,
        energy: 312.0,
        temperature: 48.2,
        humidity: 66.0,
        indoor: hour > 12,
        elevation: if hour > 12 { None } else { Some(25.4) },
    }
}

fn hr(day: u32, h: u32, m: u32, value: f64) -> HeartRateSample {
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    HeartRateSample {
        timestamp: tz.with_ymd_and_hms(2021, 11, day, h, m, 0).unwrap(),
        value,
        unit: "count/min".into(),
    }
}

fn sample_tables() -> (HeartRateSeries, Vec<Run>) {
    let series = HeartRateSeries::from_samples(vec![hr(11, 8, 5, 120.0), hr(11, 8, 15, 140.5)]);
    (series, vec![run(11, 8, 3.1), run(12, 18, 5.0)])
}

#[test]
fn marker_from_today_is_fresh_and_tables_reload_identically() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let (series, runs) = sample_tables();

    store.save(&series, &runs, d(13)).unwrap();
    assert_eq!(check_cache(&store, d(13)), CacheState::Fresh);

    let (loaded_hr, loaded_runs) = store.load().unwrap();
    assert_eq!(loaded_hr, series);
    assert_eq!(loaded_runs, runs);
}

#[test]
fn marker_from_another_day_is_stale() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let (series, runs) = sample_tables();
    store.save(&series, &runs, d(12)).unwrap();
    assert_eq!(check_cache(&store, d(13)), CacheState::Stale);
}

#[test]
fn no_marker_is_stale() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path().join("never_written"));
    assert_eq!(check_cache(&store, d(13)), CacheState::Stale);
    assert_eq!(store.read_marker().unwrap(), None);
}

#[test]
fn corrupt_marker_is_reported_but_treated_as_stale() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let (series, runs) = sample_tables();
    store.save(&series, &runs, d(13)).unwrap();
    fs::write(store.marker_path(), "thirteenth of november").unwrap();

    assert!(matches!(
        store.read_marker(),
        Err(RunGraphError::CacheCorruption { .. })
    ));
    assert_eq!(check_cache(&store, d(13)), CacheState::Stale);
}

#[test]
fn unpadded_marker_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let (series, runs) = sample_tables();
    store.save(&series, &runs, d(1)).unwrap();
    fs::write(store.marker_path(), "2021-11-3\n").unwrap();
    assert_eq!(check_cache(&store, d(3)), CacheState::Fresh);
}

#[test]
fn marker_without_tables_is_stale() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    fs::write(store.marker_path(), "2021-11-13").unwrap();
    assert_eq!(check_cache(&store, d(13)), CacheState::Stale);
}

#[test]
fn save_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let (series, runs) = sample_tables();
    store.save(&series, &runs, d(13)).unwrap();

    let mut names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names, vec!["as_of.txt", "heart_rates.csv", "runs.csv"]);
    assert_eq!(fs::read_to_string(store.marker_path()).unwrap(), "2021-11-13");
}

#[test]
fn persisted_runs_table_round_trips_per_cell() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let (series, runs) = sample_tables();
    store.save(&series, &runs, d(13)).unwrap();

    let loaded = store.load_table(Schema::Runs).unwrap();
    let before = runs_to_table(&runs);
    assert_eq!(loaded.columns, before.columns);
    assert_eq!(runs_from_table(&loaded).unwrap(), runs);
    for (a, b) in loaded.rows.iter().zip(&before.rows) {
        for (ca, cb) in a.iter().zip(b) {
            assert_eq!(ca.to_string(), cb.to_string());
        }
    }
}

#[test]
fn merge_keeps_new_rows_and_adds_missing_old_ones() {
    let new_runs = vec![run(12, 18, 6.0)];
    let old_runs = vec![run(11, 8, 3.1), run(12, 18, 5.0)];
    let merged = merge_runs(new_runs, old_runs);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].date, d(11));
    assert_eq!(merged[1].distance, 6.0);

    let new_hr = HeartRateSeries::from_samples(vec![hr(11, 8, 15, 150.0)]);
    let old_hr = HeartRateSeries::from_samples(vec![hr(11, 8, 5, 120.0), hr(11, 8, 15, 140.0)]);
    let merged = merge_heart_rates(new_hr, old_hr);
    let values: Vec<f64> = merged.iter().map(|s| s.value).collect();
    assert_eq!(values, vec![120.0, 150.0]);
}

#[test]
fn persisted_headers_match_model_fields() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let (series, runs) = sample_tables();
    store.save(&series, &runs, d(13)).unwrap();

    let hr_csv = fs::read_to_string(store.heart_rates_path()).unwrap();
    assert_eq!(hr_csv.lines().next(), Some("timestamp,value,unit"));
    let runs_csv = fs::read_to_string(store.runs_path()).unwrap();
    assert_eq!(
        runs_csv.lines().next(),
        Some("date,start,end,distance,duration,pace,speed,avg_hr,max_hr,energy,temperature,humidity,indoor,elevation")
    );
}
