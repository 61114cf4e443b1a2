use std::cell::RefCell;
use std::fs;

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use rungraph_core::plot::{heart_rate_chart, runs_chart, AxisKind, DEFAULT_HOVER};
use rungraph_core::{
    ChartHandle, HeartRateSample, OutputMode, Result, Run, RunColumn, RunGraphError, ScatterChart,
    ScatterRenderer, SvgRenderer,
};

fn run(day: u32, pace: f64, avg_hr: f64) -> Run {
    Run {
        date: NaiveDate::from_ymd_opt(2021, 11, day).unwrap(),
        start: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        end: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        distance: 30.0 / pace,
        duration: 30.0,
        pace,
        speed: 60.0 / pace,
        avg_hr,
        max_hr: avg_hr + 15.0,
        energy: 300.0,
        temperature: 50.0,
        humidity: 65.0,
        indoor: false,
        elevation: None,
    }
}

/// Samler figurene i stedet for å tegne dem.
#[derive(Default)]
struct Recorder {
    charts: RefCell<Vec<ScatterChart>>,
}

impl ScatterRenderer for Recorder {
    fn render_scatter(&self, chart: &ScatterChart) -> Result<ChartHandle> {
        self.charts.borrow_mut().push(chart.clone());
        Ok(ChartHandle {
            path: format!("{}.mem", chart.name).into(),
            points: chart.points.len(),
        })
    }
}

#[test]
fn pace_axis_is_reversed_and_points_follow_rows() {
    let runs = vec![run(11, 9.0, 140.0), run(12, 8.0, f64::NAN)];
    let chart = runs_chart(
        &runs,
        RunColumn::Pace,
        RunColumn::AvgHr,
        RunColumn::Distance,
        &DEFAULT_HOVER,
    );
    assert!(chart.reverse_y);
    assert_eq!(chart.x_kind, AxisKind::Date);
    assert_eq!(chart.name, "runs_pace");
    assert_eq!(chart.points.len(), 2);
    assert_eq!(chart.points[0].y, 9.0);
    assert_eq!(chart.points[0].color, Some(140.0));
    assert_eq!(chart.hover_columns.len(), DEFAULT_HOVER.len());
    assert_eq!(chart.points[0].hover[0], "2021-11-11");

    let speed = runs_chart(&runs, RunColumn::Speed, RunColumn::AvgHr, RunColumn::Distance, &[]);
    assert!(!speed.reverse_y);
}

#[test]
fn heart_rate_chart_uses_seconds_from_run_midnight() {
    let r = run(11, 9.0, 140.0);
    let tz = FixedOffset::west_opt(5 * 3600).unwrap();
    let s = HeartRateSample {
        timestamp: tz.with_ymd_and_hms(2021, 11, 11, 8, 15, 0).unwrap(),
        value: 142.0,
        unit: "count/min".into(),
    };
    let chart = heart_rate_chart(&r, &[&s]);
    assert_eq!(chart.x_kind, AxisKind::TimeOfDay);
    assert_eq!(chart.points[0].x, 8.0 * 3600.0 + 15.0 * 60.0);
    assert_eq!(chart.points[0].y, 142.0);
    assert_eq!(chart.fixed_color, Some((220, 20, 20)));
}

#[test]
fn renderer_is_a_seam() {
    let recorder = Recorder::default();
    let runs = vec![run(11, 9.0, 140.0)];
    let chart = runs_chart(&runs, RunColumn::Pace, RunColumn::AvgHr, RunColumn::Distance, &[]);
    let handle = recorder.render_scatter(&chart).unwrap();
    assert_eq!(handle.points, 1);
    assert_eq!(recorder.charts.borrow()[0], chart);
}

#[test]
fn static_mode_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = SvgRenderer::new(dir.path(), OutputMode::StaticImage);
    let runs = vec![run(11, 9.0, 140.0), run(12, 8.5, 150.0), run(14, 10.0, f64::NAN)];
    let chart = runs_chart(&runs, RunColumn::Pace, RunColumn::AvgHr, RunColumn::Distance, &[]);

    let handle = renderer.render_scatter(&chart).unwrap();
    assert_eq!(handle.path, dir.path().join("runs_pace.svg"));
    let svg = fs::read_to_string(&handle.path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("<circle"));
}

#[test]
fn interactive_mode_escapes_hover_text() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = SvgRenderer::new(dir.path(), OutputMode::Interactive);
    let runs = vec![run(11, 9.0, 140.0)];
    let mut chart = runs_chart(&runs, RunColumn::Pace, RunColumn::AvgHr, RunColumn::Distance, &[]);
    chart.hover_columns = vec!["note".into()];
    chart.points[0].hover = vec!["<b>fast</b>".into()];

    let handle = renderer.render_scatter(&chart).unwrap();
    let html = fs::read_to_string(&handle.path).unwrap();
    assert!(html.contains("&lt;b&gt;fast&lt;/b&gt;"));
    assert!(!html.contains("<b>fast</b>"));
}

#[test]
fn empty_chart_still_renders() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = SvgRenderer::new(dir.path(), OutputMode::StaticImage);
    let chart = runs_chart(&[], RunColumn::Speed, RunColumn::AvgHr, RunColumn::Distance, &[]);
    assert_eq!(renderer.render_scatter(&chart).unwrap().points, 0);
}

#[test]
fn unknown_column_name_is_rejected() {
    assert_eq!("Avg HR".parse::<RunColumn>().unwrap(), RunColumn::AvgHr);
    assert!(matches!(
        "cadence".parse::<RunColumn>(),
        Err(RunGraphError::Plot(_))
    ));
}
