//! Spredningsplott av økter og puls per økt. Tegnes som SVG med plotters;
//! interaktiv modus pakker SVG-en inn i en HTML-side med hover-data.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use log::info;
use plotters::prelude::*;

use crate::config::OutputMode;
use crate::error::{Result, RunGraphError};
use crate::models::{HeartRateSample, Run};

/// Kolonner i runs-tabellen som kan brukes som akse, farge, størrelse eller hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunColumn {
    Date,
    Start,
    Distance,
    Duration,
    Pace,
    Speed,
    AvgHr,
    MaxHr,
    Energy,
    Temperature,
    Humidity,
    Indoor,
    Elevation,
}

pub const DEFAULT_HOVER: [RunColumn; 11] = [
    RunColumn::Date,
    RunColumn::Pace,
    RunColumn::Speed,
    RunColumn::Distance,
    RunColumn::AvgHr,
    RunColumn::MaxHr,
    RunColumn::Temperature,
    RunColumn::Humidity,
    RunColumn::Energy,
    RunColumn::Start,
    RunColumn::Duration,
];

impl RunColumn {
    pub fn name(&self) -> &'static str {
        match self {
            RunColumn::Date => "date",
            RunColumn::Start => "start",
            RunColumn::Distance => "distance",
            RunColumn::Duration => "duration",
            RunColumn::Pace => "pace",
            RunColumn::Speed => "speed",
            RunColumn::AvgHr => "avg_hr",
            RunColumn::MaxHr => "max_hr",
            RunColumn::Energy => "energy",
            RunColumn::Temperature => "temperature",
            RunColumn::Humidity => "humidity",
            RunColumn::Indoor => "indoor",
            RunColumn::Elevation => "elevation",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RunColumn::Date => "Date",
            RunColumn::Start => "Start",
            RunColumn::Distance => "Distance (mi)",
            RunColumn::Duration => "Duration (min)",
            RunColumn::Pace => "Pace (min/mi)",
            RunColumn::Speed => "Speed (mph)",
            RunColumn::AvgHr => "Avg HR (bpm)",
            RunColumn::MaxHr => "Max HR (bpm)",
            RunColumn::Energy => "Energy (kcal)",
            RunColumn::Temperature => "Temperature (°F)",
            RunColumn::Humidity => "Humidity",
            RunColumn::Indoor => "Indoor",
            RunColumn::Elevation => "Elevation (ft)",
        }
    }

    /// Numerisk verdi for plotting. Dato = dager fra CE, start = timer.
    pub fn value(&self, run: &Run) -> f64 {
        match self {
            RunColumn::Date => f64::from(run.date.num_days_from_ce()),
            RunColumn::Start => f64::from(run.start.num_seconds_from_midnight()) / 3600.0,
            RunColumn::Distance => run.distance,
            RunColumn::Duration => run.duration,
            RunColumn::Pace => run.pace,
            RunColumn::Speed => run.speed,
            RunColumn::AvgHr => run.avg_hr,
            RunColumn::MaxHr => run.max_hr,
            RunColumn::Energy => run.energy,
            RunColumn::Temperature => run.temperature,
            RunColumn::Humidity => run.humidity,
            RunColumn::Indoor => {
                if run.indoor {
                    1.0
                } else {
                    0.0
                }
            }
            RunColumn::Elevation => run.elevation.unwrap_or(f64::NAN),
        }
    }

    /// Hover-tekst.
    pub fn display(&self, run: &Run) -> String {
        match self {
            RunColumn::Date => run.date.to_string(),
            RunColumn::Start => run.start.format("%H:%M:%S").to_string(),
            RunColumn::Indoor => run.indoor.to_string(),
            RunColumn::Humidity => format!("{}", run.humidity),
            RunColumn::Energy => format!("{:.0}", run.energy),
            RunColumn::AvgHr | RunColumn::MaxHr | RunColumn::Temperature => {
                format!("{:.1}", self.value(run))
            }
            RunColumn::Elevation => run
                .elevation
                .map_or_else(|| "-".to_string(), |e| format!("{e:.1}")),
            _ => format!("{:.2}", self.value(run)),
        }
    }
}

impl FromStr for RunColumn {
    type Err = RunGraphError;

    fn from_str(s: &str) -> Result<Self> {
        let col = match s.to_ascii_lowercase().replace(' ', "_").as_str() {
            "date" => RunColumn::Date,
            "start" => RunColumn::Start,
            "distance" => RunColumn::Distance,
            "duration" => RunColumn::Duration,
            "pace" => RunColumn::Pace,
            "speed" => RunColumn::Speed,
            "avg_hr" => RunColumn::AvgHr,
            "max_hr" => RunColumn::MaxHr,
            "energy" => RunColumn::Energy,
            "temperature" => RunColumn::Temperature,
            "humidity" => RunColumn::Humidity,
            "indoor" => RunColumn::Indoor,
            "elevation" => RunColumn::Elevation,
            other => return Err(RunGraphError::Plot(format!("unknown run column {other:?}"))),
        };
        Ok(col)
    }
}

impl fmt::Display for RunColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisKind {
    Number,
    /// Dager fra CE.
    Date,
    /// Sekunder fra midnatt (kan gå over 24 t for økter over midnatt).
    TimeOfDay,
}

impl AxisKind {
    fn format(&self, v: f64) -> String {
        match self {
            AxisKind::Number => format!("{v:.1}"),
            AxisKind::Date => NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
                .map_or_else(String::new, |d| d.format("%Y-%m-%d").to_string()),
            AxisKind::TimeOfDay => {
                let secs = (v.round() as i64).rem_euclid(86_400) as u32;
                NaiveTime::from_num_seconds_from_midnight_opt(secs, 0)
                    .map_or_else(String::new, |t| t.format("%I:%M").to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub color: Option<f64>,
    pub size: Option<f64>,
    pub hover: Vec<String>,
}

/// Ferdig utvalgt tabell for én figur.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterChart {
    /// Filnavn uten endelse.
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_kind: AxisKind,
    /// Tegn y-aksen snudd (lavere tempo = raskere = høyere opp).
    pub reverse_y: bool,
    pub fixed_color: Option<(u8, u8, u8)>,
    pub hover_columns: Vec<String>,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub path: PathBuf,
    pub points: usize,
}

/// Visualiseringsadapteren pipelinen bruker.
pub trait ScatterRenderer {
    fn render_scatter(&self, chart: &ScatterChart) -> Result<ChartHandle>;
}

/// Økter med x = dato.
pub fn runs_chart(
    runs: &[Run],
    y: RunColumn,
    color: RunColumn,
    size: RunColumn,
    hover: &[RunColumn],
) -> ScatterChart {
    let points = runs
        .iter()
        .map(|r| ScatterPoint {
            x: RunColumn::Date.value(r),
            y: y.value(r),
            color: Some(color.value(r)),
            size: Some(size.value(r)),
            hover: hover.iter().map(|c| c.display(r)).collect(),
        })
        .collect();

    ScatterChart {
        name: format!("runs_{}", y.name()),
        title: format!("{} by date (color: {}, size: {})", y.label(), color.name(), size.name()),
        x_label: RunColumn::Date.label().to_string(),
        y_label: y.label().to_string(),
        x_kind: AxisKind::Date,
        reverse_y: y == RunColumn::Pace,
        fixed_color: None,
        hover_columns: hover.iter().map(|c| c.name().to_string()).collect(),
        points,
    }
}

/// Puls gjennom én økt: x = klokkeslett, y = bpm.
pub fn heart_rate_chart(run: &Run, samples: &[&HeartRateSample]) -> ScatterChart {
    let midnight = run.date.and_time(NaiveTime::default());
    let points = samples
        .iter()
        .map(|s| {
            let local = s.local();
            ScatterPoint {
                x: (local - midnight).num_milliseconds() as f64 / 1000.0,
                y: s.value,
                color: None,
                size: None,
                hover: vec![local.format("%H:%M:%S").to_string(), format!("{:.0}", s.value)],
            }
        })
        .collect();

    ScatterChart {
        name: format!("hr_{}_{}", run.date, run.start.format("%H%M")),
        title: format!("Run on {}", run.date),
        x_label: "Time".to_string(),
        y_label: "Heart Rate (bpm)".to_string(),
        x_kind: AxisKind::TimeOfDay,
        reverse_y: false,
        fixed_color: Some((220, 20, 20)),
        hover_columns: vec!["time".to_string(), "value".to_string()],
        points,
    }
}

/// Skriver figurer til en katalog: HTML (interaktiv) eller ren SVG.
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    out_dir: PathBuf,
    mode: OutputMode,
    size: (u32, u32),
}

impl SvgRenderer {
    pub fn new(out_dir: impl Into<PathBuf>, mode: OutputMode) -> Self {
        Self {
            out_dir: out_dir.into(),
            mode,
            size: (1500, 600),
        }
    }
}

impl ScatterRenderer for SvgRenderer {
    fn render_scatter(&self, chart: &ScatterChart) -> Result<ChartHandle> {
        fs::create_dir_all(&self.out_dir)?;
        let svg = draw_svg(chart, self.size)?;
        let path = match self.mode {
            OutputMode::StaticImage => {
                let path = self.out_dir.join(format!("{}.svg", chart.name));
                fs::write(&path, svg)?;
                path
            }
            OutputMode::Interactive => {
                let path = self.out_dir.join(format!("{}.html", chart.name));
                fs::write(&path, wrap_html(chart, &svg))?;
                path
            }
        };
        info!("✅ Figur skrevet til {}", path.display());
        Ok(ChartHandle {
            path,
            points: chart.points.len(),
        })
    }
}

fn plot_err<E: fmt::Display>(e: E) -> RunGraphError {
    RunGraphError::Plot(e.to_string())
}

/// (min, max) for endelige verdier; utvidet når alle er like.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        return (lo - 1.0, hi + 1.0);
    }
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

fn unit_scale(v: Option<f64>, (lo, hi): (f64, f64)) -> Option<f64> {
    let v = v.filter(|v| v.is_finite())?;
    if hi - lo <= 0.0 {
        return Some(0.5);
    }
    Some(((v - lo) / (hi - lo)).clamp(0.0, 1.0))
}

// lineær gradient mellom endene av viridis
fn gradient(t: Option<f64>) -> RGBColor {
    match t {
        Some(t) => {
            let lerp = |a: f64, b: f64| (a + (b - a) * t).round() as u8;
            RGBColor(lerp(68.0, 253.0), lerp(1.0, 231.0), lerp(84.0, 37.0))
        }
        None => RGBColor(170, 170, 170),
    }
}

fn draw_svg(chart: &ScatterChart, size: (u32, u32)) -> Result<String> {
    let sign = if chart.reverse_y { -1.0 } else { 1.0 };
    let points: Vec<&ScatterPoint> = chart
        .points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .collect();

    let (x0, x1) = padded_range(points.iter().map(|p| p.x));
    let (y0, y1) = padded_range(points.iter().map(|p| sign * p.y));
    let color_range = padded_range(points.iter().filter_map(|p| p.color));
    let size_range = padded_range(points.iter().filter_map(|p| p.size));

    let x_kind = chart.x_kind;
    let x_fmt = move |v: &f64| x_kind.format(*v);
    let y_fmt = move |v: &f64| format!("{:.2}", sign * *v);

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut ctx = ChartBuilder::on(&root)
            .caption(&chart.title, ("sans-serif", 22).into_font())
            .margin(20)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(plot_err)?;

        ctx.configure_mesh()
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .draw()
            .map_err(plot_err)?;

        ctx.draw_series(points.iter().map(|p| {
            let color = match chart.fixed_color {
                Some((r, g, b)) => RGBColor(r, g, b),
                None => gradient(unit_scale(p.color, color_range)),
            };
            let radius = match p.size {
                Some(_) => 3.0 + 9.0 * unit_scale(p.size, size_range).unwrap_or(0.0),
                None => 3.0,
            };
            Circle::new((p.x, sign * p.y), radius.round() as u32, color.filled())
        }))
        .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
    }
    Ok(svg)
}

fn wrap_html(chart: &ScatterChart, svg: &str) -> String {
    let esc = |s: &str| html_escape::encode_text(s).into_owned();

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", esc(&chart.title)));
    html.push_str(
        "<style>body{font-family:sans-serif}table{border-collapse:collapse}\
         td,th{border:1px solid #ccc;padding:2px 6px}tbody tr:hover{background:#ffe9a8}</style>\n",
    );
    html.push_str("</head>\n<body>\n");
    html.push_str(svg);
    html.push_str("\n<table>\n<thead><tr>");
    for col in &chart.hover_columns {
        html.push_str(&format!("<th>{}</th>", esc(col)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for p in &chart.points {
        html.push_str("<tr>");
        for v in &p.hover {
            html.push_str(&format!("<td>{}</td>", esc(v)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
    html
}
