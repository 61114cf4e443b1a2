use std::fmt::Write;

use crate::metrics::{max_value, mean_value};
use crate::models::Run;

fn fmt_hr(v: f64) -> String {
    if v.is_nan() {
        "-".to_string()
    } else {
        format!("{v:.0}")
    }
}

/// Tabell over alle økter + totaler, klar for stdout.
pub fn format_run_report(runs: &[Run]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "--- Run Report ---");
    let _ = writeln!(
        out,
        "{:<10} {:>8} {:>8} {:>7} {:>7} {:>6} {:>6} {:>6} {:>6}",
        "date", "start", "dist", "min", "pace", "mph", "avg", "max", "degF"
    );
    for r in runs {
        let _ = writeln!(
            out,
            "{:<10} {:>8} {:>8.2} {:>7.1} {:>7.2} {:>6.2} {:>6} {:>6} {:>6.0}{}",
            r.date,
            r.start.format("%H:%M:%S"),
            r.distance,
            r.duration,
            r.pace,
            r.speed,
            fmt_hr(r.avg_hr),
            fmt_hr(r.max_hr),
            r.temperature,
            if r.indoor { "  (indoor)" } else { "" }
        );
    }

    let distance: f64 = runs.iter().map(|r| r.distance).sum();
    let duration: f64 = runs.iter().map(|r| r.duration).sum();
    let avg_hrs: Vec<f64> = runs.iter().map(|r| r.avg_hr).filter(|v| !v.is_nan()).collect();
    let max_hrs: Vec<f64> = runs.iter().map(|r| r.max_hr).filter(|v| !v.is_nan()).collect();

    let _ = writeln!(out, "Runs: {}", runs.len());
    let _ = writeln!(out, "Total distance: {distance:.2} mi");
    let _ = writeln!(out, "Total time: {duration:.1} min");
    if distance > 0.0 {
        let _ = writeln!(out, "Overall pace: {:.2} min/mi", duration / distance);
    }
    let _ = writeln!(out, "Mean avg HR: {}", fmt_hr(mean_value(&avg_hrs)));
    let _ = writeln!(out, "Highest HR: {}", fmt_hr(max_value(&max_hrs)));
    out
}

pub fn print_run_report(runs: &[Run]) {
    print!("{}", format_run_report(runs));
}
