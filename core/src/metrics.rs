use ordered_float::OrderedFloat;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

use crate::error::Result;

/// Maks av verdiene; NaN når utvalget er tomt.
pub fn max_value(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .map(OrderedFloat)
        .max()
        .map_or(f64::NAN, |v| v.0)
}

/// Snitt; NaN når utvalget er tomt.
pub fn mean_value(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Median (snitt av de to midterste ved partall); NaN når utvalget er tomt.
pub fn median_value(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut xs: Vec<OrderedFloat<f64>> = values.iter().copied().map(OrderedFloat).collect();
    xs.sort();
    let n = xs.len();
    if n % 2 == 1 {
        xs[n / 2].0
    } else {
        (xs[n / 2 - 1].0 + xs[n / 2].0) / 2.0
    }
}

/// Prosess-tellere for pipelinen.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    cache_fresh: IntCounter,
    cache_stale: IntCounter,
    heart_rate_samples: IntCounter,
    runs_extracted: IntCounter,
    empty_hr_windows: IntCounter,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let cache_fresh = IntCounter::new(
            "rungraph_cache_fresh_total",
            "Sessions served from today's cache",
        )?;
        let cache_stale = IntCounter::new(
            "rungraph_cache_stale_total",
            "Sessions that re-extracted from export.xml",
        )?;
        let heart_rate_samples = IntCounter::new(
            "rungraph_heart_rate_samples_total",
            "Heart rate samples extracted from the export",
        )?;
        let runs_extracted =
            IntCounter::new("rungraph_runs_extracted_total", "Running workouts extracted")?;
        let empty_hr_windows = IntCounter::new(
            "rungraph_empty_hr_windows_total",
            "Runs without any heart rate sample in their window",
        )?;

        registry.register(Box::new(cache_fresh.clone()))?;
        registry.register(Box::new(cache_stale.clone()))?;
        registry.register(Box::new(heart_rate_samples.clone()))?;
        registry.register(Box::new(runs_extracted.clone()))?;
        registry.register(Box::new(empty_hr_windows.clone()))?;

        Ok(Self {
            registry,
            cache_fresh,
            cache_stale,
            heart_rate_samples,
            runs_extracted,
            empty_hr_windows,
        })
    }

    pub fn cache_fresh_total(&self) -> &IntCounter {
        &self.cache_fresh
    }

    pub fn cache_stale_total(&self) -> &IntCounter {
        &self.cache_stale
    }

    pub fn heart_rate_samples_total(&self) -> &IntCounter {
        &self.heart_rate_samples
    }

    pub fn runs_extracted_total(&self) -> &IntCounter {
        &self.runs_extracted
    }

    pub fn empty_hr_windows_total(&self) -> &IntCounter {
        &self.empty_hr_windows
    }

    /// Tekstformat (Prometheus exposition).
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("cache_fresh", &self.cache_fresh.get())
            .field("cache_stale", &self.cache_stale.get())
            .field("heart_rate_samples", &self.heart_rate_samples.get())
            .field("runs_extracted", &self.runs_extracted.get())
            .field("empty_hr_windows", &self.empty_hr_windows.get())
            .finish()
    }
}
