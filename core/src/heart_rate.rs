use std::str::FromStr;

use chrono::Duration;
use log::debug;

use crate::error::{Result, RunGraphError};
use crate::metrics::{max_value, mean_value, median_value};
use crate::models::{HeartRateSample, RunWindow};
use crate::normalize::parse_timestamp;
use crate::types::RawRecord;

/// Pulsserie sortert stigende på tidsstempel. Like tidsstempler er lov
/// (flere enheter kan måle samtidig) og beholder innbyrdes rekkefølge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeartRateSeries {
    samples: Vec<HeartRateSample>,
}

impl HeartRateSeries {
    pub fn from_samples(mut samples: Vec<HeartRateSample>) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        Self { samples }
    }

    pub fn as_slice(&self) -> &[HeartRateSample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<HeartRateSample> {
        self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HeartRateSample> {
        self.samples.iter()
    }

    /// Alle prøver strengt innenfor øktens vindu (lokal dato + klokkeslett).
    pub fn window(&self, window: &RunWindow) -> Vec<&HeartRateSample> {
        let (start, end) = window.bounds();
        // Serien er sortert på absolutt tid; lokal tid avviker maks ett døgn
        // fra UTC, så vi kan snevre inn søket før det eksakte filteret.
        let lo_utc = start - Duration::days(1);
        let hi_utc = end + Duration::days(1);
        let lo = self
            .samples
            .partition_point(|s| s.timestamp.naive_utc() < lo_utc);
        let hi = self
            .samples
            .partition_point(|s| s.timestamp.naive_utc() <= hi_utc);

        self.samples[lo..hi.max(lo)]
            .iter()
            .filter(|s| window.contains(s.local()))
            .collect()
    }

    /// Pulsaggregat for en økt.
    pub fn find_hr(&self, window: &RunWindow, mode: AggregateMode) -> HrAggregate<'_> {
        let selected = self.window(window);
        if selected.is_empty() {
            debug!(
                "Ingen pulsdata for {} {}–{}",
                window.date, window.start, window.end
            );
        }
        match mode {
            AggregateMode::Max => HrAggregate::Value(max_value(&values(&selected))),
            AggregateMode::Median => HrAggregate::Value(median_value(&values(&selected))),
            AggregateMode::Mean => HrAggregate::Value(mean_value(&values(&selected))),
            AggregateMode::All => HrAggregate::Samples(selected),
        }
    }
}

fn values(selected: &[&HeartRateSample]) -> Vec<f64> {
    selected.iter().map(|s| s.value).collect()
}

impl<'a> IntoIterator for &'a HeartRateSeries {
    type Item = &'a HeartRateSample;
    type IntoIter = std::slice::Iter<'a, HeartRateSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    Max,
    Median,
    Mean,
    All,
}

impl FromStr for AggregateMode {
    type Err = RunGraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "max" => Ok(AggregateMode::Max),
            "median" => Ok(AggregateMode::Median),
            "mean" => Ok(AggregateMode::Mean),
            "all" => Ok(AggregateMode::All),
            other => Err(RunGraphError::InvalidArgument(other.to_string())),
        }
    }
}

/// Resultat av [`HeartRateSeries::find_hr`]. Tomt vindu gir `Value(NaN)`.
#[derive(Debug, Clone, PartialEq)]
pub enum HrAggregate<'a> {
    Value(f64),
    Samples(Vec<&'a HeartRateSample>),
}

impl HrAggregate<'_> {
    pub fn value(&self) -> Option<f64> {
        match self {
            HrAggregate::Value(v) => Some(*v),
            HrAggregate::Samples(_) => None,
        }
    }
}

/// Pulsposter → sortert serie. Manglende attributt gir `MalformedRecord`.
pub fn extract_heart_rates(records: &[RawRecord]) -> Result<HeartRateSeries> {
    let mut samples = Vec::with_capacity(records.len());
    for record in records {
        let end = record
            .get("endDate")
            .ok_or_else(|| RunGraphError::missing("heart rate", "endDate"))?;
        let value = record
            .get("value")
            .ok_or_else(|| RunGraphError::missing("heart rate", "value"))?;
        let unit = record
            .get("unit")
            .ok_or_else(|| RunGraphError::missing("heart rate", "unit"))?;

        samples.push(HeartRateSample {
            timestamp: parse_timestamp("endDate", end)?,
            value: value
                .trim()
                .parse::<f64>()
                .map_err(|e| RunGraphError::parse("value", value, e))?,
            unit: unit.to_string(),
        });
    }
    Ok(HeartRateSeries::from_samples(samples))
}
