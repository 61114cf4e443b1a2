use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Én pulsmåling fra eksporten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateSample {
    pub timestamp: DateTime<FixedOffset>,
    pub value: f64, // bpm
    pub unit: String,
}

impl HeartRateSample {
    /// Lokal veggklokke-tid (i målingens egen offset).
    pub fn local(&self) -> NaiveDateTime {
        self.timestamp.naive_local()
    }
}

/// Én løpeøkt med avledede nøkkeltall. Feltrekkefølgen er også
/// kolonnerekkefølgen i runs.csv.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub distance: f64,    // mi
    pub duration: f64,    // min
    pub pace: f64,        // min/mi
    pub speed: f64,       // mph
    pub avg_hr: f64,      // bpm, NaN når vinduet er tomt
    pub max_hr: f64,      // bpm, NaN når vinduet er tomt
    pub energy: f64,      // kcal
    pub temperature: f64, // degF
    pub humidity: f64,
    pub indoor: bool,
    pub elevation: Option<f64>, // fot, bare i nyere eksporter
}

impl Run {
    pub fn window(&self) -> RunWindow {
        RunWindow {
            date: self.date,
            start: self.start,
            end: self.end,
        }
    }

    /// Naturlig nøkkel for sammenslåing med cachede rader.
    pub fn key(&self) -> (NaiveDate, NaiveTime) {
        (self.date, self.start)
    }
}

/// Tidsvinduet en økt dekker: dato + klokkeslett for start og slutt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunWindow {
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl RunWindow {
    /// Åpent intervall (start, end) i lokal tid. Er `end` tidligere enn `start`
    /// går økten over midnatt, og slutten legges på neste dato.
    pub fn bounds(&self) -> (NaiveDateTime, NaiveDateTime) {
        let start = self.date.and_time(self.start);
        let mut end = self.date.and_time(self.end);
        if self.end < self.start {
            end += Duration::days(1);
        }
        (start, end)
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end < self.start
    }

    /// Strengt innenfor vinduet; prøver nøyaktig på start eller slutt telles ikke.
    pub fn contains(&self, local: NaiveDateTime) -> bool {
        let (start, end) = self.bounds();
        start < local && local < end
    }
}
