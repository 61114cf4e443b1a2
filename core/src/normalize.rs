use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use crate::error::{Result, RunGraphError};
use crate::table::{Cell, Table};

/// Hvilken tabell som normaliseres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Runs,
    HeartRates,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Temporal {
    Date,
    Time,
    Timestamp,
}

impl Schema {
    pub fn as_str(&self) -> &'static str {
        match self {
            Schema::Runs => "runs",
            Schema::HeartRates => "heart_rates",
        }
    }

    fn temporal_columns(&self) -> &'static [(&'static str, Temporal)] {
        match self {
            Schema::Runs => &[
                ("date", Temporal::Date),
                ("start", Temporal::Time),
                ("end", Temporal::Time),
            ],
            Schema::HeartRates => &[("timestamp", Temporal::Timestamp)],
        }
    }
}

impl FromStr for Schema {
    type Err = RunGraphError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "runs" => Ok(Schema::Runs),
            "heart_rates" => Ok(Schema::HeartRates),
            other => Err(RunGraphError::InvalidSchema(other.to_string())),
        }
    }
}

/// Gir dato/tid-kolonnene riktig type. Celler som allerede er typet
/// (eller tomme) røres ikke, så funksjonen er idempotent.
pub fn enforce_types(table: &mut Table, schema: Schema) -> Result<()> {
    for (column, kind) in schema.temporal_columns() {
        let Some(idx) = table.column_index(column) else {
            continue;
        };
        for row in table.rows.iter_mut() {
            let Some(cell) = row.get_mut(idx) else {
                continue;
            };
            if let Cell::Text(s) = cell {
                let typed = match kind {
                    Temporal::Date => Cell::Date(parse_date(column, s)?),
                    Temporal::Time => Cell::Time(parse_time(column, s)?),
                    Temporal::Timestamp => Cell::Timestamp(parse_timestamp(column, s)?),
                };
                *cell = typed;
            }
        }
    }
    Ok(())
}

/// Som [`enforce_types`], men med skjema som tekst ("runs" / "heart_rates").
pub fn enforce_types_tagged(table: &mut Table, tag: &str) -> Result<()> {
    let schema: Schema = tag.parse()?;
    enforce_types(table, schema)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
// eksport-format først, deretter cache-format
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y/%m/%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

pub fn parse_date(field: &str, s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .ok_or_else(|| RunGraphError::parse(field, s, "unrecognized date format"))
}

pub fn parse_time(field: &str, s: &str) -> Result<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| RunGraphError::parse(field, s, "unrecognized time format"))
}

/// Tidsstempel med offset. Uten offset tolkes verdien som UTC.
pub fn parse_timestamp(field: &str, s: &str) -> Result<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Some(ts) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
    {
        return Ok(ts);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
        .ok_or_else(|| RunGraphError::parse(field, s, "unrecognized timestamp format"))
}

/// "2024-3-7" / "2024-03-07": tre heltall skilt med bindestrek.
pub fn parse_ymd(s: &str) -> Option<NaiveDate> {
    let parts = s
        .trim()
        .split('-')
        .map(|p| p.trim().parse::<i32>().ok())
        .collect::<Option<Vec<i32>>>()?;
    match parts.as_slice() {
        [y, m, d] => NaiveDate::from_ymd_opt(*y, u32::try_from(*m).ok()?, u32::try_from(*d).ok()?),
        _ => None,
    }
}
