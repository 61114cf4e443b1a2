use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::{info, warn};

use crate::error::{Result, RunGraphError};
use crate::heart_rate::HeartRateSeries;
use crate::models::{HeartRateSample, Run};
use crate::normalize::{enforce_types, parse_ymd, Schema};
use crate::table::{Cell, RowView, Table};

pub const RUN_COLUMNS: [&str; 14] = [
    "date",
    "start",
    "end",
    "distance",
    "duration",
    "pace",
    "speed",
    "avg_hr",
    "max_hr",
    "energy",
    "temperature",
    "humidity",
    "indoor",
    "elevation",
];

pub const HEART_RATE_COLUMNS: [&str; 3] = ["timestamp", "value", "unit"];

pub fn runs_to_table(runs: &[Run]) -> Table {
    let mut table = Table::new(&RUN_COLUMNS);
    for r in runs {
        table.push_row(vec![
            Cell::Date(r.date),
            Cell::Time(r.start),
            Cell::Time(r.end),
            r.distance.into(),
            r.duration.into(),
            r.pace.into(),
            r.speed.into(),
            r.avg_hr.into(),
            r.max_hr.into(),
            r.energy.into(),
            r.temperature.into(),
            r.humidity.into(),
            r.indoor.into(),
            r.elevation.into(),
        ]);
    }
    table
}

fn run_from_row(row: &RowView<'_>) -> Result<Run> {
    Ok(Run {
        date: row.date("date")?,
        start: row.time("start")?,
        end: row.time("end")?,
        distance: row.f64("distance")?,
        duration: row.f64("duration")?,
        pace: row.f64("pace")?,
        speed: row.f64("speed")?,
        avg_hr: row.f64("avg_hr")?,
        max_hr: row.f64("max_hr")?,
        energy: row.f64("energy")?,
        temperature: row.f64("temperature")?,
        humidity: row.f64("humidity")?,
        indoor: row.bool("indoor")?,
        // eldre cacher har ikke kolonnen
        elevation: row.opt_f64("elevation")?,
    })
}

/// Normalisert tabell → runs. Tabellen må ha gått gjennom [`enforce_types`].
pub fn runs_from_table(table: &Table) -> Result<Vec<Run>> {
    table.iter_rows().map(|row| run_from_row(&row)).collect()
}

pub fn heart_rates_to_table(series: &HeartRateSeries) -> Table {
    let mut table = Table::new(&HEART_RATE_COLUMNS);
    for s in series {
        table.push_row(vec![
            Cell::Timestamp(s.timestamp),
            s.value.into(),
            s.unit.as_str().into(),
        ]);
    }
    table
}

pub fn heart_rates_from_table(table: &Table) -> Result<HeartRateSeries> {
    let samples = table
        .iter_rows()
        .map(|row| {
            Ok(HeartRateSample {
                timestamp: row.timestamp("timestamp")?,
                value: row.f64("value")?,
                unit: row.text("unit")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(HeartRateSeries::from_samples(samples))
}

/// Filene i cache-katalogen: to tabeller + as-of-markør.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn runs_path(&self) -> PathBuf {
        self.dir.join("runs.csv")
    }

    pub fn heart_rates_path(&self) -> PathBuf {
        self.dir.join("heart_rates.csv")
    }

    pub fn marker_path(&self) -> PathBuf {
        self.dir.join("as_of.txt")
    }

    /// Finnes begge tabellfilene?
    pub fn has_tables(&self) -> bool {
        self.runs_path().exists() && self.heart_rates_path().exists()
    }

    /// Leser as-of-datoen. `Ok(None)` når markøren ikke finnes;
    /// `CacheCorruption` når innholdet ikke er tre heltall med bindestrek.
    pub fn read_marker(&self) -> Result<Option<NaiveDate>> {
        let path = self.marker_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        parse_marker(&content)
            .map(Some)
            .ok_or(RunGraphError::CacheCorruption { path, content })
    }

    /// Leser en tabell og gir dato/tid-kolonnene riktig type.
    pub fn load_table(&self, schema: Schema) -> Result<Table> {
        let path = match schema {
            Schema::Runs => self.runs_path(),
            Schema::HeartRates => self.heart_rates_path(),
        };
        let mut table = Table::read_csv(&path)?;
        enforce_types(&mut table, schema)?;
        info!("📂 {} rader lastet fra {}", table.len(), path.display());
        Ok(table)
    }

    pub fn load(&self) -> Result<(HeartRateSeries, Vec<Run>)> {
        let heart_rates = heart_rates_from_table(&self.load_table(Schema::HeartRates)?)?;
        let runs = runs_from_table(&self.load_table(Schema::Runs)?)?;
        Ok((heart_rates, runs))
    }

    /// Skriver begge tabellene og til slutt markøren. Gammel markør fjernes
    /// først, så en avbrutt lagring etterlater cachen som utdatert.
    pub fn save(&self, heart_rates: &HeartRateSeries, runs: &[Run], as_of: NaiveDate) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let marker = self.marker_path();
        if marker.exists() {
            fs::remove_file(&marker)?;
        }

        write_atomic(&self.heart_rates_path(), |tmp| {
            heart_rates_to_table(heart_rates).write_csv(tmp)
        })?;
        write_atomic(&self.runs_path(), |tmp| runs_to_table(runs).write_csv(tmp))?;
        write_atomic(&marker, |tmp| Ok(fs::write(tmp, as_of.format("%Y-%m-%d").to_string())?))?;

        info!(
            "✅ Cache lagret i {} ({} pulsprøver, {} økter, as-of {})",
            self.dir.display(),
            heart_rates.len(),
            runs.len(),
            as_of
        );
        Ok(())
    }
}

/// Skriv til `<path>.tmp` og rename over målet.
fn write_atomic(path: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    if let Err(e) = write(&tmp) {
        warn!("⚠️ Skriving av {} feilet: {e}", path.display());
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Innholdet i as_of.txt → dato.
pub fn parse_marker(content: &str) -> Option<NaiveDate> {
    parse_ymd(content)
}
