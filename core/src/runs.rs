use std::collections::BTreeMap;

use log::{info, warn};

use crate::error::{Result, RunGraphError};
use crate::heart_rate::{AggregateMode, HeartRateSeries};
use crate::metrics::Metrics;
use crate::models::{Run, RunWindow};
use crate::normalize::parse_timestamp;
use crate::table::parse_flag;
use crate::types::RawWorkout;
use crate::units::{
    convert_elevation, convert_humidity, convert_temperature, distance_to_miles,
    duration_to_minutes, energy_to_kcal,
};

// Nøkler i eksporten (attributter og MetadataEntry)
pub const START_DATE: &str = "startDate";
pub const END_DATE: &str = "endDate";
pub const TOTAL_DISTANCE: &str = "totalDistance";
pub const DURATION: &str = "duration";
pub const TOTAL_ENERGY: &str = "totalEnergyBurned";
pub const WEATHER_TEMPERATURE: &str = "HKWeatherTemperature";
pub const WEATHER_HUMIDITY: &str = "HKWeatherHumidity";
pub const INDOOR: &str = "HKIndoorWorkout";
pub const ELEVATION_ASCENDED: &str = "HKElevationAscended";

type Fields = BTreeMap<String, String>;

fn require<'a>(fields: &'a Fields, key: &str) -> Result<&'a str> {
    fields
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| RunGraphError::missing("workout", key))
}

fn float(key: &str, s: &str) -> Result<f64> {
    s.trim()
        .parse::<f64>()
        .map_err(|e| RunGraphError::parse(key, s, e))
}

/// Økt før sortering og pulsberegning.
struct PartialRun {
    window: RunWindow,
    distance: f64,
    duration: f64,
    energy: f64,
    temperature: f64,
    humidity: f64,
    indoor: bool,
    elevation: Option<f64>,
}

fn parse_workout(workout: &RawWorkout) -> Result<PartialRun> {
    let fields = workout.merged_fields();

    let start_ts = parse_timestamp(START_DATE, require(&fields, START_DATE)?)?;
    let end_ts = parse_timestamp(END_DATE, require(&fields, END_DATE)?)?;

    let distance = distance_to_miles(
        float(TOTAL_DISTANCE, require(&fields, TOTAL_DISTANCE)?)?,
        fields.get("totalDistanceUnit").map(String::as_str),
    )?;
    let duration = duration_to_minutes(
        float(DURATION, require(&fields, DURATION)?)?,
        fields.get("durationUnit").map(String::as_str),
    )?;
    let energy = energy_to_kcal(
        float(TOTAL_ENERGY, require(&fields, TOTAL_ENERGY)?)?,
        fields.get("totalEnergyBurnedUnit").map(String::as_str),
    )?;

    let temperature = convert_temperature(require(&fields, WEATHER_TEMPERATURE)?)?;
    let humidity = convert_humidity(require(&fields, WEATHER_HUMIDITY)?)?;
    let indoor = parse_flag(INDOOR, require(&fields, INDOOR)?)?;
    let elevation = fields
        .get(ELEVATION_ASCENDED)
        .map(|raw| convert_elevation(raw))
        .transpose()?;

    // dato og start fra samme tidspunkt, lokal tid i eksportens offset
    let start_local = start_ts.naive_local();
    let window = RunWindow {
        date: start_local.date(),
        start: start_local.time(),
        end: end_ts.naive_local().time(),
    };

    Ok(PartialRun {
        window,
        distance,
        duration,
        energy,
        temperature,
        humidity,
        indoor,
        elevation,
    })
}

/// Løpeøkter → tabell med tempo, fart og puls. Én rad per økt, sortert
/// stabilt på dato. Feil i én økt stopper hele uttrekket.
pub fn extract_runs(
    workouts: &[RawWorkout],
    heart_rates: &HeartRateSeries,
    metrics: &Metrics,
) -> Result<Vec<Run>> {
    let mut partial = workouts
        .iter()
        .map(parse_workout)
        .collect::<Result<Vec<_>>>()?;

    // stabil sortering: samme dato beholder dokumentrekkefølgen
    partial.sort_by_key(|p| p.window.date);

    let mut runs = Vec::with_capacity(partial.len());
    for p in partial {
        // ikke beskyttet mot 0-distanse/-varighet: gir inf/NaN videre
        let speed = 60.0 * p.distance / p.duration;
        let pace = p.duration / p.distance;

        if p.window.crosses_midnight() {
            warn!(
                "Økt {} {} krysser midnatt; pulsvinduet fortsetter på neste dato",
                p.window.date, p.window.start
            );
        }

        let max_hr = heart_rates
            .find_hr(&p.window, AggregateMode::Max)
            .value()
            .unwrap_or(f64::NAN);
        let avg_hr = heart_rates
            .find_hr(&p.window, AggregateMode::Mean)
            .value()
            .unwrap_or(f64::NAN);
        if avg_hr.is_nan() {
            metrics.empty_hr_windows_total().inc();
        }

        runs.push(Run {
            date: p.window.date,
            start: p.window.start,
            end: p.window.end,
            distance: p.distance,
            duration: p.duration,
            pace,
            speed,
            avg_hr,
            max_hr,
            energy: p.energy,
            temperature: p.temperature,
            humidity: p.humidity,
            indoor: p.indoor,
            elevation: p.elevation,
        });
    }

    metrics.runs_extracted_total().inc_by(runs.len() as u64);
    info!("✅ {} løpeøkter hentet ut", runs.len());
    Ok(runs)
}
