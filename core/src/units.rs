use crate::error::{Result, RunGraphError};

/// Rå feltverdi: enten tekst med enhet ("10 degF", "5000 %", "120 cm")
/// eller et tall som allerede er konvertert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
    Text(&'a str),
    Number(f64),
}

impl<'a> From<&'a str> for RawValue<'a> {
    fn from(s: &'a str) -> Self {
        RawValue::Text(s)
    }
}

impl<'a> From<&'a String> for RawValue<'a> {
    fn from(s: &'a String) -> Self {
        RawValue::Text(s.as_str())
    }
}

impl From<f64> for RawValue<'_> {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

/// Første whitespace-token som f64.
fn leading_number(field: &str, s: &str) -> Result<f64> {
    let token = s
        .split_whitespace()
        .next()
        .ok_or_else(|| RunGraphError::parse(field, s, "empty value"))?;
    token
        .parse::<f64>()
        .map_err(|e| RunGraphError::parse(field, s, e))
}

/// Temperatur i °F. Eksporten skriver allerede degF, så tallet brukes som det er.
pub fn convert_temperature<'a>(input: impl Into<RawValue<'a>>) -> Result<f64> {
    match input.into() {
        RawValue::Text(s) => leading_number("temperature", s),
        RawValue::Number(v) => Ok(v),
    }
}

/// Fuktighet: "5000 %" → 50.0 (kilden skalerer prosent med 100).
pub fn convert_humidity<'a>(input: impl Into<RawValue<'a>>) -> Result<f64> {
    match input.into() {
        RawValue::Text(s) => Ok(leading_number("humidity", s)? / 100.0),
        RawValue::Number(v) => Ok(v),
    }
}

/// Høydemeter: cm i eksporten → fot.
pub fn convert_elevation<'a>(input: impl Into<RawValue<'a>>) -> Result<f64> {
    match input.into() {
        RawValue::Text(s) => Ok(leading_number("elevation", s)? * 2.54 / 12.0),
        RawValue::Number(v) => Ok(v),
    }
}

/// Distanse til miles ut fra `totalDistanceUnit` (mangler → mi).
pub fn distance_to_miles(value: f64, unit: Option<&str>) -> Result<f64> {
    match unit.map(str::trim) {
        None | Some("") | Some("mi") => Ok(value),
        Some("km") => Ok(value / 1.609_344),
        Some("m") => Ok(value / 1_609.344),
        Some(other) => Err(RunGraphError::parse(
            "totalDistanceUnit",
            other,
            "unsupported distance unit",
        )),
    }
}

/// Varighet til minutter ut fra `durationUnit` (mangler → min).
pub fn duration_to_minutes(value: f64, unit: Option<&str>) -> Result<f64> {
    match unit.map(str::trim) {
        None | Some("") | Some("min") => Ok(value),
        Some("s") => Ok(value / 60.0),
        Some("h") | Some("hr") => Ok(value * 60.0),
        Some(other) => Err(RunGraphError::parse(
            "durationUnit",
            other,
            "unsupported duration unit",
        )),
    }
}

/// Energi til kcal ut fra `totalEnergyBurnedUnit` (mangler → kcal).
/// Eksporten skriver "Cal" for kilokalorier.
pub fn energy_to_kcal(value: f64, unit: Option<&str>) -> Result<f64> {
    match unit.map(str::trim) {
        None | Some("") | Some("Cal") | Some("kcal") => Ok(value),
        Some("kJ") => Ok(value / 4.184),
        Some(other) => Err(RunGraphError::parse(
            "totalEnergyBurnedUnit",
            other,
            "unsupported energy unit",
        )),
    }
}
