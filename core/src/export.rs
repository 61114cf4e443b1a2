//! Strømmende lesing av `export.xml`. Vi bygger ikke et DOM: bare
//! pulsposter og løpeøkter (direkte under roten) plukkes ut.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::info;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Result;
use crate::types::{HealthExport, RawRecord, RawStatistic, RawWorkout};

pub const HEART_RATE_TYPE: &str = "HKQuantityTypeIdentifierHeartRate";
pub const RUNNING_TYPE: &str = "HKWorkoutActivityTypeRunning";

pub fn read_export(path: &Path) -> Result<HealthExport> {
    info!("📂 Leser eksport fra {}", path.display());
    let file = File::open(path)?;
    let export = parse_export(BufReader::new(file))?;
    info!(
        "Eksport lest: {} pulsposter, {} løpeøkter",
        export.heart_rates.len(),
        export.workouts.len()
    );
    Ok(export)
}

pub fn parse_export<R: BufRead>(input: R) -> Result<HealthExport> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut export = HealthExport::default();
    let mut buf = Vec::new();
    // dybde før elementet åpnes: roten = 0, poster = 1
    let mut depth = 0usize;
    // løpeøkt under arbeid + dybden dens barn ligger på
    let mut current: Option<(RawWorkout, usize)> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                handle_element(&e, depth, &mut export, &mut current, true)?;
                depth += 1;
            }
            Event::Empty(e) => {
                handle_element(&e, depth, &mut export, &mut current, false)?;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if e.name().as_ref() == b"Workout" && depth == 1 {
                    if let Some((workout, _)) = current.take() {
                        export.workouts.push(workout);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(export)
}

fn handle_element(
    e: &BytesStart<'_>,
    depth: usize,
    export: &mut HealthExport,
    current: &mut Option<(RawWorkout, usize)>,
    has_children: bool,
) -> Result<()> {
    let name = e.name();
    match (name.as_ref(), depth) {
        (b"Record", 1) => {
            let attributes = attributes(e)?;
            if attributes.get("type").map(String::as_str) == Some(HEART_RATE_TYPE) {
                export.heart_rates.push(RawRecord { attributes });
            }
        }
        (b"Workout", 1) => {
            let attributes = attributes(e)?;
            if attributes.get("workoutActivityType").map(String::as_str) == Some(RUNNING_TYPE) {
                let workout = RawWorkout {
                    attributes,
                    ..Default::default()
                };
                if has_children {
                    *current = Some((workout, depth + 1));
                } else {
                    export.workouts.push(workout);
                }
            }
        }
        (b"MetadataEntry", d) => {
            if let Some((workout, child_depth)) = current.as_mut() {
                if *child_depth == d {
                    let mut attrs = attributes(e)?;
                    if let (Some(key), Some(value)) = (attrs.remove("key"), attrs.remove("value")) {
                        workout.metadata.push((key, value));
                    }
                }
            }
        }
        (b"WorkoutStatistics", d) => {
            if let Some((workout, child_depth)) = current.as_mut() {
                if *child_depth == d {
                    let mut attrs = attributes(e)?;
                    if let Some(kind) = attrs.remove("type") {
                        workout.statistics.push(RawStatistic {
                            kind,
                            sum: attrs.remove("sum"),
                            unit: attrs.remove("unit"),
                        });
                    }
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn attributes(e: &BytesStart<'_>) -> Result<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        out.insert(key, value);
    }
    Ok(out)
}
