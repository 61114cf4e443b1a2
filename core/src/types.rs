use std::collections::BTreeMap;

/// `Record`-element fra eksporten, bare attributtene.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub attributes: BTreeMap<String, String>,
}

impl RawRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// `WorkoutStatistics`-barn (nyere eksporter har distanse/energi her).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStatistic {
    pub kind: String,
    pub sum: Option<String>,
    pub unit: Option<String>,
}

/// `Workout`-element med attributter, `MetadataEntry`-par og statistikk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawWorkout {
    pub attributes: BTreeMap<String, String>,
    pub metadata: Vec<(String, String)>,
    pub statistics: Vec<RawStatistic>,
}

pub const DISTANCE_STAT: &str = "HKQuantityTypeIdentifierDistanceWalkingRunning";
pub const ENERGY_STAT: &str = "HKQuantityTypeIdentifierActiveEnergyBurned";

impl RawWorkout {
    /// Flatt feltsett: attributter, så metadata (metadata vinner ved kollisjon).
    /// Mangler distanse/energi som attributt, brukes `WorkoutStatistics`.
    pub fn merged_fields(&self) -> BTreeMap<String, String> {
        let mut fields = self.attributes.clone();
        for stat in &self.statistics {
            let (value_key, unit_key) = match stat.kind.as_str() {
                DISTANCE_STAT => ("totalDistance", "totalDistanceUnit"),
                ENERGY_STAT => ("totalEnergyBurned", "totalEnergyBurnedUnit"),
                _ => continue,
            };
            if fields.contains_key(value_key) {
                continue;
            }
            if let Some(sum) = &stat.sum {
                fields.insert(value_key.to_string(), sum.clone());
                if let Some(unit) = &stat.unit {
                    fields.insert(unit_key.to_string(), unit.clone());
                }
            }
        }
        for (k, v) in &self.metadata {
            fields.insert(k.clone(), v.clone());
        }
        fields
    }
}

/// Det vi trenger fra eksporten: pulsposter og løpeøkter, i dokumentrekkefølge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthExport {
    pub heart_rates: Vec<RawRecord>,
    pub workouts: Vec<RawWorkout>,
}
