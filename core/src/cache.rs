use std::collections::HashSet;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveTime};
use log::{info, warn};

use crate::heart_rate::HeartRateSeries;
use crate::models::Run;
use crate::storage::CacheStore;

/// Kilde for "i dag". Byttes ut i tester.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Markøren er fra i dag: tabellene kan lastes som de er.
    Fresh,
    /// Ingen markør, gammel markør eller ødelagt markør: hent ut på nytt.
    Stale,
}

/// Avgjør cache-tilstand ut fra as-of-markøren. En ødelagt markør
/// logges og behandles som utdatert.
pub fn check_cache(store: &CacheStore, today: NaiveDate) -> CacheState {
    match store.read_marker() {
        Ok(Some(as_of)) if as_of == today => {
            if store.has_tables() {
                info!("📂 Cache fra {as_of} er fersk");
                CacheState::Fresh
            } else {
                warn!("⚠️ Markøren er fra i dag, men tabellfiler mangler");
                CacheState::Stale
            }
        }
        Ok(Some(as_of)) => {
            info!("Cache fra {as_of} er utdatert (i dag: {today})");
            CacheState::Stale
        }
        Ok(None) => {
            info!("Ingen cache-markør i {}", store.dir().display());
            CacheState::Stale
        }
        Err(e) => {
            warn!("⚠️ {e}; bygger cachen på nytt");
            CacheState::Stale
        }
    }
}

/// Nye prøver + gamle prøver med tidsstempel som ikke finnes i de nye.
/// Duplikater innen samme side beholdes (flere enheter).
pub fn merge_heart_rates(new: HeartRateSeries, old: HeartRateSeries) -> HeartRateSeries {
    let seen: HashSet<DateTime<FixedOffset>> = new.iter().map(|s| s.timestamp).collect();
    let mut samples = new.into_samples();
    let before = samples.len();
    samples.extend(
        old.into_samples()
            .into_iter()
            .filter(|s| !seen.contains(&s.timestamp)),
    );
    info!("Slo sammen puls: {} nye + {} fra cache", before, samples.len() - before);
    HeartRateSeries::from_samples(samples)
}

/// Nye økter + cachede økter med (dato, start) som ikke finnes blant de nye.
/// Resultatet sorteres stabilt på dato.
pub fn merge_runs(new: Vec<Run>, old: Vec<Run>) -> Vec<Run> {
    let seen: HashSet<(NaiveDate, NaiveTime)> = new.iter().map(Run::key).collect();
    let mut runs = new;
    let before = runs.len();
    runs.extend(old.into_iter().filter(|r| !seen.contains(&r.key())));
    info!("Slo sammen økter: {} nye + {} fra cache", before, runs.len() - before);
    runs.sort_by_key(|r| r.date);
    runs
}
