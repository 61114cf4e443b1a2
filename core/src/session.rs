use chrono::NaiveDate;
use log::{info, warn};
use once_cell::unsync::OnceCell;

use crate::cache::{check_cache, merge_heart_rates, merge_runs, CacheState, Clock};
use crate::config::PipelineConfig;
use crate::error::{Result, RunGraphError};
use crate::export::read_export;
use crate::heart_rate::{extract_heart_rates, AggregateMode, HeartRateSeries, HrAggregate};
use crate::metrics::Metrics;
use crate::models::{HeartRateSample, Run};
use crate::normalize::parse_ymd;
use crate::plot::{heart_rate_chart, runs_chart, ChartHandle, RunColumn, ScatterRenderer, DEFAULT_HOVER};
use crate::runs::extract_runs;
use crate::storage::CacheStore;
use crate::types::HealthExport;

/// Resultat av oppslag på dato.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RunLookup<'a> {
    /// Ingen økter den dagen.
    Missing,
    /// `matches` > 1 betyr at dagen var tvetydig.
    Found { run: &'a Run, matches: usize },
    /// Dagen har økter, men indeksen er for stor.
    OutOfRange { idx: usize, matches: usize },
}

/// Én kjøring: eier begge tabellene og (ved behov) den parsede eksporten.
#[derive(Debug)]
pub struct FitnessSession {
    config: PipelineConfig,
    store: CacheStore,
    state: CacheState,
    heart_rates: HeartRateSeries,
    runs: Vec<Run>,
    export: OnceCell<HealthExport>,
}

impl FitnessSession {
    /// FRESH → tabellene lastes fra disk. STALE → XML parses og cachen skrives.
    pub fn open(config: PipelineConfig, clock: &dyn Clock, metrics: &Metrics) -> Result<Self> {
        let store = CacheStore::new(&config.storage_dir);
        let today = clock.today();
        let state = check_cache(&store, today);

        let mut session = Self {
            config,
            store,
            state,
            heart_rates: HeartRateSeries::default(),
            runs: Vec::new(),
            export: OnceCell::new(),
        };

        match state {
            CacheState::Fresh => {
                metrics.cache_fresh_total().inc();
                let (heart_rates, runs) = session.store.load()?;
                session.heart_rates = heart_rates;
                session.runs = runs;
            }
            CacheState::Stale => {
                metrics.cache_stale_total().inc();
                session.rebuild(today, metrics)?;
            }
        }
        Ok(session)
    }

    /// Tving ny uttrekking uansett markør.
    pub fn refresh(&mut self, clock: &dyn Clock, metrics: &Metrics) -> Result<()> {
        metrics.cache_stale_total().inc();
        self.state = CacheState::Stale;
        self.rebuild(clock.today(), metrics)
    }

    /// Som [`refresh`](Self::refresh), men bare når tabellene kom fra cachen.
    /// Er de allerede hentet ut i denne økten, gjøres ingenting (`Ok(false)`).
    pub fn refresh_if_cached(&mut self, clock: &dyn Clock, metrics: &Metrics) -> Result<bool> {
        if self.state == CacheState::Stale {
            info!("Tabellene er allerede hentet ut på nytt i denne økten");
            return Ok(false);
        }
        self.refresh(clock, metrics)?;
        Ok(true)
    }

    fn export(&self) -> Result<&HealthExport> {
        self.export
            .get_or_try_init(|| read_export(&self.config.export_path))
    }

    fn rebuild(&mut self, today: NaiveDate, metrics: &Metrics) -> Result<()> {
        let export = self.export()?;
        let mut heart_rates = extract_heart_rates(&export.heart_rates)?;
        metrics
            .heart_rate_samples_total()
            .inc_by(heart_rates.len() as u64);
        let mut runs = extract_runs(&export.workouts, &heart_rates, metrics)?;

        if self.config.merge_with_cache && self.store.has_tables() {
            match self.store.load() {
                Ok((old_hr, old_runs)) => {
                    heart_rates = merge_heart_rates(heart_rates, old_hr);
                    runs = merge_runs(runs, old_runs);
                }
                Err(e) => warn!("⚠️ Kunne ikke lese forrige cache for sammenslåing: {e}"),
            }
        }

        self.store.save(&heart_rates, &runs, today)?;
        self.heart_rates = heart_rates;
        self.runs = runs;
        Ok(())
    }

    /// Hvordan tabellene ble hentet: fra dagens cache (`Fresh`) eller ny uttrekking (`Stale`).
    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn heart_rates(&self) -> &HeartRateSeries {
        &self.heart_rates
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_on(&self, date: NaiveDate) -> Vec<&Run> {
        self.runs.iter().filter(|r| r.date == date).collect()
    }

    /// Velger økt nr. `idx` (tabellrekkefølge) på `date`.
    pub fn find_run(&self, date: NaiveDate, idx: usize) -> RunLookup<'_> {
        let matches = self.runs_on(date);
        match matches.get(idx) {
            Some(&run) => {
                if matches.len() > 1 {
                    warn!(
                        "⚠️ {} økter {date}, bruker nr. {idx} (start {})",
                        matches.len(),
                        run.start
                    );
                }
                RunLookup::Found {
                    run,
                    matches: matches.len(),
                }
            }
            None if matches.is_empty() => {
                info!("Ingen økter {date}");
                RunLookup::Missing
            }
            None => {
                warn!("⚠️ {} økter {date}, indeks {idx} finnes ikke", matches.len());
                RunLookup::OutOfRange {
                    idx,
                    matches: matches.len(),
                }
            }
        }
    }

    /// Som [`find_run`](Self::find_run), men med dato som "YYYY-M-D".
    pub fn lookup(&self, date: &str, idx: usize) -> Result<RunLookup<'_>> {
        let date = parse_ymd(date)
            .ok_or_else(|| RunGraphError::parse("date", date, "expected YYYY-M-D"))?;
        Ok(self.find_run(date, idx))
    }

    /// Alle pulsprøver innenfor øktens vindu.
    pub fn run_heart_rates(&self, run: &Run) -> Vec<&HeartRateSample> {
        match self.heart_rates.find_hr(&run.window(), AggregateMode::All) {
            HrAggregate::Samples(samples) => samples,
            HrAggregate::Value(_) => Vec::new(),
        }
    }

    /// Øktplott: x = dato, valgfri y/farge/størrelse.
    pub fn plot_runs(
        &self,
        renderer: &dyn ScatterRenderer,
        y: RunColumn,
        color: RunColumn,
        size: RunColumn,
    ) -> Result<ChartHandle> {
        let chart = runs_chart(&self.runs, y, color, size, &DEFAULT_HOVER);
        renderer.render_scatter(&chart)
    }

    /// Pulsplott for én økt. `Ok(None)` når oppslaget ikke treffer.
    pub fn plot_heart_rate(
        &self,
        renderer: &dyn ScatterRenderer,
        date: &str,
        idx: usize,
    ) -> Result<Option<ChartHandle>> {
        let run = match self.lookup(date, idx)? {
            RunLookup::Found { run, .. } => run,
            RunLookup::Missing | RunLookup::OutOfRange { .. } => return Ok(None),
        };
        let samples = self.run_heart_rates(run);
        if samples.is_empty() {
            warn!("⚠️ Ingen pulsprøver for økten {} {}", run.date, run.start);
        }
        let chart = heart_rate_chart(run, &samples);
        renderer.render_scatter(&chart).map(Some)
    }
}
