pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod heart_rate;
pub mod metrics;
pub mod models;
pub mod normalize;
pub mod plot;
pub mod runs;
pub mod session;
pub mod storage;
pub mod table;
pub mod types;
pub mod units;

pub use cache::{check_cache, CacheState, Clock, FixedClock, SystemClock};
pub use config::{load_config, OutputMode, PipelineConfig};
pub use error::{Result, RunGraphError};
pub use heart_rate::{extract_heart_rates, AggregateMode, HeartRateSeries, HrAggregate};
pub use metrics::Metrics;
pub use models::{HeartRateSample, Run, RunWindow};
pub use normalize::{enforce_types, Schema};
pub use plot::{ChartHandle, RunColumn, ScatterChart, ScatterRenderer, SvgRenderer};
pub use runs::extract_runs;
pub use session::{FitnessSession, RunLookup};
pub use storage::CacheStore;
pub use units::{convert_elevation, convert_humidity, convert_temperature};
