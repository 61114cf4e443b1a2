use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;

use rungraph_core::cli::print_run_report;
use rungraph_core::{
    load_config, FitnessSession, Metrics, OutputMode, RunColumn, SvgRenderer, SystemClock,
};

#[derive(Parser, Debug)]
#[command(name = "rungraph", about = "Running workouts and heart rate from a health export")]
struct Cli {
    /// JSON-konfig (mangler den, brukes standardverdier)
    #[arg(long, default_value = "rungraph.json")]
    config: PathBuf,

    /// Sti til export.xml
    #[arg(long)]
    export: Option<PathBuf>,

    /// Cache-katalog
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Katalog for figurer
    #[arg(long)]
    plots: Option<PathBuf>,

    /// Skriv ren SVG i stedet for HTML (headless)
    #[arg(long)]
    static_images: bool,

    /// Slå ny uttrekking sammen med forrige cache
    #[arg(long)]
    merge: bool,

    /// Hent ut på nytt selv om cachen er fra i dag
    #[arg(long)]
    refresh: bool,

    /// Skriv prometheus-tellere til stdout til slutt
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tabell over alle økter (standard)
    Summary,
    /// Spredningsplott av øktene, x = dato
    Plot {
        #[arg(long, default_value = "pace")]
        y: RunColumn,
        #[arg(long, default_value = "avg_hr")]
        color: RunColumn,
        #[arg(long, default_value = "distance")]
        size: RunColumn,
    },
    /// Puls gjennom én økt
    HrPlot {
        /// Dato som YYYY-M-D
        date: String,
        /// Hvilken økt når dagen har flere
        #[arg(long, default_value_t = 0)]
        idx: usize,
    },
    /// Bygg cachen på nytt fra eksporten
    Refresh,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .try_init();

    let mut config = load_config(&cli.config).context("loading config")?;
    if let Some(p) = cli.export {
        config.export_path = p;
    }
    if let Some(p) = cli.storage {
        config.storage_dir = p;
    }
    if let Some(p) = cli.plots {
        config.plot_dir = p;
    }
    if cli.static_images {
        config.output_mode = OutputMode::StaticImage;
    }
    if cli.merge {
        config.merge_with_cache = true;
    }

    let metrics = Metrics::new().context("registering metrics")?;
    let clock = SystemClock;
    let mut session = FitnessSession::open(config, &clock, &metrics).context("opening session")?;

    let command = cli.command.unwrap_or(Command::Summary);
    if cli.refresh || matches!(command, Command::Refresh) {
        session
            .refresh_if_cached(&clock, &metrics)
            .context("refreshing cache")?;
    }

    let renderer = SvgRenderer::new(&session.config().plot_dir, session.config().output_mode);
    match command {
        Command::Summary => print_run_report(session.runs()),
        Command::Plot { y, color, size } => {
            let handle = session
                .plot_runs(&renderer, y, color, size)
                .context("rendering chart")?;
            println!("{}", handle.path.display());
        }
        Command::HrPlot { date, idx } => {
            match session
                .plot_heart_rate(&renderer, &date, idx)
                .context("rendering chart")?
            {
                Some(handle) => println!("{}", handle.path.display()),
                None => println!("No run found on {date} (idx {idx})"),
            }
        }
        Command::Refresh => {
            info!("🔄 {} økter, {} pulsprøver", session.runs().len(), session.heart_rates().len());
        }
    }

    if cli.metrics {
        print!("{}", metrics.render().context("rendering metrics")?);
    }
    Ok(())
}
