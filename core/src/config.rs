use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RunGraphError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// HTML-side med SVG og hover-tabell.
    #[default]
    Interactive,
    /// Bare SVG-filen (headless/CI).
    StaticImage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub export_path: PathBuf,
    pub storage_dir: PathBuf,
    pub plot_dir: PathBuf,
    /// Slå nye uttrekk sammen med forrige cache i stedet for å erstatte den.
    pub merge_with_cache: bool,
    pub output_mode: OutputMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            export_path: PathBuf::from("./apple_health_export/export.xml"),
            storage_dir: PathBuf::from("./storage"),
            plot_dir: PathBuf::from("./plots"),
            merge_with_cache: false,
            output_mode: OutputMode::Interactive,
        }
    }
}

/// Leser konfig fra JSON. Finnes ikke filen, brukes standardverdier.
/// Feil i filen rapporteres med stien til feltet (f.eks. `output_mode`).
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        warn!(
            "⚠️ Fant ikke konfig på {}, bruker standardverdier",
            path.display()
        );
        return Ok(PipelineConfig::default());
    }
    let contents = fs::read_to_string(path)?;
    let config = parse_config(&contents)?;
    info!("📂 Konfig lastet fra {}", path.display());
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<PipelineConfig> {
    let de = &mut serde_json::Deserializer::from_str(contents);
    serde_path_to_error::deserialize(de)
        .map_err(|e| RunGraphError::Config(format!("{} at `{}`", e.inner(), e.path())))
}

/// Lagrer konfig som pretty-printet JSON.
pub fn save_config(config: &PipelineConfig, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(config)
        .map_err(|e| RunGraphError::Config(e.to_string()))?;
    fs::write(path, json)?;
    info!("✅ Konfig lagret til {}", path.display());
    Ok(())
}
