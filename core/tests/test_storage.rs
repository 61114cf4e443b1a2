use std::fs;
use std::path::PathBuf;

use rungraph_core::config::save_config;
use rungraph_core::{load_config, OutputMode, PipelineConfig, RunGraphError};

#[test]
fn test_save_and_load_config() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("rungraph.json");

    // lag en konfig som avviker fra standard
    let config = PipelineConfig {
        export_path: PathBuf::from("/data/export.xml"),
        storage_dir: PathBuf::from("/data/cache"),
        plot_dir: PathBuf::from("/data/plots"),
        merge_with_cache: true,
        output_mode: OutputMode::StaticImage,
    };

    save_config(&config, &path).expect("kunne ikke lagre konfig");
    let loaded = load_config(&path).expect("kunne ikke laste konfig");
    assert_eq!(loaded, config);

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"static_image\""));
}

#[test]
fn missing_config_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = load_config(&dir.path().join("nope.json")).unwrap();
    assert_eq!(loaded, PipelineConfig::default());
    assert_eq!(loaded.plot_dir, PathBuf::from("./plots"));
}

#[test]
fn unknown_field_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rungraph.json");
    fs::write(&path, r#"{ "storage": "./elsewhere" }"#).unwrap();
    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, RunGraphError::Config(_)), "{err}");
}

#[test]
fn wrong_type_names_the_field() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rungraph.json");
    fs::write(&path, r#"{ "merge_with_cache": "yes" }"#).unwrap();
    let err = load_config(&path).unwrap_err().to_string();
    assert!(err.contains("merge_with_cache"), "{err}");
}
