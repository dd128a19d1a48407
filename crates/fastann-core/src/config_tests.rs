//! Tests for config module

use super::config::*;
use super::distance::DistanceMetric;
use super::index::IndexKind;
use serial_test::serial;
use std::io::Write;

// ========================================================================
// Defaults
// ========================================================================

#[test]
fn test_config_default_values() {
    let config = FastAnnConfig::default();

    assert_eq!(config.index.algorithm, IndexKind::Hnsw);
    assert_eq!(config.index.metric, DistanceMetric::SquaredEuclidean);
    assert_eq!(config.search.k, 100);
    assert_eq!(config.hnsw.m, 16);
    assert_eq!(config.hnsw.ef_construction, 200);
    assert_eq!(config.hnsw.ef_search, 100);
    assert!(config.hnsw.seed.is_none());
    assert!(config.vptree.parallel);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, "text");
    assert!(config.logging.file.is_none());
    assert!(config.validate().is_ok());
}

// ========================================================================
// TOML parsing
// ========================================================================

#[test]
fn test_config_from_toml_minimal() {
    let toml = r#"
[index]
algorithm = "vp_tree"
"#;

    let config = FastAnnConfig::from_toml(toml).expect("parse");

    assert_eq!(config.index.algorithm, IndexKind::VpTree);
    // Everything else keeps its default
    assert_eq!(config.hnsw.m, 16);
    assert_eq!(config.search.k, 100);
}

#[test]
fn test_config_from_toml_full() {
    let toml = r#"
[index]
algorithm = "brute_force"
metric = "manhattan"

[search]
k = 10

[hnsw]
m = 32
ef_construction = 400
ef_search = 64
seed = 7

[vptree]
seed = 11
parallel = false
parallel_threshold = 128

[logging]
level = "debug"
format = "json"
file = "run.log"
"#;

    let config = FastAnnConfig::from_toml(toml).expect("parse");

    assert_eq!(config.index.algorithm, IndexKind::BruteForce);
    assert_eq!(config.index.metric, DistanceMetric::Manhattan);
    assert_eq!(config.search.k, 10);
    assert_eq!(config.hnsw.m, 32);
    assert_eq!(config.hnsw.ef_construction, 400);
    assert_eq!(config.hnsw.ef_search, 64);
    assert_eq!(config.hnsw.seed, Some(7));
    assert_eq!(config.vptree.seed, Some(11));
    assert!(!config.vptree.parallel);
    assert_eq!(config.vptree.parallel_threshold, 128);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.logging.file.as_deref(), Some(std::path::Path::new("run.log")));
}

#[test]
fn test_config_from_toml_rejects_unknown_metric() {
    let toml = r#"
[index]
metric = "hamming"
"#;

    let result = FastAnnConfig::from_toml(toml);

    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}

#[test]
fn test_config_to_toml_round_trip() {
    let mut config = FastAnnConfig::default();
    config.index.algorithm = IndexKind::VpTree;
    config.hnsw.seed = Some(42);

    let toml = config.to_toml().expect("serialize");
    let parsed = FastAnnConfig::from_toml(&toml).expect("parse");

    assert_eq!(parsed.index.algorithm, IndexKind::VpTree);
    assert_eq!(parsed.hnsw.seed, Some(42));
    assert_eq!(parsed.hnsw.m, config.hnsw.m);
}

// ========================================================================
// Validation
// ========================================================================

#[test]
fn test_validate_rejects_zero_k() {
    let mut config = FastAnnConfig::default();
    config.search.k = 0;

    let err = config.validate().unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "search.k"));
}

#[test]
fn test_validate_rejects_zero_m() {
    let mut config = FastAnnConfig::default();
    config.hnsw.m = 0;

    let err = config.validate().unwrap_err();

    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "hnsw.m"));
}

#[test]
fn test_validate_accepts_m_of_one() {
    let mut config = FastAnnConfig::default();
    config.hnsw.m = 1;
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_rejects_zero_ef() {
    let mut config = FastAnnConfig::default();
    config.hnsw.ef_search = 0;
    assert!(config.validate().is_err());

    let mut config = FastAnnConfig::default();
    config.hnsw.ef_construction = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_logging() {
    let mut config = FastAnnConfig::default();
    config.logging.level = "verbose".to_string();
    assert!(config.validate().is_err());

    let mut config = FastAnnConfig::default();
    config.logging.format = "xml".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_config_error_converts_to_crate_error() {
    let err: crate::error::Error = ConfigError::ParseError("bad".to_string()).into();
    assert_eq!(err.code(), "FANN-001");
}

// ========================================================================
// File and environment layering
// ========================================================================

#[test]
#[serial]
fn test_load_from_path_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[hnsw]\nm = 24\n\n[search]\nk = 5").expect("write");

    let config = FastAnnConfig::load_from_path(file.path()).expect("load");

    assert_eq!(config.hnsw.m, 24);
    assert_eq!(config.search.k, 5);
}

#[test]
#[serial]
fn test_load_from_missing_path_uses_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");

    let config = FastAnnConfig::load_from_path(dir.path().join("absent.toml")).expect("load");

    assert_eq!(config.hnsw.m, 16);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[hnsw]\nef_search = 50").expect("write");
    std::env::set_var("FASTANN_HNSW__EF_SEARCH", "250");

    let result = FastAnnConfig::load_from_path(file.path());
    std::env::remove_var("FASTANN_HNSW__EF_SEARCH");

    assert_eq!(result.expect("load").hnsw.ef_search, 250);
}
