//! CLI integration tests for the `fastann` binary, using `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[allow(deprecated)]
fn fastann_cmd() -> Command {
    let mut cmd = Command::cargo_bin("fastann").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_fvecs(path: &Path, rows: &[Vec<f32>]) {
    let mut bytes = Vec::new();
    for row in rows {
        bytes.extend_from_slice(&(row.len() as i32).to_le_bytes());
        for v in row {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }
    fs::write(path, bytes).unwrap();
}

fn read_ivecs(path: &Path) -> Vec<Vec<i32>> {
    let bytes = fs::read(path).unwrap();
    let mut rows = Vec::new();
    let mut chunks = bytes.chunks_exact(4).map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]));
    while let Some(dim) = chunks.next() {
        rows.push((0..dim).map(|_| chunks.next().unwrap()).collect());
    }
    rows
}

/// 50 points on the x axis at x = 0, 1, ..., 49.
fn line_dataset(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    let base = dir.path().join("base.fvecs");
    let queries = dir.path().join("queries.fvecs");
    write_fvecs(
        &base,
        &(0..50).map(|i| vec![i as f32, 0.0]).collect::<Vec<_>>(),
    );
    write_fvecs(&queries, &[vec![10.2, 0.0], vec![48.9, 0.0]]);
    (base, queries)
}

// =============================================================================
// Help & Version Tests
// =============================================================================

#[test]
fn test_help_displays_usage() {
    fastann_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fastann CLI"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_version_displays_version() {
    fastann_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fastann"));
}

#[test]
fn test_invalid_command_shows_error() {
    fastann_cmd()
        .arg("invalid_command_xyz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// =============================================================================
// Info Command Tests
// =============================================================================

#[test]
fn test_info_reports_dimension_and_count() {
    let dir = TempDir::new().unwrap();
    let (base, _) = line_dataset(&dir);

    fastann_cmd()
        .current_dir(dir.path())
        .arg("info")
        .arg(&base)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dimension: 2"))
        .stdout(predicate::str::contains("Records:   50"));
}

#[test]
fn test_info_rejects_truncated_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.fvecs");
    let mut bytes = 3i32.to_le_bytes().to_vec();
    bytes.extend_from_slice(&1.0f32.to_le_bytes());
    fs::write(&path, bytes).unwrap();

    fastann_cmd()
        .current_dir(dir.path())
        .arg("info")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("truncated"));
}

// =============================================================================
// Ground Truth Tests
// =============================================================================

#[test]
fn test_ground_truth_writes_ivecs() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);
    let output = dir.path().join("gt.ivecs");

    fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "ground-truth", "-k", "3", "--metric", "euclidean"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));

    let rows = read_ivecs(&output);
    assert_eq!(rows, vec![vec![10, 11, 9], vec![49, 48, 47]]);
}

#[test]
fn test_ground_truth_rejects_dimension_mismatch() {
    let dir = TempDir::new().unwrap();
    let (base, _) = line_dataset(&dir);
    let queries = dir.path().join("bad_queries.fvecs");
    write_fvecs(&queries, &[vec![1.0, 2.0, 3.0]]);

    fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "ground-truth", "-k", "3"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .arg("--output")
        .arg(dir.path().join("gt.ivecs"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not match"));
}

// =============================================================================
// Bench Command Tests
// =============================================================================

#[test]
fn test_bench_json_report_for_every_algorithm() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);

    for algorithm in ["brute_force", "vp_tree", "hnsw"] {
        let output = fastann_cmd()
            .current_dir(dir.path())
            .args(["--quiet", "bench", "--format", "json", "-k", "5", "--seed", "7"])
            .args(["--algorithm", algorithm, "--metric", "euclidean"])
            .arg("--base")
            .arg(&base)
            .arg("--queries")
            .arg(&queries)
            .output()
            .unwrap();
        assert!(output.status.success(), "{algorithm}");

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["algorithm"], algorithm);
        assert_eq!(report["points"], 50);
        assert_eq!(report["queries"], 2);
        assert_eq!(report["k"], 5);
        assert!(report["recall"].as_f64().unwrap() > 0.99, "{algorithm}");
    }
}

#[test]
fn test_bench_uses_ground_truth_file() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);
    let gt = dir.path().join("gt.ivecs");
    // Deliberately wrong truth for the first query
    let mut bytes = Vec::new();
    for row in [[0i32, 1, 2], [49, 48, 47]] {
        bytes.extend_from_slice(&3i32.to_le_bytes());
        for id in row {
            bytes.extend_from_slice(&id.to_le_bytes());
        }
    }
    fs::write(&gt, bytes).unwrap();

    let output = fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "bench", "--format", "json", "-k", "3"])
        .args(["--algorithm", "brute_force"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .arg("--ground-truth")
        .arg(&gt)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let recall = report["recall"].as_f64().unwrap();
    assert!((recall - 0.5).abs() < 1e-9, "recall {recall}");
}

#[test]
fn test_bench_table_output() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);

    fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "bench", "-k", "2", "--algorithm", "vp_tree"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .assert()
        .success()
        .stdout(predicate::str::contains("Benchmark Summary"))
        .stdout(predicate::str::contains("recall@2"));
}

#[test]
fn test_bench_rejects_unknown_algorithm() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);

    fastann_cmd()
        .current_dir(dir.path())
        .args(["bench", "--algorithm", "annoy"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown index"));
}

#[test]
fn test_bench_rejects_invalid_hnsw_parameters() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);

    fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "bench", "--m", "0"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .assert()
        .failure()
        .stderr(predicate::str::contains("hnsw.m"));
}

#[test]
fn test_config_file_selects_algorithm() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);
    fs::write(
        dir.path().join("fastann.toml"),
        "[index]\nalgorithm = \"vp_tree\"\nmetric = \"manhattan\"\n\n[search]\nk = 4\n",
    )
    .unwrap();

    let output = fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "bench", "--format", "json"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .output()
        .unwrap();
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["algorithm"], "vp_tree");
    assert_eq!(report["metric"], "manhattan");
    assert_eq!(report["k"], 4);
}

// =============================================================================
// Logging Tests
// =============================================================================

#[test]
fn test_log_file_receives_diagnostics() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);
    let log = dir.path().join("bench.log");

    fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "bench", "--format", "json", "-k", "3"])
        .args(["--algorithm", "brute_force"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .arg("--log-file")
        .arg(&log)
        .assert()
        .success()
        .stderr(predicate::str::contains("Building index").not());

    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Building index"), "{contents}");
    assert!(!contents.contains('\u{1b}'), "log file must not carry ANSI escapes");
}

#[test]
fn test_log_file_from_config() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);
    fs::write(
        dir.path().join("fastann.toml"),
        "[logging]\nlevel = \"debug\"\nfile = \"fastann.log\"\n",
    )
    .unwrap();

    fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "bench", "--format", "json", "--algorithm", "vp_tree"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .assert()
        .success();

    let contents = fs::read_to_string(dir.path().join("fastann.log")).unwrap();
    assert!(contents.contains("Loaded base vectors"), "{contents}");
}

#[test]
fn test_default_logging_goes_to_stderr() {
    let dir = TempDir::new().unwrap();
    let (base, queries) = line_dataset(&dir);

    fastann_cmd()
        .current_dir(dir.path())
        .args(["--quiet", "bench", "--format", "json", "--algorithm", "brute_force"])
        .arg("--base")
        .arg(&base)
        .arg("--queries")
        .arg(&queries)
        .assert()
        .success()
        .stderr(predicate::str::contains("Building index"));
}
