//! Experiment drivers: brute-force ground truth and build/query evaluation.

use anyhow::{bail, Context, Result};
use fastann_core::metrics::{average_metrics, compute_latency_percentiles, LatencyStats};
use fastann_core::{
    build_index, BruteForceIndex, DistanceMetric, FastAnnConfig, IndexKind, VectorStore,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Loads rows into a store, using each row's ordinal as its id.
pub fn store_from_rows(dimension: usize, rows: Vec<Vec<f32>>) -> Result<VectorStore> {
    VectorStore::from_records(dimension, (0u64..).zip(rows))
        .context("Failed to load base vectors")
}

/// Computes exact top-`k` ordinals for every query.
pub fn compute_ground_truth(
    store: VectorStore,
    queries: &[Vec<f32>],
    metric: DistanceMetric,
    k: usize,
    show_progress: bool,
) -> Result<Vec<Vec<i32>>> {
    let oracle = BruteForceIndex::build(store, metric);
    let progress = create_progress_bar(queries.len(), show_progress);
    progress.set_message("Computing ground truth");

    let mut rows = Vec::with_capacity(queries.len());
    for (i, query) in queries.iter().enumerate() {
        let hits = oracle
            .search(query, k)
            .with_context(|| format!("Query {i} failed"))?;
        let ids = hits
            .iter()
            .map(|h| i32::try_from(h.id).context("Record ordinal exceeds the ivecs range"))
            .collect::<Result<Vec<_>>>()?;
        rows.push(ids);
        progress.inc(1);
    }

    progress.finish_and_clear();
    Ok(rows)
}

/// Parameters of one evaluation run.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    pub algorithm: IndexKind,
    pub metric: DistanceMetric,
    pub k: usize,
    pub show_progress: bool,
}

impl ExperimentConfig {
    /// Takes every setting from a loaded configuration.
    pub fn from_config(config: &FastAnnConfig, show_progress: bool) -> Self {
        Self {
            algorithm: config.index.algorithm,
            metric: config.index.metric,
            k: config.search.k,
            show_progress,
        }
    }
}

/// Query latency summary in microseconds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LatencyReport {
    pub mean_us: f64,
    pub p50_us: f64,
    pub p95_us: f64,
    pub p99_us: f64,
    pub max_us: f64,
}

impl From<LatencyStats> for LatencyReport {
    fn from(stats: LatencyStats) -> Self {
        let us = |d: Duration| d.as_secs_f64() * 1e6;
        Self {
            mean_us: us(stats.mean),
            p50_us: us(stats.p50),
            p95_us: us(stats.p95),
            p99_us: us(stats.p99),
            max_us: us(stats.max),
        }
    }
}

/// Outcome of one evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct ExperimentReport {
    pub algorithm: IndexKind,
    pub metric: DistanceMetric,
    pub points: usize,
    pub dimension: usize,
    pub queries: usize,
    pub k: usize,
    pub build_ms: f64,
    pub latency: LatencyReport,
    pub queries_per_sec: f64,
    pub recall: f64,
    pub precision: f64,
    pub mrr: f64,
}

/// Builds the configured index, runs every query and scores the results.
///
/// Ground truth rows hold record ordinals; when absent they are computed
/// with a brute-force scan first.
pub fn run(
    store: VectorStore,
    queries: &[Vec<f32>],
    ground_truth: Option<Vec<Vec<i32>>>,
    config: &FastAnnConfig,
    experiment: &ExperimentConfig,
) -> Result<ExperimentReport> {
    let k = experiment.k;
    let points = store.len();
    let dimension = store.dimension();

    let truth = match ground_truth {
        Some(rows) => {
            if rows.len() != queries.len() {
                bail!(
                    "Ground truth has {} rows for {} queries",
                    rows.len(),
                    queries.len()
                );
            }
            rows
        }
        None => compute_ground_truth(
            store.clone(),
            queries,
            experiment.metric,
            k,
            experiment.show_progress,
        )?,
    };
    let truth: Vec<Vec<u64>> = truth
        .iter()
        .map(|row| {
            row.iter()
                .take(k)
                .filter_map(|&id| u64::try_from(id).ok())
                .collect()
        })
        .collect();

    tracing::info!(
        algorithm = %experiment.algorithm,
        metric = %experiment.metric,
        points,
        dimension,
        "Building index"
    );
    let start = Instant::now();
    let index = build_index(experiment.algorithm, store, experiment.metric, config)
        .context("Index build failed")?;
    let build_time = start.elapsed();

    let progress = create_progress_bar(queries.len(), experiment.show_progress);
    progress.set_message("Querying");
    let mut latencies = Vec::with_capacity(queries.len());
    let mut results = Vec::with_capacity(queries.len());
    let query_start = Instant::now();
    for (i, query) in queries.iter().enumerate() {
        let started = Instant::now();
        let hits = index
            .search(query, k)
            .with_context(|| format!("Query {i} failed"))?;
        latencies.push(started.elapsed());
        results.push(hits.iter().map(|h| h.id).collect::<Vec<u64>>());
        progress.inc(1);
    }
    let query_time = query_start.elapsed();
    progress.finish_and_clear();

    let quality = average_metrics(&truth, &results);
    let queries_per_sec = if query_time.is_zero() {
        0.0
    } else {
        queries.len() as f64 / query_time.as_secs_f64()
    };

    Ok(ExperimentReport {
        algorithm: experiment.algorithm,
        metric: experiment.metric,
        points,
        dimension,
        queries: queries.len(),
        k,
        build_ms: build_time.as_secs_f64() * 1e3,
        latency: compute_latency_percentiles(&latencies).into(),
        queries_per_sec,
        recall: quality.recall,
        precision: quality.precision,
        mrr: quality.mrr,
    })
}

fn create_progress_bar(total: usize, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
