//! Tests for `metrics` module

use super::metrics::*;
use std::time::Duration;

// ---- recall / precision / reciprocal rank ----

#[test]
fn test_recall_at_k_perfect() {
    let ground_truth = vec![1u64, 2, 3, 4, 5];
    let results = vec![5u64, 4, 3, 2, 1];

    let recall = recall_at_k(&ground_truth, &results);

    assert!((recall - 1.0).abs() < f64::EPSILON, "Expected 1.0, got {recall}");
}

#[test]
fn test_recall_at_k_partial() {
    let ground_truth = vec![1u64, 2, 3, 4, 5];
    let results = vec![1u64, 3, 6, 2, 7];

    let recall = recall_at_k(&ground_truth, &results);

    assert!((recall - 0.6).abs() < 1e-9, "Expected 0.6, got {recall}");
}

#[test]
fn test_recall_at_k_empty_ground_truth() {
    assert!(recall_at_k::<u64>(&[], &[1, 2]).abs() < f64::EPSILON);
}

#[test]
fn test_precision_at_k_partial() {
    let ground_truth = vec![1u64, 2, 3];
    let results = vec![1u64, 9, 2, 8];

    let precision = precision_at_k(&ground_truth, &results);

    assert!((precision - 0.5).abs() < 1e-9);
    assert!(precision_at_k::<u64>(&ground_truth, &[]).abs() < f64::EPSILON);
}

#[test]
fn test_mrr_ranks() {
    let ground_truth = vec![3u64];

    assert!((mrr(&ground_truth, &[3, 1, 2]) - 1.0).abs() < f64::EPSILON);
    assert!((mrr(&ground_truth, &[1, 2, 3]) - 1.0 / 3.0).abs() < 1e-9);
    assert!(mrr(&ground_truth, &[1, 2]).abs() < f64::EPSILON);
}

#[test]
fn test_average_metrics() {
    let ground_truths = vec![vec![1u64, 2], vec![3u64, 4]];
    let results = vec![vec![1u64, 2], vec![5u64, 3]];

    let quality = average_metrics(&ground_truths, &results);

    assert_eq!(quality.queries, 2);
    assert!((quality.recall - 0.75).abs() < 1e-9);
    assert!((quality.precision - 0.75).abs() < 1e-9);
    assert!((quality.mrr - 0.75).abs() < 1e-9);
}

#[test]
fn test_average_metrics_ignores_unpaired_queries() {
    let ground_truths = vec![vec![1u64], vec![2u64], vec![3u64]];
    let results = vec![vec![1u64]];

    let quality = average_metrics(&ground_truths, &results);

    assert_eq!(quality.queries, 1);
    assert!((quality.recall - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_average_metrics_empty() {
    let quality = average_metrics::<u64>(&[], &[]);

    assert_eq!(quality, QualityMetrics::default());
}

// ---- latency ----

#[test]
fn test_latency_stats_basic() {
    let samples: Vec<Duration> = vec![
        Duration::from_micros(300),
        Duration::from_micros(100),
        Duration::from_micros(500),
        Duration::from_micros(200),
        Duration::from_micros(400),
    ];

    let stats = compute_latency_percentiles(&samples);

    assert_eq!(stats.count, 5);
    assert_eq!(stats.min, Duration::from_micros(100));
    assert_eq!(stats.max, Duration::from_micros(500));
    assert_eq!(stats.p50, Duration::from_micros(300));
    assert_eq!(stats.mean, Duration::from_micros(300));
}

#[test]
fn test_latency_stats_single_sample() {
    let samples = vec![Duration::from_micros(100)];

    let stats = compute_latency_percentiles(&samples);

    assert_eq!(stats.min, Duration::from_micros(100));
    assert_eq!(stats.p50, Duration::from_micros(100));
    assert_eq!(stats.p95, Duration::from_micros(100));
    assert_eq!(stats.p99, Duration::from_micros(100));
}

#[test]
fn test_latency_stats_empty() {
    let stats = compute_latency_percentiles(&[]);

    assert_eq!(stats, LatencyStats::default());
    assert_eq!(stats.p99, Duration::ZERO);
}

#[test]
fn test_latency_stats_p99() {
    let samples: Vec<Duration> = (1..=100).map(|i| Duration::from_micros(i * 10)).collect();

    let stats = compute_latency_percentiles(&samples);

    assert_eq!(stats.p50, Duration::from_micros(500));
    assert_eq!(stats.p95, Duration::from_micros(950));
    assert_eq!(stats.p99, Duration::from_micros(990));
    assert_eq!(stats.max, Duration::from_micros(1000));
}
