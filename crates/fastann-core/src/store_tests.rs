//! Tests for `store` module

use super::distance::DistanceMetric;
use super::error::Error;
use super::store::*;
use proptest::prelude::*;

fn line_store(n: usize) -> VectorStore {
    // id = 100 + i, vector = (i, 0)
    VectorStore::from_records(2, (0..n).map(|i| (100 + i as u64, vec![i as f32, 0.0])))
        .expect("valid records")
}

#[test]
fn test_new_rejects_zero_dimension() {
    let err = VectorStore::new(0).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_append_returns_positions() {
    let mut store = VectorStore::new(3).unwrap();

    assert_eq!(store.append(42, &[1.0, 2.0, 3.0]).unwrap(), 0);
    assert_eq!(store.append(7, &[4.0, 5.0, 6.0]).unwrap(), 1);

    assert_eq!(store.len(), 2);
    assert_eq!(store.dimension(), 3);
    let record = store.at(1).unwrap();
    assert_eq!(record.id, 7);
    assert_eq!(record.vector, &[4.0, 5.0, 6.0]);
}

#[test]
fn test_append_rejects_wrong_dimension() {
    let mut store = VectorStore::new(3).unwrap();

    let err = store.append(1, &[1.0, 2.0]).unwrap_err();

    assert!(matches!(
        err,
        Error::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
    assert!(store.is_empty());
}

#[test]
fn test_duplicate_ids_are_kept() {
    let mut store = VectorStore::new(1).unwrap();
    store.append(5, &[1.0]).unwrap();
    store.append(5, &[2.0]).unwrap();
    assert_eq!(store.len(), 2);
}

#[test]
fn test_at_out_of_range() {
    let store = line_store(3);

    let err = store.at(3).unwrap_err();

    assert!(matches!(err, Error::IndexOutOfRange { position: 3, len: 3 }));
    assert!(!err.is_recoverable());
    assert!(store.get(3).is_none());
}

#[test]
fn test_swap_keeps_id_with_vector() {
    let mut store = line_store(4);

    store.swap(0, 3).unwrap();

    let first = store.at(0).unwrap();
    assert_eq!(first.id, 103);
    assert_eq!(first.vector, &[3.0, 0.0]);
    let last = store.at(3).unwrap();
    assert_eq!(last.id, 100);
    assert_eq!(last.vector, &[0.0, 0.0]);
}

#[test]
fn test_swap_out_of_range() {
    let mut store = line_store(2);
    assert!(matches!(
        store.swap(0, 5),
        Err(Error::IndexOutOfRange { position: 5, .. })
    ));
}

#[test]
fn test_iter_in_position_order() {
    let store = line_store(3);
    let ids: Vec<u64> = store.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![100, 101, 102]);
}

#[test]
fn test_partition_places_median() {
    // Pivot (0,0) at position 0; the rest shuffled
    let mut store = VectorStore::from_records(
        2,
        vec![
            (0, vec![0.0, 0.0]),
            (5, vec![5.0, 0.0]),
            (2, vec![2.0, 0.0]),
            (4, vec![4.0, 0.0]),
            (1, vec![1.0, 0.0]),
            (3, vec![3.0, 0.0]),
        ],
    )
    .unwrap();

    let threshold = store
        .partition_by_distance(0..6, 3, &DistanceMetric::Euclidean)
        .unwrap();

    assert_eq!(store.at(0).unwrap().id, 0, "pivot must not move");
    assert_eq!(store.at(3).unwrap().id, 3);
    assert!((threshold - 3.0).abs() < 1e-6);
    for pos in 1..3 {
        assert!(store.at(pos).unwrap().id < 3);
    }
    for pos in 4..6 {
        assert!(store.at(pos).unwrap().id > 3);
    }
}

#[test]
fn test_partition_sub_range_leaves_outside_untouched() {
    let mut store = line_store(8);

    store
        .partition_by_distance(2..7, 4, &DistanceMetric::Euclidean)
        .unwrap();

    assert_eq!(store.at(0).unwrap().id, 100);
    assert_eq!(store.at(1).unwrap().id, 101);
    assert_eq!(store.at(2).unwrap().id, 102);
    assert_eq!(store.at(7).unwrap().id, 107);
}

#[test]
fn test_partition_rejects_bad_arguments() {
    let mut store = line_store(4);
    let metric = DistanceMetric::Euclidean;

    assert!(matches!(
        store.partition_by_distance(0..5, 2, &metric),
        Err(Error::IndexOutOfRange { .. })
    ));
    assert!(matches!(
        store.partition_by_distance(0..4, 0, &metric),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        store.partition_by_distance(0..4, 4, &metric),
        Err(Error::InvalidArgument(_))
    ));
    assert!(matches!(
        store.partition_by_distance(2..3, 2, &metric),
        Err(Error::InvalidArgument(_))
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: after partitioning, [lower+1, median) <= d(median) <= [median, upper).
    #[test]
    fn prop_partition_postcondition(
        points in proptest::collection::vec(proptest::collection::vec(-50i32..50, 3), 2..40),
        lower_frac in 0.0f64..0.5,
        seed_median in 0usize..1000
    ) {
        let n = points.len();
        let records = points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as u64, p.iter().map(|&x| x as f32).collect::<Vec<f32>>()));
        let mut store = VectorStore::from_records(3, records).unwrap();

        let lower = ((n as f64 * lower_frac) as usize).min(n - 2);
        let upper = n;
        let median = lower + 1 + seed_median % (upper - lower - 1);
        let metric = DistanceMetric::Manhattan;

        let ids_before: Vec<u64> = {
            let mut ids: Vec<u64> = store.iter().map(|r| r.id).collect();
            ids.sort_unstable();
            ids
        };
        let pivot_id = store.at(lower).unwrap().id;

        let threshold = store.partition_by_distance(lower..upper, median, &metric).unwrap();

        let pivot = store.at(lower).unwrap().vector.to_vec();
        prop_assert_eq!(store.at(lower).unwrap().id, pivot_id);
        let median_distance = metric.calculate(&pivot, store.at(median).unwrap().vector);
        prop_assert_eq!(threshold, median_distance);
        for pos in lower + 1..median {
            prop_assert!(metric.calculate(&pivot, store.at(pos).unwrap().vector) <= median_distance);
        }
        for pos in median..upper {
            prop_assert!(metric.calculate(&pivot, store.at(pos).unwrap().vector) >= median_distance);
        }

        let mut ids_after: Vec<u64> = store.iter().map(|r| r.id).collect();
        ids_after.sort_unstable();
        prop_assert_eq!(ids_before, ids_after, "partition must be a permutation");
    }
}
