//! Capacity-bounded top-k accumulator.
//!
//! [`BoundedTopK`] keeps the `k` smallest distances offered to it in a
//! max-heap, so the current worst retained entry (the search bound) is
//! always available in O(1).

use crate::ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::BinaryHeap;

/// A single search hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Stable record id.
    pub id: u64,
    /// Distance from the query.
    pub distance: f32,
}

impl Neighbor {
    /// Creates a new search hit.
    #[must_use]
    pub const fn new(id: u64, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// Accumulates the `k` smallest `(distance, id)` pairs.
///
/// Invariant: never holds more than `k` entries. Among equal distances the
/// retained ids are unspecified.
#[derive(Debug, Clone)]
pub struct BoundedTopK {
    k: usize,
    heap: BinaryHeap<(OrderedFloat, u64)>,
}

impl BoundedTopK {
    /// Creates an empty accumulator for `k` entries.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            // +1: offer pushes before evicting
            heap: BinaryHeap::with_capacity(k.saturating_add(1).min(4096)),
        }
    }

    /// Offers a candidate. Returns true if it is retained.
    ///
    /// When the structure is full, a candidate no better than the current
    /// worst is rejected outright; otherwise it is inserted and the worst
    /// entry evicted.
    pub fn offer(&mut self, distance: f32, id: u64) -> bool {
        if self.k == 0 {
            return false;
        }
        if self.heap.len() >= self.k {
            match self.heap.peek() {
                Some(&(OrderedFloat(worst), _)) if distance >= worst => return false,
                _ => {}
            }
        }
        self.heap.push((OrderedFloat(distance), id));
        if self.heap.len() > self.k {
            self.heap.pop();
        }
        true
    }

    /// Returns the kth-best distance, or `+inf` while fewer than `k` are held.
    #[must_use]
    pub fn peek_worst(&self) -> f32 {
        if self.heap.len() < self.k {
            return f32::INFINITY;
        }
        self.heap.peek().map_or(f32::INFINITY, |(d, _)| d.0)
    }

    /// Number of entries currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Returns true if nothing has been retained yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns true once `k` entries are held.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// The `k` this accumulator was created with.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.k
    }

    /// Consumes the accumulator, returning hits in ascending distance order.
    #[must_use]
    pub fn drain_sorted(self) -> Vec<Neighbor> {
        self.heap
            .into_sorted_vec()
            .into_iter()
            .map(|(d, id)| Neighbor::new(id, d.0))
            .collect()
    }
}

/// Merges per-shard result lists into one ascending top-`k` list.
///
/// Shards are assumed to hold disjoint ids; duplicates are not collapsed.
#[must_use]
pub fn merge_neighbors<I>(k: usize, shards: I) -> Vec<Neighbor>
where
    I: IntoIterator,
    I::Item: IntoIterator<Item = Neighbor>,
{
    let mut top = BoundedTopK::new(k);
    for shard in shards {
        for hit in shard {
            top.offer(hit.distance, hit.id);
        }
    }
    top.drain_sorted()
}
