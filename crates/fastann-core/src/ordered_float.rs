//! Ordered float wrapper for heaps and selection.
//!
//! Uses `f32::total_cmp`: -NaN < -∞ < ... < -0 < +0 < ... < +∞ < +NaN

use std::cmp::Ordering;

/// `f32` with a total order, usable as a `BinaryHeap` key.
///
/// Eq is bitwise so that Ord/Eq stay consistent for NaN and signed zero.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OrderedFloat(pub f32);

impl PartialEq for OrderedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for OrderedFloat {}

impl PartialOrd for OrderedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}
