//! Contiguous, append-only vector storage with in-place reordering.
//!
//! Vectors live in a single `Vec<f32>` buffer; a slot table maps each
//! physical position to its `(stable_id, buffer slot)` pair. Swapping or
//! partitioning positions only permutes the slot table, so vector bytes are
//! never moved and every stable id keeps travelling with its vector.
//!
//! # Memory Layout
//!
//! ```text
//! slots:  [ (id=7, slot=2) | (id=3, slot=0) | (id=9, slot=1) ]   <- positions 0..N
//! buffer: [ v_slot0 ......  | v_slot1 ...... | v_slot2 ...... ]   <- D floats each
//! ```

use crate::distance::Distance;
use crate::error::{Error, Result};
use crate::ordered_float::OrderedFloat;
use std::ops::Range;

/// Position-to-record mapping entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub(crate) id: u64,
    pub(crate) offset: usize,
}

/// Borrowed view of one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordRef<'a> {
    /// Stable record id, unaffected by reordering.
    pub id: u64,
    /// The record's vector.
    pub vector: &'a [f32],
}

/// Owning store of fixed-dimension vectors addressed by physical position.
///
/// Populate it with [`append`](Self::append), then hand it to an index
/// builder. The builder takes ownership; nothing else aliases the vectors.
#[derive(Clone)]
pub struct VectorStore {
    dimension: usize,
    data: Vec<f32>,
    slots: Vec<Slot>,
}

impl VectorStore {
    /// Creates an empty store for vectors of `dimension` components.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `dimension` is zero.
    pub fn new(dimension: usize) -> Result<Self> {
        Self::with_capacity(dimension, 0)
    }

    /// Creates an empty store with room for `capacity` vectors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `dimension` is zero, or
    /// [`Error::ResourceExhausted`] if the reservation fails.
    pub fn with_capacity(dimension: usize, capacity: usize) -> Result<Self> {
        if dimension == 0 {
            return Err(Error::Config("dimension must be at least 1".to_string()));
        }
        let mut data = Vec::new();
        data.try_reserve_exact(capacity.saturating_mul(dimension))?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        Ok(Self {
            dimension,
            data,
            slots,
        })
    }

    /// Builds a store from `(id, vector)` pairs, in iteration order.
    ///
    /// # Errors
    ///
    /// Fails on the first vector whose length differs from `dimension`.
    pub fn from_records<I>(dimension: usize, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, Vec<f32>)>,
    {
        let records = records.into_iter();
        let mut store = Self::with_capacity(dimension, records.size_hint().0)?;
        for (id, vector) in records {
            store.append(id, &vector)?;
        }
        Ok(store)
    }

    /// Appends a record and returns its position.
    ///
    /// Duplicate ids are accepted as-is.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DimensionMismatch`] if the vector length is wrong.
    pub fn append(&mut self, id: u64, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(Error::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        self.data.try_reserve(self.dimension)?;
        self.slots.try_reserve(1)?;

        let position = self.slots.len();
        self.data.extend_from_slice(vector);
        self.slots.push(Slot {
            id,
            offset: position,
        });
        Ok(position)
    }

    /// Returns the vector dimension.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the record at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] past the end.
    pub fn at(&self, position: usize) -> Result<RecordRef<'_>> {
        self.get(position).ok_or(Error::IndexOutOfRange {
            position,
            len: self.len(),
        })
    }

    /// Returns the record at `position`, or `None` past the end.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<RecordRef<'_>> {
        self.slots.get(position).map(|slot| RecordRef {
            id: slot.id,
            vector: self.slot_vector(*slot),
        })
    }

    /// Iterates over records in position order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = RecordRef<'_>> + '_ {
        self.slots.iter().map(move |slot| RecordRef {
            id: slot.id,
            vector: self.slot_vector(*slot),
        })
    }

    /// Swaps the records at two positions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if either position is past the end.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        self.check_position(a)?;
        self.check_position(b)?;
        self.slots.swap(a, b);
        Ok(())
    }

    /// Partially orders `[range.start + 1, range.end)` by distance from the
    /// pivot at `range.start`.
    ///
    /// Afterwards the record at `median` is the one a full sort would put
    /// there; every record in `[range.start + 1, median)` is no farther from
    /// the pivot, every record in `[median, range.end)` no closer. Expected
    /// cost is linear in the range length. The pivot itself does not move.
    ///
    /// Returns the pivot-to-median distance.
    ///
    /// # Errors
    ///
    /// - [`Error::IndexOutOfRange`] if `range.end` exceeds the store length.
    /// - [`Error::InvalidArgument`] if `median` is not strictly inside the
    ///   range (`range.start < median < range.end`).
    pub fn partition_by_distance<D: Distance + ?Sized>(
        &mut self,
        range: Range<usize>,
        median: usize,
        metric: &D,
    ) -> Result<f32> {
        if range.end > self.len() {
            return Err(Error::IndexOutOfRange {
                position: range.end - 1,
                len: self.len(),
            });
        }
        if !(range.start < median && median < range.end) {
            return Err(Error::InvalidArgument(format!(
                "median {median} must lie strictly inside {}..{}",
                range.start, range.end
            )));
        }
        let start = range.start;
        self.slice_mut(range).partition_by_distance(median - start, metric)
    }

    /// Stable id at `position`. Panics past the end.
    #[inline]
    pub(crate) fn id(&self, position: usize) -> u64 {
        self.slots[position].id
    }

    /// Vector at `position`. Panics past the end.
    #[inline]
    pub(crate) fn vector(&self, position: usize) -> &[f32] {
        self.slot_vector(self.slots[position])
    }

    /// Mutable view over a position range, for in-place tree construction.
    pub(crate) fn slice_mut(&mut self, range: Range<usize>) -> StoreSlice<'_> {
        StoreSlice {
            base: range.start,
            slots: &mut self.slots[range],
            data: &self.data,
            dimension: self.dimension,
        }
    }

    #[inline]
    fn slot_vector(&self, slot: Slot) -> &[f32] {
        slot_vector(&self.data, self.dimension, slot)
    }

    fn check_position(&self, position: usize) -> Result<()> {
        if position >= self.len() {
            return Err(Error::IndexOutOfRange {
                position,
                len: self.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Debug for VectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorStore")
            .field("dimension", &self.dimension)
            .field("len", &self.len())
            .finish()
    }
}

#[inline]
fn slot_vector(data: &[f32], dimension: usize, slot: Slot) -> &[f32] {
    let start = slot.offset * dimension;
    &data[start..start + dimension]
}

/// Mutable window over a contiguous range of store positions.
///
/// Local positions start at 0; `base` maps them back to store positions.
/// Two disjoint windows obtained from [`split_at`](Self::split_at) can be
/// reordered independently (and concurrently).
pub(crate) struct StoreSlice<'a> {
    base: usize,
    slots: &'a mut [Slot],
    data: &'a [f32],
    dimension: usize,
}

impl<'a> StoreSlice<'a> {
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Store position of local position 0.
    pub(crate) fn base(&self) -> usize {
        self.base
    }

    pub(crate) fn swap(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
    }

    /// Splits into `[0, mid)` and `[mid, len)`.
    pub(crate) fn split_at(self, mid: usize) -> (StoreSlice<'a>, StoreSlice<'a>) {
        let slots = self.slots;
        let (left, right) = slots.split_at_mut(mid);
        (
            StoreSlice {
                base: self.base,
                slots: left,
                data: self.data,
                dimension: self.dimension,
            },
            StoreSlice {
                base: self.base + mid,
                slots: right,
                data: self.data,
                dimension: self.dimension,
            },
        )
    }

    /// Selection around local `median` with the pivot at local 0.
    /// Requires `0 < median < len`.
    pub(crate) fn partition_by_distance<D: Distance + ?Sized>(
        &mut self,
        median: usize,
        metric: &D,
    ) -> Result<f32> {
        debug_assert!(median > 0 && median < self.len());
        let data = self.data;
        let dimension = self.dimension;
        let pivot = slot_vector(data, dimension, self.slots[0]);

        let mut keyed: Vec<(OrderedFloat, Slot)> = Vec::new();
        keyed.try_reserve_exact(self.len() - 1)?;
        keyed.extend(self.slots[1..].iter().map(|&slot| {
            let d = metric.distance(pivot, slot_vector(data, dimension, slot));
            (OrderedFloat(d), slot)
        }));

        let (_, &mut (median_distance, _), _) =
            keyed.select_nth_unstable_by(median - 1, |a, b| a.0.cmp(&b.0));

        for (dst, (_, slot)) in self.slots[1..].iter_mut().zip(keyed) {
            *dst = slot;
        }
        Ok(median_distance.0)
    }
}
