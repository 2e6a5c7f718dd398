//! Dense, index-addressed storage with an affine coordinate mapping.
//!
//! Every entry sits at `coordinate = base + index * step`. Coordinates map
//! back to indices by rounding to nearest, so a coordinate that drifted by
//! floating error still lands on its slot. Writes past the end backfill the
//! gap through a [`Backfill`] policy and mark the filled slots invalid.

use num_traits::Float;

use crate::constants::MAX_BACKFILL_GAP;
use crate::error::{Result, SeriesError};
use crate::validity::Validity;

/// Supplies values for gap slots created by a write past the end.
pub trait Backfill<T> {
    /// Value for gap slot `offset` (0-based) of `gap` slots lying between
    /// `previous`, the last populated entry if any, and `next`, the value
    /// being written.
    fn fill(&self, previous: Option<&T>, next: &T, offset: usize, gap: usize) -> T;
}

/// Fills gaps with `T::default()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFill;

impl<T: Default> Backfill<T> for DefaultFill {
    fn fill(&self, _previous: Option<&T>, _next: &T, _offset: usize, _gap: usize) -> T {
        T::default()
    }
}

/// Repeats the last populated entry, or the new value when the series was empty.
#[derive(Clone, Copy, Debug, Default)]
pub struct HoldFill;

impl<T: Clone> Backfill<T> for HoldFill {
    fn fill(&self, previous: Option<&T>, next: &T, _offset: usize, _gap: usize) -> T {
        previous.unwrap_or(next).clone()
    }
}

/// Straight line between the last populated entry and the new value.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearFill;

impl<T: Float> Backfill<T> for LinearFill {
    fn fill(&self, previous: Option<&T>, next: &T, offset: usize, gap: usize) -> T {
        let Some(&prev) = previous else {
            return *next;
        };
        let (Some(num), Some(den)) = (T::from(offset + 1), T::from(gap + 1)) else {
            return prev;
        };
        prev + (*next - prev) * (num / den)
    }
}

#[derive(Clone, Debug)]
pub struct IndexedSeries<T, F = DefaultFill> {
    base: f64,
    step: f64,
    entries: Vec<T>,
    validity: Validity,
    backfill: F,
}

impl<T> IndexedSeries<T, DefaultFill> {
    /// Create an empty series. `step` must be finite and nonzero.
    pub fn new(base: f64, step: f64) -> Result<Self> {
        Self::with_backfill(base, step, DefaultFill)
    }
}

impl<T, F> IndexedSeries<T, F> {
    pub fn with_backfill(base: f64, step: f64, backfill: F) -> Result<Self> {
        if !base.is_finite() {
            return Err(SeriesError::InvalidArgument(format!(
                "base must be finite, got {base}"
            )));
        }
        if !step.is_finite() || step == 0.0 {
            return Err(SeriesError::InvalidArgument(format!(
                "step must be finite and nonzero, got {step}"
            )));
        }
        Ok(Self {
            base,
            step,
            entries: Vec::new(),
            validity: Validity::new(),
            backfill,
        })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn backfill(&self) -> &F {
        &self.backfill
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // --- Coordinate mapping ---

    /// Nearest index for `coordinate`: `round((coordinate - base) / step)`.
    /// Negative when the coordinate lies before `base` in step direction.
    pub fn index_of(&self, coordinate: f64) -> i64 {
        ((coordinate - self.base) / self.step).round() as i64
    }

    pub fn coordinate_of(&self, index: usize) -> f64 {
        self.base + index as f64 * self.step
    }

    /// Coordinate of the last populated index.
    pub fn max_coordinate(&self) -> Result<f64> {
        match self.entries.len() {
            0 => Err(SeriesError::OutOfRange { index: -1, len: 0 }),
            n => Ok(self.coordinate_of(n - 1)),
        }
    }

    /// Index for `coordinate`, rejecting non-finite input and anything before index 0.
    /// Does not check against the current length.
    pub fn slot_of(&self, coordinate: f64) -> Result<usize> {
        if !coordinate.is_finite() {
            return Err(SeriesError::InvalidArgument(format!(
                "coordinate must be finite, got {coordinate}"
            )));
        }
        let index = self.index_of(coordinate);
        usize::try_from(index).map_err(|_| SeriesError::OutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    // --- Reads ---

    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index)
    }

    pub fn read_at(&self, index: usize) -> Result<&T> {
        self.entries.get(index).ok_or(SeriesError::OutOfRange {
            index: index as i64,
            len: self.entries.len(),
        })
    }

    pub fn read_at_coordinate(&self, coordinate: f64) -> Result<&T> {
        let index = self.slot_of(coordinate)?;
        self.read_at(index)
    }

    pub fn values(&self) -> &[T] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.entries.iter()
    }

    /// `(coordinate, value)` for every entry, in index order.
    pub fn points(&self) -> impl Iterator<Item = (f64, &T)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, v)| (self.coordinate_of(i), v))
    }

    // --- Appends ---

    /// Append at the next index and return its coordinate.
    pub fn append(&mut self, value: T) -> f64 {
        self.push_valid(value);
        self.coordinate_of(self.entries.len() - 1)
    }

    /// Append without computing the coordinate.
    pub fn append_fast(&mut self, value: T) {
        self.push_valid(value);
    }

    fn push_valid(&mut self, value: T) {
        self.validity.reconcile(self.entries.len());
        self.entries.push(value);
        self.validity.push(true);
    }

    // --- Validity overlay ---

    pub fn is_valid(&self, index: usize) -> bool {
        self.validity.get(index, self.entries.len())
    }

    pub fn is_valid_at(&self, coordinate: f64) -> bool {
        self.slot_of(coordinate)
            .map(|i| self.is_valid(i))
            .unwrap_or(false)
    }

    /// Mark an existing entry valid or invalid. Returns whether the flag changed.
    pub fn set_valid(&mut self, index: usize, valid: bool) -> Result<bool> {
        self.validity.reconcile(self.entries.len());
        if index >= self.entries.len() {
            return Err(SeriesError::OutOfRange {
                index: index as i64,
                len: self.entries.len(),
            });
        }
        Ok(self.validity.set(index, valid))
    }

    pub fn set_valid_at(&mut self, coordinate: f64, valid: bool) -> Result<bool> {
        let index = self.slot_of(coordinate)?;
        self.set_valid(index, valid)
    }

    /// Bring the overlay to the entry count. Returns whether it changed.
    pub fn reconcile_length(&mut self) -> bool {
        self.validity.reconcile(self.entries.len())
    }

    pub fn valid_count(&self) -> usize {
        self.validity.count_valid(self.entries.len())
    }

    /// Validity flags after reconciling to the entry count.
    pub fn validity_flags(&self) -> Vec<bool> {
        (0..self.entries.len()).map(|i| self.is_valid(i)).collect()
    }

    // --- Shrinking ---

    /// Drop entries from `len` onward. The overlay catches up lazily.
    pub fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.validity.clear();
    }
}

impl<T, F: Backfill<T>> IndexedSeries<T, F> {
    /// Replace the entry at `index`, or extend the series up to and including
    /// it. Gap slots come from the backfill policy and are marked invalid.
    ///
    /// A write more than [`MAX_BACKFILL_GAP`] slots past the end fails with
    /// `OutOfRange` and leaves the series untouched.
    pub fn write_at(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.entries.len();
        self.validity.reconcile(len);

        if index < len {
            self.entries[index] = value;
            self.validity.set(index, true);
            return Ok(());
        }

        let gap = index - len;
        if gap > MAX_BACKFILL_GAP {
            return Err(SeriesError::OutOfRange {
                index: i64::try_from(index).unwrap_or(i64::MAX),
                len,
            });
        }
        if gap > 0 {
            let previous = self.entries.last();
            let fills: Vec<T> = (0..gap)
                .map(|offset| self.backfill.fill(previous, &value, offset, gap))
                .collect();
            self.entries.reserve(gap + 1);
            self.entries.extend(fills);
            for _ in 0..gap {
                self.validity.push(false);
            }
        }
        self.entries.push(value);
        self.validity.push(true);
        Ok(())
    }

    /// [`write_at`](Self::write_at) at the index nearest `coordinate`.
    /// Returns the index written.
    pub fn write_at_coordinate(&mut self, coordinate: f64, value: T) -> Result<usize> {
        let index = self.slot_of(coordinate)?;
        self.write_at(index, value)?;
        Ok(index)
    }
}

impl<T: Default, F> IndexedSeries<T, F> {
    /// Remove in place: the slot keeps its index, takes the default value and
    /// is marked invalid. Returns the previous value.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let len = self.entries.len();
        let slot = self.entries.get_mut(index).ok_or(SeriesError::OutOfRange {
            index: index as i64,
            len,
        })?;
        let old = std::mem::take(slot);
        self.validity.reconcile(len);
        self.validity.set(index, false);
        Ok(old)
    }

    pub fn remove_at_coordinate(&mut self, coordinate: f64) -> Result<T> {
        let index = self.slot_of(coordinate)?;
        self.remove_at(index)
    }
}

impl<'a, T, F> IntoIterator for &'a IndexedSeries<T, F> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(base: f64, step: f64, n: usize, entry: f64) -> IndexedSeries<f64> {
        let mut s = IndexedSeries::new(base, step).unwrap();
        for _ in 0..n {
            s.append(entry);
        }
        s
    }

    fn assert_out_of_range<T: std::fmt::Debug>(r: Result<T>) {
        assert!(
            matches!(r, Err(SeriesError::OutOfRange { .. })),
            "expected OutOfRange, got {r:?}"
        );
    }

    #[test]
    fn test_index_mapping() {
        let s: IndexedSeries<f64> = IndexedSeries::new(0.0, 2.0).unwrap();
        assert_eq!(s.coordinate_of(3), 6.0);
        assert_eq!(s.index_of(6.0), 3);
    }

    #[test]
    fn test_index_mapping_irregular_step() {
        let s: IndexedSeries<f64> = IndexedSeries::new(0.582, 1.78305).unwrap();
        assert!((s.coordinate_of(3) - 5.93115).abs() < 1e-12);
        assert_eq!(s.index_of(5.93115), 3);
    }

    #[test]
    fn test_index_mapping_tiny_step() {
        let s: IndexedSeries<f64> = IndexedSeries::new(0.0, f64::MIN_POSITIVE).unwrap();
        assert_eq!(s.index_of(3.0 * f64::MIN_POSITIVE), 3);
    }

    #[test]
    fn test_index_mapping_negative_step() {
        let s: IndexedSeries<f64> = IndexedSeries::new(0.0, -5.0).unwrap();
        assert_eq!(s.coordinate_of(3), -15.0);
        assert_eq!(s.index_of(-15.0), 3);
        assert_eq!(s.index_of(5.0), -1);
    }

    #[test]
    fn test_rounds_to_nearest() {
        let s: IndexedSeries<f64> = IndexedSeries::new(0.0, 1.0).unwrap();
        assert_eq!(s.index_of(3.499_999_999_999), 3);
        assert_eq!(s.index_of(2.5), 3);
        assert_eq!(s.index_of(2.9), 3);
    }

    #[test]
    fn test_zero_step_rejected() {
        let r: Result<IndexedSeries<f64>> = IndexedSeries::new(0.0, 0.0);
        assert!(matches!(r, Err(SeriesError::InvalidArgument(_))));
        let r: Result<IndexedSeries<f64>> = IndexedSeries::new(f64::NAN, 1.0);
        assert!(r.is_err());
        let r: Result<IndexedSeries<f64>> = IndexedSeries::new(0.0, f64::INFINITY);
        assert!(r.is_err());
    }

    #[test]
    fn test_append_returns_coordinate() {
        let mut s = IndexedSeries::new(0.0, 1.0).unwrap();
        for (i, expected) in [0.0, 1.0, 2.0, 3.0].iter().enumerate() {
            assert_eq!(s.append(3.0), *expected, "append #{i}");
        }
        assert_eq!(s.len(), 4);
        assert_eq!(*s.read_at(3).unwrap(), 3.0);
    }

    #[test]
    fn test_reads_by_index_and_coordinate() {
        let s = filled(0.0, 1.0, 4, 3.0);
        assert_eq!(*s.read_at(3).unwrap(), 3.0);
        assert_eq!(*s.read_at_coordinate(3.0).unwrap(), 3.0);
        assert_eq!(*s.read_at_coordinate(3.0 + 0.499_999_999_999_999).unwrap(), 3.0);
        assert_eq!(*s.read_at_coordinate(3.0 - 0.5).unwrap(), 3.0);
        assert_out_of_range(s.read_at_coordinate(-1.0));
        assert_out_of_range(s.read_at_coordinate(4.0));
        assert_out_of_range(s.read_at(4));
    }

    #[test]
    fn test_append_fast_matches_append() {
        let mut a = IndexedSeries::new(0.0, 1.0).unwrap();
        let mut b = IndexedSeries::new(0.0, 1.0).unwrap();
        for v in [1.0, 2.0, 3.0] {
            a.append(v);
            b.append_fast(v);
        }
        assert_eq!(a.values(), b.values());
        assert!(b.is_valid(2));
    }

    #[test]
    fn test_write_at_backfills_gap_as_invalid() {
        let mut s = IndexedSeries::new(0.0, 1.0).unwrap();
        s.write_at(3, 3.0).unwrap();
        assert_eq!(s.len(), 4);
        assert_eq!(s.values(), &[0.0, 0.0, 0.0, 3.0]);
        assert!(!s.is_valid(0));
        assert!(!s.is_valid(2));
        assert!(s.is_valid(3));
        assert_eq!(s.valid_count(), 1);
    }

    #[test]
    fn test_write_at_replaces_without_shifting() {
        let mut s = filled(0.0, 1.0, 4, 1.0);
        s.write_at(1, 9.0).unwrap();
        assert_eq!(s.values(), &[1.0, 9.0, 1.0, 1.0]);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_write_at_restores_validity() {
        let mut s = filled(0.0, 1.0, 3, 1.0);
        s.remove_at(1).unwrap();
        assert!(!s.is_valid(1));
        s.write_at(1, 2.0).unwrap();
        assert!(s.is_valid(1));
    }

    #[test]
    fn test_write_at_coordinate() {
        let mut s = IndexedSeries::new(0.0, 1.0).unwrap();
        assert_eq!(s.write_at_coordinate(3.0 + 0.499_999_999_999_999, 3.0).unwrap(), 3);
        assert_eq!(*s.read_at(3).unwrap(), 3.0);
        assert_eq!(s.len(), 4);
    }

    #[test]
    fn test_write_before_base_rejected() {
        let mut s = IndexedSeries::new(0.0, 1.0).unwrap();
        assert_out_of_range(s.write_at_coordinate(-1.0, 3.0));
        assert_out_of_range(s.write_at_coordinate(-0.500_000_000_000_000_1, 3.0));
        assert!(s.is_empty());
        assert!(matches!(
            s.write_at_coordinate(f64::NAN, 1.0),
            Err(SeriesError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_hold_fill() {
        let mut s = IndexedSeries::with_backfill(0.0, 1.0, HoldFill).unwrap();
        s.append(2.0);
        s.write_at(3, 7.0).unwrap();
        assert_eq!(s.values(), &[2.0, 2.0, 2.0, 7.0]);

        let mut empty = IndexedSeries::with_backfill(0.0, 1.0, HoldFill).unwrap();
        empty.write_at(2, 4.0).unwrap();
        assert_eq!(empty.values(), &[4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_linear_fill() {
        let mut s = IndexedSeries::with_backfill(0.0, 1.0, LinearFill).unwrap();
        s.append(0.0);
        s.write_at(4, 8.0).unwrap();
        assert_eq!(s.values(), &[0.0, 2.0, 4.0, 6.0, 8.0]);
        assert!(!s.is_valid(2));
    }

    #[test]
    fn test_max_coordinate() {
        let empty: IndexedSeries<f64> = IndexedSeries::new(0.0, 1.0).unwrap();
        assert_out_of_range(empty.max_coordinate());

        let mut s = IndexedSeries::new(1.0, 0.5).unwrap();
        s.write_at(6, 1.0).unwrap();
        assert_eq!(s.max_coordinate().unwrap(), 4.0);
    }

    #[test]
    fn test_set_valid() {
        let mut s = filled(0.0, 1.0, 3, 1.0);
        assert!(s.set_valid(1, false).unwrap());
        assert!(!s.set_valid(1, false).unwrap());
        assert!(!s.is_valid(1));
        assert!(!s.is_valid_at(1.0));
        assert!(s.set_valid_at(1.2, true).unwrap());
        assert!(s.is_valid(1));
        assert_out_of_range(s.set_valid(3, true));
        assert_out_of_range(s.set_valid_at(-2.0, true));
    }

    #[test]
    fn test_remove_keeps_slot() {
        let mut s = filled(0.0, 1.0, 3, 5.0);
        assert_eq!(s.remove_at(1).unwrap(), 5.0);
        assert_eq!(s.len(), 3);
        assert_eq!(s.values(), &[5.0, 0.0, 5.0]);
        assert!(!s.is_valid(1));
        assert_out_of_range(s.remove_at(3));
        assert_eq!(s.remove_at_coordinate(2.0).unwrap(), 5.0);
    }

    #[test]
    fn test_truncate_reconciles_lazily() {
        let mut s = filled(0.0, 1.0, 4, 1.0);
        s.truncate(2);
        assert!(!s.is_valid(3));
        assert_eq!(s.valid_count(), 2);
        assert!(s.reconcile_length());
        assert!(!s.reconcile_length());
        s.append(2.0);
        assert!(s.is_valid(2));
        assert_eq!(s.validity_flags(), vec![true, true, true]);
    }

    #[test]
    fn test_empty_and_clear() {
        let mut s = IndexedSeries::new(0.0, 1.0).unwrap();
        assert!(s.is_empty());
        assert_out_of_range(s.read_at(0));
        s.append(3.0);
        assert!(!s.is_empty());
        s.clear();
        assert!(s.is_empty());
        assert!(!s.is_valid(0));
    }

    #[test]
    fn test_iteration() {
        let s = filled(10.0, 0.5, 3, 3.0);
        assert!(s.iter().all(|&v| v == 3.0));
        assert_eq!((&s).into_iter().count(), 3);
        let coords: Vec<f64> = s.points().map(|(x, _)| x).collect();
        assert_eq!(coords, vec![10.0, 10.5, 11.0]);
    }

    #[test]
    fn test_write_far_past_end_rejected() {
        let mut s = filled(0.0, 1.0, 2, 1.0);
        assert_out_of_range(s.write_at(MAX_BACKFILL_GAP + 3, 1.0));
        assert_out_of_range(s.write_at_coordinate(1e15, 1.0));
        assert_eq!(s.len(), 2);
        assert_eq!(s.valid_count(), 2);
    }

    #[test]
    fn test_generic_entries() {
        let mut s: IndexedSeries<Option<String>> = IndexedSeries::new(0.0, 1.0).unwrap();
        s.write_at(2, Some("x".to_string())).unwrap();
        assert_eq!(s.read_at(0).unwrap(), &None);
        assert_eq!(s.read_at(2).unwrap().as_deref(), Some("x"));
    }
}
