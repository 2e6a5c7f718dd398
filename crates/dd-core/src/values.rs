//! Numeric series with a y-precision and a cached derivative-depth array.

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::compare::{check_tolerance, within};
use crate::depth::{DepthConfig, DepthEngine};
use crate::error::{Result, SeriesError};
use crate::regime::{Regime, Segment, segments};
use crate::series::{Backfill, DefaultFill, IndexedSeries};

/// Immutable `(x, y)` pair: coordinate and value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValuePair<T> {
    pub x: f64,
    pub y: T,
}

impl<T> ValuePair<T> {
    pub fn new(x: f64, y: T) -> Self {
        Self { x, y }
    }
}

/// An [`IndexedSeries`] of floats that answers approximate containment
/// queries and classifies itself by derivative depth.
///
/// The depth cache is rebuilt lazily: every mutation marks it dirty, and the
/// next depth read recomputes the whole array.
#[derive(Clone, Debug)]
pub struct ValueSeries<T, F = DefaultFill> {
    series: IndexedSeries<T, F>,
    y_precision: T,
    engine: DepthEngine,
    depths: Vec<i32>,
    depths_dirty: bool,
}

impl<T: Float> ValueSeries<T, DefaultFill> {
    pub fn new(base: f64, step: f64, y_precision: T) -> Result<Self> {
        Self::with_config(base, step, y_precision, &DepthConfig::default())
    }

    pub fn with_config(
        base: f64,
        step: f64,
        y_precision: T,
        config: &DepthConfig,
    ) -> Result<Self> {
        Self::from_parts(IndexedSeries::new(base, step)?, y_precision, config)
    }
}

impl<T: Float, F> ValueSeries<T, F> {
    /// Wrap an existing series. Its entries are kept as they are.
    pub fn from_parts(
        series: IndexedSeries<T, F>,
        y_precision: T,
        config: &DepthConfig,
    ) -> Result<Self> {
        check_tolerance(y_precision, "y_precision")?;
        Ok(Self {
            series,
            y_precision,
            engine: DepthEngine::new(config)?,
            depths: Vec::new(),
            depths_dirty: true,
        })
    }

    /// Read access to the underlying series: coordinates, values, validity.
    pub fn series(&self) -> &IndexedSeries<T, F> {
        &self.series
    }

    pub fn y_precision(&self) -> T {
        self.y_precision
    }

    pub fn engine(&self) -> &DepthEngine {
        &self.engine
    }

    /// Swap the engine; the cache is rebuilt on next read.
    pub fn set_engine(&mut self, engine: DepthEngine) {
        self.engine = engine;
        self.mark_dirty();
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn coordinate_of(&self, index: usize) -> f64 {
        self.series.coordinate_of(index)
    }

    pub fn read_at(&self, index: usize) -> Result<T> {
        self.series.read_at(index).copied()
    }

    pub fn read_at_coordinate(&self, coordinate: f64) -> Result<T> {
        self.series.read_at_coordinate(coordinate).copied()
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.series.is_valid(index)
    }

    pub fn is_valid_at(&self, coordinate: f64) -> bool {
        self.series.is_valid_at(coordinate)
    }

    pub fn valid_count(&self) -> usize {
        self.series.valid_count()
    }

    pub fn max_coordinate(&self) -> Result<f64> {
        self.series.max_coordinate()
    }

    // --- Mutation (every path invalidates the depth cache) ---

    pub fn mark_dirty(&mut self) {
        self.depths_dirty = true;
    }

    pub fn append(&mut self, value: T) -> f64 {
        self.mark_dirty();
        self.series.append(value)
    }

    pub fn append_fast(&mut self, value: T) {
        self.mark_dirty();
        self.series.append_fast(value);
    }

    pub fn set_valid(&mut self, index: usize, valid: bool) -> Result<bool> {
        self.series.set_valid(index, valid)
    }

    pub fn set_valid_at(&mut self, coordinate: f64, valid: bool) -> Result<bool> {
        self.series.set_valid_at(coordinate, valid)
    }

    pub fn remove_at(&mut self, index: usize) -> Result<T>
    where
        T: Default,
    {
        let old = self.series.remove_at(index)?;
        self.mark_dirty();
        Ok(old)
    }

    pub fn remove_at_coordinate(&mut self, coordinate: f64) -> Result<T>
    where
        T: Default,
    {
        let index = self.series.slot_of(coordinate)?;
        self.remove_at(index)
    }

    pub fn truncate(&mut self, len: usize) {
        self.mark_dirty();
        self.series.truncate(len);
    }

    pub fn clear(&mut self) {
        self.mark_dirty();
        self.series.clear();
    }

    // --- Containment ---

    /// Whether the entry at `index` is within `y_precision` of `value`.
    /// An index with no entry is simply not a match.
    pub fn contains_at(&self, index: usize, value: T) -> bool {
        self.series
            .get(index)
            .is_some_and(|&v| within(value, v, self.y_precision))
    }

    /// Whether any entry whose coordinate lies within `x_tolerance` of
    /// `coordinate` has a value within `y_tolerance` of `value`.
    ///
    /// The nearest index is always tested, so zero tolerances reduce to an
    /// exact match at the slot `coordinate` rounds to. From there the search
    /// walks outward in both directions, stopping each walk at the first
    /// coordinate outside `x_tolerance`.
    pub fn contains_near(
        &self,
        coordinate: f64,
        value: T,
        x_tolerance: f64,
        y_tolerance: T,
    ) -> Result<bool> {
        check_tolerance(x_tolerance, "x_tolerance")?;
        check_tolerance(y_tolerance, "y_tolerance")?;
        if !coordinate.is_finite() {
            return Ok(false);
        }

        let nearest = self.series.index_of(coordinate);
        let in_reach = |index: i64| {
            let x = self.series.base() + index as f64 * self.series.step();
            (x - coordinate).abs() <= x_tolerance
        };
        let matches = |index: i64| {
            usize::try_from(index)
                .ok()
                .and_then(|i| self.series.get(i))
                .is_some_and(|&v| within(value, v, y_tolerance))
        };

        let last = self.series.len() as i64 - 1;
        if (0..=last).contains(&nearest) && matches(nearest) {
            return Ok(true);
        }

        // Slots between the nearest index and the populated range are closer
        // than the range edge, so the walks may start at the edge.
        let mut index = (nearest - 1).min(last);
        while index >= 0 && in_reach(index) {
            if matches(index) {
                return Ok(true);
            }
            index -= 1;
        }

        let mut index = (nearest + 1).max(0);
        while index <= last && in_reach(index) {
            if matches(index) {
                return Ok(true);
            }
            index += 1;
        }
        Ok(false)
    }

    /// [`contains_near`](Self::contains_near) with `|step| / 2` and `y_precision`.
    pub fn contains(&self, coordinate: f64, value: T) -> bool {
        let x_tolerance = self.series.step().abs() / 2.0;
        self.contains_near(coordinate, value, x_tolerance, self.y_precision)
            .unwrap_or(false)
    }

    pub fn contains_pair(&self, pair: &ValuePair<T>) -> bool {
        self.contains(pair.x, pair.y)
    }

    // --- Derivative depth ---

    /// Recompute the depth array if anything changed since the last run.
    pub fn calc_deriv_depths(&mut self) -> Result<&[i32]> {
        if self.depths_dirty || self.depths.len() != self.series.len() {
            self.depths = self.engine.classify_series(&self.series)?;
            self.depths_dirty = false;
        }
        Ok(&self.depths)
    }

    /// Depth code at `index`, recomputing first when the cache is stale or
    /// shorter than `index`.
    pub fn deriv_depth(&mut self, index: usize) -> Result<i32> {
        if self.depths_dirty || index >= self.depths.len() {
            self.calc_deriv_depths()?;
        }
        self.depths
            .get(index)
            .copied()
            .ok_or(SeriesError::OutOfRange {
                index: index as i64,
                len: self.depths.len(),
            })
    }

    pub fn deriv_depth_at(&mut self, coordinate: f64) -> Result<i32> {
        let index = self.series.slot_of(coordinate)?;
        self.deriv_depth(index)
    }

    /// The cached array as last computed, without recomputing.
    pub fn cached_depths(&self) -> Option<&[i32]> {
        (!self.depths_dirty).then_some(self.depths.as_slice())
    }

    pub fn regime(&mut self, index: usize) -> Result<Regime> {
        self.deriv_depth(index).map(Regime::from_depth)
    }

    pub fn segments(&mut self) -> Result<Vec<Segment>> {
        Ok(segments(self.calc_deriv_depths()?))
    }
}

impl<T: Float, F: Backfill<T>> ValueSeries<T, F> {
    pub fn write_at(&mut self, index: usize, value: T) -> Result<()> {
        self.series.write_at(index, value)?;
        self.mark_dirty();
        Ok(())
    }

    pub fn write_at_coordinate(&mut self, coordinate: f64, value: T) -> Result<usize> {
        let index = self.series.write_at_coordinate(coordinate, value)?;
        self.mark_dirty();
        Ok(index)
    }

    /// Write `pair.y` at the index nearest `pair.x`.
    pub fn append_pair(&mut self, pair: ValuePair<T>) -> Result<usize> {
        self.write_at_coordinate(pair.x, pair.y)
    }
}
