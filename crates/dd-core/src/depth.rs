//! Derivative-depth classification.
//!
//! For every sample the engine counts how many finite-difference levels it
//! takes before the difference vanishes: 0 for a locally constant signal, 1
//! for a ramp, `p` for a degree-`p` polynomial. Three passes:
//!
//! 1. Build a Newton forward-difference table, capped at `max_depth` columns.
//!    Each new row fills one anti-diagonal, so the cost per sample is
//!    O(max_depth).
//! 2. The first zero column of each row gives its depth; a row with no zero
//!    within the budget is [`UNRESOLVED`].
//! 3. A row whose top column is still live although a lower column already
//!    vanished is looking at a regime change `max_depth - 2` rows ahead. That
//!    row is marked [`BOUNDARY`] and the contaminated rows up to it repeat
//!    the last stable depth.
//!
//! The last `max_depth` or so rows lack the forward context for a full column
//! and are provisional.

use std::fmt;
use std::sync::Arc;

use num_traits::Float;
use serde::{Deserialize, Serialize};

use crate::compare::check_tolerance;
use crate::constants::{
    BOUNDARY, DEFAULT_DECIMAL_DIGITS, DEFAULT_EPSILON, DEFAULT_MAX_DEPTH, MIN_POINTS, UNRESOLVED,
};
use crate::error::{Result, SeriesError};
use crate::series::IndexedSeries;
use crate::tangent::{DecimalTangent, FloatTangent, NoiseTolerant, Tangent, TangentMode};

/// Engine settings. Every field has a default, so partial TOML/JSON works.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthConfig {
    /// Difference levels per row, including level 0 (the raw value).
    pub max_depth: usize,
    pub tangent: TangentMode,
    /// Significant digits for [`TangentMode::Decimal`].
    pub precision: u32,
    pub noise_tolerant: bool,
    pub epsilon: f64,
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            tangent: TangentMode::Float,
            precision: DEFAULT_DECIMAL_DIGITS,
            noise_tolerant: true,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl DepthConfig {
    pub fn validate(&self) -> Result<()> {
        check_max_depth(self.max_depth)?;
        check_tolerance(self.epsilon, "epsilon")?;
        if self.tangent == TangentMode::Decimal {
            DecimalTangent::new(self.precision)?;
        }
        Ok(())
    }

    fn build_tangent(&self) -> Result<Arc<dyn Tangent + Send + Sync>> {
        let tangent: Arc<dyn Tangent + Send + Sync> = match (self.tangent, self.noise_tolerant) {
            (TangentMode::Float, false) => Arc::new(FloatTangent),
            (TangentMode::Float, true) => Arc::new(NoiseTolerant::new(FloatTangent, self.epsilon)?),
            (TangentMode::Decimal, false) => Arc::new(DecimalTangent::new(self.precision)?),
            (TangentMode::Decimal, true) => Arc::new(NoiseTolerant::new(
                DecimalTangent::new(self.precision)?,
                self.epsilon,
            )?),
        };
        Ok(tangent)
    }
}

fn check_max_depth(max_depth: usize) -> Result<()> {
    if max_depth < 2 {
        return Err(SeriesError::InvalidArgument(format!(
            "max_depth must be at least 2, got {max_depth}"
        )));
    }
    Ok(())
}

/// Forward-difference table, one row per sample in ascending-coordinate order.
/// Column `j` holds the `j`-th difference; cells never reached stay `0.0`.
#[derive(Clone, Debug, PartialEq)]
pub struct DifferenceTable {
    rows: usize,
    width: usize,
    cells: Vec<f64>,
}

impl DifferenceTable {
    fn zeros(rows: usize, width: usize) -> Self {
        Self {
            rows,
            width,
            cells: vec![0.0; rows * width],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell `(row, level)`. Panics when out of bounds, like slice indexing.
    pub fn get(&self, row: usize, level: usize) -> f64 {
        assert!(level < self.width, "level {level} >= width {}", self.width);
        self.cells[row * self.width + level]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    fn set(&mut self, row: usize, level: usize, value: f64) {
        self.cells[row * self.width + level] = value;
    }
}

#[derive(Clone)]
pub struct DepthEngine {
    max_depth: usize,
    tangent: Arc<dyn Tangent + Send + Sync>,
}

impl fmt::Debug for DepthEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DepthEngine")
            .field("max_depth", &self.max_depth)
            .finish_non_exhaustive()
    }
}

impl DepthEngine {
    pub fn new(config: &DepthConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            max_depth: config.max_depth,
            tangent: config.build_tangent()?,
        })
    }

    /// Engine with a caller-supplied difference evaluator.
    pub fn with_tangent<E>(max_depth: usize, tangent: E) -> Result<Self>
    where
        E: Tangent + Send + Sync + 'static,
    {
        check_max_depth(max_depth)?;
        Ok(Self {
            max_depth,
            tangent: Arc::new(tangent),
        })
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Build the difference table for `values` sampled `step` apart.
    ///
    /// A negative `step` means the values are stored in descending-coordinate
    /// order; the table is built from the far end so differences always run
    /// toward increasing coordinate, and row `r` then belongs to index
    /// `len - 1 - r`.
    pub fn difference_table(&self, values: &[f64], step: f64) -> Result<DifferenceTable> {
        let n = values.len();
        if n < MIN_POINTS {
            return Err(SeriesError::TooFewPoints {
                got: n,
                min: MIN_POINTS,
            });
        }
        if !step.is_finite() || step == 0.0 {
            return Err(SeriesError::InvalidArgument(format!(
                "step must be finite and nonzero, got {step}"
            )));
        }

        let ascending = step > 0.0;
        let h = step.abs();
        let sample = |k: usize| if ascending { values[k] } else { values[n - 1 - k] };

        let width = self.max_depth;
        let mut table = DifferenceTable::zeros(n, width);
        table.set(0, 0, sample(0));
        // The final sample never enters the table; its row stays provisional.
        for k in 1..n - 1 {
            table.set(k, 0, sample(k));
            for level in 1..=k.min(width - 1) {
                let row = k - level;
                let d = self.tangent.tangent(
                    h,
                    table.get(row, level - 1),
                    table.get(row + 1, level - 1),
                );
                table.set(row, level, d);
            }
        }
        Ok(table)
    }

    /// One depth code per entry of `values`, in the same order as `values`.
    pub fn classify(&self, values: &[f64], step: f64) -> Result<Vec<i32>> {
        let table = self.difference_table(values, step)?;
        let mut depths = count_depths(&table);
        let boundaries = smooth_boundaries(&table, &mut depths);
        if step < 0.0 {
            depths.reverse();
        }
        tracing::debug!(
            "classified {} samples at max_depth {}: {boundaries} boundaries",
            values.len(),
            self.max_depth
        );
        Ok(depths)
    }

    /// [`classify`](Self::classify) over a series' entries and step.
    pub fn classify_series<T: Float, F>(&self, series: &IndexedSeries<T, F>) -> Result<Vec<i32>> {
        let values: Vec<f64> = series
            .iter()
            .map(|v| v.to_f64().unwrap_or(f64::NAN))
            .collect();
        self.classify(&values, series.step())
    }
}

/// First vanishing level per row, minus one. `-0.0` counts as zero.
fn count_depths(table: &DifferenceTable) -> Vec<i32> {
    (0..table.rows())
        .map(|row| {
            (1..table.width())
                .find(|&level| table.get(row, level) == 0.0)
                .map_or(UNRESOLVED, |level| (level - 1) as i32)
        })
        .collect()
}

/// Mark regime changes and flatten the rows contaminated by them.
/// Returns the number of boundaries marked.
fn smooth_boundaries(table: &DifferenceTable, depths: &mut [i32]) -> usize {
    let top = table.width() - 1;
    let reach = table.width() - 2;
    let mut held = 0;
    let mut tracking = false;
    let mut boundaries = 0;

    for row in 0..depths.len() {
        if tracking {
            if depths[row] == BOUNDARY {
                tracking = false;
            } else {
                depths[row] = held;
            }
            continue;
        }

        let marker = row + reach;
        if table.get(row, top) != 0.0 && depths[row] < top as i32 && marker < depths.len() {
            held = depths[row];
            depths[marker] = BOUNDARY;
            tracking = true;
            boundaries += 1;
        }
    }
    boundaries
}
