//! Derivative-depth signal classifier.
//!
//! Stores a uniformly sampled signal in an index-addressed series and labels
//! every sample with the number of finite-difference levels it takes before
//! the difference vanishes: an estimate of the local polynomial degree. Where
//! that estimate changes, the engine marks a boundary.
//!
//! Zero I/O: pure numeric containers and engine, with a JSON snapshot format
//! for callers that need to persist a series.

pub mod compare;
pub mod constants;
pub mod depth;
pub mod error;
pub mod regime;
pub mod serde_compat;
pub mod series;
pub mod tangent;
pub mod validity;
pub mod values;

pub use compare::{approx_equal, proportional_equal};
pub use constants::{
    BOUNDARY, DEFAULT_EPSILON, DEFAULT_MAX_DEPTH, EXPONENTIAL, TRIGONOMETRIC, UNDEFINED,
    UNRESOLVED,
};
pub use depth::{DepthConfig, DepthEngine, DifferenceTable};
pub use error::{Result, SeriesError};
pub use regime::{Regime, Segment, segments};
pub use serde_compat::{CURRENT_VERSION, SeriesSnapshot, export_json, import_json};
pub use series::{Backfill, DefaultFill, HoldFill, IndexedSeries, LinearFill};
pub use tangent::{DecimalTangent, FloatTangent, NoiseTolerant, Tangent, TangentMode};
pub use validity::Validity;
pub use values::{ValuePair, ValueSeries};
