/// Number of difference levels kept per row of the pyramid.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Inputs closer than this are treated as equal by the noise-tolerant tangent.
pub const DEFAULT_EPSILON: f64 = 0.001;

/// Significant digits carried by the decimal tangent.
pub const DEFAULT_DECIMAL_DIGITS: u32 = 16;

/// Lower bound on decimal precision; below this the decimal path loses its point.
pub const MIN_DECIMAL_DIGITS: u32 = 10;

/// Upper bound imposed by the 96-bit decimal mantissa.
pub const MAX_DECIMAL_DIGITS: u32 = 28;

/// Largest gap a single write past the end may backfill.
pub const MAX_BACKFILL_GAP: usize = 1 << 24;

/// The engine needs at least one difference.
pub const MIN_POINTS: usize = 2;

// --- Depth codes ---

/// No zero difference found within the depth budget.
pub const UNRESOLVED: i32 = i32::MAX;

/// Regime-change boundary.
pub const BOUNDARY: i32 = -1;

/// Reserved: exponential growth. Never assigned by the engine.
pub const EXPONENTIAL: i32 = -2;

/// Reserved: trigonometric. Never assigned by the engine.
pub const TRIGONOMETRIC: i32 = -3;

/// Reserved: undefined behaviour. Never assigned by the engine.
pub const UNDEFINED: i32 = -5;
