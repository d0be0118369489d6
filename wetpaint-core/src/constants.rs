//! Centralized tuning constants for the painting decision engine.
//!
//! These values define when and where the engine paints. Keeping them together
//! means behaviour can only be adjusted via reviewed code changes rather than
//! through stored park data.

// Storage keys -------------------------------------------------------------
pub const SAVE_KEY: &str = "WetPaint.rideProps";

// Geometry -----------------------------------------------------------------
/// World coordinate units covered by one map tile along x or y.
pub const UNITS_PER_TILE: i32 = 32;

// Gating -------------------------------------------------------------------
/// Cars within this many units of the start of their segment can trigger a
/// recomputation. Painting happens once per segment entry, not every tick.
pub const LAZY_PROGRESS_THRESHOLD: i32 = 15;

// Rule tuning --------------------------------------------------------------
/// Steps walked back from the second car for the `afterFirstCar` end rule.
pub const AFTER_FIRST_CAR_WALK: i32 = 2;
/// Elements dropped from the front of the tail walk ahead of the train.
pub const TAIL_START_BEFORE_SEGMENT: usize = 0;
/// Elements dropped from the end of the tail walk behind the train.
pub const TAIL_END_AFTER_SEGMENT: usize = 0;

// Colours ------------------------------------------------------------------
pub const COLOUR_MAX: u8 = 31;
pub const MAX_SETS: usize = 3;
/// Largest segment count accepted by the N-segment rules.
pub const MAX_N_SEGMENTS: u32 = 255;

// Defaults -----------------------------------------------------------------
pub const DEFAULT_N_SEGMENTS: u32 = 3;
pub const DEFAULT_NUMBER_VEHICLE_SETS: u8 = 1;
pub const DEFAULT_NUMBER_TAIL_SETS: u8 = 2;
pub const DEFAULT_TAIL_START_BEFORE: usize = 1;
pub const DEFAULT_TAIL_START_AFTER: usize = 1;
