//! Centralized default tuning constants for the drive simulator.
//!
//! These values are the literal thresholds the hazard model was fitted
//! against. Every one of them can be overridden through [`crate::GameRules`]
//! or [`crate::FieldPartition`]; the constants only seed the serde defaults.

// Field layout --------------------------------------------------------------
pub(crate) const FIELD_LENGTH: u8 = 100;
pub(crate) const DEFAULT_PIECE_BOUNDARIES: [u8; 4] = [0, 13, 75, 100];
pub(crate) const DEFAULT_REDZONE_PIECE: usize = 2;

// Scoring and field position -----------------------------------------------
pub(crate) const FIELD_GOAL_RANGE: f64 = 67.0;
pub(crate) const PUNT_DISTANCE: f64 = 38.0;
pub(crate) const COFFIN_CORNER_YARDLINE: f64 = 2.0;
pub(crate) const TOUCHBACK_YARDLINE: f64 = 20.0;
pub(crate) const PIECE_BOUNDARY_EPSILON: f64 = 0.01;
pub(crate) const TOUCHDOWN_POINTS: u32 = 7;
pub(crate) const FIELD_GOAL_POINTS: u32 = 3;

// Clock (minutes) -----------------------------------------------------------
pub(crate) const GAME_MINUTES: f64 = 60.0;
pub(crate) const HALF_MINUTES: f64 = 30.0;
pub(crate) const HALFTIME_TOLERANCE: f64 = 0.5;
pub(crate) const PUNT_CLOCK_MINUTES: f64 = 15.0 / 60.0;
pub(crate) const TOUCHDOWN_CLOCK_MINUTES: f64 = 15.0 / 60.0;
pub(crate) const FIELD_GOAL_CLOCK_MINUTES: f64 = 15.0 / 60.0;
pub(crate) const TWO_MINUTE_WINDOW: f64 = 2.0;
pub(crate) const DRIVE_CAP_PER_GAME: usize = 1_000;

// Elapsed time per drive (minutes = intercept + slope * yards) --------------
pub(crate) const ELAPSED_INTERCEPT_MINUTES: f64 = 1.15;
pub(crate) const ELAPSED_MINUTES_PER_YARD: f64 = 0.047;

// Game situation ------------------------------------------------------------
pub(crate) const LOSING_BADLY_THRESHOLD: i32 = 16;
pub(crate) const TIE_BREAK_HOME_EDGE: f64 = 0.03;
pub(crate) const COIN_FLIP_THRESHOLD: f64 = 0.5;

// Batch ---------------------------------------------------------------------
pub(crate) const PROGRESS_LOG_INTERVAL: usize = 50;
pub(crate) const MEDIAN_TEAM_SLUG: &str = "MED";
