//! Game rules and the top-level simulation configuration.
use serde::{Deserialize, Serialize};

use crate::clock::ElapsedTimeModel;
use crate::constants;
use crate::error::ConfigError;
use crate::field::FieldPartition;

/// Scoring, field-position and clock rules applied around the hazard model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    /// Ordinary deaths beyond this yardline are made field goals; the rest punt.
    #[serde(default = "GameRules::default_field_goal_range")]
    pub field_goal_range: f64,
    /// Net punt distance after the return.
    #[serde(default = "GameRules::default_punt_distance")]
    pub punt_distance: f64,
    /// Punts landing short of this yardline are brought out to the touchback.
    #[serde(default = "GameRules::default_coffin_corner_yardline")]
    pub coffin_corner_yardline: f64,
    #[serde(default = "GameRules::default_touchback_yardline")]
    pub touchback_yardline: f64,
    /// Distance a drive is nudged past a piece boundary after surviving it.
    #[serde(default = "GameRules::default_boundary_epsilon")]
    pub boundary_epsilon: f64,
    #[serde(default = "GameRules::default_touchdown_points")]
    pub touchdown_points: u32,
    #[serde(default = "GameRules::default_field_goal_points")]
    pub field_goal_points: u32,
    #[serde(default = "GameRules::default_game_minutes")]
    pub game_minutes: f64,
    #[serde(default = "GameRules::default_half_minutes")]
    pub half_minutes: f64,
    /// Halftime triggers once the clock drops below `half_minutes + halftime_tolerance`.
    #[serde(default = "GameRules::default_halftime_tolerance")]
    pub halftime_tolerance: f64,
    #[serde(default = "GameRules::default_punt_clock")]
    pub punt_clock_minutes: f64,
    #[serde(default = "GameRules::default_touchdown_clock")]
    pub touchdown_clock_minutes: f64,
    #[serde(default = "GameRules::default_field_goal_clock")]
    pub field_goal_clock_minutes: f64,
    /// Minutes before the end of each half that count as a two-minute drill.
    #[serde(default = "GameRules::default_two_minute_window")]
    pub two_minute_window: f64,
    /// Score margin beyond which an offense is losing badly or winning greatly.
    #[serde(default = "GameRules::default_blowout_margin")]
    pub blowout_margin: i32,
    /// Home team's edge on the coin flip that breaks tied games.
    #[serde(default = "GameRules::default_tie_break_home_edge")]
    pub tie_break_home_edge: f64,
    #[serde(default = "GameRules::default_drive_cap")]
    pub max_drives_per_game: usize,
}

impl GameRules {
    const fn default_field_goal_range() -> f64 {
        constants::FIELD_GOAL_RANGE
    }

    const fn default_punt_distance() -> f64 {
        constants::PUNT_DISTANCE
    }

    const fn default_coffin_corner_yardline() -> f64 {
        constants::COFFIN_CORNER_YARDLINE
    }

    const fn default_touchback_yardline() -> f64 {
        constants::TOUCHBACK_YARDLINE
    }

    const fn default_boundary_epsilon() -> f64 {
        constants::PIECE_BOUNDARY_EPSILON
    }

    const fn default_touchdown_points() -> u32 {
        constants::TOUCHDOWN_POINTS
    }

    const fn default_field_goal_points() -> u32 {
        constants::FIELD_GOAL_POINTS
    }

    const fn default_game_minutes() -> f64 {
        constants::GAME_MINUTES
    }

    const fn default_half_minutes() -> f64 {
        constants::HALF_MINUTES
    }

    const fn default_halftime_tolerance() -> f64 {
        constants::HALFTIME_TOLERANCE
    }

    const fn default_punt_clock() -> f64 {
        constants::PUNT_CLOCK_MINUTES
    }

    const fn default_touchdown_clock() -> f64 {
        constants::TOUCHDOWN_CLOCK_MINUTES
    }

    const fn default_field_goal_clock() -> f64 {
        constants::FIELD_GOAL_CLOCK_MINUTES
    }

    const fn default_two_minute_window() -> f64 {
        constants::TWO_MINUTE_WINDOW
    }

    const fn default_blowout_margin() -> i32 {
        constants::LOSING_BADLY_THRESHOLD
    }

    const fn default_tie_break_home_edge() -> f64 {
        constants::TIE_BREAK_HOME_EDGE
    }

    const fn default_drive_cap() -> usize {
        constants::DRIVE_CAP_PER_GAME
    }

    /// Clock reading at which the first half ends.
    #[must_use]
    pub fn halftime_threshold(&self) -> f64 {
        self.half_minutes + self.halftime_tolerance
    }

    /// Whether a drive starting with `clock` minutes left is a two-minute drill.
    #[must_use]
    pub fn is_two_minute_drill(&self, clock: f64) -> bool {
        let half = self.half_minutes;
        (half < clock && clock < half + self.two_minute_window) || clock < self.two_minute_window
    }

    /// Validate rule invariants.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [
            ("rules.field_goal_range", self.field_goal_range),
            ("rules.punt_distance", self.punt_distance),
            ("rules.coffin_corner_yardline", self.coffin_corner_yardline),
            ("rules.touchback_yardline", self.touchback_yardline),
            ("rules.boundary_epsilon", self.boundary_epsilon),
            ("rules.game_minutes", self.game_minutes),
            ("rules.half_minutes", self.half_minutes),
            ("rules.halftime_tolerance", self.halftime_tolerance),
            ("rules.punt_clock_minutes", self.punt_clock_minutes),
            ("rules.touchdown_clock_minutes", self.touchdown_clock_minutes),
            ("rules.field_goal_clock_minutes", self.field_goal_clock_minutes),
            ("rules.two_minute_window", self.two_minute_window),
            ("rules.tie_break_home_edge", self.tie_break_home_edge),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }
        for (field, value) in [
            ("rules.field_goal_range", self.field_goal_range),
            ("rules.touchback_yardline", self.touchback_yardline),
            ("rules.coffin_corner_yardline", self.coffin_corner_yardline),
        ] {
            if !(0.0..100.0).contains(&value) {
                return Err(ConfigError::RangeViolation {
                    field,
                    min: 0.0,
                    max: 100.0,
                    value,
                });
            }
        }
        for (field, value) in [
            ("rules.punt_distance", self.punt_distance),
            ("rules.punt_clock_minutes", self.punt_clock_minutes),
            ("rules.touchdown_clock_minutes", self.touchdown_clock_minutes),
            ("rules.field_goal_clock_minutes", self.field_goal_clock_minutes),
            ("rules.two_minute_window", self.two_minute_window),
            ("rules.halftime_tolerance", self.halftime_tolerance),
        ] {
            if value < 0.0 {
                return Err(ConfigError::MinViolation {
                    field,
                    min: 0.0,
                    value,
                });
            }
        }
        if self.boundary_epsilon <= 0.0 || self.boundary_epsilon >= 1.0 {
            return Err(ConfigError::RangeViolation {
                field: "rules.boundary_epsilon",
                min: 0.0,
                max: 1.0,
                value: self.boundary_epsilon,
            });
        }
        if self.half_minutes <= 0.0 || self.half_minutes >= self.game_minutes {
            return Err(ConfigError::RangeViolation {
                field: "rules.half_minutes",
                min: 0.0,
                max: self.game_minutes,
                value: self.half_minutes,
            });
        }
        if !(0.0..=0.5).contains(&self.tie_break_home_edge) {
            return Err(ConfigError::RangeViolation {
                field: "rules.tie_break_home_edge",
                min: 0.0,
                max: 0.5,
                value: self.tie_break_home_edge,
            });
        }
        if self.max_drives_per_game < 2 {
            return Err(ConfigError::MinViolation {
                field: "rules.max_drives_per_game",
                min: 2.0,
                value: crate::numbers::usize_to_f64(self.max_drives_per_game),
            });
        }
        Ok(())
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            field_goal_range: Self::default_field_goal_range(),
            punt_distance: Self::default_punt_distance(),
            coffin_corner_yardline: Self::default_coffin_corner_yardline(),
            touchback_yardline: Self::default_touchback_yardline(),
            boundary_epsilon: Self::default_boundary_epsilon(),
            touchdown_points: Self::default_touchdown_points(),
            field_goal_points: Self::default_field_goal_points(),
            game_minutes: Self::default_game_minutes(),
            half_minutes: Self::default_half_minutes(),
            halftime_tolerance: Self::default_halftime_tolerance(),
            punt_clock_minutes: Self::default_punt_clock(),
            touchdown_clock_minutes: Self::default_touchdown_clock(),
            field_goal_clock_minutes: Self::default_field_goal_clock(),
            two_minute_window: Self::default_two_minute_window(),
            blowout_margin: Self::default_blowout_margin(),
            tie_break_home_edge: Self::default_tie_break_home_edge(),
            max_drives_per_game: Self::default_drive_cap(),
        }
    }
}

/// Everything the drive, game and season simulators need besides parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub partition: FieldPartition,
    #[serde(default)]
    pub rules: GameRules,
    #[serde(default)]
    pub elapsed_time: ElapsedTimeModel,
}

impl SimulationConfig {
    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or any section fails validation.
    pub fn from_json(json: &str) -> Result<Self, SimConfigLoadError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate()?;
        self.elapsed_time.validate()?;
        Ok(())
    }
}

/// Failure while loading a [`SimulationConfig`] document.
#[derive(Debug, thiserror::Error)]
pub enum SimConfigLoadError {
    #[error("malformed simulation config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}
