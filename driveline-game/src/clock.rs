//! Drive elapsed-time model: minutes consumed as a linear function of yards.
use serde::{Deserialize, Serialize};

use crate::constants::{ELAPSED_INTERCEPT_MINUTES, ELAPSED_MINUTES_PER_YARD};
use crate::error::ConfigError;
use crate::numbers::usize_to_f64;

/// `elapsed = intercept + slope * yards`, fitted once from historical drives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElapsedTimeModel {
    #[serde(default = "ElapsedTimeModel::default_intercept")]
    pub intercept: f64,
    #[serde(default = "ElapsedTimeModel::default_slope")]
    pub minutes_per_yard: f64,
}

/// One historical drive used to fit the elapsed-time model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriveTiming {
    pub yards: f64,
    pub elapsed_minutes: f64,
}

impl ElapsedTimeModel {
    const fn default_intercept() -> f64 {
        ELAPSED_INTERCEPT_MINUTES
    }

    const fn default_slope() -> f64 {
        ELAPSED_MINUTES_PER_YARD
    }

    /// Build a model from already-fitted coefficients.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonFinite`] when either coefficient is NaN or infinite.
    pub fn new(intercept: f64, minutes_per_yard: f64) -> Result<Self, ConfigError> {
        let model = Self {
            intercept,
            minutes_per_yard,
        };
        model.validate()?;
        Ok(model)
    }

    /// Ordinary least squares fit of elapsed minutes on drive yards.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnderdeterminedFit`] with fewer than two
    /// observations or when every observation has the same yardage.
    pub fn fit(observations: &[DriveTiming]) -> Result<Self, ConfigError> {
        let usable: Vec<&DriveTiming> = observations
            .iter()
            .filter(|o| o.yards.is_finite() && o.elapsed_minutes.is_finite())
            .collect();
        if usable.len() < 2 {
            return Err(ConfigError::UnderdeterminedFit {
                observations: usable.len(),
            });
        }
        let n = usize_to_f64(usable.len());
        let mean_x = usable.iter().map(|o| o.yards).sum::<f64>() / n;
        let mean_y = usable.iter().map(|o| o.elapsed_minutes).sum::<f64>() / n;
        let (sxy, sxx) = usable.iter().fold((0.0, 0.0), |(sxy, sxx), o| {
            let dx = o.yards - mean_x;
            (sxy + dx * (o.elapsed_minutes - mean_y), sxx + dx * dx)
        });
        if sxx <= f64::EPSILON {
            return Err(ConfigError::UnderdeterminedFit {
                observations: usable.len(),
            });
        }
        let slope = sxy / sxx;
        Self::new(mean_y - slope * mean_x, slope)
    }

    /// Minutes consumed by a drive of `yards`; never negative.
    #[must_use]
    pub fn elapsed_minutes(&self, yards: f64) -> f64 {
        (self.intercept + self.minutes_per_yard * yards).max(0.0)
    }

    /// Validate coefficient sanity.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NonFinite`] for NaN or infinite coefficients.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.intercept.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "elapsed_time.intercept",
            });
        }
        if !self.minutes_per_yard.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "elapsed_time.minutes_per_yard",
            });
        }
        Ok(())
    }
}

impl Default for ElapsedTimeModel {
    fn default() -> Self {
        Self {
            intercept: Self::default_intercept(),
            minutes_per_yard: Self::default_slope(),
        }
    }
}
