//! Posterior traces produced by the external model fit.
//!
//! A trace is an empirical distribution: every draw is one joint realization of
//! the sub-model's parameters. Shapes are validated once when a sampler is
//! built so the hot loop can index without checks beyond `get`.
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Scalar coefficients applied when a drive-level situation flag is set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SituationalEffects {
    #[serde(default)]
    pub two_minute_drill: f64,
    #[serde(default)]
    pub offense_losing_badly: f64,
    #[serde(default)]
    pub offense_winning_greatly: f64,
}

/// One draw of the ordinary drive-death model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeathDraw {
    pub atts: Vec<f64>,
    pub defs: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atts_rz: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defs_rz: Option<Vec<f64>>,
    /// Per-team home-field coefficient, indexed by the home team.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<Vec<f64>>,
    pub baseline_hazards: Vec<f64>,
    #[serde(flatten)]
    pub situational: SituationalEffects,
}

/// One draw of the turnover model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnoverDraw {
    pub atts: Vec<f64>,
    /// Defensive takeaway propensity; absent in models fitted without it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defs: Option<Vec<f64>>,
    /// League-wide home-field coefficient.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<f64>,
    pub baseline_hazards: Vec<f64>,
    #[serde(flatten)]
    pub situational: SituationalEffects,
}

/// Shape checks shared by both sub-model draws.
pub trait TraceDraw {
    /// Label used in error messages.
    const MODEL: &'static str;

    /// Validate one draw against the team count and number of field pieces.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first mismatch.
    fn validate(&self, draw: usize, teams: usize, pieces: usize) -> Result<(), ConfigError>;
}

fn check_len(
    model: &'static str,
    draw: usize,
    field: &'static str,
    values: &[f64],
    expected: usize,
) -> Result<(), ConfigError> {
    if values.len() != expected {
        return Err(ConfigError::TraceShape {
            model,
            draw,
            field,
            expected,
            found: values.len(),
        });
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(ConfigError::NonFinite { field });
    }
    Ok(())
}

fn check_baseline(
    model: &'static str,
    draw: usize,
    values: &[f64],
    pieces: usize,
) -> Result<(), ConfigError> {
    if values.len() != pieces {
        return Err(ConfigError::TraceShape {
            model,
            draw,
            field: "baseline_hazards",
            expected: pieces,
            found: values.len(),
        });
    }
    for (piece, &value) in values.iter().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::InvalidBaselineHazard {
                model,
                draw,
                piece,
                value,
            });
        }
    }
    Ok(())
}

fn check_situational(effects: &SituationalEffects) -> Result<(), ConfigError> {
    for (field, value) in [
        ("two_minute_drill", effects.two_minute_drill),
        ("offense_losing_badly", effects.offense_losing_badly),
        ("offense_winning_greatly", effects.offense_winning_greatly),
    ] {
        if !value.is_finite() {
            return Err(ConfigError::NonFinite { field });
        }
    }
    Ok(())
}

impl TraceDraw for DeathDraw {
    const MODEL: &'static str = "death";

    fn validate(&self, draw: usize, teams: usize, pieces: usize) -> Result<(), ConfigError> {
        check_len(Self::MODEL, draw, "atts", &self.atts, teams)?;
        check_len(Self::MODEL, draw, "defs", &self.defs, teams)?;
        if let Some(values) = &self.atts_rz {
            check_len(Self::MODEL, draw, "atts_rz", values, teams)?;
        }
        if let Some(values) = &self.defs_rz {
            check_len(Self::MODEL, draw, "defs_rz", values, teams)?;
        }
        if let Some(values) = &self.home {
            check_len(Self::MODEL, draw, "home", values, teams)?;
        }
        check_baseline(Self::MODEL, draw, &self.baseline_hazards, pieces)?;
        check_situational(&self.situational)
    }
}

impl TraceDraw for TurnoverDraw {
    const MODEL: &'static str = "turnover";

    fn validate(&self, draw: usize, teams: usize, pieces: usize) -> Result<(), ConfigError> {
        check_len(Self::MODEL, draw, "atts", &self.atts, teams)?;
        if let Some(values) = &self.defs {
            check_len(Self::MODEL, draw, "defs", values, teams)?;
        }
        if let Some(home) = self.home
            && !home.is_finite()
        {
            return Err(ConfigError::NonFinite { field: "home" });
        }
        check_baseline(Self::MODEL, draw, &self.baseline_hazards, pieces)?;
        check_situational(&self.situational)
    }
}

/// Ordered posterior draws for one sub-model. Read-only during simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorTrace<D> {
    draws: Vec<D>,
}

impl<D: TraceDraw> PosteriorTrace<D> {
    #[must_use]
    pub fn new(draws: Vec<D>) -> Self {
        Self { draws }
    }

    /// A trace holding exactly one draw: deterministic parameters.
    #[must_use]
    pub fn single(draw: D) -> Self {
        Self { draws: vec![draw] }
    }

    #[must_use]
    pub fn draws(&self) -> &[D] {
        &self.draws
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.draws.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.draws.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&D> {
        self.draws.get(index)
    }

    /// Validate every draw's shape.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty trace or the first malformed draw.
    pub fn validate(&self, teams: usize, pieces: usize) -> Result<(), ConfigError> {
        if self.draws.is_empty() {
            return Err(ConfigError::EmptyTrace { model: D::MODEL });
        }
        self.draws
            .iter()
            .enumerate()
            .try_for_each(|(index, draw)| draw.validate(index, teams, pieces))
    }
}

impl<D> PosteriorTrace<D>
where
    D: TraceDraw + serde::de::DeserializeOwned,
{
    /// Parse a trace document of the form `{"draws": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into draws.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_death_trace_with_flattened_situational_effects() {
        let json = r#"{"draws": [{
            "atts": [0.1, -0.1], "defs": [0.0, 0.0],
            "atts_rz": [0.2, -0.2], "defs_rz": [0.0, 0.0],
            "home": [0.05, 0.03],
            "baseline_hazards": [0.01, 0.02, 0.03],
            "two_minute_drill": -0.4, "offense_losing_badly": 0.2
        }]}"#;
        let trace: PosteriorTrace<DeathDraw> = PosteriorTrace::from_json(json).unwrap();
        assert_eq!(trace.len(), 1);
        let draw = &trace.draws()[0];
        assert!((draw.situational.two_minute_drill + 0.4).abs() < f64::EPSILON);
        assert!(draw.situational.offense_winning_greatly.abs() < f64::EPSILON);
        trace.validate(2, 3).unwrap();
    }

    #[test]
    fn turnover_defense_is_optional() {
        let json = r#"{"draws": [{"atts": [0.0], "home": 0.1, "baseline_hazards": [0.01]}]}"#;
        let trace: PosteriorTrace<TurnoverDraw> = PosteriorTrace::from_json(json).unwrap();
        assert!(trace.draws()[0].defs.is_none());
        trace.validate(1, 1).unwrap();
    }

    #[test]
    fn validation_reports_shape_errors() {
        let draw = TurnoverDraw {
            atts: vec![0.0, 0.0],
            defs: Some(vec![0.0]),
            home: None,
            baseline_hazards: vec![0.01],
            situational: SituationalEffects::default(),
        };
        assert_eq!(
            PosteriorTrace::single(draw.clone()).validate(2, 1),
            Err(ConfigError::TraceShape {
                model: "turnover",
                draw: 0,
                field: "defs",
                expected: 2,
                found: 1,
            })
        );
        let negative = TurnoverDraw {
            defs: None,
            baseline_hazards: vec![-0.5],
            ..draw
        };
        assert!(matches!(
            PosteriorTrace::single(negative).validate(2, 1),
            Err(ConfigError::InvalidBaselineHazard { piece: 0, .. })
        ));
        assert_eq!(
            PosteriorTrace::<TurnoverDraw>::new(Vec::new()).validate(2, 1),
            Err(ConfigError::EmptyTrace { model: "turnover" })
        );
    }
}
