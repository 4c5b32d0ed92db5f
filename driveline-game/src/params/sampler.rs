//! Posterior-backed [`ParameterProvider`].
use rand::Rng;

use super::trace::{DeathDraw, PosteriorTrace, SituationalEffects, TurnoverDraw};
use super::{ModelVariant, ParameterProvider, Side, Situation, SubModel, VariantFeatures};
use crate::error::{ConfigError, SimError, SimResult};
use crate::numbers::median;
use crate::teams::{Matchup, TeamId};

/// One game's worth of parameters: the sampled trace rows with the median
/// team appended to every team-specific vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDraw {
    /// Row of the death trace this draw came from.
    pub death_row: usize,
    /// Row of the turnover trace this draw came from.
    pub turnover_row: usize,
    pub atts: Vec<f64>,
    pub defs: Vec<f64>,
    pub atts_rz: Option<Vec<f64>>,
    pub defs_rz: Option<Vec<f64>>,
    pub home: Option<Vec<f64>>,
    pub death_baseline: Vec<f64>,
    pub death_situational: SituationalEffects,
    pub turnover_atts: Vec<f64>,
    pub turnover_defs: Option<Vec<f64>>,
    pub turnover_home: Option<f64>,
    pub turnover_baseline: Vec<f64>,
    pub turnover_situational: SituationalEffects,
}

fn with_median(values: &[f64]) -> Vec<f64> {
    let mut extended = Vec::with_capacity(values.len() + 1);
    extended.extend_from_slice(values);
    extended.push(median(values).unwrap_or(0.0));
    extended
}

impl ParameterDraw {
    fn assemble(
        death_row: usize,
        death: &DeathDraw,
        turnover_row: usize,
        turnover: &TurnoverDraw,
    ) -> Self {
        Self {
            death_row,
            turnover_row,
            atts: with_median(&death.atts),
            defs: with_median(&death.defs),
            atts_rz: death.atts_rz.as_deref().map(with_median),
            defs_rz: death.defs_rz.as_deref().map(with_median),
            home: death.home.as_deref().map(with_median),
            death_baseline: death.baseline_hazards.clone(),
            death_situational: death.situational,
            turnover_atts: with_median(&turnover.atts),
            turnover_defs: turnover.defs.as_deref().map(with_median),
            turnover_home: turnover.home,
            turnover_baseline: turnover.baseline_hazards.clone(),
            turnover_situational: turnover.situational,
        }
    }

    /// Number of team slots including the median team.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.atts.len()
    }
}

fn at(values: &[f64], team: TeamId) -> SimResult<f64> {
    values.get(team).copied().ok_or(SimError::UnknownTeam {
        index: team,
        slots: values.len(),
    })
}

/// Resamples uniformly (with replacement) from two independent posterior
/// traces and exposes the parameters a model variant calls for.
#[derive(Debug, Clone)]
pub struct PosteriorSampler<'t> {
    death: &'t PosteriorTrace<DeathDraw>,
    turnover: &'t PosteriorTrace<TurnoverDraw>,
    variant: ModelVariant,
    features: VariantFeatures,
    teams: usize,
    matchup: Option<Matchup>,
    current: Option<ParameterDraw>,
}

impl<'t> PosteriorSampler<'t> {
    /// Build a sampler for `variant` over validated traces.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a trace is empty or malformed for
    /// `teams`/`pieces`, or lacks a component the variant needs.
    pub fn new(
        death: &'t PosteriorTrace<DeathDraw>,
        turnover: &'t PosteriorTrace<TurnoverDraw>,
        variant: ModelVariant,
        teams: usize,
        pieces: usize,
    ) -> Result<Self, ConfigError> {
        if teams == 0 {
            return Err(ConfigError::NoTeams);
        }
        death.validate(teams, pieces)?;
        turnover.validate(teams, pieces)?;
        let features = variant.features();
        let missing = |model: &'static str, field: &'static str| ConfigError::MissingComponent {
            variant: variant.label(),
            model,
            field,
        };
        for draw in death.draws() {
            if features.redzone && draw.atts_rz.is_none() {
                return Err(missing("death", "atts_rz"));
            }
            if features.redzone && draw.defs_rz.is_none() {
                return Err(missing("death", "defs_rz"));
            }
            if features.home_field && draw.home.is_none() {
                return Err(missing("death", "home"));
            }
        }
        for draw in turnover.draws() {
            if features.turnover_defense && draw.defs.is_none() {
                return Err(missing("turnover", "defs"));
            }
            if features.home_field && draw.home.is_none() {
                return Err(missing("turnover", "home"));
            }
        }
        Ok(Self {
            death,
            turnover,
            variant,
            features,
            teams,
            matchup: None,
            current: None,
        })
    }

    #[must_use]
    pub const fn variant(&self) -> ModelVariant {
        self.variant
    }

    #[must_use]
    pub const fn features(&self) -> VariantFeatures {
        self.features
    }

    /// Team slot of the synthetic median team.
    #[must_use]
    pub const fn median_id(&self) -> TeamId {
        self.teams
    }

    /// The active draw.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Uninitialized`] before the first resample.
    pub fn current(&self) -> SimResult<&ParameterDraw> {
        self.current.as_ref().ok_or(SimError::Uninitialized)
    }

    fn bound(&self) -> SimResult<(&ParameterDraw, Matchup)> {
        let draw = self.current()?;
        let matchup = self.matchup.ok_or(SimError::Unbound)?;
        Ok((draw, matchup))
    }

    fn attacking_defending(matchup: Matchup, side: Side) -> (TeamId, TeamId) {
        match side {
            Side::Home => (matchup.home, matchup.away),
            Side::Away => (matchup.away, matchup.home),
        }
    }
}

impl ParameterProvider for PosteriorSampler<'_> {
    fn resample<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let death_row = rng.gen_range(0..self.death.len());
        let turnover_row = rng.gen_range(0..self.turnover.len());
        // Both traces were validated non-empty at construction.
        if let (Some(death), Some(turnover)) =
            (self.death.get(death_row), self.turnover.get(turnover_row))
        {
            self.current = Some(ParameterDraw::assemble(
                death_row,
                death,
                turnover_row,
                turnover,
            ));
        }
    }

    fn bind_matchup(&mut self, matchup: Matchup) -> SimResult<()> {
        let slots = self.teams + 1;
        for index in [matchup.home, matchup.away] {
            if index >= slots {
                return Err(SimError::UnknownTeam { index, slots });
            }
        }
        self.matchup = Some(matchup);
        Ok(())
    }

    fn offense_defense_predictor(&self, side: Side, in_redzone: bool) -> SimResult<f64> {
        let (draw, matchup) = self.bound()?;
        let (offense, defense) = Self::attacking_defending(matchup, side);
        let (atts, defs) = match (&draw.atts_rz, &draw.defs_rz) {
            (Some(atts_rz), Some(defs_rz)) if in_redzone && self.features.redzone => {
                (atts_rz, defs_rz)
            }
            _ => (&draw.atts, &draw.defs),
        };
        let mut xb = at(atts, offense)? + at(defs, defense)?;
        if side == Side::Away
            && self.features.home_field
            && let Some(home) = &draw.home
        {
            xb += at(home, matchup.home)?;
        }
        Ok(xb)
    }

    fn turnover_predictor(&self, side: Side) -> SimResult<f64> {
        let (draw, matchup) = self.bound()?;
        let (offense, defense) = Self::attacking_defending(matchup, side);
        let mut xb = at(&draw.turnover_atts, offense)?;
        if self.features.turnover_defense
            && let Some(defs) = &draw.turnover_defs
        {
            xb += at(defs, defense)?;
        }
        if side == Side::Away && self.features.home_field {
            xb += draw.turnover_home.unwrap_or(0.0);
        }
        Ok(xb)
    }

    fn situational_adjustment(&self, situation: Situation, model: SubModel) -> SimResult<f64> {
        let draw = self.current()?;
        let effects = match model {
            SubModel::Death => &draw.death_situational,
            SubModel::Turnover => &draw.turnover_situational,
        };
        Ok(situation.coefficient(effects))
    }

    fn baseline_hazard(&self, piece: usize, model: SubModel) -> SimResult<f64> {
        let draw = self.current()?;
        let baseline = match model {
            SubModel::Death => &draw.death_baseline,
            SubModel::Turnover => &draw.turnover_baseline,
        };
        baseline.get(piece).copied().ok_or(SimError::UnknownPiece {
            piece,
            pieces: baseline.len(),
        })
    }
}
