//! Parameter providers: the seam between posterior draws and the simulator.
//!
//! Model variants differ only in which effects they expose (redzone-specific
//! team strengths, defensive takeaway propensity, home field). One
//! [`ParameterProvider`] contract serves all of them so the hazard and drive
//! code never branch on the variant.
use std::ops::{Index, IndexMut};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::teams::Matchup;

pub mod sampler;
pub mod trace;

pub use sampler::{ParameterDraw, PosteriorSampler};
pub use trace::{DeathDraw, PosteriorTrace, SituationalEffects, TraceDraw, TurnoverDraw};

/// Which team holds the ball.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

/// A value tracked separately for the home and away sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerSide<T> {
    pub home: T,
    pub away: T,
}

impl<T> PerSide<T> {
    #[must_use]
    pub const fn new(home: T, away: T) -> Self {
        Self { home, away }
    }
}

impl<T> Index<Side> for PerSide<T> {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }
}

impl<T> IndexMut<Side> for PerSide<T> {
    fn index_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

/// The two independent hazard sub-models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubModel {
    /// Ordinary drive death: punts and field goals.
    Death,
    Turnover,
}

/// Drive-level game situations with their own coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    TwoMinuteDrill,
    LosingBadly,
    WinningGreatly,
}

impl Situation {
    pub const ALL: [Self; 3] = [Self::TwoMinuteDrill, Self::LosingBadly, Self::WinningGreatly];

    #[must_use]
    pub const fn coefficient(self, effects: &SituationalEffects) -> f64 {
        match self {
            Self::TwoMinuteDrill => effects.two_minute_drill,
            Self::LosingBadly => effects.offense_losing_badly,
            Self::WinningGreatly => effects.offense_winning_greatly,
        }
    }
}

/// Which effects a model variant exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantFeatures {
    /// Separate team strengths inside the red zone.
    pub redzone: bool,
    /// Defensive takeaway propensity in the turnover model.
    pub turnover_defense: bool,
    pub home_field: bool,
}

/// The fitted model variants the simulator knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelVariant {
    /// Redzone strengths, defensive takeaways and home field.
    #[default]
    Baseline,
    NoTurnoverDefense,
    NoRedzone,
    NoRedzoneNoTurnoverDefense,
    /// No redzone distinction, no defensive takeaways, no home field.
    NeutralField,
}

impl ModelVariant {
    pub const ALL: [Self; 5] = [
        Self::Baseline,
        Self::NoTurnoverDefense,
        Self::NoRedzone,
        Self::NoRedzoneNoTurnoverDefense,
        Self::NeutralField,
    ];

    #[must_use]
    pub const fn features(self) -> VariantFeatures {
        match self {
            Self::Baseline => VariantFeatures {
                redzone: true,
                turnover_defense: true,
                home_field: true,
            },
            Self::NoTurnoverDefense => VariantFeatures {
                redzone: true,
                turnover_defense: false,
                home_field: true,
            },
            Self::NoRedzone => VariantFeatures {
                redzone: false,
                turnover_defense: true,
                home_field: true,
            },
            Self::NoRedzoneNoTurnoverDefense => VariantFeatures {
                redzone: false,
                turnover_defense: false,
                home_field: true,
            },
            Self::NeutralField => VariantFeatures {
                redzone: false,
                turnover_defense: false,
                home_field: false,
            },
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::NoTurnoverDefense => "no-turnover-defense",
            Self::NoRedzone => "no-redzone",
            Self::NoRedzoneNoTurnoverDefense => "no-redzone-no-turnover-defense",
            Self::NeutralField => "neutral-field",
        }
    }
}

/// Situation flags fixed at the start of a drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SituationFlags {
    pub two_minute_drill: bool,
    pub losing_badly: bool,
    pub winning_greatly: bool,
}

impl SituationFlags {
    #[must_use]
    pub const fn is_set(&self, situation: Situation) -> bool {
        match situation {
            Situation::TwoMinuteDrill => self.two_minute_drill,
            Situation::LosingBadly => self.losing_badly,
            Situation::WinningGreatly => self.winning_greatly,
        }
    }

    /// Situations whose flag is set, in a stable order.
    pub fn active(self) -> impl Iterator<Item = Situation> {
        Situation::ALL.into_iter().filter(move |s| self.is_set(*s))
    }
}

/// Linear-predictor contributions and baseline hazards for a bound matchup.
///
/// Every accessor fails with [`crate::SimError::Uninitialized`] until the first
/// [`ParameterProvider::resample`], and with [`crate::SimError::Unbound`] until
/// a matchup is bound.
pub trait ParameterProvider {
    /// Draw a fresh parameter vector from the posterior. Call once per game.
    fn resample<R: Rng + ?Sized>(&mut self, rng: &mut R);

    /// Bind the home/away teams used by the predictor accessors.
    ///
    /// # Errors
    ///
    /// Returns [`crate::SimError::UnknownTeam`] for indices past the median slot.
    fn bind_matchup(&mut self, matchup: Matchup) -> SimResult<()>;

    /// Offense strength plus opposing defense strength for the ordinary-death model.
    ///
    /// # Errors
    ///
    /// Fails when uninitialized or unbound.
    fn offense_defense_predictor(&self, side: Side, in_redzone: bool) -> SimResult<f64>;

    /// Offense plus (when modeled) defense and home-field terms for turnovers.
    ///
    /// # Errors
    ///
    /// Fails when uninitialized or unbound.
    fn turnover_predictor(&self, side: Side) -> SimResult<f64>;

    /// Coefficient added to the sub-model predictor when `situation` holds.
    ///
    /// # Errors
    ///
    /// Fails when uninitialized.
    fn situational_adjustment(&self, situation: Situation, model: SubModel) -> SimResult<f64>;

    /// Baseline hazard rate for a field piece.
    ///
    /// # Errors
    ///
    /// Fails when uninitialized or the piece is not in the draw.
    fn baseline_hazard(&self, piece: usize, model: SubModel) -> SimResult<f64>;
}
