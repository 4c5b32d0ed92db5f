//! Single-drive simulation over the piecewise-exponential hazard.
//!
//! A drive survives each field piece with an exponential draw against the
//! combined hazard. Surviving the red zone is a touchdown; dying anywhere is
//! split between turnovers and ordinary deaths in proportion to the two
//! hazards, and ordinary deaths become field goals or punts by position.
use std::hash::Hasher;

use rand::Rng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};
use twox_hash::XxHash64;

use crate::constants::FIELD_LENGTH;
use crate::error::SimResult;
use crate::hazard::{PieceHazards, evaluate_hazards};
use crate::params::{ParameterProvider, PerSide, Side, SituationFlags};
use crate::rules::{GameRules, SimulationConfig};
use crate::teams::{Matchup, TeamId};

/// How a drive ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveOutcome {
    Touchdown,
    FieldGoal,
    Punt,
    Turnover,
}

impl DriveOutcome {
    pub const ALL: [Self; 4] = [Self::Touchdown, Self::FieldGoal, Self::Punt, Self::Turnover];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Touchdown => "touchdown",
            Self::FieldGoal => "field_goal",
            Self::Punt => "punt",
            Self::Turnover => "turnover",
        }
    }

    #[must_use]
    pub const fn is_score(self) -> bool {
        matches!(self, Self::Touchdown | Self::FieldGoal)
    }
}

/// Situation flags fixed for a drive from the clock and score at its start.
#[must_use]
pub fn situation_flags(
    rules: &GameRules,
    clock: f64,
    attacking_score: u32,
    defending_score: u32,
) -> SituationFlags {
    let lead = i64::from(attacking_score) - i64::from(defending_score);
    let margin = i64::from(rules.blowout_margin);
    SituationFlags {
        two_minute_drill: rules.is_two_minute_drill(clock),
        losing_badly: -lead > margin,
        winning_greatly: lead > margin,
    }
}

/// Everything known when a drive begins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveStart {
    pub matchup: Matchup,
    pub offense: Side,
    pub yardline: f64,
    pub clock: f64,
    pub score: PerSide<u32>,
    /// Monte-Carlo iteration the drive belongs to, when run inside a batch.
    pub iteration: Option<usize>,
}

impl DriveStart {
    #[must_use]
    pub const fn attacking(&self) -> TeamId {
        match self.offense {
            Side::Home => self.matchup.home,
            Side::Away => self.matchup.away,
        }
    }

    #[must_use]
    pub const fn defending(&self) -> TeamId {
        match self.offense {
            Side::Home => self.matchup.away,
            Side::Away => self.matchup.home,
        }
    }
}

/// Append-only log entry for one simulated drive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration: Option<usize>,
    pub home: TeamId,
    pub away: TeamId,
    pub attacking: TeamId,
    pub defending: TeamId,
    pub offense: Side,
    pub score_home: u32,
    pub score_away: u32,
    pub score_attacking: u32,
    pub score_defending: u32,
    pub start_yardline: f64,
    pub end_yardline: f64,
    pub start_clock: f64,
    pub end_clock: f64,
    pub two_minute_drill: bool,
    pub offense_losing_badly: bool,
    pub offense_winning_greatly: bool,
    pub outcome: DriveOutcome,
    pub field_goal_attempt: bool,
    pub touchdown: bool,
    pub yards: f64,
}

/// A finished drive and what it hands to the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveResult {
    pub record: DriveRecord,
    pub points: u32,
    /// Where the other side takes over.
    pub next_yardline: f64,
}

impl DriveResult {
    #[must_use]
    pub const fn outcome(&self) -> DriveOutcome {
        self.record.outcome
    }

    #[must_use]
    pub const fn end_clock(&self) -> f64 {
        self.record.end_clock
    }
}

/// Runs drives against a fixed configuration.
#[derive(Debug, Clone, Copy)]
pub struct DriveSimulator<'c> {
    config: &'c SimulationConfig,
}

impl<'c> DriveSimulator<'c> {
    #[must_use]
    pub const fn new(config: &'c SimulationConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &'c SimulationConfig {
        self.config
    }

    /// Simulate one drive from `start` until it ends.
    ///
    /// # Errors
    ///
    /// Fails when the start yardline is off the field or the provider is not
    /// resampled and bound.
    pub fn run<P, R>(&self, start: &DriveStart, provider: &P, rng: &mut R) -> SimResult<DriveResult>
    where
        P: ParameterProvider,
        R: Rng + ?Sized,
    {
        let rules = &self.config.rules;
        let offense = start.offense;
        let attacking_score = start.score[offense];
        let defending_score = start.score[offense.opponent()];
        let flags = situation_flags(rules, start.clock, attacking_score, defending_score);
        log::trace!(
            "{} has the ball at the {:.2} yardline with {:.2} remaining",
            offense.label(),
            start.yardline,
            start.clock
        );

        let mut yardline = start.yardline;
        let mut yards = 0.0;
        let mut clock = start.clock;
        let (outcome, points, next_yardline) = loop {
            let PieceHazards {
                piece,
                in_redzone,
                hazards,
            } = evaluate_hazards(&self.config.partition, yardline, offense, flags, provider)?;
            let survived = match Exp::new(hazards.total()) {
                Ok(exp) if !hazards.is_degenerate() => exp.sample(rng),
                _ => {
                    log::trace!("degenerate hazard in piece {}, advancing", piece.index);
                    f64::INFINITY
                }
            };

            if yardline + survived > piece.end {
                yards += piece.end - yardline;
                if in_redzone {
                    clock -= rules.touchdown_clock_minutes;
                    log::trace!("{} scored a touchdown", offense.label());
                    break (
                        DriveOutcome::Touchdown,
                        rules.touchdown_points,
                        rules.touchback_yardline,
                    );
                }
                log::trace!(
                    "{} advanced past piece {} by surviving {survived:.2} yards",
                    offense.label(),
                    piece.index
                );
                yardline = piece.end + rules.boundary_epsilon;
                continue;
            }

            let position = yardline + survived;
            yards += survived;
            if rng.r#gen::<f64>() < hazards.turnover_share() {
                log::trace!("{} turned it over at the {position:.2}", offense.label());
                break (
                    DriveOutcome::Turnover,
                    0,
                    f64::from(FIELD_LENGTH) - position,
                );
            }
            if position > rules.field_goal_range {
                clock -= rules.field_goal_clock_minutes;
                log::trace!("{} kicked a field goal from the {position:.2}", offense.label());
                break (
                    DriveOutcome::FieldGoal,
                    rules.field_goal_points,
                    rules.touchback_yardline,
                );
            }
            clock -= rules.punt_clock_minutes;
            let landing = f64::from(FIELD_LENGTH) - (position + rules.punt_distance);
            let landing = if landing < rules.coffin_corner_yardline {
                rules.touchback_yardline
            } else {
                landing
            };
            log::trace!(
                "{} punted from the {position:.2} to the {landing:.2}",
                offense.label()
            );
            break (DriveOutcome::Punt, 0, landing);
        };

        clock -= self.config.elapsed_time.elapsed_minutes(yards);
        log::trace!("drive covered {yards:.2} yards");

        let record = DriveRecord {
            iteration: start.iteration,
            home: start.matchup.home,
            away: start.matchup.away,
            attacking: start.attacking(),
            defending: start.defending(),
            offense,
            score_home: start.score.home,
            score_away: start.score.away,
            score_attacking: attacking_score,
            score_defending: defending_score,
            start_yardline: start.yardline,
            end_yardline: start.yardline + yards,
            start_clock: start.clock,
            end_clock: clock,
            two_minute_drill: flags.two_minute_drill,
            offense_losing_badly: flags.losing_badly,
            offense_winning_greatly: flags.winning_greatly,
            outcome,
            field_goal_attempt: outcome == DriveOutcome::FieldGoal,
            touchdown: outcome == DriveOutcome::Touchdown,
            yards,
        };
        Ok(DriveResult {
            record,
            points,
            next_yardline,
        })
    }
}

/// Stable fingerprint of a drive sequence, for reproducibility checks.
///
/// # Errors
///
/// Returns an error if a record cannot be serialized.
pub fn drive_fingerprint(records: &[DriveRecord]) -> Result<u64, serde_json::Error> {
    let mut hasher = XxHash64::with_seed(0);
    for record in records {
        hasher.write(&serde_json::to_vec(record)?);
    }
    Ok(hasher.finish())
}
