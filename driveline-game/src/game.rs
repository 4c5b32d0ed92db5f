//! Full-game simulation: possession alternation, halftime and the clock.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::COIN_FLIP_THRESHOLD;
use crate::drive::{DriveOutcome, DriveRecord, DriveSimulator, DriveStart};
use crate::error::{SimError, SimResult};
use crate::params::{ParameterProvider, PerSide, Side};
use crate::rng::RngBundle;
use crate::rules::{GameRules, SimulationConfig};
use crate::teams::Matchup;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    #[default]
    FirstHalf,
    SecondHalf,
    Final,
}

/// Mutable state of one game in progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub matchup: Matchup,
    /// Minutes remaining.
    pub clock: f64,
    /// Field position measured from the offense's own goal line.
    pub yardline: f64,
    pub possession: Side,
    pub opening: Side,
    pub phase: GamePhase,
    pub score: PerSide<u32>,
    pub yards: PerSide<f64>,
    pub turnovers: PerSide<u32>,
    pub possessions: PerSide<u32>,
}

impl GameState {
    /// State at kickoff with `opening` receiving.
    #[must_use]
    pub fn kickoff(rules: &GameRules, matchup: Matchup, opening: Side) -> Self {
        Self {
            matchup,
            clock: rules.game_minutes,
            yardline: rules.touchback_yardline,
            possession: opening,
            opening,
            phase: GamePhase::FirstHalf,
            score: PerSide::default(),
            yards: PerSide::default(),
            turnovers: PerSide::default(),
            possessions: PerSide::default(),
        }
    }

    /// Whether the first half ends now that the clock reads `self.clock`.
    #[must_use]
    pub fn reached_halftime(&self, rules: &GameRules) -> bool {
        self.phase == GamePhase::FirstHalf && self.clock < rules.halftime_threshold()
    }

    /// Reset for the second half: the side that did not open receives at the touchback.
    pub fn start_second_half(&mut self, rules: &GameRules) {
        self.phase = GamePhase::SecondHalf;
        self.clock = rules.half_minutes;
        self.possession = self.opening.opponent();
        self.yardline = rules.touchback_yardline;
    }
}

/// Decide a game, breaking ties with a coin slightly weighted toward home.
#[must_use]
pub fn decide_winner(score: PerSide<u32>, home_edge: f64, coin: f64) -> Side {
    match score.home.cmp(&score.away) {
        std::cmp::Ordering::Greater => Side::Home,
        std::cmp::Ordering::Less => Side::Away,
        std::cmp::Ordering::Equal if coin > COIN_FLIP_THRESHOLD - home_edge => Side::Home,
        std::cmp::Ordering::Equal => Side::Away,
    }
}

/// Final box score of one game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub matchup: Matchup,
    pub score: PerSide<u32>,
    pub yards: PerSide<f64>,
    pub turnovers: PerSide<u32>,
    pub possessions: PerSide<u32>,
    pub winner: Side,
    /// Whether the winner was decided by the tie-break coin.
    pub tie_break: bool,
}

impl GameResult {
    #[must_use]
    pub const fn loser(&self) -> Side {
        self.winner.opponent()
    }
}

/// A finished game with its drive log.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOutcome {
    pub result: GameResult,
    pub drives: Vec<DriveRecord>,
}

/// Plays complete games on top of [`DriveSimulator`].
#[derive(Debug, Clone, Copy)]
pub struct GameSimulator<'c> {
    drives: DriveSimulator<'c>,
}

impl<'c> GameSimulator<'c> {
    #[must_use]
    pub const fn new(config: &'c SimulationConfig) -> Self {
        Self {
            drives: DriveSimulator::new(config),
        }
    }

    /// Play one game between the teams bound to `provider`.
    ///
    /// The provider must already be resampled and bound to `matchup`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ClockStalled`] when the drive cap is reached and
    /// propagates drive errors.
    pub fn play<P: ParameterProvider>(
        &self,
        provider: &P,
        matchup: Matchup,
        rngs: &mut RngBundle,
        iteration: Option<usize>,
    ) -> SimResult<GameOutcome> {
        let rules = &self.drives.config().rules;
        let opening = if rngs.play().r#gen::<f64>() > COIN_FLIP_THRESHOLD {
            Side::Home
        } else {
            Side::Away
        };
        let mut state = GameState::kickoff(rules, matchup, opening);
        let mut drives = Vec::new();

        while state.clock > 0.0 {
            if drives.len() >= rules.max_drives_per_game {
                return Err(SimError::ClockStalled {
                    drives: drives.len(),
                    clock: state.clock,
                });
            }
            let offense = state.possession;
            state.possessions[offense] += 1;
            let start = DriveStart {
                matchup,
                offense,
                yardline: state.yardline,
                clock: state.clock,
                score: state.score,
                iteration,
            };
            let drive = self.drives.run(&start, provider, rngs.play())?;

            state.score[offense] += drive.points;
            state.yards[offense] += drive.record.yards;
            if drive.outcome() == DriveOutcome::Turnover {
                state.turnovers[offense] += 1;
            }
            state.clock = drive.end_clock();
            state.yardline = drive.next_yardline;
            state.possession = offense.opponent();
            drives.push(drive.record);

            if state.reached_halftime(rules) {
                log::trace!("halftime {}-{}", state.score.home, state.score.away);
                state.start_second_half(rules);
            }
        }
        state.phase = GamePhase::Final;

        let coin = rngs.tiebreak().r#gen::<f64>();
        let winner = decide_winner(state.score, rules.tie_break_home_edge, coin);
        log::debug!(
            "game {} vs {}: {}-{} over {} drives",
            matchup.home,
            matchup.away,
            state.score.home,
            state.score.away,
            drives.len()
        );
        Ok(GameOutcome {
            result: GameResult {
                matchup,
                score: state.score,
                yards: state.yards,
                turnovers: state.turnovers,
                possessions: state.possessions,
                winner,
                tie_break: state.score.home == state.score.away,
            },
            drives,
        })
    }
}
