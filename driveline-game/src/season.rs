//! One pass over a schedule and the season table it produces.
use std::collections::BTreeMap;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::drive::DriveRecord;
use crate::error::SimResult;
use crate::game::{GameResult, GameSimulator};
use crate::params::{ParameterProvider, Side};
use crate::rng::RngBundle;
use crate::rules::SimulationConfig;
use crate::teams::{Schedule, TeamId};

/// Accumulated statistics for one team over a set of games.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SeasonLine {
    pub games: u32,
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub points_allowed: u32,
    pub yards: f64,
    pub yards_allowed: f64,
    pub turnovers: u32,
    pub takeaways: u32,
    pub possessions: u32,
}

impl SeasonLine {
    /// Fold one game into the line of the team that played it as `side`.
    pub fn record(&mut self, game: &GameResult, side: Side) {
        let other = side.opponent();
        self.games += 1;
        if game.winner == side {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.points += game.score[side];
        self.points_allowed += game.score[other];
        self.yards += game.yards[side];
        self.yards_allowed += game.yards[other];
        self.turnovers += game.turnovers[side];
        self.takeaways += game.turnovers[other];
        self.possessions += game.possessions[side];
    }
}

impl Add for SeasonLine {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            games: self.games + rhs.games,
            wins: self.wins + rhs.wins,
            losses: self.losses + rhs.losses,
            points: self.points + rhs.points,
            points_allowed: self.points_allowed + rhs.points_allowed,
            yards: self.yards + rhs.yards,
            yards_allowed: self.yards_allowed + rhs.yards_allowed,
            turnovers: self.turnovers + rhs.turnovers,
            takeaways: self.takeaways + rhs.takeaways,
            possessions: self.possessions + rhs.possessions,
        }
    }
}

/// One team's season in one Monte-Carlo iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonRow {
    pub team: TeamId,
    pub iteration: usize,
    /// Team whose schedule was played, for counterfactual seasons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_of: Option<TeamId>,
    pub home: SeasonLine,
    pub away: SeasonLine,
}

impl SeasonRow {
    #[must_use]
    pub fn total(&self) -> SeasonLine {
        self.home + self.away
    }
}

/// Season rows across iterations, in (iteration, team) order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonTable {
    rows: Vec<SeasonRow>,
}

impl SeasonTable {
    #[must_use]
    pub fn new(rows: Vec<SeasonRow>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[SeasonRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn for_team(&self, team: TeamId) -> impl Iterator<Item = &SeasonRow> + '_ {
        self.rows.iter().filter(move |row| row.team == team)
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = SeasonRow>) {
        self.rows.extend(rows);
    }

    /// Keep only rows for `team`, tagging them with the schedule they played.
    #[must_use]
    pub fn retain_team(self, team: TeamId, schedule_of: Option<TeamId>) -> Self {
        Self {
            rows: self
                .rows
                .into_iter()
                .filter(|row| row.team == team)
                .map(|row| SeasonRow {
                    schedule_of: schedule_of.or(row.schedule_of),
                    ..row
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<SeasonRow> {
        self.rows
    }
}

/// Everything one pass over a schedule produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeasonOutcome {
    pub rows: Vec<SeasonRow>,
    pub games: Vec<GameResult>,
    /// Drive log, empty unless collection was requested.
    pub drives: Vec<DriveRecord>,
}

/// Build per-team rows from finished games.
#[must_use]
pub fn season_rows(games: &[GameResult], iteration: usize) -> Vec<SeasonRow> {
    let mut lines: BTreeMap<TeamId, (SeasonLine, SeasonLine)> = BTreeMap::new();
    for game in games {
        lines
            .entry(game.matchup.home)
            .or_default()
            .0
            .record(game, Side::Home);
        lines
            .entry(game.matchup.away)
            .or_default()
            .1
            .record(game, Side::Away);
    }
    lines
        .into_iter()
        .map(|(team, (home, away))| SeasonRow {
            team,
            iteration,
            schedule_of: None,
            home,
            away,
        })
        .collect()
}

/// Play every scheduled game once, resampling parameters before each game.
///
/// # Errors
///
/// Propagates the first game failure; the partial season is discarded.
pub fn simulate_season<P: ParameterProvider>(
    config: &SimulationConfig,
    schedule: &Schedule,
    provider: &mut P,
    rngs: &mut RngBundle,
    iteration: usize,
    collect_drives: bool,
) -> SimResult<SeasonOutcome> {
    let games = GameSimulator::new(config);
    let mut outcome = SeasonOutcome::default();
    for &matchup in schedule.games() {
        provider.bind_matchup(matchup)?;
        provider.resample(rngs.parameters());
        let game = games.play(&*provider, matchup, rngs, Some(iteration))?;
        if collect_drives {
            outcome.drives.extend(game.drives);
        }
        outcome.games.push(game.result);
    }
    outcome.rows = season_rows(&outcome.games, iteration);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PerSide;
    use crate::teams::Matchup;

    fn result(home: TeamId, away: TeamId, score: (u32, u32), winner: Side) -> GameResult {
        GameResult {
            matchup: Matchup::new(home, away),
            score: PerSide::new(score.0, score.1),
            yards: PerSide::new(300.0, 250.0),
            turnovers: PerSide::new(1, 2),
            possessions: PerSide::new(11, 10),
            winner,
            tie_break: score.0 == score.1,
        }
    }

    #[test]
    fn rows_split_home_and_away() {
        let games = [
            result(0, 1, (24, 10), Side::Home),
            result(1, 0, (17, 17), Side::Away),
        ];
        let rows = season_rows(&games, 4);
        assert_eq!(rows.len(), 2);
        let zero = &rows[0];
        assert_eq!(zero.team, 0);
        assert_eq!(zero.iteration, 4);
        assert_eq!(zero.home.wins, 1);
        assert_eq!(zero.away.wins, 1);
        let total = zero.total();
        assert_eq!(total.games, 2);
        assert_eq!(total.points, 41);
        assert_eq!(total.points_allowed, 27);
        assert_eq!(total.turnovers, 3);
        assert_eq!(total.takeaways, 3);
        assert!((total.yards - 550.0).abs() < f64::EPSILON);
        let one = rows[1].total();
        assert_eq!(one.wins + one.losses, one.games);
        assert_eq!(one.losses, 2);
    }

    #[test]
    fn retained_rows_carry_the_schedule_tag() {
        let games = [result(0, 5, (3, 0), Side::Home)];
        let table = SeasonTable::new(season_rows(&games, 0)).retain_team(5, Some(0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].schedule_of, Some(0));
        assert_eq!(table.rows()[0].away.losses, 1);
    }
}
