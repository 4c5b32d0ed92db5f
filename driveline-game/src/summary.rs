//! Per-team aggregates across Monte-Carlo iterations.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::numbers::{mean, quantile_sorted, u32_to_f64};
use crate::season::{SeasonLine, SeasonTable};
use crate::teams::TeamId;

/// Means over iterations plus the spread of season win totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSummary {
    pub team: TeamId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_of: Option<TeamId>,
    pub iterations: usize,
    pub games: f64,
    pub wins: f64,
    pub losses: f64,
    pub points: f64,
    pub points_allowed: f64,
    pub yards: f64,
    pub yards_allowed: f64,
    pub turnovers: f64,
    pub takeaways: f64,
    pub possessions: f64,
    pub wins_p10: f64,
    pub wins_p50: f64,
    pub wins_p90: f64,
}

impl TeamSummary {
    fn from_lines(team: TeamId, schedule_of: Option<TeamId>, lines: &[SeasonLine]) -> Self {
        let column = |pick: fn(&SeasonLine) -> f64| -> Vec<f64> { lines.iter().map(pick).collect() };
        let mut wins = column(|l| u32_to_f64(l.wins));
        wins.sort_by(f64::total_cmp);
        let quantile = |q| quantile_sorted(&wins, q).unwrap_or(0.0);
        Self {
            team,
            schedule_of,
            iterations: lines.len(),
            games: mean(&column(|l| u32_to_f64(l.games))),
            wins: mean(&wins),
            losses: mean(&column(|l| u32_to_f64(l.losses))),
            points: mean(&column(|l| u32_to_f64(l.points))),
            points_allowed: mean(&column(|l| u32_to_f64(l.points_allowed))),
            yards: mean(&column(|l| l.yards)),
            yards_allowed: mean(&column(|l| l.yards_allowed)),
            turnovers: mean(&column(|l| u32_to_f64(l.turnovers))),
            takeaways: mean(&column(|l| u32_to_f64(l.takeaways))),
            possessions: mean(&column(|l| u32_to_f64(l.possessions))),
            wins_p10: quantile(0.1),
            wins_p50: quantile(0.5),
            wins_p90: quantile(0.9),
        }
    }

    /// Points scored minus points allowed per iteration.
    #[must_use]
    pub fn point_differential(&self) -> f64 {
        self.points - self.points_allowed
    }
}

/// Summarize a season table per (team, schedule) pair, ordered by team.
#[must_use]
pub fn summarize(table: &SeasonTable) -> Vec<TeamSummary> {
    let mut groups: BTreeMap<(TeamId, Option<TeamId>), Vec<SeasonLine>> = BTreeMap::new();
    for row in table.rows() {
        groups
            .entry((row.team, row.schedule_of))
            .or_default()
            .push(row.total());
    }
    groups
        .into_iter()
        .map(|((team, schedule_of), lines)| TeamSummary::from_lines(team, schedule_of, &lines))
        .collect()
}

/// Sort summaries best first by mean wins, then point differential.
pub fn rank_by_wins(summaries: &mut [TeamSummary]) {
    summaries.sort_by(|a, b| {
        b.wins
            .total_cmp(&a.wins)
            .then_with(|| b.point_differential().total_cmp(&a.point_differential()))
    });
}
