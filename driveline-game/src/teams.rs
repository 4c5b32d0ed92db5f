//! Team index table and schedules.
//!
//! Team ids are assigned alphabetically by slug; the synthetic median team
//! always occupies the slot right after the last real team.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::MEDIAN_TEAM_SLUG;
use crate::error::{ConfigError, SimError, SimResult};

/// Index into per-team parameter vectors.
pub type TeamId = usize;

/// Alphabetical `slug <-> id` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TeamTable {
    slugs: Vec<String>,
}

impl TeamTable {
    /// Build a table, sorting slugs alphabetically.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] for an empty table, duplicate slugs, or use of
    /// the reserved median slug.
    pub fn new<I, S>(slugs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        for slug in slugs {
            let slug = slug.into().trim().to_ascii_uppercase();
            if slug == MEDIAN_TEAM_SLUG {
                return Err(ConfigError::ReservedSlug { slug });
            }
            if !seen.insert(slug.clone()) {
                return Err(ConfigError::DuplicateTeam { slug });
            }
        }
        if seen.is_empty() {
            return Err(ConfigError::NoTeams);
        }
        Ok(Self {
            slugs: seen.into_iter().collect(),
        })
    }

    /// Number of real teams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }

    /// Slot of the synthetic median team.
    #[must_use]
    pub fn median_id(&self) -> TeamId {
        self.slugs.len()
    }

    /// Look up the id for a slug (case-insensitive). `MED` resolves to the median slot.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownSlug`] when the slug is not in the table.
    pub fn id(&self, slug: &str) -> SimResult<TeamId> {
        let wanted = slug.trim().to_ascii_uppercase();
        if wanted == MEDIAN_TEAM_SLUG {
            return Ok(self.median_id());
        }
        self.slugs
            .binary_search(&wanted)
            .map_err(|_| SimError::UnknownSlug { slug: wanted })
    }

    /// Slug for an id, including the median slot.
    #[must_use]
    pub fn slug(&self, id: TeamId) -> Option<&str> {
        if id == self.median_id() {
            return Some(MEDIAN_TEAM_SLUG);
        }
        self.slugs.get(id).map(String::as_str)
    }

    /// Real team ids in order.
    pub fn ids(&self) -> impl Iterator<Item = TeamId> + '_ {
        0..self.slugs.len()
    }
}

impl TryFrom<Vec<String>> for TeamTable {
    type Error = ConfigError;

    fn try_from(slugs: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(slugs)
    }
}

impl From<TeamTable> for Vec<String> {
    fn from(table: TeamTable) -> Self {
        table.slugs
    }
}

/// One scheduled game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Matchup {
    pub home: TeamId,
    pub away: TeamId,
}

impl Matchup {
    #[must_use]
    pub const fn new(home: TeamId, away: TeamId) -> Self {
        Self { home, away }
    }

    #[must_use]
    pub const fn involves(&self, team: TeamId) -> bool {
        self.home == team || self.away == team
    }
}

/// Schedule entry as it appears in input files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlugMatchup {
    pub home: String,
    pub away: String,
}

/// Ordered list of matchups.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    games: Vec<Matchup>,
}

impl Schedule {
    #[must_use]
    pub fn new(games: Vec<Matchup>) -> Self {
        Self { games }
    }

    /// Resolve slug pairs against a team table.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownSlug`] for any slug missing from the table.
    pub fn from_slugs(table: &TeamTable, entries: &[SlugMatchup]) -> SimResult<Self> {
        let games = entries
            .iter()
            .map(|entry| Ok(Matchup::new(table.id(&entry.home)?, table.id(&entry.away)?)))
            .collect::<SimResult<Vec<_>>>()?;
        Ok(Self { games })
    }

    #[must_use]
    pub fn games(&self) -> &[Matchup] {
        &self.games
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.games.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Number of scheduled games involving `team`.
    #[must_use]
    pub fn games_for(&self, team: TeamId) -> usize {
        self.games.iter().filter(|g| g.involves(team)).count()
    }

    /// Teams appearing anywhere in the schedule, sorted.
    #[must_use]
    pub fn teams(&self) -> BTreeSet<TeamId> {
        self.games.iter().flat_map(|g| [g.home, g.away]).collect()
    }

    /// The games `team` plays with every opponent swapped for the median team.
    /// Measures standalone team quality.
    #[must_use]
    pub fn opponents_replaced_by_median(&self, team: TeamId, median: TeamId) -> Self {
        let games = self
            .games
            .iter()
            .filter(|g| g.involves(team))
            .map(|g| {
                if g.home == team {
                    Matchup::new(team, median)
                } else {
                    Matchup::new(median, team)
                }
            })
            .collect();
        Self { games }
    }

    /// The games `team` plays with `team` itself swapped for the median team.
    /// Measures strength of schedule.
    #[must_use]
    pub fn median_plays_schedule_of(&self, team: TeamId, median: TeamId) -> Self {
        let games = self
            .games
            .iter()
            .filter(|g| g.involves(team))
            .map(|g| {
                if g.home == team {
                    Matchup::new(median, g.away)
                } else {
                    Matchup::new(g.home, median)
                }
            })
            .collect();
        Self { games }
    }

    /// One home game and one away game against the median team.
    #[must_use]
    pub fn home_and_away_vs_median(team: TeamId, median: TeamId) -> Self {
        Self {
            games: vec![Matchup::new(team, median), Matchup::new(median, team)],
        }
    }
}
