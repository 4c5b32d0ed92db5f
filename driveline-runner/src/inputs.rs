//! Loading posterior traces, the team table, the schedule and the
//! simulation config from disk.
use anyhow::{Context, Result, bail};
use driveline_game::{
    DeathDraw, Matchup, PosteriorTrace, Schedule, SimulationConfig, SlugMatchup, TeamTable,
    TurnoverDraw,
};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Everything a batch needs besides the CLI options.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub death: PosteriorTrace<DeathDraw>,
    pub turnover: PosteriorTrace<TurnoverDraw>,
    pub teams: TeamTable,
    pub schedule: Option<Schedule>,
    pub config: SimulationConfig,
}

/// File locations for [`Inputs::load`].
#[derive(Debug, Clone, Copy)]
pub struct InputPaths<'a> {
    pub death_trace: &'a Path,
    pub turnover_trace: &'a Path,
    pub teams: &'a Path,
    pub schedule: Option<&'a Path>,
    pub config: Option<&'a Path>,
}

impl Inputs {
    pub fn load(paths: InputPaths<'_>) -> Result<Self> {
        let death = PosteriorTrace::from_json(&read(paths.death_trace)?)
            .with_context(|| format!("parsing death trace {}", paths.death_trace.display()))?;
        let turnover = PosteriorTrace::from_json(&read(paths.turnover_trace)?).with_context(
            || format!("parsing turnover trace {}", paths.turnover_trace.display()),
        )?;
        let teams = parse_teams(&read(paths.teams)?)
            .with_context(|| format!("parsing team table {}", paths.teams.display()))?;
        let schedule = paths
            .schedule
            .map(|path| {
                parse_schedule(&teams, &read(path)?)
                    .with_context(|| format!("parsing schedule {}", path.display()))
            })
            .transpose()?;
        let config = match paths.config {
            Some(path) => SimulationConfig::from_json(&read(path)?)
                .with_context(|| format!("parsing simulation config {}", path.display()))?,
            None => SimulationConfig::default(),
        };
        log::debug!(
            "loaded {} death draws, {} turnover draws, {} teams",
            death.len(),
            turnover.len(),
            teams.len()
        );
        Ok(Self {
            death,
            turnover,
            teams,
            schedule,
            config,
        })
    }
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn parse_teams(json: &str) -> Result<TeamTable> {
    Ok(serde_json::from_str(json)?)
}

pub fn parse_schedule(teams: &TeamTable, json: &str) -> Result<Schedule> {
    let entries: Vec<SlugMatchup> = serde_json::from_str(json)?;
    Ok(Schedule::from_slugs(teams, &entries)?)
}

fn matchup_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\s*([A-Za-z]{2,4})\s*(@|vs)\s*([A-Za-z]{2,4})\s*$").ok())
        .as_ref()
}

/// Parse `AWAY@HOME` or `HOME vs AWAY` into a matchup.
pub fn parse_matchup(teams: &TeamTable, raw: &str) -> Result<Matchup> {
    let Some(caps) = matchup_pattern().and_then(|pattern| pattern.captures(raw)) else {
        bail!("matchup `{raw}` is not of the form AWAY@HOME or HOME vs AWAY");
    };
    let (first, second) = (&caps[1], &caps[3]);
    let (home, away) = if &caps[2] == "@" {
        (second, first)
    } else {
        (first, second)
    };
    let home = teams.id(home).with_context(|| format!("home team in `{raw}`"))?;
    let away = teams.id(away).with_context(|| format!("away team in `{raw}`"))?;
    if home == away {
        bail!("matchup `{raw}` pits a team against itself");
    }
    Ok(Matchup::new(home, away))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TeamTable {
        parse_teams(r#"["SEA", "ARI", "KC"]"#).unwrap()
    }

    #[test]
    fn matchups_accept_both_orders() {
        let teams = table();
        let at = parse_matchup(&teams, "ari@sea").unwrap();
        assert_eq!(at, Matchup::new(teams.id("SEA").unwrap(), teams.id("ARI").unwrap()));
        let vs = parse_matchup(&teams, "KC vs SEA").unwrap();
        assert_eq!(vs, Matchup::new(teams.id("KC").unwrap(), teams.id("SEA").unwrap()));
        let median = parse_matchup(&teams, "MED@KC").unwrap();
        assert_eq!(median.away, teams.median_id());
    }

    #[test]
    fn malformed_matchups_are_rejected() {
        let teams = table();
        assert!(parse_matchup(&teams, "SEA").is_err());
        assert!(parse_matchup(&teams, "SEA@SEA").is_err());
        let err = parse_matchup(&teams, "SEA@NYJ").unwrap_err();
        assert!(format!("{err:#}").contains("NYJ"));
    }

    #[test]
    fn schedules_resolve_against_the_table() {
        let teams = table();
        let schedule =
            parse_schedule(&teams, r#"[{"home": "SEA", "away": "KC"}, {"home": "ARI", "away": "SEA"}]"#)
                .unwrap();
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.games_for(teams.id("SEA").unwrap()), 2);
        assert!(parse_schedule(&teams, r#"[{"home": "SEA", "away": "DAL"}]"#).is_err());
    }

    #[test]
    fn missing_files_name_the_path() {
        let missing = std::env::temp_dir().join("driveline-missing-trace.json");
        let err = Inputs::load(InputPaths {
            death_trace: &missing,
            turnover_trace: &missing,
            teams: &missing,
            schedule: None,
            config: None,
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("driveline-missing-trace.json"));
    }
}
