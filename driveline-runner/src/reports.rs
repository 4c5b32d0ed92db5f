use anyhow::Result;
use colored::Colorize;
use driveline_game::{DriveRecord, TeamId, TeamSummary, TeamTable};
use serde::Serialize;
use std::io::Write;

/// Batch facts printed above every report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub generated_at: String,
    pub mode: &'static str,
    pub variant: &'static str,
    pub iterations: usize,
    pub seed: u64,
    pub skipped: Vec<usize>,
}

/// A team summary with its ids resolved to slugs.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryLine {
    pub team_slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_slug: Option<String>,
    #[serde(flatten)]
    pub summary: TeamSummary,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    meta: &'a ReportMeta,
    teams: &'a [SummaryLine],
}

fn slug_of(teams: &TeamTable, id: TeamId) -> String {
    teams
        .slug(id)
        .map_or_else(|| format!("#{id}"), str::to_string)
}

pub fn summary_lines(teams: &TeamTable, summaries: Vec<TeamSummary>) -> Vec<SummaryLine> {
    summaries
        .into_iter()
        .map(|summary| SummaryLine {
            team_slug: slug_of(teams, summary.team),
            schedule_slug: summary.schedule_of.map(|id| slug_of(teams, id)),
            summary,
        })
        .collect()
}

fn signed(value: f64) -> String {
    format!("{value:+.2}")
}

pub fn generate_console_report<W: Write>(
    out: &mut W,
    meta: &ReportMeta,
    lines: &[SummaryLine],
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Team Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "===============".cyan())?;
    writeln!(
        out,
        "Mode: {}  Variant: {}  Iterations: {}  Seed: {}",
        meta.mode.bold(),
        meta.variant,
        meta.iterations,
        meta.seed
    )?;
    if !meta.skipped.is_empty() {
        writeln!(
            out,
            "{}",
            format!("Skipped iterations: {:?}", meta.skipped).yellow()
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{:>4}  {:<5} {:<9} {:>6} {:>14} {:>7} {:>7} {:>8} {:>6} {:>6}",
        "#", "Team", "Schedule", "Wins", "p10-p50-p90", "PF", "PA", "Diff", "TO", "TK"
    )?;
    for (rank, line) in lines.iter().enumerate() {
        let s = &line.summary;
        let diff = s.point_differential();
        let diff = if diff >= 0.0 {
            signed(diff).green()
        } else {
            signed(diff).red()
        };
        writeln!(
            out,
            "{:>4}  {:<5} {:<9} {:>6.2} {:>14} {:>7.2} {:>7.2} {:>8} {:>6.2} {:>6.2}",
            rank + 1,
            line.team_slug.bold(),
            line.schedule_slug.as_deref().unwrap_or("-"),
            s.wins,
            format!("{:.0}-{:.0}-{:.0}", s.wins_p10, s.wins_p50, s.wins_p90),
            s.points,
            s.points_allowed,
            diff,
            s.turnovers,
            s.takeaways
        )?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(
    out: &mut W,
    meta: &ReportMeta,
    lines: &[SummaryLine],
) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, &JsonReport { meta, teams: lines })?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(
    out: &mut W,
    meta: &ReportMeta,
    lines: &[SummaryLine],
) -> Result<()> {
    writeln!(out, "# Driveline Simulation Report\n")?;
    writeln!(out, "## Batch\n")?;
    writeln!(out, "- **Generated**: {}", meta.generated_at)?;
    writeln!(out, "- **Mode**: {}", meta.mode)?;
    writeln!(out, "- **Variant**: {}", meta.variant)?;
    writeln!(out, "- **Iterations**: {}", meta.iterations)?;
    writeln!(out, "- **Seed**: {}", meta.seed)?;
    writeln!(out, "- **Skipped iterations**: {}\n", meta.skipped.len())?;

    writeln!(out, "## Teams\n")?;
    writeln!(
        out,
        "| # | Team | Schedule | Wins | Wins p10 | Wins p90 | Points | Allowed | Diff |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|---|")?;
    for (rank, line) in lines.iter().enumerate() {
        let s = &line.summary;
        writeln!(
            out,
            "| {} | {} | {} | {:.2} | {:.0} | {:.0} | {:.2} | {:.2} | {} |",
            rank + 1,
            line.team_slug,
            line.schedule_slug.as_deref().unwrap_or("-"),
            s.wins,
            s.wins_p10,
            s.wins_p90,
            s.points,
            s.points_allowed,
            signed(s.point_differential())
        )?;
    }
    Ok(())
}

pub fn generate_csv_report<W: Write>(out: &mut W, lines: &[SummaryLine]) -> Result<()> {
    writeln!(
        out,
        "team,schedule_of,iterations,games,wins,losses,points,points_allowed,yards,yards_allowed,turnovers,takeaways,possessions,wins_p10,wins_p50,wins_p90"
    )?;
    for line in lines {
        let s = &line.summary;
        writeln!(
            out,
            "{},{},{},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{},{},{}",
            line.team_slug,
            line.schedule_slug.as_deref().unwrap_or(""),
            s.iterations,
            s.games,
            s.wins,
            s.losses,
            s.points,
            s.points_allowed,
            s.yards,
            s.yards_allowed,
            s.turnovers,
            s.takeaways,
            s.possessions,
            s.wins_p10,
            s.wins_p50,
            s.wins_p90
        )?;
    }
    Ok(())
}

/// One CSV row per simulated drive, teams written as slugs.
pub fn write_drive_csv<W: Write>(
    out: &mut W,
    teams: &TeamTable,
    drives: &[DriveRecord],
) -> Result<()> {
    writeln!(
        out,
        "iteration,home,away,attacking,defending,offense,score_home,score_away,start_yardline,end_yardline,start_clock,end_clock,two_minute_drill,offense_losing_badly,offense_winning_greatly,outcome,yards"
    )?;
    for drive in drives {
        writeln!(
            out,
            "{},{},{},{},{},{},{},{},{:.2},{:.2},{:.3},{:.3},{},{},{},{},{:.2}",
            drive.iteration.map(|i| i.to_string()).unwrap_or_default(),
            slug_of(teams, drive.home),
            slug_of(teams, drive.away),
            slug_of(teams, drive.attacking),
            slug_of(teams, drive.defending),
            drive.offense.label(),
            drive.score_home,
            drive.score_away,
            drive.start_yardline,
            drive.end_yardline,
            drive.start_clock,
            drive.end_clock,
            drive.two_minute_drill,
            drive.offense_losing_badly,
            drive.offense_winning_greatly,
            drive.outcome.label(),
            drive.yards
        )?;
    }
    Ok(())
}
