mod inputs;
mod reports;

use anyhow::{Context, Result, ensure};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use driveline_game::{
    BatchOptions, BatchOutput, BatchPolicy, ModelVariant, PosteriorSampler, Schedule, SeasonTable,
    everyone_vs_median, median_plays_every_schedule, quality_vs_median_opponents, rank_by_wins,
    season_rows, simulate_matchup_n_times, simulate_n_seasons, summarize,
};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use inputs::{InputPaths, Inputs, parse_matchup};
use reports::{ReportMeta, SummaryLine, summary_lines};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunMode {
    /// Every team plays the schedule as given
    Season,
    /// Each team plays its own schedule against median opponents
    Quality,
    /// The median team plays each team's schedule
    ScheduleStrength,
    /// Each team plays home and away against the median team
    VsMedian,
    /// One matchup repeated every iteration
    Matchup,
}

impl RunMode {
    const fn label(self) -> &'static str {
        match self {
            Self::Season => "season",
            Self::Quality => "quality",
            Self::ScheduleStrength => "schedule-strength",
            Self::VsMedian => "vs-median",
            Self::Matchup => "matchup",
        }
    }

    const fn needs_schedule(self) -> bool {
        matches!(self, Self::Season | Self::Quality | Self::ScheduleStrength)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Redzone strengths, defensive takeaways, home field
    Baseline,
    NoTurnoverDefense,
    NoRedzone,
    NoRedzoneNoTurnoverDefense,
    /// No redzone, no defensive takeaways, no home field
    NeutralField,
}

impl From<Variant> for ModelVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Baseline => Self::Baseline,
            Variant::NoTurnoverDefense => Self::NoTurnoverDefense,
            Variant::NoRedzone => Self::NoRedzone,
            Variant::NoRedzoneNoTurnoverDefense => Self::NoRedzoneNoTurnoverDefense,
            Variant::NeutralField => Self::NeutralField,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "driveline-runner", version = "0.3.0")]
#[command(
    about = "Monte-Carlo season simulation from piecewise-exponential drive survival posteriors"
)]
struct Args {
    /// What to simulate
    #[arg(long, value_enum, default_value_t = RunMode::Season)]
    mode: RunMode,

    /// Fitted model variant the traces come from
    #[arg(long, value_enum, default_value_t = Variant::Baseline)]
    variant: Variant,

    /// List the model variants and exit
    #[arg(long)]
    list_variants: bool,

    /// JSON posterior trace of the drive-death model
    #[arg(long, required_unless_present = "list_variants")]
    death_trace: Option<PathBuf>,

    /// JSON posterior trace of the turnover model
    #[arg(long, required_unless_present = "list_variants")]
    turnover_trace: Option<PathBuf>,

    /// JSON array of team slugs
    #[arg(long, required_unless_present = "list_variants")]
    teams: Option<PathBuf>,

    /// JSON array of {"home", "away"} slug pairs
    #[arg(long)]
    schedule: Option<PathBuf>,

    /// Simulation config overriding the default partition, rules and clock model
    #[arg(long)]
    config: Option<PathBuf>,

    /// Matchup for matchup mode, as AWAY@HOME or "HOME vs AWAY"
    #[arg(long)]
    matchup: Option<String>,

    /// Monte-Carlo iterations
    #[arg(long, default_value_t = 1000)]
    iterations: usize,

    /// Batch seed
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Skip failing iterations instead of aborting the batch
    #[arg(long)]
    skip_failures: bool,

    /// Run iterations on one thread
    #[arg(long)]
    sequential: bool,

    /// Write every simulated drive to this CSV file
    #[arg(long)]
    drives_csv: Option<PathBuf>,

    /// Output report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
    report: ReportFormat,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_variants(&args)? {
        return Ok(());
    }

    announce_banner();
    run(&args)
}

fn maybe_list_variants(args: &Args) -> Result<bool> {
    if !args.list_variants {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available variants:")?;
    for variant in ModelVariant::ALL {
        let features = variant.features();
        writeln!(
            output_target.writer(),
            "  {:32} redzone={} turnover_defense={} home_field={}",
            variant.label(),
            features.redzone,
            features.turnover_defense,
            features.home_field
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    eprintln!("{}", "🏈 Driveline Simulation Runner".bright_cyan().bold());
    eprintln!("{}", "==============================".cyan());
}

fn required<'a>(path: Option<&'a PathBuf>, flag: &str) -> Result<&'a Path> {
    path.map(PathBuf::as_path)
        .with_context(|| format!("--{flag} is required"))
}

fn validate_args(args: &Args) -> Result<()> {
    ensure!(args.iterations > 0, "--iterations must be at least 1");
    if args.mode.needs_schedule() {
        ensure!(
            args.schedule.is_some(),
            "--schedule is required in {} mode",
            args.mode.label()
        );
    }
    if args.mode == RunMode::Matchup {
        ensure!(args.matchup.is_some(), "--matchup is required in matchup mode");
        ensure!(
            args.drives_csv.is_none(),
            "--drives-csv is not available in matchup mode"
        );
    }
    Ok(())
}

fn batch_options(args: &Args) -> BatchOptions {
    let policy = if args.skip_failures {
        BatchPolicy::SkipIteration
    } else {
        BatchPolicy::Abort
    };
    let options = BatchOptions::new(args.iterations, args.seed)
        .with_drives(args.drives_csv.is_some())
        .with_policy(policy);
    if args.sequential {
        options.sequential()
    } else {
        options
    }
}

fn run(args: &Args) -> Result<()> {
    validate_args(args)?;
    let start_time = Instant::now();
    let inputs = Inputs::load(InputPaths {
        death_trace: required(args.death_trace.as_ref(), "death-trace")?,
        turnover_trace: required(args.turnover_trace.as_ref(), "turnover-trace")?,
        teams: required(args.teams.as_ref(), "teams")?,
        schedule: args.schedule.as_deref(),
        config: args.config.as_deref(),
    })?;

    let variant = ModelVariant::from(args.variant);
    let sampler = PosteriorSampler::new(
        &inputs.death,
        &inputs.turnover,
        variant,
        inputs.teams.len(),
        inputs.config.partition.pieces(),
    )
    .context("posterior traces do not fit the team table and field partition")?;
    let options = batch_options(args);
    if args.verbose {
        eprintln!(
            "Simulating {} iterations in {} mode ({} variant, seed {})",
            args.iterations,
            args.mode.label(),
            variant.label(),
            args.seed
        );
    }

    let output = simulate(args, &inputs, &sampler, &options)?;
    if let Some(path) = &args.drives_csv {
        write_drives(path, &inputs, &output)?;
    }

    let mut summaries = summarize(&output.table);
    rank_by_wins(&mut summaries);
    let lines = summary_lines(&inputs.teams, summaries);
    let meta = ReportMeta {
        generated_at: Utc::now().to_rfc3339(),
        mode: args.mode.label(),
        variant: variant.label(),
        iterations: args.iterations,
        seed: args.seed,
        skipped: output.skipped,
    };
    write_reports(args, &meta, &lines)?;

    if args.verbose {
        eprintln!("🏁 Total time: {:?}", start_time.elapsed());
    }
    Ok(())
}

fn schedule(inputs: &Inputs) -> Result<&Schedule> {
    inputs
        .schedule
        .as_ref()
        .context("a schedule is required for this mode")
}

fn simulate(
    args: &Args,
    inputs: &Inputs,
    sampler: &PosteriorSampler<'_>,
    options: &BatchOptions,
) -> Result<BatchOutput> {
    let config = &inputs.config;
    let median = inputs.teams.median_id();
    let output = match args.mode {
        RunMode::Season => simulate_n_seasons(config, schedule(inputs)?, sampler, options)?,
        RunMode::Quality => {
            quality_vs_median_opponents(config, schedule(inputs)?, median, sampler, options)?
        }
        RunMode::ScheduleStrength => {
            median_plays_every_schedule(config, schedule(inputs)?, median, sampler, options)?
        }
        RunMode::VsMedian => {
            let teams: Vec<_> = inputs.teams.ids().collect();
            everyone_vs_median(config, &teams, median, sampler, options)?
        }
        RunMode::Matchup => {
            let raw = args.matchup.as_deref().unwrap_or_default();
            let matchup = parse_matchup(&inputs.teams, raw)?;
            let games = simulate_matchup_n_times(config, matchup, sampler, options)?;
            let mut table = SeasonTable::default();
            for (iteration, game) in games.games {
                table.extend(season_rows(std::slice::from_ref(&game), iteration));
            }
            BatchOutput {
                table,
                drives: Vec::new(),
                skipped: games.skipped,
            }
        }
    };
    Ok(output)
}

fn write_drives(path: &Path, inputs: &Inputs, output: &BatchOutput) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    reports::write_drive_csv(&mut writer, &inputs.teams, &output.drives)?;
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {} drives to {}", output.drives.len(), path.display());
    Ok(())
}

fn write_reports(args: &Args, meta: &ReportMeta, lines: &[SummaryLine]) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    if lines.is_empty() {
        writeln!(&mut output_target, "No games simulated.")?;
    } else {
        match args.report {
            ReportFormat::Json => reports::generate_json_report(&mut output_target, meta, lines)?,
            ReportFormat::Markdown => {
                reports::generate_markdown_report(&mut output_target, meta, lines)?;
            }
            ReportFormat::Csv => reports::generate_csv_report(&mut output_target, lines)?,
            ReportFormat::Console => {
                reports::generate_console_report(&mut output_target, meta, lines)?;
            }
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            mode: RunMode::Season,
            variant: Variant::Baseline,
            list_variants: false,
            death_trace: Some(PathBuf::from("death.json")),
            turnover_trace: Some(PathBuf::from("turnover.json")),
            teams: Some(PathBuf::from("teams.json")),
            schedule: Some(PathBuf::from("schedule.json")),
            config: None,
            matchup: None,
            iterations: 10,
            seed: 1337,
            skip_failures: false,
            sequential: false,
            drives_csv: None,
            report: ReportFormat::Json,
            verbose: false,
            output: None,
        }
    }

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "driveline-runner-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    #[test]
    fn variants_map_onto_the_engine() {
        let mapped: Vec<ModelVariant> = Variant::value_variants()
            .iter()
            .map(|&v| ModelVariant::from(v))
            .collect();
        assert_eq!(mapped, ModelVariant::ALL.to_vec());
    }

    #[test]
    fn schedule_modes_require_a_schedule() {
        let mut args = base_args();
        args.schedule = None;
        for mode in [RunMode::Season, RunMode::Quality, RunMode::ScheduleStrength] {
            args.mode = mode;
            assert!(validate_args(&args).is_err());
        }
        args.mode = RunMode::VsMedian;
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn matchup_mode_needs_a_matchup_and_no_drive_log() {
        let mut args = base_args();
        args.mode = RunMode::Matchup;
        assert!(validate_args(&args).is_err());
        args.matchup = Some("ARI@SEA".to_string());
        assert!(validate_args(&args).is_ok());
        args.drives_csv = Some(PathBuf::from("drives.csv"));
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn options_follow_flags() {
        let mut args = base_args();
        args.skip_failures = true;
        args.sequential = true;
        args.drives_csv = Some(PathBuf::from("drives.csv"));
        let options = batch_options(&args);
        assert_eq!(options.policy, BatchPolicy::SkipIteration);
        assert!(!options.parallel);
        assert!(options.collect_drives);
        assert_eq!(options.iterations, 10);
    }

    #[test]
    fn list_variants_writes_output() {
        let mut args = base_args();
        args.list_variants = true;
        let path = temp_path("variants");
        args.output = Some(path.clone());
        assert!(maybe_list_variants(&args).unwrap());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Available variants"));
        assert!(content.contains("neutral-field"));
    }

    #[test]
    fn empty_reports_say_so() {
        let mut args = base_args();
        let path = temp_path("empty");
        args.output = Some(path.clone());
        let meta = ReportMeta {
            generated_at: String::new(),
            mode: "season",
            variant: "baseline",
            iterations: 0,
            seed: 0,
            skipped: Vec::new(),
        };
        write_reports(&args, &meta, &[]).unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("No games simulated."));
    }
}
