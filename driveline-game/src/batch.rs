//! Monte-Carlo batches over seasons, single matchups and median-team
//! counterfactuals.
//!
//! Each iteration owns a provider clone and an [`RngBundle`] derived from the
//! batch seed and its index, so sequential and parallel runs of the same batch
//! produce identical tables.
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::PROGRESS_LOG_INTERVAL;
use crate::drive::DriveRecord;
use crate::error::{SimError, SimResult};
use crate::game::{GameResult, GameSimulator};
use crate::params::ParameterProvider;
use crate::rng::RngBundle;
use crate::rules::SimulationConfig;
use crate::season::{SeasonOutcome, SeasonTable, simulate_season};
use crate::teams::{Matchup, Schedule, TeamId};

/// What a batch does when an iteration fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BatchPolicy {
    /// Stop and report the failing iteration.
    #[default]
    Abort,
    /// Log a warning, drop the iteration and keep going.
    SkipIteration,
}

/// Knobs shared by every batch entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOptions {
    pub iterations: usize,
    pub seed: u64,
    #[serde(default)]
    pub collect_drives: bool,
    #[serde(default)]
    pub policy: BatchPolicy,
    /// Spread iterations across the rayon pool when the `parallel` feature is on.
    #[serde(default = "BatchOptions::default_parallel")]
    pub parallel: bool,
}

impl BatchOptions {
    const fn default_parallel() -> bool {
        cfg!(feature = "parallel")
    }

    #[must_use]
    pub const fn new(iterations: usize, seed: u64) -> Self {
        Self {
            iterations,
            seed,
            collect_drives: false,
            policy: BatchPolicy::Abort,
            parallel: Self::default_parallel(),
        }
    }

    #[must_use]
    pub const fn with_drives(mut self, collect: bool) -> Self {
        self.collect_drives = collect;
        self
    }

    #[must_use]
    pub const fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub const fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// Season table and optional drive log of a batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchOutput {
    pub table: SeasonTable,
    pub drives: Vec<DriveRecord>,
    /// Iterations dropped under [`BatchPolicy::SkipIteration`].
    pub skipped: Vec<usize>,
}

impl BatchOutput {
    fn absorb(&mut self, other: Self) {
        self.table.extend(other.table.into_rows());
        self.drives.extend(other.drives);
        self.skipped.extend(other.skipped);
    }
}

/// Games from repeated plays of one matchup.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchupOutput {
    /// `(iteration, result)` pairs in iteration order.
    pub games: Vec<(usize, GameResult)>,
    pub skipped: Vec<usize>,
}

fn collect_iterations<T, F>(options: &BatchOptions, run: F) -> SimResult<(Vec<(usize, T)>, Vec<usize>)>
where
    T: Send,
    F: Fn(usize) -> SimResult<T> + Sync + Send,
{
    let mut kept = Vec::with_capacity(options.iterations);
    let mut skipped = Vec::new();
    let mut settle = |iteration: usize, result: SimResult<T>| -> SimResult<()> {
        if iteration > 0 && iteration % PROGRESS_LOG_INTERVAL == 0 {
            log::info!("{iteration} iterations simulated");
        }
        match result {
            Ok(value) => kept.push((iteration, value)),
            Err(err) => match options.policy {
                BatchPolicy::Abort => return Err(err.in_iteration(iteration)),
                BatchPolicy::SkipIteration => {
                    log::warn!("skipping iteration {iteration}: {err}");
                    skipped.push(iteration);
                }
            },
        }
        Ok(())
    };

    #[cfg(feature = "parallel")]
    if options.parallel {
        let results: Vec<SimResult<T>> = (0..options.iterations).into_par_iter().map(&run).collect();
        for (iteration, result) in results.into_iter().enumerate() {
            settle(iteration, result)?;
        }
        return Ok((kept, skipped));
    }

    for iteration in 0..options.iterations {
        settle(iteration, run(iteration))?;
    }
    Ok((kept, skipped))
}

/// Simulate `options.iterations` seasons of `schedule`.
///
/// # Errors
///
/// Under [`BatchPolicy::Abort`], returns the first failing iteration wrapped in
/// [`SimError::Iteration`].
pub fn simulate_n_seasons<P>(
    config: &SimulationConfig,
    schedule: &Schedule,
    provider: &P,
    options: &BatchOptions,
) -> SimResult<BatchOutput>
where
    P: ParameterProvider + Clone + Send + Sync,
{
    let (seasons, skipped) = collect_iterations(options, |iteration| {
        let mut provider = provider.clone();
        let mut rngs = RngBundle::for_iteration(options.seed, iteration);
        simulate_season(
            config,
            schedule,
            &mut provider,
            &mut rngs,
            iteration,
            options.collect_drives,
        )
    })?;

    let mut output = BatchOutput {
        skipped,
        ..BatchOutput::default()
    };
    for (_, SeasonOutcome { rows, drives, .. }) in seasons {
        output.table.extend(rows);
        output.drives.extend(drives);
    }
    log::debug!(
        "{} seasons of {} games: {} rows, {} skipped",
        options.iterations,
        schedule.len(),
        output.table.len(),
        output.skipped.len()
    );
    Ok(output)
}

/// Play one matchup `options.iterations` times, resampling before each game.
///
/// # Errors
///
/// Fails on an unknown team index, or like [`simulate_n_seasons`].
pub fn simulate_matchup_n_times<P>(
    config: &SimulationConfig,
    matchup: Matchup,
    provider: &P,
    options: &BatchOptions,
) -> SimResult<MatchupOutput>
where
    P: ParameterProvider + Clone + Send + Sync,
{
    let mut bound = provider.clone();
    bound.bind_matchup(matchup)?;
    let games = GameSimulator::new(config);
    let (games, skipped) = collect_iterations(options, |iteration| {
        let mut provider = bound.clone();
        let mut rngs = RngBundle::for_iteration(options.seed, iteration);
        provider.resample(rngs.parameters());
        games
            .play(&provider, matchup, &mut rngs, Some(iteration))
            .map(|outcome| outcome.result)
    })?;
    Ok(MatchupOutput { games, skipped })
}

fn team_batches<P, I>(
    config: &SimulationConfig,
    provider: &P,
    options: &BatchOptions,
    plans: I,
) -> SimResult<BatchOutput>
where
    P: ParameterProvider + Clone + Send + Sync,
    I: IntoIterator<Item = (TeamId, Schedule, TeamId)>,
{
    let mut output = BatchOutput::default();
    for (tag, schedule, keep) in plans {
        let batch = simulate_n_seasons(config, &schedule, provider, options)?;
        output.absorb(BatchOutput {
            table: batch.table.retain_team(keep, Some(tag)),
            ..batch
        });
    }
    Ok(output)
}

/// Every team plays a home-and-away pair against the median team.
///
/// Rows are the real team's, tagged with its own id as the schedule.
///
/// # Errors
///
/// Fails like [`simulate_n_seasons`].
pub fn everyone_vs_median<P>(
    config: &SimulationConfig,
    teams: &[TeamId],
    median: TeamId,
    provider: &P,
    options: &BatchOptions,
) -> SimResult<BatchOutput>
where
    P: ParameterProvider + Clone + Send + Sync,
{
    team_batches(
        config,
        provider,
        options,
        teams
            .iter()
            .map(|&team| (team, Schedule::home_and_away_vs_median(team, median), team)),
    )
}

/// Every team plays its own schedule with each opponent swapped for the
/// median team: quality net of schedule.
///
/// # Errors
///
/// Fails like [`simulate_n_seasons`].
pub fn quality_vs_median_opponents<P>(
    config: &SimulationConfig,
    schedule: &Schedule,
    median: TeamId,
    provider: &P,
    options: &BatchOptions,
) -> SimResult<BatchOutput>
where
    P: ParameterProvider + Clone + Send + Sync,
{
    team_batches(
        config,
        provider,
        options,
        schedule
            .teams()
            .into_iter()
            .filter(|&team| team != median)
            .map(|team| (team, schedule.opponents_replaced_by_median(team, median), team)),
    )
}

/// The median team plays each real team's schedule in its place: strength
/// of schedule.
///
/// Rows belong to the median team and are tagged with the team whose
/// schedule was played.
///
/// # Errors
///
/// Fails like [`simulate_n_seasons`].
pub fn median_plays_every_schedule<P>(
    config: &SimulationConfig,
    schedule: &Schedule,
    median: TeamId,
    provider: &P,
    options: &BatchOptions,
) -> SimResult<BatchOutput>
where
    P: ParameterProvider + Clone + Send + Sync,
{
    team_batches(
        config,
        provider,
        options,
        schedule
            .teams()
            .into_iter()
            .filter(|&team| team != median)
            .map(|team| (team, schedule.median_plays_schedule_of(team, median), median)),
    )
}

/// Unwrap an iteration failure to the error that caused it.
#[must_use]
pub fn root_cause(err: &SimError) -> &SimError {
    match err {
        SimError::Iteration { source, .. } => root_cause(source),
        other => other,
    }
}
