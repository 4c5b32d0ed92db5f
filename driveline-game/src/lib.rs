//! Driveline simulation engine
//!
//! Piecewise-exponential drive survival model for American football. Posterior
//! draws of team strengths and per-piece baseline hazards drive a stochastic
//! drive, game and season simulator used to rank team quality net of schedule
//! strength. This crate has no I/O beyond parsing JSON documents handed to it.

pub mod batch;
pub mod clock;
pub mod constants;
pub mod counts;
pub mod drive;
pub mod error;
pub mod field;
pub mod game;
pub mod hazard;
pub mod numbers;
pub mod params;
pub mod rng;
pub mod rules;
pub mod season;
pub mod summary;
pub mod teams;

// Re-export commonly used types
pub use batch::{
    BatchOptions, BatchOutput, BatchPolicy, MatchupOutput, everyone_vs_median,
    median_plays_every_schedule, quality_vs_median_opponents, root_cause, simulate_matchup_n_times,
    simulate_n_seasons,
};
pub use clock::{DriveTiming, ElapsedTimeModel};
pub use counts::{PieceCountKey, PieceCounts, by_piece, tabulate};
pub use drive::{
    DriveOutcome, DriveRecord, DriveResult, DriveSimulator, DriveStart, drive_fingerprint,
    situation_flags,
};
pub use error::{ConfigError, SimError, SimResult};
pub use field::{FieldPartition, FieldPartitionSpec, PieceSpan};
pub use game::{GameOutcome, GamePhase, GameResult, GameSimulator, GameState, decide_winner};
pub use hazard::{Hazards, PieceHazards, evaluate_hazards};
pub use params::{
    DeathDraw, ModelVariant, ParameterDraw, ParameterProvider, PerSide, PosteriorSampler,
    PosteriorTrace, Side, Situation, SituationFlags, SituationalEffects, SubModel, TraceDraw,
    TurnoverDraw, VariantFeatures,
};
pub use rng::{CountingRng, RngBundle, SimRng};
pub use rules::{GameRules, SimConfigLoadError, SimulationConfig};
pub use season::{SeasonLine, SeasonOutcome, SeasonRow, SeasonTable, season_rows, simulate_season};
pub use summary::{TeamSummary, rank_by_wins, summarize};
pub use teams::{Matchup, Schedule, SlugMatchup, TeamId, TeamTable};

/// Slug reserved for the synthetic median team.
pub const MEDIAN_TEAM: &str = constants::MEDIAN_TEAM_SLUG;
