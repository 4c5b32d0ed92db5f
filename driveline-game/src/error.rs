//! Error taxonomy shared by every simulation layer.
use thiserror::Error;

/// Result alias used throughout the engine.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised when static configuration invariants are violated.
///
/// These are fatal at startup: nothing is simulated with a configuration that
/// fails validation.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("field partition needs at least two boundaries (got {count})")]
    TooFewBoundaries { count: usize },
    #[error("field partition must span 0..={expected} (got {first}..={last})")]
    FieldSpan { first: u8, last: u8, expected: u8 },
    #[error("field partition boundaries must strictly increase (index {index}: {previous} then {next})")]
    NonIncreasingBoundaries { index: usize, previous: u8, next: u8 },
    #[error("redzone piece {redzone} must be the final piece (index {last_piece})")]
    RedzoneNotFinal { redzone: usize, last_piece: usize },
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f64,
        value: f64,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("{model} trace has no draws")]
    EmptyTrace { model: &'static str },
    #[error("{model} trace draw {draw}: {field} has {found} entries, expected {expected}")]
    TraceShape {
        model: &'static str,
        draw: usize,
        field: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("{model} trace draw {draw}: baseline hazard {piece} is negative or non-finite ({value})")]
    InvalidBaselineHazard {
        model: &'static str,
        draw: usize,
        piece: usize,
        value: f64,
    },
    #[error("variant {variant} requires `{field}` in the {model} trace")]
    MissingComponent {
        variant: &'static str,
        model: &'static str,
        field: &'static str,
    },
    #[error("team table is empty")]
    NoTeams,
    #[error("team slug `{slug}` is listed more than once")]
    DuplicateTeam { slug: String },
    #[error("team slug `{slug}` is reserved for the median team")]
    ReservedSlug { slug: String },
    #[error("elapsed-time fit needs at least two observations with distinct yardage (got {observations})")]
    UnderdeterminedFit { observations: usize },
}

/// Errors surfaced while a simulation is running.
///
/// None of these are retried. A failing game aborts its iteration; batch
/// callers decide whether the whole batch aborts.
#[derive(Debug, Error, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("yardline {yardline} is outside the field [0, 100]")]
    OutOfRange { yardline: f64 },
    #[error("parameters accessed before the first resample")]
    Uninitialized,
    #[error("no matchup bound to the parameter provider")]
    Unbound,
    #[error("piece {piece} is outside the parameter draw ({pieces} pieces)")]
    UnknownPiece { piece: usize, pieces: usize },
    #[error("team index {index} is outside the parameter draw ({slots} slots)")]
    UnknownTeam { index: usize, slots: usize },
    #[error("team slug `{slug}` is not in the team table")]
    UnknownSlug { slug: String },
    #[error("game clock stalled at {clock:.2} minutes after {drives} drives")]
    ClockStalled { drives: usize, clock: f64 },
    #[error("iteration {iteration} failed: {source}")]
    Iteration {
        iteration: usize,
        #[source]
        source: Box<SimError>,
    },
}

impl SimError {
    /// Tag an error with the Monte-Carlo iteration it aborted.
    #[must_use]
    pub fn in_iteration(self, iteration: usize) -> Self {
        match self {
            already @ Self::Iteration { .. } => already,
            other => Self::Iteration {
                iteration,
                source: Box::new(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_convert_into_sim_errors() {
        let err: SimError = ConfigError::NoTeams.into();
        assert_eq!(err.to_string(), "team table is empty");
    }

    #[test]
    fn iteration_tag_is_applied_once() {
        let err = SimError::Uninitialized.in_iteration(3).in_iteration(9);
        let SimError::Iteration { iteration, source } = err else {
            panic!("expected iteration wrapper");
        };
        assert_eq!(iteration, 3);
        assert_eq!(*source, SimError::Uninitialized);
    }
}
