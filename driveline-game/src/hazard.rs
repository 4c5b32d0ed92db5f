//! Competing piece hazards for ordinary drive death and turnovers.
use serde::{Deserialize, Serialize};

use crate::error::SimResult;
use crate::field::{FieldPartition, PieceSpan};
use crate::params::{ParameterProvider, Side, SituationFlags, SubModel};

/// Per-yard hazard rates for the piece a drive currently occupies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hazards {
    pub death: f64,
    pub turnover: f64,
}

impl Hazards {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.death + self.turnover
    }

    /// A combined hazard that cannot drive an exponential draw.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        let total = self.total();
        total.is_nan() || total <= 0.0
    }

    /// Probability that a drive ending in this piece ended in a turnover.
    #[must_use]
    pub fn turnover_share(&self) -> f64 {
        if self.is_degenerate() {
            return 0.0;
        }
        self.turnover / self.total()
    }
}

/// Hazards plus the piece they were evaluated for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceHazards {
    pub piece: PieceSpan,
    pub in_redzone: bool,
    pub hazards: Hazards,
}

/// Evaluate both hazards at `yardline` for the offense on `side`.
///
/// # Errors
///
/// Returns [`crate::SimError::OutOfRange`] for yardlines off the field and
/// propagates provider errors (uninitialized, unbound, unknown piece).
pub fn evaluate_hazards<P: ParameterProvider>(
    partition: &FieldPartition,
    yardline: f64,
    side: Side,
    flags: SituationFlags,
    provider: &P,
) -> SimResult<PieceHazards> {
    let piece = partition.locate(yardline)?;
    let in_redzone = partition.is_redzone(piece.index);

    let mut xb_death = provider.offense_defense_predictor(side, in_redzone)?;
    let mut xb_turnover = provider.turnover_predictor(side)?;
    for situation in flags.active() {
        xb_death += provider.situational_adjustment(situation, SubModel::Death)?;
        xb_turnover += provider.situational_adjustment(situation, SubModel::Turnover)?;
    }

    let hazards = Hazards {
        death: provider.baseline_hazard(piece.index, SubModel::Death)? * xb_death.exp(),
        turnover: provider.baseline_hazard(piece.index, SubModel::Turnover)? * xb_turnover.exp(),
    };
    Ok(PieceHazards {
        piece,
        in_redzone,
        hazards,
    })
}
