//! Piecewise exposure and death counts, the table the hazard model is fitted on.
//!
//! The fitting pipeline builds this table from historical drives; here it is
//! built from simulated drive logs so fitted hazards can be checked against
//! what the simulator reproduces.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::drive::{DriveOutcome, DriveRecord};
use crate::field::FieldPartition;
use crate::teams::TeamId;

/// Minimum exposure credited to a drive that touches a piece.
const MIN_EXPOSURE_YARDS: f64 = 0.01;

/// Grouping key of one count row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PieceCountKey {
    pub piece: usize,
    pub attacking: TeamId,
    pub defending: TeamId,
    pub home: TeamId,
    pub away: TeamId,
    pub defending_is_home: bool,
    pub offense_losing_badly: bool,
    pub offense_winning_greatly: bool,
    pub two_minute_drill: bool,
}

/// Exposure and deaths accumulated under one key.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PieceCounts {
    pub exposure_yards: f64,
    pub deaths: u32,
    pub deaths_turnover: u32,
    pub deaths_ex_turnover: u32,
    /// Drives that entered the piece.
    pub drives: u32,
}

impl PieceCounts {
    /// Crude hazard estimate: deaths per yard of exposure.
    #[must_use]
    pub fn death_rate(&self) -> f64 {
        if self.exposure_yards <= 0.0 {
            return 0.0;
        }
        f64::from(self.deaths_ex_turnover) / self.exposure_yards
    }

    #[must_use]
    pub fn turnover_rate(&self) -> f64 {
        if self.exposure_yards <= 0.0 {
            return 0.0;
        }
        f64::from(self.deaths_turnover) / self.exposure_yards
    }

    fn merge(&mut self, other: &Self) {
        self.exposure_yards += other.exposure_yards;
        self.deaths += other.deaths;
        self.deaths_turnover += other.deaths_turnover;
        self.deaths_ex_turnover += other.deaths_ex_turnover;
        self.drives += other.drives;
    }
}

/// Expand drives into per-piece exposure rows and group them.
#[must_use]
pub fn tabulate(partition: &FieldPartition, drives: &[DriveRecord]) -> BTreeMap<PieceCountKey, PieceCounts> {
    let mut table: BTreeMap<PieceCountKey, PieceCounts> = BTreeMap::new();
    for drive in drives {
        let start = drive.start_yardline;
        let end = drive.end_yardline.max(start);
        for piece in (0..partition.pieces()).filter_map(|i| partition.span(i)) {
            if !(start < piece.end && end > piece.start) {
                continue;
            }
            let died = drive.outcome != DriveOutcome::Touchdown && end <= piece.end;
            let turnover = died && drive.outcome == DriveOutcome::Turnover;
            let exposure = (end.min(piece.end) - start.max(piece.start)).max(MIN_EXPOSURE_YARDS);
            let key = PieceCountKey {
                piece: piece.index,
                attacking: drive.attacking,
                defending: drive.defending,
                home: drive.home,
                away: drive.away,
                defending_is_home: drive.defending == drive.home,
                offense_losing_badly: drive.offense_losing_badly,
                offense_winning_greatly: drive.offense_winning_greatly,
                two_minute_drill: drive.two_minute_drill,
            };
            table.entry(key).or_default().merge(&PieceCounts {
                exposure_yards: exposure,
                deaths: u32::from(died),
                deaths_turnover: u32::from(turnover),
                deaths_ex_turnover: u32::from(died && !turnover),
                drives: 1,
            });
        }
    }
    table
}

/// Collapse a count table to one row per piece.
#[must_use]
pub fn by_piece(table: &BTreeMap<PieceCountKey, PieceCounts>) -> BTreeMap<usize, PieceCounts> {
    let mut pieces: BTreeMap<usize, PieceCounts> = BTreeMap::new();
    for (key, counts) in table {
        pieces.entry(key.piece).or_default().merge(counts);
    }
    pieces
}
