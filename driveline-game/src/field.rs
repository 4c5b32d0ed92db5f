//! Field partition: contiguous yard-line pieces with a designated red zone.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{DEFAULT_PIECE_BOUNDARIES, DEFAULT_REDZONE_PIECE, FIELD_LENGTH};
use crate::error::{ConfigError, SimError, SimResult};

/// Boundaries stored inline; partitions rarely exceed a handful of pieces.
pub type Boundaries = SmallVec<[u8; 8]>;

/// Raw, unvalidated partition as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPartitionSpec {
    pub boundaries: Vec<u8>,
    pub redzone: usize,
}

/// Ordered yard-line boundaries `[0, b1, .., 100]` splitting the field into
/// pieces. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FieldPartitionSpec", into = "FieldPartitionSpec")]
pub struct FieldPartition {
    boundaries: Boundaries,
    redzone: usize,
}

/// Half-open span `[start, end)` of a single piece in yards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PieceSpan {
    pub index: usize,
    pub start: f64,
    pub end: f64,
}

impl PieceSpan {
    #[must_use]
    pub fn length(&self) -> f64 {
        self.end - self.start
    }
}

impl FieldPartition {
    /// Validate and build a partition.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the boundaries do not strictly increase
    /// from 0 to 100 or the red zone is not the final piece.
    pub fn new(boundaries: &[u8], redzone: usize) -> Result<Self, ConfigError> {
        let (Some(&first), Some(&last)) = (boundaries.first(), boundaries.last()) else {
            return Err(ConfigError::TooFewBoundaries { count: 0 });
        };
        if boundaries.len() < 2 {
            return Err(ConfigError::TooFewBoundaries {
                count: boundaries.len(),
            });
        }
        if first != 0 || last != FIELD_LENGTH {
            return Err(ConfigError::FieldSpan {
                first,
                last,
                expected: FIELD_LENGTH,
            });
        }
        for (index, pair) in boundaries.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(ConfigError::NonIncreasingBoundaries {
                    index: index + 1,
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        let last_piece = boundaries.len() - 2;
        if redzone != last_piece {
            return Err(ConfigError::RedzoneNotFinal {
                redzone,
                last_piece,
            });
        }
        Ok(Self {
            boundaries: boundaries.iter().copied().collect(),
            redzone,
        })
    }

    #[must_use]
    pub fn pieces(&self) -> usize {
        self.boundaries.len() - 1
    }

    #[must_use]
    pub const fn redzone(&self) -> usize {
        self.redzone
    }

    #[must_use]
    pub const fn is_redzone(&self, piece: usize) -> bool {
        piece == self.redzone
    }

    #[must_use]
    pub fn boundaries(&self) -> &[u8] {
        &self.boundaries
    }

    /// Length of every piece in yards.
    #[must_use]
    pub fn piece_lengths(&self) -> Vec<u8> {
        self.boundaries.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Span of the piece at `index`, if it exists.
    #[must_use]
    pub fn span(&self, index: usize) -> Option<PieceSpan> {
        let start = *self.boundaries.get(index)?;
        let end = *self.boundaries.get(index + 1)?;
        Some(PieceSpan {
            index,
            start: f64::from(start),
            end: f64::from(end),
        })
    }

    /// Locate the piece containing `yardline`.
    ///
    /// Pieces are closed-open, except the final piece which also contains the
    /// opponent goal line itself.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRange`] for non-finite yardlines or anything
    /// outside `[0, 100]`.
    pub fn locate(&self, yardline: f64) -> SimResult<PieceSpan> {
        if !yardline.is_finite() || yardline < 0.0 || yardline > f64::from(FIELD_LENGTH) {
            return Err(SimError::OutOfRange { yardline });
        }
        let last = self.pieces() - 1;
        let index = self
            .boundaries
            .iter()
            .skip(1)
            .position(|&end| yardline < f64::from(end))
            .unwrap_or(last);
        self.span(index).ok_or(SimError::OutOfRange { yardline })
    }
}

impl Default for FieldPartition {
    fn default() -> Self {
        Self {
            boundaries: DEFAULT_PIECE_BOUNDARIES.iter().copied().collect(),
            redzone: DEFAULT_REDZONE_PIECE,
        }
    }
}

impl TryFrom<FieldPartitionSpec> for FieldPartition {
    type Error = ConfigError;

    fn try_from(spec: FieldPartitionSpec) -> Result<Self, Self::Error> {
        Self::new(&spec.boundaries, spec.redzone)
    }
}

impl From<FieldPartition> for FieldPartitionSpec {
    fn from(partition: FieldPartition) -> Self {
        Self {
            boundaries: partition.boundaries.to_vec(),
            redzone: partition.redzone,
        }
    }
}
