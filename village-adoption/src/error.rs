use thiserror::Error;

/// Errors produced while loading a village or simulating adoption.
#[derive(Debug, Error)]
pub enum AdoptionError {
    /// Requested period is outside the village's target-fraction sequence.
    #[error("time period {period} does not exist (village has {periods} periods)")]
    PeriodOutOfRange { period: usize, periods: usize },

    /// Target fraction is NaN or outside `[0, 1]`.
    #[error("invalid target fraction {0}: must be within [0, 1]")]
    InvalidFraction(f64),

    /// Centrality score is negative or not finite.
    #[error("invalid score {score} for household {household}")]
    InvalidScore { household: usize, score: f64 },

    #[error("adjacency matrix is not square: row {row} has {len} entries, expected {expected}")]
    NonSquareAdjacency {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("invalid adjacency entry {value} at ({row}, {col})")]
    InvalidAdjacencyEntry { row: usize, col: usize, value: f64 },

    #[error("invalid number {value:?} at row {row}, column {col}")]
    InvalidNumber {
        row: usize,
        col: usize,
        value: String,
    },

    #[error("village {0} not found in panel data")]
    UnknownVillage(u32),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AdoptionError>;
