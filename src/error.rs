//! Error taxonomy for binci.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BinciError>;

#[derive(Debug, Error)]
pub enum BinciError {
    // Precondition violations on caller input
    #[error("input is empty")]
    EmptyInput,

    #[error("length mismatch: {labels} labels for {scores} scores")]
    LengthMismatch { labels: usize, scores: usize },

    #[error("invalid label {label} at position {index} (expected 0 or 1)")]
    InvalidLabel { index: usize, label: u8 },

    #[error("non-finite score {score} at position {index}")]
    NonFiniteScore { index: usize, score: f64 },

    #[error("input contains a single class ({positives} positives, {negatives} negatives)")]
    SingleClass { positives: usize, negatives: usize },

    #[error("scores are not sorted in descending order (position {index})")]
    NotSorted { index: usize },

    #[error("invalid {name}={value}: must be in [0, 1]")]
    InvalidTarget { name: &'static str, value: f64 },

    #[error("invalid confidence level {0}: must be in (0, 1)")]
    InvalidConfidence(f64),

    #[error("invalid bootstrap setting: {0}")]
    InvalidBootstrap(String),

    // Resampling failures
    #[error("replicate {replicate} drew {attempts} single-class resamples in a row")]
    DegenerateResamples { replicate: usize, attempts: usize },

    #[error("bootstrap interrupted after a stop request")]
    Interrupted,

    // Outer surface
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for BinciError {
    fn from(e: csv::Error) -> Self {
        BinciError::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for BinciError {
    fn from(e: serde_yaml::Error) -> Self {
        BinciError::Config(e.to_string())
    }
}
