use crate::error::{BinciError, Result};
use crate::sample::ScoreOrderedSample;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Held-out predictions: one label and one score per sample
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct Data {
    pub samples: Vec<String>,
    pub y: Vec<u8>,
    pub scores: Vec<f64>,
}

impl Data {
    /// Create a new `Data` instance with default values
    pub fn new() -> Data {
        Data {
            samples: Vec::new(),
            y: Vec::new(),
            scores: Vec::new(),
        }
    }

    /// Load a tab-separated file with columns `sample`, `label`, `score`.
    ///
    /// Rows whose label is neither 0 nor 1 (e.g. 2 for unknown) are skipped
    /// with a warning. Malformed numbers abort the load.
    pub fn load_data<P: AsRef<Path>>(&mut self, path: P, has_header: bool) -> Result<()> {
        let path = path.as_ref();
        info!("Loading file {}...", path.display());

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(has_header)
            .from_path(path)?;

        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            if record.len() < 3 {
                return Err(BinciError::Parse(format!(
                    "line {}: expected 3 columns (sample, label, score), found {}",
                    line,
                    record.len()
                )));
            }

            let sample = record[0].trim().to_string();
            let label: u8 = record[1].trim().parse().map_err(|_| {
                BinciError::Parse(format!("line {}: invalid label '{}'", line, &record[1]))
            })?;
            let score: f64 = record[2].trim().parse().map_err(|_| {
                BinciError::Parse(format!("line {}: invalid score '{}'", line, &record[2]))
            })?;

            if label > 1 {
                warn!("Sample {} has label {} (neither 0 nor 1). Skipping it.", sample, label);
                continue;
            }
            self.samples.push(sample);
            self.y.push(label);
            self.scores.push(score);
        }

        Ok(())
    }

    pub fn sample_len(&self) -> usize {
        self.y.len()
    }

    /// Build the score-ordered view the estimators work on.
    ///
    /// With `sort_scores` unset the rows must already be in descending score
    /// order.
    pub fn to_sample(&self, sort_scores: bool) -> Result<ScoreOrderedSample> {
        if sort_scores {
            ScoreOrderedSample::new(self.y.clone(), self.scores.clone())
        } else {
            ScoreOrderedSample::from_sorted(self.y.clone(), self.scores.clone())
        }
    }
}

impl Default for Data {
    fn default() -> Self {
        Data::new()
    }
}

impl fmt::Debug for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positives = self.y.iter().filter(|&&l| l == 1).count();
        write!(
            f,
            "Data: {} samples ({} positives, {} negatives)",
            self.sample_len(),
            positives,
            self.sample_len() - positives
        )
    }
}
