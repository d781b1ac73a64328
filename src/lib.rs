pub mod auc;
pub mod bootstrap;
pub mod curve;
pub mod data;
pub mod error;
pub mod loss;
pub mod param;
pub mod ranking;
pub mod sample;
pub mod stats;
pub mod threshold;
pub mod utils;

use crate::auc::{roc_auc_ci, AucInterval};
use crate::bootstrap::Resampler;
use crate::curve::{pr_curve, sr_curve, CurveBand};
use crate::error::{BinciError, Result};
use crate::threshold::{pr_threshold, sr_threshold, ThresholdResult};
use chrono::Local;
use data::Data;
use log::debug;
use param::Param;
use sample::ScoreOrderedSample;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Everything estimated for one set of held-out predictions
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub binci_version: String,
    pub timestamp: String,
    pub sample_len: usize,
    pub positives: usize,
    pub negatives: usize,
    pub n_bootstrap: usize,
    pub conf: f64,
    pub seed: u64,
    pub auc: Option<AucInterval>,
    pub pr_curve: Option<CurveBand>,
    pub sr_curve: Option<CurveBand>,
    pub pr_threshold: Option<ThresholdResult>,
    pub sr_threshold: Option<ThresholdResult>,
    pub execution_time: f64,
}

impl Report {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BinciError::Parse(e.to_string()))
    }
}

/// Load the file named in `param.data` and estimate everything requested.
pub fn run(param: &Param, running: Arc<AtomicBool>) -> Result<Report> {
    let mut data = Data::new();
    data.load_data(&param.data.path, param.data.has_header)?;
    cinfo!(param.general.display_colorful, "\x1b[2;97m{:?}\x1b[0m", data);

    let sample = data.to_sample(param.data.sort_scores)?;
    run_on_sample(&sample, param, running)
}

/// Same as [`run`] on an already built sample.
pub fn run_on_sample(sample: &ScoreOrderedSample, param: &Param, running: Arc<AtomicBool>) -> Result<Report> {
    let start = std::time::Instant::now();
    let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let resampler = Resampler::from_param(param)?.with_running(running);

    let mut pool = rayon::ThreadPoolBuilder::new();
    if param.general.thread_number > 0 {
        pool = pool.num_threads(param.general.thread_number);
    }
    let pool = pool.build().map_err(|e| BinciError::Config(e.to_string()))?;
    debug!("Bootstrapping on {} threads", pool.current_num_threads());

    let (auc, pr_band, sr_band) = pool.install(|| -> Result<_> {
        let auc = if param.curves.compute_auc {
            cinfo!(param.general.display_colorful, "Bootstrapping ROC-AUC ({} replicates)...", resampler.n_bootstrap);
            Some(roc_auc_ci(sample, &resampler)?)
        } else {
            None
        };
        let pr_band = if param.curves.compute_pr {
            cinfo!(param.general.display_colorful, "Bootstrapping precision-recall curve...");
            Some(pr_curve(sample, &resampler)?)
        } else {
            None
        };
        let sr_band = if param.curves.compute_sr {
            cinfo!(param.general.display_colorful, "Bootstrapping specificity-recall curve...");
            Some(sr_curve(sample, &resampler)?)
        } else {
            None
        };
        Ok((auc, pr_band, sr_band))
    })?;

    let pr_threshold = param
        .threshold
        .min_precision
        .map(|target| pr_threshold(sample, target))
        .transpose()?;
    let sr_threshold = param
        .threshold
        .min_specificity
        .map(|target| sr_threshold(sample, target))
        .transpose()?;

    Ok(Report {
        binci_version: version(),
        timestamp,
        sample_len: sample.len(),
        positives: sample.positives(),
        negatives: sample.negatives(),
        n_bootstrap: resampler.n_bootstrap,
        conf: resampler.conf,
        seed: resampler.seed,
        auc,
        pr_curve: pr_band,
        sr_curve: sr_band,
        pr_threshold,
        sr_threshold,
        execution_time: start.elapsed().as_secs_f64(),
    })
}

fn version() -> String {
    format!(
        "{}#{}",
        env!("CARGO_PKG_VERSION"),
        option_env!("BINCI_GIT_SHA").unwrap_or("unknown")
    )
}

/// First grid point reaching each recall decile
fn decile_rows(band: &CurveBand) -> Vec<usize> {
    let mut rows = Vec::new();
    for decile in 1..=10 {
        let target = decile as f64 / 10.0;
        if let Some(i) = band.recall.iter().position(|&r| r >= target - 1e-12) {
            if rows.last() != Some(&i) {
                rows.push(i);
            }
        }
    }
    rows
}

fn fmt_band(f: &mut fmt::Formatter<'_>, name: &str, band: &CurveBand) -> fmt::Result {
    writeln!(f, "{} curve (rejected draws {:.1}%)", name, band.rejection_rate * 100.0)?;
    writeln!(f, "  {:>8}  {:>8}  {:>8}  {:>8}", "recall", name, "lower", "upper")?;
    for i in decile_rows(band) {
        writeln!(
            f,
            "  {:>8.3}  {:>8.3}  {:>8.3}  {:>8.3}",
            band.recall[i], band.value[i], band.lower[i], band.upper[i]
        )?;
    }
    Ok(())
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "binci {} | {} samples ({} positives, {} negatives) | B={} conf={:.3} seed={}",
            self.binci_version,
            self.sample_len,
            self.positives,
            self.negatives,
            self.n_bootstrap,
            self.conf,
            self.seed
        )?;
        if let Some(ref auc) = self.auc {
            writeln!(
                f,
                "ROC-AUC {:.4} [{:.4}, {:.4}] (std err {:.4}, rejected draws {:.1}%)",
                auc.auc,
                auc.lower,
                auc.upper,
                auc.std_error,
                auc.rejection_rate * 100.0
            )?;
        }
        if let Some(ref t) = self.pr_threshold {
            writeln!(f, "Precision-constrained threshold {:.4} | recall {:.4}", t.threshold, t.recall)?;
        }
        if let Some(ref t) = self.sr_threshold {
            writeln!(f, "Specificity-constrained threshold {:.4} | recall {:.4}", t.threshold, t.recall)?;
        }
        if let Some(ref band) = self.pr_curve {
            fmt_band(f, "precision", band)?;
        }
        if let Some(ref band) = self.sr_curve {
            fmt_band(f, "specificity", band)?;
        }
        write!(f, "Computed in {:.2}s", self.execution_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decile_rows() {
        let band = CurveBand {
            recall: vec![0.0, 0.5, 0.5, 1.0],
            value: vec![1.0, 1.0, 0.5, 0.75],
            lower: vec![1.0; 4],
            upper: vec![1.0; 4],
            rejection_rate: 0.0,
        };
        assert_eq!(decile_rows(&band), vec![1, 3]);
    }
}
