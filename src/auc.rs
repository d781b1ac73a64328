use crate::bootstrap::Resampler;
use crate::error::Result;
use crate::sample::ScoreOrderedSample;
use crate::utils::{mean_and_std, percentile_interval};
use log::debug;
use serde::{Deserialize, Serialize};

/// ROC-AUC point estimate with its percentile bootstrap interval
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AucInterval {
    pub auc: f64,
    pub lower: f64,
    pub upper: f64,
    /// standard deviation of the bootstrap replicates
    pub std_error: f64,
    pub rejection_rate: f64,
}

/// A fitted binary classifier able to score feature rows.
pub trait Classifier {
    /// Probability of the positive class for each row of `features`.
    fn predict_proba(&self, features: &[Vec<f64>]) -> Vec<f64>;
}

/// Area under the ROC curve through the Mann-Whitney U statistic.
///
/// Tied scores share their mid-rank, which counts a tied positive/negative
/// pair as one half. Labels other than 0 and 1 are ignored. Returns 0.5 when
/// either class is absent.
pub fn roc_auc(labels: &[u8], scores: &[f64]) -> f64 {
    let mut combined: Vec<(f64, u8)> = scores
        .iter()
        .copied()
        .zip(labels.iter().copied())
        .filter(|&(_, label)| label <= 1)
        .collect();

    let n1 = combined.iter().filter(|&&(_, label)| label == 1).count() as f64;
    let n0 = combined.len() as f64 - n1;
    if n1 == 0.0 || n0 == 0.0 {
        return 0.5;
    }

    combined.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut rank_sum_1 = 0.0;
    let mut i = 0;
    while i < combined.len() {
        let start = i;
        while i + 1 < combined.len() && combined[i].0 == combined[i + 1].0 {
            i += 1;
        }
        let rank = (start + i + 2) as f64 / 2.0;
        let positives = combined[start..=i].iter().filter(|(_, label)| *label == 1).count();
        rank_sum_1 += rank * positives as f64;
        i += 1;
    }

    let u_stat = rank_sum_1 - n1 * (n1 + 1.0) / 2.0;
    u_stat / (n1 * n0)
}

/// ROC-AUC of `sample` and its bootstrap interval at `resampler.conf`.
///
/// Unlike the curve bands, replicates are not interpolated: the quantiles are
/// taken straight from the replicate AUCs.
pub fn roc_auc_ci(sample: &ScoreOrderedSample, resampler: &Resampler) -> Result<AucInterval> {
    let auc = roc_auc(sample.labels(), sample.scores());
    let ensemble = resampler.run(sample, roc_auc)?;
    let (lower, upper) = percentile_interval(&ensemble.replicates, resampler.conf);
    let (_, std_error) = mean_and_std(&ensemble.replicates);

    debug!(
        "AUC {:.4} [{:.4}, {:.4}] over {} replicates",
        auc,
        lower,
        upper,
        ensemble.replicates.len()
    );

    Ok(AucInterval {
        auc,
        lower,
        upper,
        std_error,
        rejection_rate: ensemble.rejection_rate(),
    })
}

/// Score `features` with `classifier`, then bootstrap the ROC-AUC against `labels`.
pub fn roc_auc_ci_for_classifier<C: Classifier + ?Sized>(
    classifier: &C,
    features: &[Vec<f64>],
    labels: &[u8],
    resampler: &Resampler,
) -> Result<AucInterval> {
    let probabilities = classifier.predict_proba(features);
    let sample = ScoreOrderedSample::new(labels.to_vec(), probabilities)?;
    roc_auc_ci(&sample, resampler)
}
