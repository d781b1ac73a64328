use crate::bootstrap::Resampler;
use crate::error::Result;
use crate::sample::ScoreOrderedSample;
use crate::stats::CumulativeCounts;
use crate::utils::{interval_levels, quantile_linear_sorted};
use log::debug;
use serde::{Deserialize, Serialize};

/// A metric-vs-recall curve with its pointwise bootstrap band.
///
/// All four vectors have `n + 1` entries: entry 0 is the fixed boundary point
/// (recall 0, value 1, bounds 1) and entry `i + 1` corresponds to position `i`
/// of the score-ordered sample.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CurveBand {
    pub recall: Vec<f64>,
    pub value: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    /// share of bootstrap draws discarded as single-class
    pub rejection_rate: f64,
}

impl CurveBand {
    pub fn len(&self) -> usize {
        self.recall.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recall.is_empty()
    }
}

/// Running maximum taken from the last entry back to the first.
///
/// Applied to a precision (or specificity) sequence along the ordering, it
/// gives each position the best value reachable at that recall or beyond,
/// so the result never increases.
pub fn monotone_envelope(values: &[f64]) -> Vec<f64> {
    let mut envelope = values.to_vec();
    for i in (0..envelope.len().saturating_sub(1)).rev() {
        envelope[i] = envelope[i].max(envelope[i + 1]);
    }
    envelope
}

/// Pointwise `(1-conf)/2` and `1-(1-conf)/2` quantiles across equally long curves
pub fn pointwise_bounds(curves: &[Vec<f64>], conf: f64) -> (Vec<f64>, Vec<f64>) {
    let (lo_q, hi_q) = interval_levels(conf);
    let len = curves.first().map_or(0, |c| c.len());
    let mut column: Vec<f64> = Vec::with_capacity(curves.len());

    (0..len)
        .map(|j| {
            column.clear();
            column.extend(curves.iter().map(|c| c[j]));
            column.sort_by(f64::total_cmp);
            (
                quantile_linear_sorted(&column, lo_q),
                quantile_linear_sorted(&column, hi_q),
            )
        })
        .unzip()
}

/// Precision-recall curve with bootstrap band.
///
/// The point estimate is the raw precision `tp[i] / (i + 1)`; each replicate
/// is passed through [`monotone_envelope`] before the quantiles are taken.
pub fn pr_curve(sample: &ScoreOrderedSample, resampler: &Resampler) -> Result<CurveBand> {
    debug!("Estimating precision-recall band...");
    band(sample, resampler, CumulativeCounts::precisions)
}

/// Specificity-recall curve with bootstrap band.
///
/// Specificity at position `i` is the share of negatives ranked after `i`.
pub fn sr_curve(sample: &ScoreOrderedSample, resampler: &Resampler) -> Result<CurveBand> {
    debug!("Estimating specificity-recall band...");
    band(sample, resampler, CumulativeCounts::specificities)
}

fn band(
    sample: &ScoreOrderedSample,
    resampler: &Resampler,
    metric: fn(&CumulativeCounts) -> Vec<f64>,
) -> Result<CurveBand> {
    let counts = sample.counts();

    let ensemble = resampler.run(sample, |labels, _| {
        monotone_envelope(&metric(&CumulativeCounts::from_labels(labels)))
    })?;
    let (lower, upper) = pointwise_bounds(&ensemble.replicates, resampler.conf);

    Ok(CurveBand {
        recall: with_boundary(0.0, counts.recalls()),
        value: with_boundary(1.0, metric(&counts)),
        lower: with_boundary(1.0, lower),
        upper: with_boundary(1.0, upper),
        rejection_rate: ensemble.rejection_rate(),
    })
}

fn with_boundary(first: f64, rest: Vec<f64>) -> Vec<f64> {
    let mut v = Vec::with_capacity(rest.len() + 1);
    v.push(first);
    v.extend(rest);
    v
}
