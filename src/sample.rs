use crate::error::{BinciError, Result};
use crate::stats::CumulativeCounts;
use log::debug;
use serde::{Deserialize, Serialize};

/// Labels and scores ordered by descending score.
///
/// Every threshold search and curve estimator in the crate works on positions
/// in this ordering: position `i` stands for the threshold "predict positive
/// iff score >= scores[i]". Constructing the sample is the only way to obtain
/// one, so the ordering and the two-class requirement are checked once here
/// rather than trusted at each call site.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoreOrderedSample {
    labels: Vec<u8>,
    scores: Vec<f64>,
    positives: usize,
}

impl ScoreOrderedSample {
    /// Validate `labels`/`scores` and sort them by descending score.
    ///
    /// The sort is stable: tied scores keep the caller's relative order.
    ///
    /// # Errors
    ///
    /// Empty input, mismatched lengths, labels outside {0, 1}, non-finite
    /// scores, or input holding a single class.
    pub fn new(labels: Vec<u8>, scores: Vec<f64>) -> Result<ScoreOrderedSample> {
        let positives = validate(&labels, &scores)?;

        let mut order: Vec<usize> = (0..labels.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        let moved = order.iter().enumerate().filter(|(i, &j)| *i != j).count();
        debug!("Ordered {} samples by descending score ({} moved)", labels.len(), moved);

        Ok(ScoreOrderedSample {
            labels: order.iter().map(|&i| labels[i]).collect(),
            scores: order.iter().map(|&i| scores[i]).collect(),
            positives,
        })
    }

    /// Same checks as [`ScoreOrderedSample::new`], but the caller vouches for
    /// the ordering: scores must already be non-increasing.
    pub fn from_sorted(labels: Vec<u8>, scores: Vec<f64>) -> Result<ScoreOrderedSample> {
        let positives = validate(&labels, &scores)?;
        if let Some(i) = scores.windows(2).position(|w| w[1] > w[0]) {
            return Err(BinciError::NotSorted { index: i + 1 });
        }
        Ok(ScoreOrderedSample { labels, scores, positives })
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: construction rejects empty input.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn positives(&self) -> usize {
        self.positives
    }

    pub fn negatives(&self) -> usize {
        self.labels.len() - self.positives
    }

    /// Cumulative true-positive / negative counts along the ordering.
    pub fn counts(&self) -> CumulativeCounts {
        CumulativeCounts::from_labels(&self.labels)
    }
}

/// Returns the number of positives when the pair of arrays is usable.
fn validate(labels: &[u8], scores: &[f64]) -> Result<usize> {
    if labels.len() != scores.len() {
        return Err(BinciError::LengthMismatch { labels: labels.len(), scores: scores.len() });
    }
    if labels.is_empty() {
        return Err(BinciError::EmptyInput);
    }
    if let Some((index, &label)) = labels.iter().enumerate().find(|(_, &l)| l > 1) {
        return Err(BinciError::InvalidLabel { index, label });
    }
    if let Some((index, &score)) = scores.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(BinciError::NonFiniteScore { index, score });
    }

    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(BinciError::SingleClass { positives, negatives });
    }
    Ok(positives)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_sorts_descending() {
        let sample = ScoreOrderedSample::new(vec![0, 1, 0, 1], vec![0.1, 0.9, 0.4, 0.7]).unwrap();
        assert_eq!(sample.scores(), &[0.9, 0.7, 0.4, 0.1]);
        assert_eq!(sample.labels(), &[1, 1, 0, 0]);
        assert_eq!(sample.positives(), 2);
        assert_eq!(sample.negatives(), 2);
        assert_eq!(sample.len(), 4);
    }

    #[test]
    fn test_new_keeps_input_order_on_ties() {
        let sample = ScoreOrderedSample::new(vec![0, 1, 0, 1], vec![0.5, 0.5, 0.9, 0.5]).unwrap();
        assert_eq!(sample.labels(), &[0, 0, 1, 1], "tied scores should keep their relative order");
    }

    #[test]
    fn test_from_sorted_accepts_ties() {
        let sample = ScoreOrderedSample::from_sorted(vec![1, 0, 1], vec![0.8, 0.8, 0.2]).unwrap();
        assert_eq!(sample.labels(), &[1, 0, 1]);
    }

    #[test]
    fn test_from_sorted_rejects_ascending_scores() {
        let err = ScoreOrderedSample::from_sorted(vec![1, 0, 1], vec![0.8, 0.3, 0.4]).unwrap_err();
        assert!(matches!(err, BinciError::NotSorted { index: 2 }), "got {:?}", err);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(ScoreOrderedSample::new(vec![], vec![]), Err(BinciError::EmptyInput)));
    }

    #[test]
    fn test_length_mismatch() {
        let err = ScoreOrderedSample::new(vec![0, 1], vec![0.3]).unwrap_err();
        assert!(matches!(err, BinciError::LengthMismatch { labels: 2, scores: 1 }));
    }

    #[test]
    fn test_single_class_is_rejected() {
        let err = ScoreOrderedSample::new(vec![0, 0, 0], vec![0.3, 0.2, 0.1]).unwrap_err();
        assert!(matches!(err, BinciError::SingleClass { positives: 0, negatives: 3 }));
        let err = ScoreOrderedSample::new(vec![1, 1], vec![0.3, 0.2]).unwrap_err();
        assert!(matches!(err, BinciError::SingleClass { positives: 2, negatives: 0 }));
    }

    #[test]
    fn test_invalid_label_and_score() {
        let err = ScoreOrderedSample::new(vec![0, 2, 1], vec![0.3, 0.2, 0.1]).unwrap_err();
        assert!(matches!(err, BinciError::InvalidLabel { index: 1, label: 2 }));
        let err = ScoreOrderedSample::new(vec![0, 1], vec![f64::NAN, 0.2]).unwrap_err();
        assert!(matches!(err, BinciError::NonFiniteScore { index: 0, .. }));
    }
}
