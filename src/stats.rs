use serde::{Deserialize, Serialize};

/// Running class counts over a label sequence ordered by descending score.
///
/// `tp[i]` is the number of positives among the first `i + 1` labels and
/// `negatives_seen[i]` the number of negatives among them. Both sequences
/// are non-decreasing; their last entries are the class totals.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CumulativeCounts {
    pub tp: Vec<usize>,
    pub negatives_seen: Vec<usize>,
}

impl CumulativeCounts {
    pub fn from_labels(labels: &[u8]) -> CumulativeCounts {
        let mut tp = Vec::with_capacity(labels.len());
        let mut negatives_seen = Vec::with_capacity(labels.len());
        let (mut pos, mut neg) = (0usize, 0usize);

        for &label in labels {
            if label == 1 {
                pos += 1;
            } else {
                neg += 1;
            }
            tp.push(pos);
            negatives_seen.push(neg);
        }

        CumulativeCounts { tp, negatives_seen }
    }

    pub fn len(&self) -> usize {
        self.tp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tp.is_empty()
    }

    pub fn total_positives(&self) -> usize {
        self.tp.last().copied().unwrap_or(0)
    }

    pub fn total_negatives(&self) -> usize {
        self.negatives_seen.last().copied().unwrap_or(0)
    }

    /// Negatives ranked strictly after position `i`, i.e. true negatives
    /// when every label up to `i` is predicted positive.
    pub fn tn_from_end(&self, i: usize) -> usize {
        self.total_negatives() - self.negatives_seen[i]
    }

    pub fn recall(&self, i: usize) -> f64 {
        self.tp[i] as f64 / self.total_positives() as f64
    }

    pub fn precision(&self, i: usize) -> f64 {
        self.tp[i] as f64 / (i + 1) as f64
    }

    pub fn specificity(&self, i: usize) -> f64 {
        self.tn_from_end(i) as f64 / self.total_negatives() as f64
    }

    pub fn recalls(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.recall(i)).collect()
    }

    pub fn precisions(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.precision(i)).collect()
    }

    pub fn specificities(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.specificity(i)).collect()
    }

    /// Checked before trusting the specificity binary search.
    pub fn specificity_is_non_increasing(&self) -> bool {
        self.negatives_seen.windows(2).all(|w| w[0] <= w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_labels_counts() {
        let counts = CumulativeCounts::from_labels(&[1, 1, 0, 1, 0]);
        assert_eq!(counts.tp, vec![1, 2, 2, 3, 3]);
        assert_eq!(counts.negatives_seen, vec![0, 0, 1, 1, 2]);
        assert_eq!(counts.total_positives(), 3);
        assert_eq!(counts.total_negatives(), 2);
    }

    #[test]
    fn test_tn_from_end() {
        let counts = CumulativeCounts::from_labels(&[0, 1, 0, 0]);
        let tn: Vec<usize> = (0..counts.len()).map(|i| counts.tn_from_end(i)).collect();
        assert_eq!(tn, vec![2, 2, 1, 0]);
    }

    #[test]
    fn test_rates() {
        let counts = CumulativeCounts::from_labels(&[1, 0, 1, 0]);
        assert_eq!(counts.recalls(), vec![0.5, 0.5, 1.0, 1.0]);
        assert_eq!(counts.precisions(), vec![1.0, 0.5, 2.0 / 3.0, 0.5]);
        assert_eq!(counts.specificities(), vec![1.0, 0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_specificity_monotone() {
        let counts = CumulativeCounts::from_labels(&[0, 1, 1, 0, 1, 0, 0]);
        assert!(counts.specificity_is_non_increasing());
        let specs = counts.specificities();
        assert!(specs.windows(2).all(|w| w[0] >= w[1]), "specificity should never increase: {:?}", specs);
    }

    #[test]
    fn test_empty_labels() {
        let counts = CumulativeCounts::from_labels(&[]);
        assert!(counts.is_empty());
        assert_eq!(counts.total_positives(), 0);
    }
}
