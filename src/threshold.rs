use crate::error::{BinciError, Result};
use crate::sample::ScoreOrderedSample;
use log::debug;
use serde::{Deserialize, Serialize};

/// Operating point chosen by a constrained threshold search
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ThresholdResult {
    /// predict positive iff score >= threshold
    pub threshold: f64,
    /// recall achieved at `threshold`
    pub recall: f64,
    /// position of the threshold in the score-ordered sample
    pub index: usize,
}

fn check_target(name: &'static str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(BinciError::InvalidTarget { name, value });
    }
    Ok(())
}

/// Highest-recall threshold whose precision is at least `min_precision`.
///
/// Precision is not monotone along the ordering, so every position is
/// visited. The search starts from position 0 and only moves on a strict
/// recall improvement, which makes the earliest (highest) threshold win among
/// positions of equal recall. When no later position qualifies, position 0
/// is returned whatever its precision.
///
/// # Examples
///
/// ```
/// use binci::sample::ScoreOrderedSample;
/// use binci::threshold::pr_threshold;
///
/// let sample = ScoreOrderedSample::from_sorted(
///     vec![1, 1, 0, 1, 0],
///     vec![0.9, 0.8, 0.7, 0.6, 0.5],
/// ).unwrap();
/// let best = pr_threshold(&sample, 0.6).unwrap();
/// assert_eq!(best.threshold, 0.6);
/// assert_eq!(best.recall, 1.0);
/// ```
pub fn pr_threshold(sample: &ScoreOrderedSample, min_precision: f64) -> Result<ThresholdResult> {
    check_target("min_precision", min_precision)?;
    let counts = sample.counts();

    let mut best_index = 0;
    let mut max_recall = counts.recall(0);
    for i in 1..counts.len() {
        if counts.precision(i) >= min_precision {
            let recall = counts.recall(i);
            if recall > max_recall {
                max_recall = recall;
                best_index = i;
            }
        }
    }

    debug!(
        "Precision >= {:.3}: threshold {:.4} at position {} (recall {:.3})",
        min_precision,
        sample.scores()[best_index],
        best_index,
        max_recall
    );

    Ok(ThresholdResult {
        threshold: sample.scores()[best_index],
        recall: max_recall,
        index: best_index,
    })
}

/// Threshold where specificity crosses `min_specificity`, found by bisection.
///
/// Specificity at position `i` counts the negatives ranked after `i`, so it
/// never increases along the ordering. The bisection keeps `left` on the
/// satisfying side and `right` on the failing side; comparisons are exact,
/// and a position whose specificity equals the target stops the search at
/// once even if later positions share that value. When no position
/// satisfies the target the search falls back to position 0.
pub fn sr_threshold(sample: &ScoreOrderedSample, min_specificity: f64) -> Result<ThresholdResult> {
    check_target("min_specificity", min_specificity)?;
    let counts = sample.counts();
    debug_assert!(
        counts.specificity_is_non_increasing(),
        "specificity must be non-increasing for the bisection"
    );

    let mut left: isize = -1;
    let mut right: isize = counts.len() as isize;
    while left + 1 < right {
        let middle = (left + right) / 2;
        let specificity = counts.specificity(middle as usize);
        if specificity < min_specificity {
            right = middle;
        } else if specificity > min_specificity {
            left = middle;
        } else {
            left = middle;
            break;
        }
    }

    let index = if left < 0 {
        debug!("No position reaches specificity {:.3}, falling back to position 0", min_specificity);
        0
    } else {
        left as usize
    };

    debug!(
        "Specificity >= {:.3}: threshold {:.4} at position {} (recall {:.3})",
        min_specificity,
        sample.scores()[index],
        index,
        counts.recall(index)
    );

    Ok(ThresholdResult {
        threshold: sample.scores()[index],
        recall: counts.recall(index),
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn sorted(labels: Vec<u8>) -> ScoreOrderedSample {
        let n = labels.len();
        let scores = (0..n).map(|i| 1.0 - i as f64 / n as f64).collect();
        ScoreOrderedSample::from_sorted(labels, scores).unwrap()
    }

    fn random_sample(rng: &mut ChaCha8Rng, n: usize) -> ScoreOrderedSample {
        loop {
            let labels: Vec<u8> = (0..n).map(|_| rng.gen_range(0..2)).collect();
            let scores: Vec<f64> = (0..n).map(|_| rng.gen::<f64>()).collect();
            if let Ok(sample) = ScoreOrderedSample::new(labels, scores) {
                return sample;
            }
        }
    }

    #[test]
    fn test_pr_threshold_widest_prefix() {
        let sample = sorted(vec![1, 1, 0, 1, 0]);
        let res = pr_threshold(&sample, 0.6).unwrap();
        assert_eq!(res.index, 3, "precision 0.75 at position 3 reaches full recall first");
        assert_eq!(res.threshold, sample.scores()[3]);
        assert_eq!(res.recall, 1.0);
    }

    #[test]
    fn test_pr_threshold_falls_back_to_first_position() {
        // nothing after position 0 reaches precision 1.0 with better recall
        let sample = sorted(vec![1, 0, 1, 0, 0]);
        let res = pr_threshold(&sample, 1.0).unwrap();
        assert_eq!(res.index, 0);
        assert_eq!(res.recall, 0.5);
        assert_eq!(res.threshold, sample.scores()[0]);
    }

    #[test]
    fn test_pr_threshold_zero_target_takes_full_recall() {
        let sample = sorted(vec![0, 1, 0, 0, 1, 0]);
        let res = pr_threshold(&sample, 0.0).unwrap();
        assert_eq!(res.index, 4);
        assert_eq!(res.recall, 1.0);
    }

    #[test]
    fn test_sr_threshold_bisection() {
        // specificities: [1, 1, 2/3, 2/3, 1/3, 0]
        let sample = sorted(vec![1, 1, 0, 1, 0, 0]);
        let res = sr_threshold(&sample, 0.5).unwrap();
        assert_eq!(res.index, 3);
        assert_eq!(res.recall, 1.0);
    }

    #[test]
    fn test_sr_threshold_exact_match_stops_early() {
        let sample = sorted(vec![1, 1, 0, 1, 0, 0]);
        let res = sr_threshold(&sample, 2.0 / 3.0).unwrap();
        assert_eq!(res.index, 2, "exact match at the first probe wins over the later tie at position 3");
        assert_eq!(res.recall, 2.0 / 3.0);
    }

    #[test]
    fn test_sr_threshold_unattainable_target() {
        // first label is negative: specificity is at most 0.5 everywhere
        let sample = sorted(vec![0, 1, 0, 1]);
        let res = sr_threshold(&sample, 1.0).unwrap();
        assert_eq!(res.index, 0);
        assert_eq!(res.threshold, sample.scores()[0]);
        assert_eq!(res.recall, 0.0);
    }

    #[test]
    fn test_sr_threshold_zero_target_reaches_last_position() {
        let sample = sorted(vec![1, 0, 0, 1, 0]);
        let res = sr_threshold(&sample, 0.0).unwrap();
        assert_eq!(res.recall, 1.0);
        assert!(res.index >= 3);
    }

    #[test]
    fn test_invalid_targets() {
        let sample = sorted(vec![1, 0]);
        assert!(matches!(pr_threshold(&sample, 1.5), Err(BinciError::InvalidTarget { .. })));
        assert!(matches!(sr_threshold(&sample, -0.1), Err(BinciError::InvalidTarget { .. })));
        assert!(matches!(sr_threshold(&sample, f64::NAN), Err(BinciError::InvalidTarget { .. })));
    }

    #[test]
    fn test_constraints_hold_on_random_samples() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        for _ in 0..50 {
            let sample = random_sample(&mut rng, 40);
            let counts = sample.counts();
            let target: f64 = rng.gen_range(0.0..1.0);

            let pr = pr_threshold(&sample, target).unwrap();
            assert!((0.0..=1.0).contains(&pr.recall));
            let any_precision = (0..counts.len()).any(|i| counts.precision(i) >= target);
            if any_precision && pr.index > 0 {
                assert!(counts.precision(pr.index) >= target);
            }
            let best = (0..counts.len())
                .filter(|&i| counts.precision(i) >= target)
                .map(|i| counts.recall(i))
                .fold(counts.recall(0), f64::max);
            assert_eq!(pr.recall, best, "linear scan should reach the best feasible recall");

            let sr = sr_threshold(&sample, target).unwrap();
            assert!((0.0..=1.0).contains(&sr.recall));
            if counts.specificity(0) >= target {
                assert!(counts.specificity(sr.index) >= target);
                if sr.index + 1 < counts.len() && counts.specificity(sr.index) > target {
                    assert!(counts.specificity(sr.index + 1) < target, "bisection should stop at the boundary");
                }
            }
        }
    }
}
