use crate::error::{BinciError, Result};
use crate::param::Param;
use crate::sample::ScoreOrderedSample;
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const DEFAULT_N_BOOTSTRAP: usize = 10_000;
pub const DEFAULT_CONF: f64 = 0.95;
/// Consecutive single-class draws tolerated for one replicate
pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000;

const REJECTION_WARN_RATE: f64 = 0.1;

/// Accepted bootstrap replicates along with the draw bookkeeping
#[derive(Clone, Debug)]
pub struct Ensemble<T> {
    pub replicates: Vec<T>,
    /// every resample drawn, accepted or not
    pub draws: usize,
    /// resamples discarded because they held a single class
    pub rejected: usize,
}

impl<T> Ensemble<T> {
    pub fn rejection_rate(&self) -> f64 {
        if self.draws == 0 {
            0.0
        } else {
            self.rejected as f64 / self.draws as f64
        }
    }
}

/// Uniform with-replacement resampler over a score-ordered sample.
///
/// Replicate `k` draws from its own ChaCha8 stream (`seed`, stream `k`), so an
/// ensemble only depends on the seed and never on how rayon schedules the
/// replicates across threads.
#[derive(Clone, Debug)]
pub struct Resampler {
    pub n_bootstrap: usize,
    pub conf: f64,
    pub seed: u64,
    pub max_attempts: usize,
    running: Option<Arc<AtomicBool>>,
}

impl Resampler {
    pub fn new(n_bootstrap: usize, conf: f64, seed: u64) -> Result<Resampler> {
        let resampler = Resampler {
            n_bootstrap,
            conf,
            seed,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            running: None,
        };
        resampler.validate()?;
        Ok(resampler)
    }

    pub fn from_param(param: &Param) -> Result<Resampler> {
        Resampler::new(param.bootstrap.n_bootstrap, param.bootstrap.conf, param.general.seed)?
            .with_max_attempts(param.bootstrap.max_attempts)
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Result<Resampler> {
        self.max_attempts = max_attempts;
        self.validate()?;
        Ok(self)
    }

    /// Stop drawing as soon as `running` is cleared.
    pub fn with_running(mut self, running: Arc<AtomicBool>) -> Resampler {
        self.running = Some(running);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.n_bootstrap == 0 {
            return Err(BinciError::InvalidBootstrap("n_bootstrap must be >= 1".to_string()));
        }
        if !(self.conf > 0.0 && self.conf < 1.0) {
            return Err(BinciError::InvalidConfidence(self.conf));
        }
        if self.max_attempts == 0 {
            return Err(BinciError::InvalidBootstrap("max_attempts must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Evaluate `evaluate` on `n_bootstrap` accepted resamples of `sample`.
    ///
    /// Each resample holds `sample.len()` positions drawn uniformly with
    /// replacement and put back in ascending order, so the labels and scores
    /// handed to `evaluate` keep the descending-score ordering. Resamples
    /// holding a single class are redrawn and counted in
    /// [`Ensemble::rejected`].
    ///
    /// # Errors
    ///
    /// [`BinciError::DegenerateResamples`] when one replicate sees
    /// `max_attempts` single-class draws in a row, [`BinciError::Interrupted`]
    /// when the running flag is cleared.
    pub fn run<T, F>(&self, sample: &ScoreOrderedSample, evaluate: F) -> Result<Ensemble<T>>
    where
        T: Send,
        F: Fn(&[u8], &[f64]) -> T + Sync,
    {
        debug!(
            "Bootstrapping {} replicates over {} samples (seed {})",
            self.n_bootstrap,
            sample.len(),
            self.seed
        );

        let results: Vec<(T, usize)> = (0..self.n_bootstrap)
            .into_par_iter()
            .map(|replicate| self.replicate(replicate, sample, &evaluate))
            .collect::<Result<Vec<(T, usize)>>>()?;

        let draws = results.iter().map(|(_, attempts)| attempts).sum::<usize>();
        let replicates: Vec<T> = results.into_iter().map(|(value, _)| value).collect();
        let ensemble = Ensemble {
            rejected: draws - replicates.len(),
            replicates,
            draws,
        };

        if ensemble.rejection_rate() > REJECTION_WARN_RATE {
            warn!(
                "{:.1}% of bootstrap resamples held a single class ({} of {} draws). \
                The class balance is extreme for this sample size; intervals may be unreliable.",
                ensemble.rejection_rate() * 100.0,
                ensemble.rejected,
                ensemble.draws
            );
        } else {
            debug!(
                "Bootstrap done: {} draws, {} rejected",
                ensemble.draws, ensemble.rejected
            );
        }

        Ok(ensemble)
    }

    fn replicate<T, F>(&self, replicate: usize, sample: &ScoreOrderedSample, evaluate: &F) -> Result<(T, usize)>
    where
        F: Fn(&[u8], &[f64]) -> T,
    {
        let n = sample.len();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(replicate as u64);
        let mut indices = vec![0usize; n];

        for attempt in 1..=self.max_attempts {
            if let Some(ref running) = self.running {
                if !running.load(Ordering::Relaxed) {
                    return Err(BinciError::Interrupted);
                }
            }

            for slot in indices.iter_mut() {
                *slot = rng.gen_range(0..n);
            }
            indices.sort_unstable();

            let labels: Vec<u8> = indices.iter().map(|&i| sample.labels()[i]).collect();
            let positives = labels.iter().filter(|&&l| l == 1).count();
            if positives == 0 || positives == n {
                continue;
            }

            let scores: Vec<f64> = indices.iter().map(|&i| sample.scores()[i]).collect();
            return Ok((evaluate(&labels, &scores), attempt));
        }

        Err(BinciError::DegenerateResamples {
            replicate,
            attempts: self.max_attempts,
        })
    }
}
