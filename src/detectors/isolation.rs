//! Isolation-forest outlier detection on the energy signal.
//!
//! Trees are grown on random subsamples by picking a uniform split between the
//! current minimum and maximum. Outliers are isolated in fewer splits, so their
//! average path length is short and their anomaly score
//! `2^(-E[h(x)] / c(n))` is close to 1. The `contamination` quantile of the
//! training scores is the decision threshold.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::stats;
use crate::error::{CoreError, Result};
use crate::models::Label;

// ---

pub const DEFAULT_CONTAMINATION: f64 = 0.03;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_MAX_SAMPLES: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Isolation-based detector parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForest {
    /// Expected outlier fraction, in `(0, 0.5]`.
    pub contamination: f64,
    /// Seed for subsampling and split selection.
    pub seed: u64,
    pub n_trees: usize,
    /// Subsample size per tree (capped at the input length).
    pub max_samples: usize,
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self {
            contamination: DEFAULT_CONTAMINATION,
            seed: DEFAULT_SEED,
            n_trees: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
        }
    }
}

impl IsolationForest {
    // ---
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fit on `values` and label each of them.
    ///
    /// Fails on NaN/infinite input. Fewer than two values cannot be isolated
    /// from anything and are all reported normal.
    pub fn labels(&self, values: &[f64]) -> Result<Vec<Label>> {
        // ---
        self.validate()?;
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(CoreError::NonFiniteInput { index });
        }
        if values.len() < 2 {
            debug!("isolation_forest: {} value(s), nothing to isolate", values.len());
            return Ok(vec![Label::Normal; values.len()]);
        }

        let scores = self.score_samples(values);
        let Some(threshold) = stats::quantile(&scores, 1.0 - self.contamination) else {
            return Ok(vec![Label::Normal; values.len()]);
        };

        let labels: Vec<Label> = scores
            .iter()
            .map(|&score| Label::from_flag(score > threshold))
            .collect();
        debug!(
            "isolation_forest: {} of {} rows above score threshold {:.4}",
            labels.iter().filter(|l| l.is_anomalous()).count(),
            values.len(),
            threshold
        );
        Ok(labels)
    }

    /// Anomaly score in `(0, 1]` for each value; higher is more anomalous.
    ///
    /// Expects finite values and at least two of them.
    pub fn score_samples(&self, values: &[f64]) -> Vec<f64> {
        // ---
        let mut rng = StdRng::seed_from_u64(self.seed);
        let sample_size = self.max_samples.min(values.len());
        let height_limit = (sample_size as f64).log2().ceil() as usize;

        let trees: Vec<Node> = (0..self.n_trees)
            .map(|_| {
                let subset: Vec<f64> = sample(&mut rng, values.len(), sample_size)
                    .iter()
                    .map(|i| values[i])
                    .collect();
                Node::grow(subset, 0, height_limit, &mut rng)
            })
            .collect();

        let norm = average_path_length(sample_size);
        values
            .iter()
            .map(|&x| {
                let total: f64 = trees.iter().map(|tree| tree.path_length(x, 0)).sum();
                let mean_path = total / trees.len() as f64;
                2f64.powf(-mean_path / norm)
            })
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if !(self.contamination > 0.0 && self.contamination <= 0.5) {
            return Err(CoreError::InvalidParameter(format!(
                "contamination must be in (0, 0.5], got {}",
                self.contamination
            )));
        }
        if self.n_trees == 0 || self.max_samples < 2 {
            return Err(CoreError::InvalidParameter(
                "isolation forest needs at least one tree and two samples per tree".into(),
            ));
        }
        Ok(())
    }
}

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        value: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    // ---
    fn grow(values: Vec<f64>, depth: usize, height_limit: usize, rng: &mut StdRng) -> Node {
        // ---
        if depth >= height_limit || values.len() <= 1 {
            return Node::Leaf { size: values.len() };
        }

        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if min >= max {
            return Node::Leaf { size: values.len() };
        }

        // Convex combination: `max - min` may overflow for extreme finite values.
        let t: f64 = rng.gen();
        let value = min * (1.0 - t) + max * t;
        let (left, right): (Vec<f64>, Vec<f64>) = values.into_iter().partition(|&v| v < value);

        Node::Split {
            value,
            left: Box::new(Node::grow(left, depth + 1, height_limit, rng)),
            right: Box::new(Node::grow(right, depth + 1, height_limit, rng)),
        }
    }

    fn path_length(&self, x: f64, depth: usize) -> f64 {
        match self {
            Node::Leaf { size } => depth as f64 + average_path_length(*size),
            Node::Split { value, left, right } => {
                if x < *value {
                    left.path_length(x, depth + 1)
                } else {
                    right.path_length(x, depth + 1)
                }
            }
        }
    }
}

/// Average path length of an unsuccessful BST search over `n` points, `c(n)`.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
