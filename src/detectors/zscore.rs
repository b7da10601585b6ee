//! Z-score detection over the whole input table.

use tracing::debug;

use super::stats;
use crate::models::Label;

pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Flags rows whose population z-score magnitude exceeds `threshold`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZScore {
    pub threshold: f64,
}

impl Default for ZScore {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_Z_THRESHOLD,
        }
    }
}

impl ZScore {
    // ---
    /// Label `values`. Mean and deviation are taken over the finite values of
    /// the whole slice; a zero deviation labels everything normal.
    pub fn labels(&self, values: &[f64]) -> Vec<Label> {
        // ---
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let (Some(mean), Some(std)) = (stats::mean(&finite), stats::population_std(&finite)) else {
            return vec![Label::Normal; values.len()];
        };
        if std == 0.0 {
            debug!("z_score: zero variance over {} rows, no anomalies", values.len());
            return vec![Label::Normal; values.len()];
        }

        values
            .iter()
            .map(|v| Label::from_flag(((v - mean) / std).abs() > self.threshold))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_flags_far_values_only() {
        // ---
        let mut values = vec![10.0; 50];
        for (i, v) in values.iter_mut().enumerate() {
            *v += (i % 5) as f64 * 0.2;
        }
        values[10] = 40.0;

        let labels = ZScore::default().labels(&values);
        assert!(labels[10].is_anomalous());
        assert_eq!(labels.iter().filter(|l| l.is_anomalous()).count(), 1);
    }

    #[test]
    fn test_constant_values_have_no_anomalies() {
        let labels = ZScore::default().labels(&[7.25; 30]);
        assert!(labels.iter().all(|l| *l == Label::Normal));
    }

    #[test]
    fn test_empty_and_single() {
        assert!(ZScore::default().labels(&[]).is_empty());
        assert_eq!(ZScore::default().labels(&[1.0]), vec![Label::Normal]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // ---
        // mean 0, population std 1: values at exactly +/-1
        let values = [1.0, -1.0, 1.0, -1.0];
        let detector = ZScore { threshold: 1.0 };
        assert!(detector.labels(&values).iter().all(|l| !l.is_anomalous()));
    }

    #[test]
    fn test_nan_rows_are_normal_and_ignored_by_stats() {
        // ---
        let mut values = vec![1.0; 20];
        values[3] = f64::NAN;
        values[7] = 1.0 + 1e-3;
        let labels = ZScore::default().labels(&values);
        assert_eq!(labels[3], Label::Normal);
        assert_eq!(labels.len(), 20);
    }
}
