//! Deviation from a centered rolling median.
//!
//! For a window of `w` rows the median at row `i` covers rows
//! `i - w/2 ..= i + (w - 1) - w/2`; rows where that span leaves the table have
//! no median and are always normal. The threshold is
//! `mean(dev) + k * std(dev)` over the defined deviations (sample deviation).

use tracing::debug;

use super::stats;
use crate::models::Label;

pub const DEFAULT_WINDOW: usize = 12;
pub const DEFAULT_K: f64 = 3.0;

#[derive(Debug, Clone, PartialEq)]
pub struct RollingMedian {
    pub window: usize,
    pub k: f64,
}

impl Default for RollingMedian {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            k: DEFAULT_K,
        }
    }
}

impl RollingMedian {
    // ---
    /// Centered rolling median; `None` where the window is incomplete.
    pub fn rolling_median(&self, values: &[f64]) -> Vec<Option<f64>> {
        // ---
        let n = values.len();
        if self.window == 0 || n < self.window {
            return vec![None; n];
        }
        let before = self.window / 2;
        let after = self.window - 1 - before;

        (0..n)
            .map(|i| {
                if i < before || i + after >= n {
                    None
                } else {
                    stats::median(&values[i - before..=i + after])
                }
            })
            .collect()
    }

    /// Label `values` in their current order.
    pub fn labels(&self, values: &[f64]) -> Vec<Label> {
        // ---
        let deviations: Vec<Option<f64>> = self
            .rolling_median(values)
            .into_iter()
            .zip(values)
            .map(|(median, v)| median.map(|m| (v - m).abs()))
            .collect();

        let defined: Vec<f64> = deviations
            .iter()
            .flatten()
            .copied()
            .filter(|d| d.is_finite())
            .collect();
        let (Some(mean), Some(std)) = (stats::mean(&defined), stats::sample_std(&defined)) else {
            debug!(
                "rolling_median: {} rows with window {}, too few deviations for a threshold",
                values.len(),
                self.window
            );
            return vec![Label::Normal; values.len()];
        };
        let threshold = mean + self.k * std;

        deviations
            .into_iter()
            .map(|dev| Label::from_flag(dev.is_some_and(|d| d > threshold)))
            .collect()
    }
}
