//! Side-by-side comparison of every detector on one filtered view.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::detectors::{DetectorSettings, Method};
use crate::models::FilteredView;

/// One detector's result on the compared view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub method: Method,
    pub title: String,
    pub anomaly_count: usize,
    pub anomaly_rate: f64,
    /// Why the detector reported nothing, when it failed on this view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run each detector independently on `view`, in [`Method::ALL`] order.
///
/// A detector that fails is reported with zero anomalies instead of failing
/// the whole comparison.
pub fn compare(view: &FilteredView, settings: &DetectorSettings) -> Vec<ComparisonRow> {
    // ---
    let total = view.len();

    Method::ALL
        .into_iter()
        .map(|method| {
            let (anomaly_count, error) = match settings.detector(method).apply(view.readings()) {
                Ok(labeled) => (labeled.anomaly_count(), None),
                Err(e) => {
                    warn!(
                        "{} failed on {} ({} readings): {}",
                        method,
                        view.filter().machine_id,
                        total,
                        e
                    );
                    (0, Some(e.to_string()))
                }
            };
            let anomaly_rate = if total > 0 {
                anomaly_count as f64 / total as f64
            } else {
                0.0
            };

            ComparisonRow {
                method,
                title: method.title().to_string(),
                anomaly_count,
                anomaly_rate,
                error,
            }
        })
        .collect()
}
