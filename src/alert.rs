//! Alert decision over a metrics snapshot.

use serde::{Deserialize, Serialize};

use crate::metrics::MetricsSnapshot;

pub const DEFAULT_MAX_ANOMALY_RATE: f64 = 0.15;
pub const DEFAULT_MAX_IDLE_LOSS_KWH: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub max_anomaly_rate: f64,
    pub max_idle_loss_kwh: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            max_anomaly_rate: DEFAULT_MAX_ANOMALY_RATE,
            max_idle_loss_kwh: DEFAULT_MAX_IDLE_LOSS_KWH,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Alert {
    HighAnomalyRate,
    IdleLossWarning,
    Normal,
}

impl Alert {
    // ---
    /// First matching rule wins: anomaly rate, then idle loss.
    pub fn evaluate(metrics: &MetricsSnapshot, thresholds: &AlertThresholds) -> Self {
        if metrics.anomaly_rate > thresholds.max_anomaly_rate {
            Alert::HighAnomalyRate
        } else if metrics.idle_energy_loss_kwh > thresholds.max_idle_loss_kwh {
            Alert::IdleLossWarning
        } else {
            Alert::Normal
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Alert::HighAnomalyRate => "High anomaly rate detected!",
            Alert::IdleLossWarning => "Significant idle energy loss observed.",
            Alert::Normal => "All systems operating normally.",
        }
    }
}
