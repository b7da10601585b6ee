//! Derived energy KPIs for a labeled view.

use serde::{Deserialize, Serialize};

use crate::models::LabeledTable;

/// Added to total consumption so an all-zero view does not divide by zero.
pub const EFFICIENCY_EPSILON: f64 = 1e-9;

/// Scalar KPIs computed fresh from one labeled view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Mean `energy_kwh`; `None` for an empty view.
    pub mean_kwh_per_reading: Option<f64>,
    /// Share of consumption drawn while operational. Not clamped.
    pub efficiency_score: f64,
    /// Consumption while not operational.
    pub idle_energy_loss_kwh: f64,
    pub anomaly_count: usize,
    pub total_readings: usize,
    /// `anomaly_count / total_readings`, 0 for an empty view.
    pub anomaly_rate: f64,
}

impl MetricsSnapshot {
    // ---
    pub fn compute(view: &LabeledTable) -> Self {
        // ---
        let total_readings = view.len();
        let mut total_kwh = 0.0;
        let mut operational_kwh = 0.0;
        let mut idle_kwh = 0.0;
        let mut anomaly_count = 0;

        for row in view.rows() {
            let kwh = row.reading.energy_kwh;
            total_kwh += kwh;
            if row.reading.is_operational {
                operational_kwh += kwh;
            } else {
                idle_kwh += kwh;
            }
            if row.anomaly.is_anomalous() {
                anomaly_count += 1;
            }
        }

        let mean_kwh_per_reading = if total_readings > 0 {
            Some(total_kwh / total_readings as f64)
        } else {
            None
        };
        let anomaly_rate = if total_readings > 0 {
            anomaly_count as f64 / total_readings as f64
        } else {
            0.0
        };

        Self {
            mean_kwh_per_reading,
            efficiency_score: operational_kwh / (total_kwh + EFFICIENCY_EPSILON),
            idle_energy_loss_kwh: idle_kwh,
            anomaly_count,
            total_readings,
            anomaly_rate,
        }
    }
}
