//! Anomaly detector strategies.
//!
//! Three interchangeable detectors share one contract: take the readings of a
//! table, return a copy of them with a per-row [`Label`]. [`Method`] names the
//! closed set of strategies; [`Detector`] is a method plus its parameters.
//! Adding a strategy means adding one variant to each enum.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::{Label, LabeledTable, Reading};

mod isolation;
mod rolling;
mod stats;
mod zscore;

pub use isolation::{IsolationForest, DEFAULT_CONTAMINATION, DEFAULT_SEED};
pub use rolling::{RollingMedian, DEFAULT_WINDOW};
pub use zscore::{ZScore, DEFAULT_Z_THRESHOLD};

// ---

/// Detector names accepted at the selection boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    IsolationForest,
    ZScore,
    RollingMedian,
}

impl Method {
    // ---
    /// Every method, in comparison-table order.
    pub const ALL: [Method; 3] = [Method::IsolationForest, Method::ZScore, Method::RollingMedian];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::IsolationForest => "isolation_forest",
            Method::ZScore => "z_score",
            Method::RollingMedian => "rolling_median",
        }
    }

    /// Display name, e.g. "Isolation Forest".
    pub fn title(self) -> &'static str {
        match self {
            Method::IsolationForest => "Isolation Forest",
            Method::ZScore => "Z Score",
            Method::RollingMedian => "Rolling Median",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| CoreError::UnknownMethod(s.to_string()))
    }
}

/// A detection strategy together with its parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Detector {
    IsolationForest(IsolationForest),
    ZScore(ZScore),
    RollingMedian(RollingMedian),
}

impl Detector {
    // ---
    pub fn method(&self) -> Method {
        match self {
            Detector::IsolationForest(_) => Method::IsolationForest,
            Detector::ZScore(_) => Method::ZScore,
            Detector::RollingMedian(_) => Method::RollingMedian,
        }
    }

    /// One label per value, in input order.
    pub fn labels(&self, values: &[f64]) -> Result<Vec<Label>> {
        match self {
            Detector::IsolationForest(forest) => forest.labels(values),
            Detector::ZScore(z) => Ok(z.labels(values)),
            Detector::RollingMedian(rolling) => Ok(rolling.labels(values)),
        }
    }

    /// Label `readings` by their `energy_kwh`, returning a new labeled table.
    pub fn apply(&self, readings: &[Reading]) -> Result<LabeledTable> {
        // ---
        let values: Vec<f64> = readings.iter().map(|r| r.energy_kwh).collect();
        let labels = self.labels(&values)?;
        Ok(LabeledTable::from_labels(readings, labels))
    }
}

/// Parameters for every detector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorSettings {
    pub isolation_forest: IsolationForest,
    pub z_score: ZScore,
    pub rolling_median: RollingMedian,
}

impl DetectorSettings {
    // ---
    /// Default settings with an explicit isolation-forest seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            isolation_forest: IsolationForest::default().with_seed(seed),
            ..Default::default()
        }
    }

    pub fn detector(&self, method: Method) -> Detector {
        match method {
            Method::IsolationForest => Detector::IsolationForest(self.isolation_forest.clone()),
            Method::ZScore => Detector::ZScore(self.z_score.clone()),
            Method::RollingMedian => Detector::RollingMedian(self.rolling_median.clone()),
        }
    }
}

/// Label `readings` with the detector named `method`, using default settings.
///
/// Fails with [`CoreError::UnknownMethod`] for unrecognized names.
pub fn detect(readings: &[Reading], method: &str) -> Result<LabeledTable> {
    detect_with(readings, method.parse()?, &DetectorSettings::default())
}

/// Label `readings` with `method` configured by `settings`.
pub fn detect_with(
    readings: &[Reading],
    method: Method,
    settings: &DetectorSettings,
) -> Result<LabeledTable> {
    // ---
    let labeled = settings.detector(method).apply(readings)?;
    tracing::debug!(
        "{}: {} anomalies in {} readings",
        method,
        labeled.anomaly_count(),
        labeled.len()
    );
    Ok(labeled)
}
