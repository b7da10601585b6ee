//! Core engine for the `smartenergy-watch` service.
//!
//! Pure, synchronous batch computations over an in-memory energy signal:
//! - `detectors` – isolation-forest, z-score and rolling-median anomaly labels
//! - `metrics`   – efficiency, idle-loss and anomaly-rate KPIs of a labeled view
//! - `compare`   – every detector side by side on one view
//! - `alert`     – the alert decision over a metrics snapshot
//! - `forecast`  – request/response shapes for the external forecaster
//! - `analysis`  – the above combined for one machine/date slice
//!
//! Nothing here performs I/O; loading, HTTP and the forecaster client live in
//! the service binary.

pub mod alert;
pub mod analysis;
pub mod compare;
pub mod detectors;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod models;

pub use alert::{Alert, AlertThresholds};
pub use analysis::{analyze, label_view, Analysis, DetectionScope};
pub use compare::{compare, ComparisonRow};
pub use detectors::{detect, detect_with, Detector, DetectorSettings, Method};
pub use error::{CoreError, Result};
pub use forecast::{Forecast, ForecastPoint, ForecastRequest, Observation};
pub use metrics::MetricsSnapshot;
pub use models::{
    parse_timestamp, FilteredView, Label, LabeledReading, LabeledTable, Reading, SignalTable,
    ViewFilter,
};
