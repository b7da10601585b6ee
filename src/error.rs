//! Error types for the energy analysis core.

use thiserror::Error;

/// Failures surfaced by the core.
///
/// Numeric degeneracies (zero variance, windows longer than the input) are not
/// errors: detectors absorb them and report every row as normal.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Detector name outside `isolation_forest`, `z_score`, `rolling_median`.
    #[error("Unknown anomaly detection method: {0}")]
    UnknownMethod(String),

    /// Not enough observations to hand the series to the forecaster.
    #[error("Insufficient data: {actual} readings (need at least {required})")]
    InsufficientData { required: usize, actual: usize },

    /// Forecast horizon outside the accepted range.
    #[error("Invalid forecast horizon: {days} days (allowed: {min}..={max})")]
    InvalidHorizon { days: u32, min: u32, max: u32 },

    /// The isolation-based model cannot be trained on NaN or infinite values.
    #[error("Non-finite energy value at row {index}")]
    NonFiniteInput { index: usize },

    /// Detector parameter out of range.
    #[error("Invalid detector parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
