//! Request/response types for the external forecaster, and the precondition
//! checked before calling it.
//!
//! The core never forecasts by itself. It turns a filtered view into a
//! [`ForecastRequest`] (or refuses to) and describes the [`Forecast`] shape it
//! expects back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::FilteredView;

/// Fewer observations than this and forecasting is skipped.
pub const MIN_FORECAST_OBSERVATIONS: usize = 20;
pub const MIN_HORIZON_DAYS: u32 = 7;
pub const MAX_HORIZON_DAYS: u32 = 60;
pub const DEFAULT_HORIZON_DAYS: u32 = 30;

/// One observed `(timestamp, value)` pair handed to the forecaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    pub horizon_days: u32,
    pub history: Vec<Observation>,
}

impl ForecastRequest {
    // ---
    /// Build a request from a view's energy series.
    ///
    /// Fails with [`CoreError::InvalidHorizon`] outside
    /// `MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS`, and with
    /// [`CoreError::InsufficientData`] below [`MIN_FORECAST_OBSERVATIONS`].
    pub fn from_view(view: &FilteredView, horizon_days: u32) -> Result<Self> {
        // ---
        if !(MIN_HORIZON_DAYS..=MAX_HORIZON_DAYS).contains(&horizon_days) {
            return Err(CoreError::InvalidHorizon {
                days: horizon_days,
                min: MIN_HORIZON_DAYS,
                max: MAX_HORIZON_DAYS,
            });
        }
        if view.len() < MIN_FORECAST_OBSERVATIONS {
            return Err(CoreError::InsufficientData {
                required: MIN_FORECAST_OBSERVATIONS,
                actual: view.len(),
            });
        }

        let history = view
            .readings()
            .iter()
            .map(|r| Observation {
                timestamp: r.timestamp,
                value: r.energy_kwh,
            })
            .collect();

        Ok(Self {
            horizon_days,
            history,
        })
    }
}

/// Predicted value with its confidence bounds for one future timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub horizon_days: u32,
    pub points: Vec<ForecastPoint>,
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::models::{Reading, SignalTable, ViewFilter};
    use chrono::{Duration, NaiveDate, TimeZone};

    fn view_with(n: usize) -> FilteredView {
        // ---
        let start = Utc.with_ymd_and_hms(2025, 8, 1, 0, 0, 0).unwrap();
        let table: SignalTable = (0..n)
            .map(|i| Reading::new(start + Duration::hours(i as i64), "A1", i as f64, true))
            .collect();
        let day = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        table.view(&ViewFilter::new("A1", day, day + Duration::days(30)))
    }

    #[test]
    fn test_insufficient_data() {
        // ---
        let err = ForecastRequest::from_view(&view_with(19), DEFAULT_HORIZON_DAYS).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientData {
                required: 20,
                actual: 19
            }
        );
    }

    #[test]
    fn test_request_carries_series() {
        // ---
        let request = ForecastRequest::from_view(&view_with(20), 14).unwrap();
        assert_eq!(request.horizon_days, 14);
        assert_eq!(request.history.len(), 20);
        assert_eq!(request.history[19].value, 19.0);
    }

    #[test]
    fn test_horizon_range() {
        // ---
        let view = view_with(40);
        assert!(matches!(
            ForecastRequest::from_view(&view, 6),
            Err(CoreError::InvalidHorizon { days: 6, .. })
        ));
        assert!(ForecastRequest::from_view(&view, 60).is_ok());
        assert!(ForecastRequest::from_view(&view, 61).is_err());
    }
}
