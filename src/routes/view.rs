//! Query parameters shared by the view-based endpoints, and resolution of a
//! request into a loaded table plus [`ViewFilter`].

use axum::{http::StatusCode, response::Response};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::error;

use super::error_response;
use crate::{store, CoreError, DetectionScope, Method, SignalTable, ViewFilter};

// ---

/// Filter and detector selection supplied by the dashboard.
#[derive(Debug, Deserialize)]
pub struct ViewQuery {
    pub machine_id: String,
    /// Inclusive; defaults to the machine's first reading date.
    pub start_date: Option<NaiveDate>,
    /// Inclusive; defaults to the machine's last reading date.
    pub end_date: Option<NaiveDate>,
    pub method: Option<String>,
    pub scope: Option<DetectionScope>,
    pub horizon_days: Option<u32>,
}

impl ViewQuery {
    /// Requested detector, `isolation_forest` when absent.
    pub fn method(&self) -> Result<Method, CoreError> {
        self.method
            .as_deref()
            .unwrap_or(Method::IsolationForest.as_str())
            .parse()
    }

    /// Build the filter, filling missing dates from the machine's bounds.
    /// `None` when the machine has no readings.
    pub fn resolve(&self, table: &SignalTable) -> Option<ViewFilter> {
        let (first, last) = table.date_bounds(&self.machine_id)?;
        Some(ViewFilter::new(
            self.machine_id.clone(),
            self.start_date.unwrap_or(first),
            self.end_date.unwrap_or(last),
        ))
    }
}

/// Load the signal and resolve the request's filter, or produce the error
/// response to return.
pub async fn load_view(pool: &PgPool, query: &ViewQuery) -> Result<(SignalTable, ViewFilter), Response> {
    // ---
    let table = store::load_signal_table(pool).await.map_err(|e| {
        error!("Failed to load readings: {}", e);
        error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load readings")
    })?;

    let filter = query.resolve(&table).ok_or_else(|| {
        error_response(
            StatusCode::NOT_FOUND,
            format!("No readings for machine '{}'", query.machine_id),
        )
    })?;

    Ok((table, filter))
}
