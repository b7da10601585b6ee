//! Forecast endpoint: validates the slice and hands it to the external
//! forecaster.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use sqlx::PgPool;
use tracing::{error, info, warn};

use super::view::{load_view, ViewQuery};
use super::{core_error_response, error_response};
use crate::forecast::DEFAULT_HORIZON_DAYS;
use crate::{forecast_client, Config, CoreError, ForecastRequest};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/forecast", get(handler))
}

async fn handler(
    Query(params): Query<ViewQuery>,
    State((pool, config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    info!("GET /forecast - {:?}", params);

    let Some(url) = config.forecast_url.as_deref() else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, "Forecasting is not configured");
    };
    let (table, filter) = match load_view(&pool, &params).await {
        Ok(loaded) => loaded,
        Err(response) => return response,
    };

    let horizon_days = params.horizon_days.unwrap_or(DEFAULT_HORIZON_DAYS);
    let request = match ForecastRequest::from_view(&table.view(&filter), horizon_days) {
        Ok(request) => request,
        Err(e @ CoreError::InsufficientData { .. }) => {
            warn!("Skipping forecast for {}: {}", filter.machine_id, e);
            return error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Not enough data to generate a reliable forecast.",
            );
        }
        Err(e) => return core_error_response(e),
    };

    match forecast_client::request_forecast(url, &request).await {
        Ok(forecast) => (StatusCode::OK, Json(forecast)).into_response(),
        Err(e) => {
            error!("Forecaster call failed: {}", e);
            error_response(StatusCode::BAD_GATEWAY, "Forecaster call failed")
        }
    }
}
