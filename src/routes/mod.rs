use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use sqlx::PgPool;

use crate::{Config, CoreError};

mod analysis;
mod export;
mod forecast;
mod health;
mod import;
mod machines;
mod view;

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(analysis::router())
        .merge(forecast::router())
        .merge(export::router())
        .merge(import::router())
        .merge(machines::router())
        .merge(health::router())
        .with_state((pool, config))
}

/// Plain JSON string error body, as every handler reports failures.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(message.into())).into_response()
}

/// Map a core failure onto an HTTP status.
fn core_error_response(err: CoreError) -> Response {
    // ---
    let status = match err {
        CoreError::UnknownMethod(_) | CoreError::InvalidHorizon { .. } => StatusCode::BAD_REQUEST,
        CoreError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CoreError::NonFiniteInput { .. } | CoreError::InvalidParameter(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    error_response(status, err.to_string())
}
