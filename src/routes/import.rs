//! CSV ingestion endpoint.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router,
};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, error, info};

use super::error_response;
use crate::{csv_io, store, Config};

// ---

#[derive(Serialize)]
struct ImportResponse {
    imported: u64,
    skipped: usize,
}

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/readings/import", post(handler))
}

async fn handler(State((pool, _config)): State<(PgPool, Config)>, body: String) -> impl IntoResponse {
    // ---
    info!("POST /readings/import - {} bytes", body.len());

    // Step 1: Parse
    let parsed = match csv_io::parse_readings(&body) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!("Rejected CSV upload: {}", e);
            return error_response(StatusCode::BAD_REQUEST, e.to_string());
        }
    };

    // Step 2: Store
    match store::insert_readings(&pool, &parsed.readings).await {
        Ok(imported) => {
            info!("Imported {} readings ({} skipped)", imported, parsed.skipped);
            let response = ImportResponse {
                imported,
                skipped: parsed.skipped,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            error!("Failed to store readings: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to store readings")
        }
    }
}
