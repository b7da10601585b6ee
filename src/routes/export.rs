//! CSV download of a labeled view.

use axum::{
    extract::Query,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use sqlx::PgPool;
use tracing::{error, info};

use super::view::{load_view, ViewQuery};
use super::{core_error_response, error_response};
use crate::{csv_io, label_view, Config};

// ---

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/export", get(handler))
}

async fn handler(
    Query(params): Query<ViewQuery>,
    State((pool, config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    info!("GET /export - {:?}", params);

    let method = match params.method() {
        Ok(method) => method,
        Err(e) => return core_error_response(e),
    };
    let (table, filter) = match load_view(&pool, &params).await {
        Ok(loaded) => loaded,
        Err(response) => return response,
    };
    let scope = params.scope.unwrap_or(config.detection_scope);

    let labeled = match label_view(&table, &filter, method, scope, &config.detector_settings()) {
        Ok(labeled) => labeled,
        Err(e) => return core_error_response(e),
    };

    match csv_io::write_labeled(&labeled) {
        Ok(body) => {
            let disposition = format!(
                "attachment; filename=\"{}_energy_data.csv\"",
                filter.machine_id
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                body,
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to render CSV: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render CSV")
        }
    }
}
