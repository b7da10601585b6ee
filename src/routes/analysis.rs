//! Analysis and detector-comparison endpoints.
//!
//! - `GET /analysis`   – labels, metrics, alert and comparison for one slice
//! - `GET /comparison` – the comparison table alone

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info};

use super::machines::describe;
use super::view::{load_view, ViewQuery};
use super::core_error_response;
use crate::{
    analyze, compare, Alert, AlertThresholds, ComparisonRow, Config, DetectionScope,
    LabeledReading, Method, MetricsSnapshot,
};

// ---

#[derive(Serialize)]
struct AlertBody {
    kind: Alert,
    message: &'static str,
}

#[derive(Serialize)]
struct AnalysisResponse {
    machine_id: String,
    description: &'static str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    method: Method,
    scope: DetectionScope,
    metrics: MetricsSnapshot,
    alert: AlertBody,
    comparison: Vec<ComparisonRow>,
    anomalies: Vec<LabeledReading>,
}

#[derive(Serialize)]
struct ComparisonResponse {
    machine_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_readings: usize,
    methods: Vec<ComparisonRow>,
}

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new()
        .route("/analysis", get(analysis_handler))
        .route("/comparison", get(comparison_handler))
}

async fn analysis_handler(
    Query(params): Query<ViewQuery>,
    State((pool, config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    info!("GET /analysis - {:?}", params);

    let method = match params.method() {
        Ok(method) => method,
        Err(e) => return core_error_response(e),
    };
    let (table, filter) = match load_view(&pool, &params).await {
        Ok(loaded) => loaded,
        Err(response) => return response,
    };
    let scope = params.scope.unwrap_or(config.detection_scope);

    let analysis = match analyze(
        &table,
        &filter,
        method,
        scope,
        &config.detector_settings(),
        &AlertThresholds::default(),
    ) {
        Ok(analysis) => analysis,
        Err(e) => return core_error_response(e),
    };

    let anomalies: Vec<LabeledReading> = analysis.labeled.anomalies().cloned().collect();
    debug!("GET /analysis - Returning {} anomalies", anomalies.len());

    let response = AnalysisResponse {
        description: describe(&analysis.filter.machine_id),
        machine_id: analysis.filter.machine_id,
        start_date: analysis.filter.start_date,
        end_date: analysis.filter.end_date,
        method: analysis.method,
        scope: analysis.scope,
        metrics: analysis.metrics,
        alert: AlertBody {
            kind: analysis.alert,
            message: analysis.alert.message(),
        },
        comparison: analysis.comparison,
        anomalies,
    };
    (StatusCode::OK, Json(response)).into_response()
}

async fn comparison_handler(
    Query(params): Query<ViewQuery>,
    State((pool, config)): State<(PgPool, Config)>,
) -> impl IntoResponse {
    // ---
    info!("GET /comparison - {:?}", params);

    let (table, filter) = match load_view(&pool, &params).await {
        Ok(loaded) => loaded,
        Err(response) => return response,
    };
    let view = table.view(&filter);

    let methods = compare(&view, &config.detector_settings());
    let response = ComparisonResponse {
        total_readings: view.len(),
        machine_id: filter.machine_id,
        start_date: filter.start_date,
        end_date: filter.end_date,
        methods,
    };
    (StatusCode::OK, Json(response)).into_response()
}
