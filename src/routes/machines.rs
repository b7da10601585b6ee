//! Machine inventory endpoint.

use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info};

use super::error_response;
use crate::{store, Config};

// ---

const MACHINE_DESCRIPTIONS: [(&str, &str); 4] = [
    ("Machine_A1", "Precision CNC mill used for aerospace parts."),
    ("Machine_B2", "Industrial 3D printer for rapid prototyping."),
    ("Machine_C3", "Automated welding robot in chassis assembly."),
    ("Machine_D4", "High-efficiency laser cutter for stainless steel."),
];

/// Catalogue description for a machine id.
pub(super) fn describe(machine_id: &str) -> &'static str {
    MACHINE_DESCRIPTIONS
        .iter()
        .find(|(id, _)| *id == machine_id)
        .map(|(_, desc)| *desc)
        .unwrap_or("No description available.")
}

#[derive(Serialize)]
struct MachineInfo {
    machine_id: String,
    description: &'static str,
    readings: i64,
    first_date: NaiveDate,
    last_date: NaiveDate,
}

pub fn router() -> Router<(PgPool, Config)> {
    // ---
    Router::new().route("/machines", get(handler))
}

async fn handler(State((pool, _config)): State<(PgPool, Config)>) -> impl IntoResponse {
    // ---
    info!("GET /machines");

    match store::list_machines(&pool).await {
        Ok(rows) => {
            let machines: Vec<MachineInfo> = rows
                .into_iter()
                .map(|m| MachineInfo {
                    description: describe(&m.machine_id),
                    machine_id: m.machine_id,
                    readings: m.readings,
                    first_date: m.first_date,
                    last_date: m.last_date,
                })
                .collect();
            (StatusCode::OK, Json(machines)).into_response()
        }
        Err(e) => {
            error!("Failed to list machines: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to list machines")
        }
    }
}
