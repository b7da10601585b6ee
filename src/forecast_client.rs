//! HTTP client for the external forecasting service.
//!
//! The forecaster speaks a Prophet-style wire format: history rows as
//! `{ds, y}`, predictions as `{ds, yhat, yhat_lower, yhat_upper}`.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Forecast, ForecastPoint, ForecastRequest};

// ---

#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    periods: u32,
    freq: &'static str,
    history: Vec<WireObservation<'a>>,
}

#[derive(Debug, Serialize)]
struct WireObservation<'a> {
    ds: &'a DateTime<Utc>,
    y: f64,
}

#[derive(Debug, Deserialize)]
struct WireResponse {
    forecast: Vec<WirePrediction>,
}

#[derive(Debug, Deserialize)]
struct WirePrediction {
    ds: DateTime<Utc>,
    yhat: f64,
    yhat_lower: f64,
    yhat_upper: f64,
}

/// Send `request` to the forecaster at `url` and return the future points.
///
/// The forecaster may echo fitted values for the history; only the final
/// `horizon_days` rows are kept.
pub async fn request_forecast(url: &str, request: &ForecastRequest) -> Result<Forecast> {
    // ---
    let body = WireRequest {
        periods: request.horizon_days,
        freq: "D",
        history: request
            .history
            .iter()
            .map(|o| WireObservation {
                ds: &o.timestamp,
                y: o.value,
            })
            .collect(),
    };

    tracing::debug!(
        "Requesting {}-day forecast from {} ({} observations)",
        request.horizon_days,
        url,
        request.history.len()
    );

    let client = reqwest::Client::new();
    let response = client.post(url).json(&body).send().await?;
    if !response.status().is_success() {
        return Err(anyhow!("Forecaster returned HTTP {}", response.status()));
    }
    let wire: WireResponse = response.json().await?;

    Ok(into_forecast(wire, request.horizon_days))
}

fn into_forecast(wire: WireResponse, horizon_days: u32) -> Forecast {
    // ---
    let skip = wire.forecast.len().saturating_sub(horizon_days as usize);
    let points = wire
        .forecast
        .into_iter()
        .skip(skip)
        .map(|p| ForecastPoint {
            timestamp: p.ds,
            predicted: p.yhat,
            lower: p.yhat_lower,
            upper: p.yhat_upper,
        })
        .collect();

    Forecast {
        horizon_days,
        points,
    }
}
