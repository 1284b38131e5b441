//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use tracing::{info, warn};

use super::AppState;
use super::types::{
    ChartPoint, ErrorResponse, SimulateRequest, SimulateResponse, StateResponse, TelemetryQuery,
    request_field,
};
use crate::error::SimError;
use crate::forecast::SuppliedBaseline;
use crate::io::dataset::DatasetFormat;
use crate::sim::Engine;

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a failed run to its status code and error body.
///
/// Config and computation errors are the caller's fault (422) and name the
/// offending field or series; an unreachable upstream is 503.
fn error_response(err: &SimError) -> ApiError {
    let (status, field, kind) = match err {
        SimError::Config(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(request_field(&e.field).to_string()),
            Some(e.kind.as_str().to_string()),
        ),
        SimError::Computation(e) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Some(e.series.to_string()),
            Some(e.kind.to_string()),
        ),
        SimError::UpstreamUnavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            None,
            Some("UPSTREAM_UNAVAILABLE".to_string()),
        ),
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            field,
            kind,
        }),
    )
}

/// Runs one simulation and records it as the latest run.
///
/// `POST /api/simulate` → 200 + `SimulateResponse` JSON
/// Invalid parameters or series → 422, bad dataset extension → 415,
/// unreachable upstream → 503. A failed run keeps the previous result.
pub async fn simulate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulateRequest>,
) -> Result<Json<SimulateResponse>, ApiError> {
    let supplied = match &req.dataset {
        Some(dataset) => {
            let format = DatasetFormat::from_file_name(&dataset.file_name).map_err(|e| {
                (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    Json(ErrorResponse {
                        error: e.to_string(),
                        field: Some("dataset.file_name".to_string()),
                        kind: Some("UNSUPPORTED_DATASET".to_string()),
                    }),
                )
            })?;
            info!(%format, points = dataset.baseline.len(), "using supplied baseline");
            Some(SuppliedBaseline::new(dataset.baseline.clone()))
        }
        None => None,
    };

    state.begin_run();
    let outcome = req
        .to_config(&state.base)
        .map_err(SimError::from)
        .and_then(|config| match supplied {
            Some(source) => Engine::new(config, source).run(),
            None => Engine::synthetic(config).run(),
        });

    match outcome {
        Ok(result) => {
            let body = SimulateResponse::from(&result);
            state.finish_run(Ok(result));
            Ok(Json(body))
        }
        Err(err) => {
            warn!(error = %err, "simulation rejected");
            let response = error_response(&err);
            state.finish_run(Err(err));
            Err(response)
        }
    }
}

/// Returns the run status and the latest successful result.
///
/// `GET /api/state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    Json(state_response(&state))
}

/// Discards the latest result and returns the idle state.
///
/// `POST /api/reset` → 200 + `StateResponse` JSON
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    state.reset_run();
    info!("run state reset");
    Json(state_response(&state))
}

fn state_response(state: &AppState) -> StateResponse {
    let run = state.run_state();
    StateResponse {
        status: run.status(),
        base: state.base.clone(),
        strategy: run.latest().map(|r| r.strategy()),
        result: run.latest().map(|r| SimulateResponse::from(r.as_ref())),
        error: run.error().map(ToString::to_string),
    }
}

/// Returns chart points of the latest result, optionally filtered by step range.
///
/// `GET /api/telemetry` → 200 + `Vec<ChartPoint>` JSON
/// `GET /api/telemetry?from=N&to=M` → filtered range (inclusive)
/// `GET /api/telemetry?from=10&to=5` → 400 + `ErrorResponse`
/// No completed run yet → 404 + `ErrorResponse`
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TelemetryQuery>,
) -> Result<Json<Vec<ChartPoint>>, ApiError> {
    let from = query.from.unwrap_or(0);
    let to = query.to.unwrap_or(usize::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::message(format!(
                "`from` ({from}) must be <= `to` ({to})"
            ))),
        ));
    }

    let run = state.run_state();
    let Some(result) = run.latest() else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::message("no completed simulation run")),
        ));
    };

    let points = result
        .steps()
        .iter()
        .filter(|s| s.time >= from && s.time <= to)
        .map(ChartPoint::from)
        .collect();

    Ok(Json(points))
}
