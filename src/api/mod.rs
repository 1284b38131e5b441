//! REST API for running simulations and reading the latest result.
//!
//! Endpoints:
//! - `POST /api/simulate`: run a scenario, return the canonical response
//! - `GET /api/state`: run status and the latest successful result
//! - `GET /api/telemetry`: chart points of the latest result, range-filterable
//! - `POST /api/reset`: discard the latest result

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::{Arc, PoisonError, RwLock};

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::sim::{RunState, SimulationResult};

pub use types::{
    ChartPoint, DatasetPayload, ErrorResponse, SimulateRequest, SimulateResponse, StateResponse,
    TelemetryQuery,
};

/// Application state shared across all request handlers.
///
/// `base` is read-only: requests override fields on their own copy. Only the
/// run lifecycle is replaced, wholesale, after each run.
pub struct AppState {
    /// Defaults for every field a request omits.
    pub base: ScenarioConfig,
    run: RwLock<RunState>,
}

impl AppState {
    pub fn new(base: ScenarioConfig) -> Self {
        Self {
            base,
            run: RwLock::new(RunState::Idle),
        }
    }

    /// Creates state that already holds a completed run.
    pub fn with_result(base: ScenarioConfig, result: SimulationResult) -> Self {
        Self {
            base,
            run: RwLock::new(RunState::Idle.finish(Ok(result))),
        }
    }

    /// Snapshot of the run lifecycle.
    pub fn run_state(&self) -> RunState {
        self.run
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn transition(&self, f: impl FnOnce(&RunState) -> RunState) {
        let mut guard = self.run.write().unwrap_or_else(PoisonError::into_inner);
        let next = f(&guard);
        *guard = next;
    }

    pub(crate) fn begin_run(&self) {
        self.transition(RunState::begin);
    }

    pub(crate) fn reset_run(&self) {
        self.transition(RunState::reset);
    }

    pub(crate) fn finish_run(&self, outcome: Result<SimulationResult, SimError>) {
        self.transition(|state| state.finish(outcome));
    }
}

/// Builds the axum router with all API routes.
///
/// # Arguments
///
/// * `state` - Shared application state
///
/// # Returns
///
/// Configured `Router` ready to serve.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/simulate", post(handlers::simulate))
        .route("/api/state", get(handlers::get_state))
        .route("/api/telemetry", get(handlers::get_telemetry))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}

/// Binds to the given address and serves the API.
///
/// # Arguments
///
/// * `state` - Shared application state
/// * `addr` - Socket address to bind to
///
/// # Errors
///
/// Returns an `io::Error` if the listener cannot bind or the server fails.
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");
    axum::serve(listener, app).await
}
