//! API request, response, and query types.
//!
//! Response field names follow the dashboard's canonical chart schema.

use serde::{Deserialize, Serialize};

use crate::config::{Horizon, ScenarioConfig};
use crate::error::ConfigError;
use crate::sim::{Metrics, SimulationResult, ThrottleStrategy, TimeStep};

/// Body of `POST /api/simulate`.
///
/// The five weather and grid fields are required; the rest fall back to the
/// server's base scenario.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    /// Grid safety ceiling (MW).
    pub max_capacity: f64,
    /// AI surge magnitude (MW).
    pub ai_spike: f64,
    /// Daily maximum temperature (°F).
    pub tmax: f64,
    /// Daily minimum temperature (°F).
    pub tmin: f64,
    /// Wind speed.
    pub wind: f64,
    /// Fraction of overshoot shed, in `[0, 1]`.
    pub aggressiveness: Option<f64>,
    /// `"24h"`, `"48h"`, or `"7d"`.
    pub horizon: Option<String>,
    pub seed: Option<u64>,
    pub strategy: Option<ThrottleStrategy>,
    /// Baseline extracted from an uploaded dataset.
    pub dataset: Option<DatasetPayload>,
}

/// Numeric baseline extracted upstream from an uploaded file.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetPayload {
    /// Original upload name; its extension must be csv, parquet, or xlsx.
    pub file_name: String,
    /// Baseline demand per step (MW).
    pub baseline: Vec<f64>,
}

impl SimulateRequest {
    /// Overlays this request on `base`.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `horizon` is not a known choice. Range
    /// checks happen when the engine runs.
    pub fn to_config(&self, base: &ScenarioConfig) -> Result<ScenarioConfig, ConfigError> {
        let mut cfg = base.clone();
        cfg.grid.max_capacity_mw = self.max_capacity;
        cfg.workload.ai_spike_mw = self.ai_spike;
        cfg.weather.tmax_f = self.tmax;
        cfg.weather.tmin_f = self.tmin;
        cfg.weather.wind = self.wind;
        if let Some(aggressiveness) = self.aggressiveness {
            cfg.policy.aggressiveness = aggressiveness;
        }
        if let Some(strategy) = self.strategy {
            cfg.policy.strategy = strategy;
        }
        if let Some(horizon) = &self.horizon {
            cfg.simulation.set_horizon(horizon.parse::<Horizon>()?);
        }
        if self.seed.is_some() {
            cfg.simulation.seed = self.seed;
        }
        Ok(cfg)
    }
}

/// Maps a config field path to the request field a caller sent.
pub fn request_field(path: &str) -> &str {
    match path {
        "grid.max_capacity_mw" => "max_capacity",
        "workload.ai_spike_mw" => "ai_spike",
        "weather.tmax_f" => "tmax",
        "weather.tmin_f" => "tmin",
        "weather.wind" => "wind",
        "policy.aggressiveness" => "aggressiveness",
        "simulation.horizon" | "simulation.horizon_steps" | "simulation.horizon_hours" => {
            "horizon"
        }
        other => other,
    }
}

/// One chart point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub time: usize,
    pub baseline: f64,
    pub ai_load: f64,
    pub attempted: f64,
    pub throttled: f64,
    pub shed: f64,
}

impl From<&TimeStep> for ChartPoint {
    fn from(s: &TimeStep) -> Self {
        Self {
            time: s.time,
            baseline: s.baseline,
            ai_load: s.ai_load,
            attempted: s.attempted,
            throttled: s.throttled,
            shed: s.shed,
        }
    }
}

/// Canonical simulation response.
#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    /// Mean baseline over the horizon (MW).
    pub baseline_load: f64,
    pub is_throttled: bool,
    pub chart_data: Vec<ChartPoint>,
    pub metrics: Metrics,
}

impl From<&SimulationResult> for SimulateResponse {
    fn from(r: &SimulationResult) -> Self {
        Self {
            baseline_load: r.baseline_load(),
            is_throttled: r.is_throttled(),
            chart_data: r.steps().iter().map(ChartPoint::from).collect(),
            metrics: *r.metrics(),
        }
    }
}

/// Body of `GET /api/state`.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    /// `idle`, `running`, `complete`, or `failed`.
    pub status: &'static str,
    /// Defaults applied to requests.
    pub base: ScenarioConfig,
    /// Throttle strategy of the latest successful result.
    pub strategy: Option<ThrottleStrategy>,
    /// Latest successful result.
    pub result: Option<SimulateResponse>,
    /// Error of the latest run, when it failed.
    pub error: Option<String>,
}

/// Optional range query parameters for the telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct TelemetryQuery {
    /// Start step (inclusive).
    pub from: Option<usize>,
    /// End step (inclusive).
    pub to: Option<usize>,
}

/// Error response body for 4xx/5xx errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Offending request field, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Machine-readable error kind, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl ErrorResponse {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            field: None,
            kind: None,
        }
    }
}
