//! Grid-Guard: grid load-shedding simulation for AI data-center demand.
//!
//! Forecasts baseline demand, overlays an AI workload surge, and throttles
//! whatever exceeds the grid's safety ceiling.

pub mod config;
pub mod error;
pub mod forecast;
pub mod io;
/// Load composition, throttling, metrics, and run orchestration.
pub mod sim;

#[cfg(feature = "api")]
pub mod api;
