//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use grid_guard::config::ScenarioConfig;
use grid_guard::forecast::SuppliedBaseline;
use grid_guard::sim::{Engine, SimulationResult};

/// Baseline preset with a fixed seed (24 hourly steps).
pub fn seeded_config() -> ScenarioConfig {
    let mut cfg = ScenarioConfig::baseline();
    cfg.simulation.seed = Some(42);
    cfg
}

/// Flat baseline with `mw` at every step of the configured horizon.
pub fn flat_baseline(cfg: &ScenarioConfig, mw: f64) -> SuppliedBaseline {
    SuppliedBaseline::new(vec![mw; cfg.simulation.horizon_steps])
}

/// Flat `floor_mw` baseline with `peak_mw` at `step`.
pub fn spike_baseline(
    cfg: &ScenarioConfig,
    floor_mw: f64,
    step: usize,
    peak_mw: f64,
) -> SuppliedBaseline {
    let mut values = vec![floor_mw; cfg.simulation.horizon_steps];
    values[step] = peak_mw;
    SuppliedBaseline::new(values)
}

/// Runs `cfg` against a supplied baseline.
pub fn run_supplied(cfg: ScenarioConfig, source: SuppliedBaseline) -> SimulationResult {
    Engine::new(cfg, source)
        .run()
        .expect("supplied-baseline run should succeed")
}
