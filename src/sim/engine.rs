//! Simulation engine wiring forecast, composer, controller, and metrics.

use tracing::{debug, info, info_span};

use crate::config::ScenarioConfig;
use crate::error::{ComputationError, SimError};
use crate::forecast::{BaselineSource, SyntheticForecast};

use super::composer::LoadComposer;
use super::controller::ThrottleController;
use super::metrics::Metrics;
use super::types::{SimulationResult, TimeStep};

/// One simulation run over a scenario and a baseline source.
///
/// Generic over `B: BaselineSource` for static dispatch. The engine owns its
/// config and is consumed by [`Engine::run`], so nothing survives between runs.
pub struct Engine<B: BaselineSource> {
    config: ScenarioConfig,
    source: B,
}

impl Engine<SyntheticForecast> {
    /// Creates an engine using the built-in weather-driven forecast.
    pub fn synthetic(config: ScenarioConfig) -> Self {
        Self::new(config, SyntheticForecast)
    }
}

impl<B: BaselineSource> Engine<B> {
    /// Creates a new simulation engine.
    ///
    /// # Arguments
    ///
    /// * `config` - Scenario to simulate; validated by [`Engine::run`]
    /// * `source` - Provider of the baseline demand series
    pub fn new(config: ScenarioConfig, source: B) -> Self {
        Self { config, source }
    }

    /// Executes the full pipeline and returns the complete result.
    ///
    /// # Errors
    ///
    /// Returns `SimError::Config` if the scenario is invalid (nothing is
    /// computed), `SimError::Computation` if a series holds non-finite values
    /// or has the wrong length, or whatever the baseline source reports.
    pub fn run(self) -> Result<SimulationResult, SimError> {
        let Self { config, source } = self;
        config.ensure_valid()?;

        let steps = config.simulation.horizon_steps;
        let _span = info_span!(
            "run",
            steps,
            strategy = %config.policy.strategy,
            seeded = config.simulation.seed.is_some()
        )
        .entered();

        // 1. Baseline
        let baseline = source.baseline(&config)?;
        ComputationError::check_len("baseline", &baseline, steps)?;
        ComputationError::check_finite("baseline", &baseline)?;

        // 2. AI surge and attempted demand
        let composer = LoadComposer::from_config(&config);
        let (ai_load, attempted) = composer.compose(&baseline);
        debug!("composed attempted demand");

        // 3. Throttle policy
        let controller = ThrottleController::from_config(&config);
        let outcome = controller.apply(&attempted)?;

        // 4. Step records
        let records: Vec<TimeStep> = (0..steps)
            .map(|t| TimeStep {
                time: t,
                baseline: baseline[t],
                ai_load: ai_load[t],
                attempted: attempted[t],
                shed: outcome.shed[t],
                throttled: outcome.throttled[t],
            })
            .collect();

        // 5. Metrics
        let dt_hours = config.dt_hours();
        let metrics = Metrics::from_steps(&records, dt_hours, config.economics.cost_per_mwh);

        info!(
            throttled = outcome.kill_switch.is_throttled(),
            peak_load_mw = metrics.peak_load,
            shed_energy_mwh = metrics.shed_energy,
            "simulation complete"
        );

        Ok(SimulationResult::new(
            records,
            outcome.kill_switch,
            outcome.kill_switch_step,
            metrics,
            controller.strategy(),
            dt_hours,
        ))
    }
}

/// Runs a scenario with the built-in synthetic forecast.
///
/// # Errors
///
/// See [`Engine::run`].
pub fn run_scenario(config: ScenarioConfig) -> Result<SimulationResult, SimError> {
    Engine::synthetic(config).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigErrorKind;
    use crate::forecast::SuppliedBaseline;

    struct Unreachable;

    impl BaselineSource for Unreachable {
        fn baseline(&self, _config: &ScenarioConfig) -> Result<Vec<f64>, SimError> {
            Err(SimError::UpstreamUnavailable("connection refused".into()))
        }
    }

    struct Truncating;

    impl BaselineSource for Truncating {
        fn baseline(&self, _config: &ScenarioConfig) -> Result<Vec<f64>, SimError> {
            Ok(vec![3000.0; 3])
        }
    }

    fn seeded() -> ScenarioConfig {
        let mut cfg = ScenarioConfig::baseline();
        cfg.simulation.seed = Some(42);
        cfg
    }

    #[test]
    fn run_produces_one_step_per_horizon_step() {
        let result = run_scenario(seeded()).unwrap();
        assert_eq!(result.steps().len(), 24);
        for (t, step) in result.steps().iter().enumerate() {
            assert_eq!(step.time, t);
        }
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let mut cfg = seeded();
        cfg.grid.max_capacity_mw = 10_000.0;
        match run_scenario(cfg) {
            Err(SimError::Config(e)) => {
                assert_eq!(e.kind, ConfigErrorKind::OutOfRange);
                assert_eq!(e.field, "grid.max_capacity_mw");
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn huge_noise_band_is_a_config_error() {
        let mut cfg = seeded();
        cfg.forecast.noise_mw = 1e308;
        match run_scenario(cfg) {
            Err(SimError::Config(e)) => assert_eq!(e.field, "forecast.noise_mw"),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn upstream_failure_propagates() {
        let err = Engine::new(seeded(), Unreachable).run().unwrap_err();
        assert!(matches!(err, SimError::UpstreamUnavailable(_)));
    }

    #[test]
    fn short_baseline_is_an_invalid_series() {
        let err = Engine::new(seeded(), Truncating).run().unwrap_err();
        match err {
            SimError::Computation(e) => assert_eq!(e.series, "baseline"),
            other => panic!("expected computation error, got {other:?}"),
        }
    }

    #[test]
    fn supplied_baseline_flows_through() {
        let result = Engine::new(seeded(), SuppliedBaseline::new(vec![3500.0]))
            .run()
            .unwrap();
        assert!(result.steps().iter().all(|s| s.baseline == 3500.0));
        assert!(!result.is_throttled());
    }

    #[test]
    fn baseline_preset_throttles() {
        let result = run_scenario(seeded()).unwrap();
        assert!(result.is_throttled());
        assert!(result.metrics().shed_energy > 0.0);
        assert!(result.kill_switch_step().is_some());
    }
}
