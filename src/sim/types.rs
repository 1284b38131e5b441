//! Core simulation types: per-step records and the immutable run result.

use std::fmt;

use super::controller::{KillSwitch, ThrottleStrategy};
use super::metrics::Metrics;

/// Complete record of one simulation step.
///
/// `attempted = baseline + ai_load` and `throttled = attempted - shed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    /// Step index.
    pub time: usize,
    /// Pre-surge demand (MW).
    pub baseline: f64,
    /// AI workload at this step (MW).
    pub ai_load: f64,
    /// Demand before policy intervention (MW).
    pub attempted: f64,
    /// Demand removed by the policy (MW, >= 0).
    pub shed: f64,
    /// Demand the grid actually sees (MW).
    pub throttled: f64,
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "t={:>3} | base={:>7.1} MW  ai={:>6.1} MW  attempted={:>7.1} MW | \
             shed={:>6.1} MW  throttled={:>7.1} MW",
            self.time, self.baseline, self.ai_load, self.attempted, self.shed, self.throttled,
        )
    }
}

/// Output of one simulation run.
///
/// Built once by the engine and never modified; a new run produces a new
/// value. Steps are in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    steps: Vec<TimeStep>,
    kill_switch: KillSwitch,
    kill_switch_step: Option<usize>,
    metrics: Metrics,
    strategy: ThrottleStrategy,
    dt_hours: f64,
}

impl SimulationResult {
    pub(crate) fn new(
        steps: Vec<TimeStep>,
        kill_switch: KillSwitch,
        kill_switch_step: Option<usize>,
        metrics: Metrics,
        strategy: ThrottleStrategy,
        dt_hours: f64,
    ) -> Self {
        Self {
            steps,
            kill_switch,
            kill_switch_step,
            metrics,
            strategy,
            dt_hours,
        }
    }

    pub fn steps(&self) -> &[TimeStep] {
        &self.steps
    }

    /// `true` iff any step shed demand.
    pub fn is_throttled(&self) -> bool {
        self.kill_switch.is_throttled()
    }

    pub fn kill_switch(&self) -> KillSwitch {
        self.kill_switch
    }

    /// First step at which demand was shed.
    pub fn kill_switch_step(&self) -> Option<usize> {
        self.kill_switch_step
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn strategy(&self) -> ThrottleStrategy {
        self.strategy
    }

    pub fn dt_hours(&self) -> f64 {
        self.dt_hours
    }

    /// Mean baseline over the horizon (MW).
    pub fn baseline_load(&self) -> f64 {
        if self.steps.is_empty() {
            return 0.0;
        }
        self.steps.iter().map(|s| s.baseline).sum::<f64>() / self.steps.len() as f64
    }

    /// One-line summary suitable for sharing.
    pub fn summary_line(&self) -> String {
        format!(
            "Grid-Guard: Peak={:.0}MW, Shed={:.0}MWh, Stability={:+.1}%",
            self.metrics.peak_load, self.metrics.shed_energy, self.metrics.stability_gain
        )
    }
}
