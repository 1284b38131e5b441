//! Capacity-threshold throttling policy and kill-switch tracking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ScenarioConfig;
use crate::error::ComputationError;

/// Exponential decay rate of the smoothing response (per hour).
///
/// Real part of the roots of `y'' + y' + 4y = 0`.
pub const SMOOTH_DECAY_RATE: f64 = 0.5;

/// Angular frequency of the smoothing response (rad per hour), `sqrt(15) / 2`.
pub fn smooth_decay_frequency() -> f64 {
    15.0_f64.sqrt() / 2.0
}

/// How shed demand is derived from the overshoot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleStrategy {
    /// `shed = max(0, attempted - capacity) * aggressiveness`.
    #[default]
    Linear,
    /// Linear shedding whose release after an overshoot rings down along an
    /// underdamped response instead of dropping to zero at once.
    SmoothDecay,
}

impl ThrottleStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::SmoothDecay => "smooth_decay",
        }
    }
}

impl fmt::Display for ThrottleStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThrottleStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Self::Linear),
            "smooth_decay" => Ok(Self::SmoothDecay),
            other => Err(format!(
                "must be \"linear\" or \"smooth_decay\", got \"{other}\""
            )),
        }
    }
}

/// Run-level kill-switch classification.
///
/// Starts `Normal` and latches to `Throttled` at the first step with a
/// positive shed. It never reverts within a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KillSwitch {
    #[default]
    Normal,
    Throttled,
}

impl KillSwitch {
    /// Returns the state after observing one step's shed amount.
    pub fn observe(self, shed_mw: f64) -> Self {
        match self {
            Self::Normal if shed_mw > 0.0 => Self::Throttled,
            state => state,
        }
    }

    pub fn is_throttled(self) -> bool {
        self == Self::Throttled
    }
}

/// Per-step shedding decisions for a whole series.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrottleOutcome {
    /// Shed demand per step (MW, >= 0).
    pub shed: Vec<f64>,
    /// `attempted - shed` per step (MW).
    pub throttled: Vec<f64>,
    /// Final kill-switch state.
    pub kill_switch: KillSwitch,
    /// First step where the kill switch engaged.
    pub kill_switch_step: Option<usize>,
}

/// Converts attempted demand into shed and throttled load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleController {
    max_capacity_mw: f64,
    aggressiveness: f64,
    strategy: ThrottleStrategy,
    dt_hours: f64,
}

impl ThrottleController {
    /// Creates a controller.
    ///
    /// # Arguments
    ///
    /// * `max_capacity_mw` - Grid safety ceiling (MW)
    /// * `aggressiveness` - Fraction of overshoot removed, in `[0, 1]`
    /// * `strategy` - Shedding strategy
    /// * `dt_hours` - Step duration, used by the smoothing response
    pub fn new(
        max_capacity_mw: f64,
        aggressiveness: f64,
        strategy: ThrottleStrategy,
        dt_hours: f64,
    ) -> Self {
        Self {
            max_capacity_mw,
            aggressiveness,
            strategy,
            dt_hours,
        }
    }

    pub fn from_config(config: &ScenarioConfig) -> Self {
        Self::new(
            config.grid.max_capacity_mw,
            config.policy.aggressiveness,
            config.policy.strategy,
            config.dt_hours(),
        )
    }

    pub fn strategy(&self) -> ThrottleStrategy {
        self.strategy
    }

    /// Linear-fractional shed for a single attempted value.
    ///
    /// Zero whenever `attempted_mw <= max_capacity_mw`.
    pub fn linear_shed(&self, attempted_mw: f64) -> f64 {
        (attempted_mw - self.max_capacity_mw).max(0.0) * self.aggressiveness
    }

    /// Residual shed `tau_hours` after an overshoot that shed `anchor_mw`.
    fn ring_down(&self, anchor_mw: f64, tau_hours: f64) -> f64 {
        anchor_mw
            * (-SMOOTH_DECAY_RATE * tau_hours).exp()
            * (smooth_decay_frequency() * tau_hours).cos()
    }

    /// Applies the policy to a full attempted series in chronological order.
    ///
    /// # Errors
    ///
    /// Returns `ComputationError` with kind `InvalidSeries` if any attempted
    /// value is NaN or infinite.
    pub fn apply(&self, attempted: &[f64]) -> Result<ThrottleOutcome, ComputationError> {
        ComputationError::check_finite("attempted", attempted)?;

        let mut shed = Vec::with_capacity(attempted.len());
        let mut throttled = Vec::with_capacity(attempted.len());
        let mut kill_switch = KillSwitch::Normal;
        let mut kill_switch_step = None;
        // (step, shed) of the most recent step with a positive linear shed
        let mut anchor: Option<(usize, f64)> = None;

        for (t, &attempted_mw) in attempted.iter().enumerate() {
            let linear = self.linear_shed(attempted_mw);
            let shed_mw = match self.strategy {
                ThrottleStrategy::Linear => linear,
                ThrottleStrategy::SmoothDecay => {
                    if linear > 0.0 {
                        anchor = Some((t, linear));
                        linear
                    } else if let Some((t0, anchor_mw)) = anchor {
                        let tau = (t - t0) as f64 * self.dt_hours;
                        self.ring_down(anchor_mw, tau)
                            .max(0.0)
                            .min(attempted_mw.max(0.0))
                    } else {
                        0.0
                    }
                }
            };

            let next = kill_switch.observe(shed_mw);
            if next != kill_switch {
                warn!(
                    step = t,
                    attempted_mw,
                    capacity_mw = self.max_capacity_mw,
                    "attempted load exceeds capacity; kill switch engaged"
                );
                kill_switch_step = Some(t);
            }
            kill_switch = next;

            shed.push(shed_mw);
            throttled.push(attempted_mw - shed_mw);
        }

        debug!(
            strategy = %self.strategy,
            throttled = kill_switch.is_throttled(),
            "applied throttle policy"
        );

        Ok(ThrottleOutcome {
            shed,
            throttled,
            kill_switch,
            kill_switch_step,
        })
    }
}
