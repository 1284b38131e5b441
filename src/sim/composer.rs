//! AI-surge profile and attempted-demand composition.

use crate::config::{ScenarioConfig, WorkloadConfig};

/// Data-center PUE at or below [`PUE_REFERENCE_TEMP_F`].
pub const BASELINE_PUE: f64 = 1.15;
/// Outside temperature below which cooling overhead is flat (°F).
pub const PUE_REFERENCE_TEMP_F: f64 = 70.0;
/// PUE increase per °F above the reference temperature.
pub const PUE_INCREASE_PER_F: f64 = 0.008;

/// Power usage effectiveness of a liquid-cooled data center at `tmax_f`.
///
/// Chillers work harder on hot days: 1.15 at 70 °F, about 1.43 at 105 °F.
pub fn predict_pue(tmax_f: f64) -> f64 {
    if tmax_f <= PUE_REFERENCE_TEMP_F {
        BASELINE_PUE
    } else {
        BASELINE_PUE + (tmax_f - PUE_REFERENCE_TEMP_F) * PUE_INCREASE_PER_F
    }
}

/// Recurring daily window during which the AI cluster runs at full surge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurgeWindow {
    /// First hour of day in the window (inclusive).
    pub start_hour: f64,
    /// Hour of day ending the window (exclusive).
    pub end_hour: f64,
}

impl SurgeWindow {
    pub fn new(start_hour: f64, end_hour: f64) -> Self {
        Self {
            start_hour,
            end_hour,
        }
    }

    /// Returns `true` when `hour_of_day` falls within `[start_hour, end_hour)`.
    pub fn contains(&self, hour_of_day: f64) -> bool {
        hour_of_day >= self.start_hour && hour_of_day < self.end_hour
    }

    /// Returns `true` when step `t` starts inside the window.
    pub fn is_active(&self, t: usize, dt_hours: f64) -> bool {
        self.contains((t as f64 * dt_hours).rem_euclid(24.0))
    }
}

impl Default for SurgeWindow {
    fn default() -> Self {
        let w = WorkloadConfig::default();
        Self::new(w.surge_start_hour, w.surge_end_hour)
    }
}

/// Builds the AI load profile and merges it with a baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadComposer {
    window: SurgeWindow,
    surge_mw: f64,
    idle_mw: f64,
    dt_hours: f64,
}

impl LoadComposer {
    /// Creates a composer with explicit parameters.
    ///
    /// # Arguments
    ///
    /// * `window` - Daily surge window
    /// * `surge_mw` - AI load inside the window (MW)
    /// * `idle_mw` - AI load outside the window (MW)
    /// * `dt_hours` - Step duration used to map steps onto hours of day
    pub fn new(window: SurgeWindow, surge_mw: f64, idle_mw: f64, dt_hours: f64) -> Self {
        Self {
            window,
            surge_mw,
            idle_mw,
            dt_hours,
        }
    }

    /// Creates the composer described by a scenario.
    ///
    /// With `workload.pue_scaling` the surge is scaled by the cooling overhead
    /// at `tmax`; the idle load never is.
    pub fn from_config(config: &ScenarioConfig) -> Self {
        let w = &config.workload;
        let surge_mw = if w.pue_scaling {
            w.ai_spike_mw * predict_pue(config.weather.tmax_f)
        } else {
            w.ai_spike_mw
        };
        Self::new(
            SurgeWindow::new(w.surge_start_hour, w.surge_end_hour),
            surge_mw,
            w.idle_mw,
            config.dt_hours(),
        )
    }

    /// AI load at step `t` (MW).
    pub fn ai_load_at(&self, t: usize) -> f64 {
        if self.window.is_active(t, self.dt_hours) {
            self.surge_mw
        } else {
            self.idle_mw
        }
    }

    /// AI load profile over `steps` steps.
    pub fn ai_profile(&self, steps: usize) -> Vec<f64> {
        (0..steps).map(|t| self.ai_load_at(t)).collect()
    }

    /// Returns `(ai_load, attempted)` for the given baseline.
    pub fn compose(&self, baseline: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let ai_load = self.ai_profile(baseline.len());
        let attempted = baseline
            .iter()
            .zip(&ai_load)
            .map(|(base, ai)| base + ai)
            .collect();
        (ai_load, attempted)
    }
}
