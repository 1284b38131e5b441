//! Post-hoc summary metrics computed from a completed run.

use std::fmt;

use serde::Serialize;

use super::types::TimeStep;

/// Summary statistics derived from a complete simulation run.
///
/// Computed from the finished `TimeStep` sequence so the reported numbers
/// always agree with the series they summarize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Highest throttled load (MW).
    pub peak_load: f64,
    /// Time integral of shed demand (MWh).
    pub shed_energy: f64,
    /// Percentage reduction of peak load versus the unthrottled series.
    pub stability_gain: f64,
    /// `shed_energy * cost_per_mwh`.
    pub cost_impact: f64,
}

impl Metrics {
    /// Computes all metrics from the complete step sequence.
    ///
    /// # Arguments
    ///
    /// * `steps` - Complete simulation steps in chronological order
    /// * `dt_hours` - Step duration in hours
    /// * `cost_per_mwh` - Cost rate applied to shed energy
    ///
    /// # Returns
    ///
    /// A `Metrics` with all fields populated; all zero for an empty run.
    pub fn from_steps(steps: &[TimeStep], dt_hours: f64, cost_per_mwh: f64) -> Self {
        if steps.is_empty() {
            return Self {
                peak_load: 0.0,
                shed_energy: 0.0,
                stability_gain: 0.0,
                cost_impact: 0.0,
            };
        }

        let mut peak_throttled = f64::NEG_INFINITY;
        let mut peak_attempted = f64::NEG_INFINITY;
        let mut shed_sum = 0.0_f64;

        for s in steps {
            peak_throttled = peak_throttled.max(s.throttled);
            peak_attempted = peak_attempted.max(s.attempted);
            shed_sum += s.shed;
        }

        // left Riemann sum over uniform steps
        let shed_energy = shed_sum * dt_hours;

        let stability_gain = if peak_attempted > 0.0 {
            (1.0 - peak_throttled / peak_attempted) * 100.0
        } else {
            0.0
        };

        Self {
            peak_load: peak_throttled,
            shed_energy,
            stability_gain,
            cost_impact: shed_energy * cost_per_mwh,
        }
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Grid Report ---")?;
        writeln!(f, "Peak load:        {:.1} MW", self.peak_load)?;
        writeln!(f, "Shed energy:      {:.1} MWh", self.shed_energy)?;
        writeln!(f, "Stability gain:   {:+.1}%", self.stability_gain)?;
        write!(f, "Cost impact:      ${:.1}k", self.cost_impact / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_step(time: usize, attempted: f64, shed: f64) -> TimeStep {
        TimeStep {
            time,
            baseline: attempted - 100.0,
            ai_load: 100.0,
            attempted,
            shed,
            throttled: attempted - shed,
        }
    }

    #[test]
    fn peak_is_max_throttled() {
        let steps = vec![
            make_step(0, 4000.0, 0.0),
            make_step(1, 5100.0, 195.0),
            make_step(2, 4700.0, 0.0),
        ];
        let m = Metrics::from_steps(&steps, 1.0, 100.0);
        assert_eq!(m.peak_load, 4905.0);
    }

    #[test]
    fn shed_energy_scales_with_step_duration() {
        let steps = vec![make_step(0, 5000.0, 40.0), make_step(1, 5000.0, 60.0)];
        let hourly = Metrics::from_steps(&steps, 1.0, 0.0);
        let quarter = Metrics::from_steps(&steps, 0.25, 0.0);
        assert_eq!(hourly.shed_energy, 100.0);
        assert_eq!(quarter.shed_energy, 25.0);
    }

    #[test]
    fn cost_impact_is_energy_times_rate() {
        let steps = vec![make_step(0, 5000.0, 50.0)];
        let m = Metrics::from_steps(&steps, 2.0, 95.0);
        assert_eq!(m.cost_impact, 100.0 * 95.0);
    }

    #[test]
    fn stability_gain_compares_peaks() {
        let steps = vec![make_step(0, 5000.0, 0.0), make_step(1, 5200.0, 200.0)];
        let m = Metrics::from_steps(&steps, 1.0, 0.0);
        // peaks: attempted 5200, throttled 5000
        assert!((m.stability_gain - (1.0 - 5000.0 / 5200.0) * 100.0).abs() < 1e-12);
    }

    #[test]
    fn no_shedding_means_no_gain() {
        let steps = vec![make_step(0, 3000.0, 0.0), make_step(1, 3500.0, 0.0)];
        let m = Metrics::from_steps(&steps, 1.0, 95.0);
        assert_eq!(m.shed_energy, 0.0);
        assert_eq!(m.stability_gain, 0.0);
        assert_eq!(m.cost_impact, 0.0);
    }

    #[test]
    fn zero_attempted_gain_is_zero() {
        let steps = vec![TimeStep {
            time: 0,
            baseline: 0.0,
            ai_load: 0.0,
            attempted: 0.0,
            shed: 0.0,
            throttled: 0.0,
        }];
        let m = Metrics::from_steps(&steps, 1.0, 95.0);
        assert_eq!(m.stability_gain, 0.0);
    }

    #[test]
    fn empty_steps() {
        let m = Metrics::from_steps(&[], 1.0, 95.0);
        assert_eq!(m.peak_load, 0.0);
        assert_eq!(m.shed_energy, 0.0);
    }

    #[test]
    fn display_does_not_panic() {
        let m = Metrics::from_steps(&[make_step(0, 5000.0, 10.0)], 1.0, 95.0);
        assert!(format!("{m}").contains("Peak load"));
    }
}
