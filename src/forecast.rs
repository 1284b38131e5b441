//! Baseline demand forecasting.
//!
//! A [`BaselineSource`] yields the pre-surge demand curve for one run. The
//! built-in [`SyntheticForecast`] draws a diurnal curve shaped by weather
//! covariates; [`SuppliedBaseline`] wraps a series extracted by an external
//! model or dataset.

use rand::distr::{Distribution, Uniform};
use rand::{SeedableRng, rngs::StdRng};
use tracing::{debug, warn};

use crate::config::{ForecastConfig, ScenarioConfig, WeatherConfig};
use crate::error::{ComputationError, ConfigError, SimError};

/// Temperature at which the weather adjustment is zero (°F).
pub const REFERENCE_TMAX_F: f64 = 80.0;

/// Anything able to produce a baseline series for a scenario.
///
/// Implementations backed by a remote model report connectivity failures as
/// [`SimError::UpstreamUnavailable`]; the engine does not retry or fall back.
pub trait BaselineSource {
    /// Returns `config.simulation.horizon_steps` non-negative, finite values.
    ///
    /// # Errors
    ///
    /// Returns a `SimError` if the series cannot be produced.
    fn baseline(&self, config: &ScenarioConfig) -> Result<Vec<f64>, SimError>;
}

/// Weather-driven diurnal baseline with bounded uniform noise.
///
/// `baseline[t] = midline + amplitude * sin(t / phase_steps)
///              + weather_adjustment + noise[t]`, clamped at zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntheticForecast;

impl SyntheticForecast {
    /// Generates the baseline for `config`.
    ///
    /// A seeded config is reproducible bit-for-bit. Without a seed every call
    /// builds its own entropy-seeded generator.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` on `forecast.noise_mw` if the noise band
    /// `[-noise_mw, noise_mw]` is not a finite range.
    pub fn generate(&self, config: &ScenarioConfig) -> Result<Vec<f64>, ConfigError> {
        let f = &config.forecast;
        let steps = config.simulation.horizon_steps;
        let noise_band = if f.noise_mw > 0.0 {
            let band = Uniform::new_inclusive(-f.noise_mw, f.noise_mw).map_err(|e| {
                ConfigError::out_of_range("forecast.noise_mw", format!("invalid noise band: {e}"))
            })?;
            Some(band)
        } else {
            None
        };
        let mut rng = match config.simulation.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let adjustment = weather_adjustment(f, &config.weather);

        let mut baseline = Vec::with_capacity(steps);
        for t in 0..steps {
            let diurnal = f.amplitude_mw * (t as f64 / f.phase_steps).sin();
            let noise = noise_band.as_ref().map_or(0.0, |band| band.sample(&mut rng));
            let mw = f.midline_mw + diurnal + adjustment + noise;
            baseline.push(mw.max(0.0)); // no negative demand
        }

        debug!(steps, adjustment, "generated synthetic baseline");
        Ok(baseline)
    }
}

impl BaselineSource for SyntheticForecast {
    fn baseline(&self, config: &ScenarioConfig) -> Result<Vec<f64>, SimError> {
        self.generate(config).map_err(SimError::from)
    }
}

/// Weather contribution to the baseline (MW).
///
/// Hot days raise demand through cooling load; wind generation offsets a
/// little of it.
pub fn weather_adjustment(forecast: &ForecastConfig, weather: &WeatherConfig) -> f64 {
    forecast.temp_coeff_mw_per_f * (weather.tmax_f - REFERENCE_TMAX_F)
        - forecast.wind_coeff_mw * weather.wind
}

/// Baseline series supplied by an external collaborator.
///
/// The series is resized to the horizon the same way a naive "tomorrow is
/// today" forecast is: copied, truncated, or repeated.
#[derive(Debug, Clone, PartialEq)]
pub struct SuppliedBaseline {
    values: Vec<f64>,
}

impl SuppliedBaseline {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// Resizes the supplied values to `horizon` steps.
    ///
    /// # Arguments
    ///
    /// * `horizon` - Number of steps to produce
    ///
    /// # Returns
    ///
    /// A vector with length equal to `horizon`. An empty input yields zeros.
    pub fn resize(&self, horizon: usize) -> Vec<f64> {
        if horizon == 0 {
            return Vec::new();
        }

        if self.values.is_empty() {
            return vec![0.0; horizon];
        }

        if self.values.len() >= horizon {
            return self.values[..horizon].to_vec();
        }

        self.values.iter().copied().cycle().take(horizon).collect()
    }
}

impl BaselineSource for SuppliedBaseline {
    fn baseline(&self, config: &ScenarioConfig) -> Result<Vec<f64>, SimError> {
        ComputationError::check_finite("baseline", &self.values)?;
        if self.values.is_empty() {
            warn!("supplied baseline is empty; using a zero series");
        }
        let horizon = config.simulation.horizon_steps;
        let clamped: Vec<f64> = self.resize(horizon).into_iter().map(|v| v.max(0.0)).collect();
        debug!(
            supplied = self.values.len(),
            horizon, "resized supplied baseline"
        );
        Ok(clamped)
    }
}
