//! TOML-based scenario configuration, presets, and validation.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigErrorKind};
use crate::sim::controller::ThrottleStrategy;

/// Lowest grid safety ceiling accepted (MW).
pub const MIN_CAPACITY_MW: f64 = 3000.0;
/// Highest grid safety ceiling accepted (MW).
pub const MAX_CAPACITY_MW: f64 = 5000.0;
/// Smallest AI surge accepted (MW).
pub const MIN_AI_SPIKE_MW: f64 = 100.0;
/// Largest AI surge accepted (MW).
pub const MAX_AI_SPIKE_MW: f64 = 1500.0;
/// Upper bound on simulated steps (one year at hourly resolution).
pub const MAX_HORIZON_STEPS: usize = 8760;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the dashboard's baseline scenario. Load
/// from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::baseline`]. A config is only handed to the engine after
/// [`ScenarioConfig::ensure_valid`] succeeds; the engine takes it by value and
/// never modifies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Grid capacity.
    #[serde(default)]
    pub grid: GridConfig,
    /// AI workload surge profile.
    #[serde(default)]
    pub workload: WorkloadConfig,
    /// Weather covariates feeding the baseline forecast.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Throttling policy.
    #[serde(default)]
    pub policy: PolicyConfig,
    /// Horizon, resolution, and seed.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Shape of the synthetic diurnal baseline.
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Monetary rates.
    #[serde(default)]
    pub economics: EconomicsConfig,
}

/// Grid capacity parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Grid safety ceiling (MW), in `[3000, 5000]`.
    pub max_capacity_mw: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_capacity_mw: 4800.0,
        }
    }
}

/// AI data-center workload parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkloadConfig {
    /// Surge magnitude inside the window (MW), in `[100, 1500]`.
    pub ai_spike_mw: f64,
    /// First hour of day in the surge window (inclusive).
    pub surge_start_hour: f64,
    /// Hour of day ending the surge window (exclusive).
    pub surge_end_hour: f64,
    /// Constant AI load outside the window (MW).
    pub idle_mw: f64,
    /// Scale the surge by the temperature-dependent cooling overhead.
    pub pue_scaling: bool,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            ai_spike_mw: 600.0,
            surge_start_hour: 12.0,
            surge_end_hour: 19.0,
            idle_mw: 100.0,
            pue_scaling: false,
        }
    }
}

/// Weather covariates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Daily maximum temperature (°F).
    pub tmax_f: f64,
    /// Daily minimum temperature (°F), must not exceed `tmax_f`.
    pub tmin_f: f64,
    /// Wind speed (non-negative).
    pub wind: f64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            tmax_f: 105.0,
            tmin_f: 80.0,
            wind: 5.0,
        }
    }
}

/// Throttling policy parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyConfig {
    /// Fraction of overshoot removed, in `[0, 1]`.
    pub aggressiveness: f64,
    /// Shedding strategy.
    pub strategy: ThrottleStrategy,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            aggressiveness: 0.65,
            strategy: ThrottleStrategy::Linear,
        }
    }
}

/// Simulation timing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of discrete steps (must be in `1..=8760`).
    pub horizon_steps: usize,
    /// Wall-clock span of the horizon in hours (must be > 0).
    pub horizon_hours: f64,
    /// Noise seed. `None` draws fresh OS entropy per run.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_steps: 24,
            horizon_hours: 24.0,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Step duration in hours.
    pub fn dt_hours(&self) -> f64 {
        self.horizon_hours / self.horizon_steps.max(1) as f64
    }

    /// Applies a UI horizon choice at hourly resolution.
    pub fn set_horizon(&mut self, horizon: Horizon) {
        self.horizon_hours = horizon.hours() as f64;
        self.horizon_steps = horizon.hours();
    }
}

/// Synthetic baseline shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Curve midline (MW).
    pub midline_mw: f64,
    /// Sinusoid amplitude (MW).
    pub amplitude_mw: f64,
    /// Divisor applied to the step index inside the sine (must be > 0).
    pub phase_steps: f64,
    /// Half-width of the uniform noise band (MW).
    pub noise_mw: f64,
    /// Baseline increase per °F of `tmax` above 80 °F.
    pub temp_coeff_mw_per_f: f64,
    /// Baseline decrease per unit of wind speed.
    pub wind_coeff_mw: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            midline_mw: 4100.0,
            amplitude_mw: 350.0,
            phase_steps: 3.0,
            noise_mw: 50.0,
            temp_coeff_mw_per_f: 15.0,
            wind_coeff_mw: 6.0,
        }
    }
}

/// Monetary rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EconomicsConfig {
    /// Cost of one MWh of shed demand.
    pub cost_per_mwh: f64,
}

impl Default for EconomicsConfig {
    fn default() -> Self {
        Self {
            cost_per_mwh: 95.0,
        }
    }
}

/// Forecast horizon choices offered by the run controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    Day,
    TwoDays,
    Week,
}

impl Horizon {
    pub fn hours(self) -> usize {
        match self {
            Self::Day => 24,
            Self::TwoDays => 48,
            Self::Week => 168,
        }
    }
}

impl FromStr for Horizon {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "24h" => Ok(Self::Day),
            "48h" => Ok(Self::TwoDays),
            "7d" => Ok(Self::Week),
            other => Err(ConfigError::out_of_range(
                "simulation.horizon",
                format!("must be \"24h\", \"48h\" or \"7d\", got \"{other}\""),
            )),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "24h",
            Self::TwoDays => "48h",
            Self::Week => "7d",
        })
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self::baseline()
    }
}

impl ScenarioConfig {
    /// Returns the dashboard's default scenario.
    pub fn baseline() -> Self {
        Self {
            grid: GridConfig::default(),
            workload: WorkloadConfig::default(),
            weather: WeatherConfig::default(),
            policy: PolicyConfig::default(),
            simulation: SimulationConfig::default(),
            forecast: ForecastConfig::default(),
            economics: EconomicsConfig::default(),
        }
    }

    /// Returns the heat-wave preset: hot, still day, large surge, tight grid.
    pub fn heat_wave() -> Self {
        Self {
            grid: GridConfig {
                max_capacity_mw: 4500.0,
            },
            workload: WorkloadConfig {
                ai_spike_mw: 1200.0,
                pue_scaling: true,
                ..WorkloadConfig::default()
            },
            weather: WeatherConfig {
                tmax_f: 110.0,
                tmin_f: 85.0,
                wind: 2.0,
            },
            policy: PolicyConfig {
                aggressiveness: 0.85,
                strategy: ThrottleStrategy::SmoothDecay,
            },
            economics: EconomicsConfig {
                cost_per_mwh: 180.0,
            },
            ..Self::baseline()
        }
    }

    /// Returns the mild-day preset: demand stays well under capacity.
    pub fn mild_day() -> Self {
        Self {
            grid: GridConfig {
                max_capacity_mw: 5000.0,
            },
            workload: WorkloadConfig {
                ai_spike_mw: 100.0,
                ..WorkloadConfig::default()
            },
            weather: WeatherConfig {
                tmax_f: 75.0,
                tmin_f: 60.0,
                wind: 12.0,
            },
            ..Self::baseline()
        }
    }

    /// Returns the week-ahead preset: baseline parameters over 168 hourly steps.
    pub fn week_ahead() -> Self {
        let mut cfg = Self::baseline();
        cfg.simulation.set_horizon(Horizon::Week);
        cfg
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "heat_wave", "mild_day", "week_ahead"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "heat_wave" => Ok(Self::heat_wave()),
            "mild_day" => Ok(Self::mild_day()),
            "week_ahead" => Ok(Self::week_ahead()),
            _ => Err(ConfigError {
                kind: ConfigErrorKind::UnknownPreset,
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            kind: ConfigErrorKind::Unreadable,
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            kind: ConfigErrorKind::Unreadable,
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Step duration in hours.
    pub fn dt_hours(&self) -> f64 {
        self.simulation.dt_hours()
    }

    /// Returns the first validation error, if any.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` reported by [`ScenarioConfig::validate`].
    pub fn ensure_valid(&self) -> Result<(), ConfigError> {
        match self.validate().into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid. NaN fails every
    /// range check.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let cap = self.grid.max_capacity_mw;
        if !(MIN_CAPACITY_MW..=MAX_CAPACITY_MW).contains(&cap) {
            errors.push(ConfigError::out_of_range(
                "grid.max_capacity_mw",
                format!("must be in [{MIN_CAPACITY_MW}, {MAX_CAPACITY_MW}], got {cap}"),
            ));
        }

        let w = &self.workload;
        if !(MIN_AI_SPIKE_MW..=MAX_AI_SPIKE_MW).contains(&w.ai_spike_mw) {
            errors.push(ConfigError::out_of_range(
                "workload.ai_spike_mw",
                format!(
                    "must be in [{MIN_AI_SPIKE_MW}, {MAX_AI_SPIKE_MW}], got {}",
                    w.ai_spike_mw
                ),
            ));
        }
        if !(w.idle_mw.is_finite() && w.idle_mw >= 0.0) {
            errors.push(ConfigError::out_of_range(
                "workload.idle_mw",
                "must be a finite value >= 0",
            ));
        }
        for (field, hour) in [
            ("workload.surge_start_hour", w.surge_start_hour),
            ("workload.surge_end_hour", w.surge_end_hour),
        ] {
            if !(0.0..=24.0).contains(&hour) {
                errors.push(ConfigError::out_of_range(field, "must be in [0, 24]"));
            }
        }
        if w.surge_start_hour >= w.surge_end_hour {
            errors.push(ConfigError::inconsistent(
                "workload.surge_start_hour",
                "must be < workload.surge_end_hour",
            ));
        }

        let wx = &self.weather;
        if !wx.tmax_f.is_finite() {
            errors.push(ConfigError::out_of_range("weather.tmax_f", "must be finite"));
        }
        if !wx.tmin_f.is_finite() {
            errors.push(ConfigError::out_of_range("weather.tmin_f", "must be finite"));
        }
        if wx.tmax_f < wx.tmin_f {
            errors.push(ConfigError::inconsistent(
                "weather.tmax_f",
                format!("must be >= weather.tmin_f ({})", wx.tmin_f),
            ));
        }
        if !(wx.wind.is_finite() && wx.wind >= 0.0) {
            errors.push(ConfigError::out_of_range(
                "weather.wind",
                "must be a finite value >= 0",
            ));
        }

        if !(0.0..=1.0).contains(&self.policy.aggressiveness) {
            errors.push(ConfigError::out_of_range(
                "policy.aggressiveness",
                format!("must be in [0.0, 1.0], got {}", self.policy.aggressiveness),
            ));
        }

        let s = &self.simulation;
        if !(1..=MAX_HORIZON_STEPS).contains(&s.horizon_steps) {
            errors.push(ConfigError::out_of_range(
                "simulation.horizon_steps",
                format!("must be in [1, {MAX_HORIZON_STEPS}], got {}", s.horizon_steps),
            ));
        }
        if !(s.horizon_hours.is_finite() && s.horizon_hours > 0.0) {
            errors.push(ConfigError::out_of_range(
                "simulation.horizon_hours",
                "must be a finite value > 0",
            ));
        }

        let f = &self.forecast;
        for (field, value) in [
            ("forecast.midline_mw", f.midline_mw),
            ("forecast.amplitude_mw", f.amplitude_mw),
            ("forecast.noise_mw", f.noise_mw),
            ("forecast.temp_coeff_mw_per_f", f.temp_coeff_mw_per_f),
            ("forecast.wind_coeff_mw", f.wind_coeff_mw),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                errors.push(ConfigError::out_of_range(field, "must be a finite value >= 0"));
            }
        }
        // noise is drawn from [-noise_mw, noise_mw]; the band width must stay finite
        if f.noise_mw.is_finite() && !(2.0 * f.noise_mw).is_finite() {
            errors.push(ConfigError::out_of_range(
                "forecast.noise_mw",
                format!("noise band [-{0}, {0}] is not finite", f.noise_mw),
            ));
        }
        if !(f.phase_steps.is_finite() && f.phase_steps > 0.0) {
            errors.push(ConfigError::out_of_range(
                "forecast.phase_steps",
                "must be a finite value > 0",
            ));
        }

        let rate = self.economics.cost_per_mwh;
        if !(rate.is_finite() && rate >= 0.0) {
            errors.push(ConfigError::out_of_range(
                "economics.cost_per_mwh",
                "must be a finite value >= 0",
            ));
        }

        errors
    }
}
