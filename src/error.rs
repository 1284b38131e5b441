//! Error taxonomy for scenario loading and simulation runs.

use std::fmt;

use thiserror::Error;

/// Convenience alias for simulation results.
pub type Result<T> = std::result::Result<T, SimError>;

/// Category of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// A field lies outside its permitted range.
    OutOfRange,
    /// Two or more fields contradict each other (e.g. `tmax < tmin`).
    Inconsistent,
    /// A scenario file could not be read or parsed.
    Unreadable,
    /// A named preset does not exist.
    UnknownPreset,
}

impl ConfigErrorKind {
    /// Stable upper-snake-case label used in API error bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Inconsistent => "INCONSISTENT",
            Self::Unreadable => "UNREADABLE",
            Self::UnknownPreset => "UNKNOWN_PRESET",
        }
    }
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("config error ({kind}): {field}: {message}")]
pub struct ConfigError {
    /// What went wrong.
    pub kind: ConfigErrorKind,
    /// Dotted field path (e.g., `"grid.max_capacity_mw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn out_of_range(field: &str, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::OutOfRange,
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn inconsistent(field: &str, message: impl Into<String>) -> Self {
        Self {
            kind: ConfigErrorKind::Inconsistent,
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Category of a [`ComputationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComputationErrorKind {
    /// A series contains NaN or infinite values.
    InvalidSeries,
}

impl fmt::Display for ComputationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSeries => f.write_str("INVALID_SERIES"),
        }
    }
}

/// A generated or supplied series failed a numeric precondition.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("computation error ({kind}): {series}[{index}] {detail}")]
pub struct ComputationError {
    pub kind: ComputationErrorKind,
    /// Name of the offending series (`"baseline"`, `"attempted"`, ...).
    pub series: &'static str,
    /// Index of the first offending element.
    pub index: usize,
    /// What is wrong at that index.
    pub detail: String,
}

impl ComputationError {
    /// Returns an error for the first non-finite value in `values`, if any.
    pub fn check_finite(series: &'static str, values: &[f64]) -> std::result::Result<(), Self> {
        match values.iter().position(|v| !v.is_finite()) {
            Some(index) => Err(Self {
                kind: ComputationErrorKind::InvalidSeries,
                series,
                index,
                detail: format!("is not finite ({})", values[index]),
            }),
            None => Ok(()),
        }
    }

    /// Returns an error unless `values` has exactly `expected` elements.
    pub fn check_len(
        series: &'static str,
        values: &[f64],
        expected: usize,
    ) -> std::result::Result<(), Self> {
        if values.len() == expected {
            return Ok(());
        }
        Err(Self {
            kind: ComputationErrorKind::InvalidSeries,
            series,
            index: values.len().min(expected),
            detail: format!("has length {}, expected {expected}", values.len()),
        })
    }
}

/// Top-level error for a simulation run. A run that returns any of these
/// produced no result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Computation(#[from] ComputationError),
    /// The external baseline provider could not be reached.
    #[error("forecast upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}
