//! Lifecycle of the most recent simulation run as seen by a front end.

use std::sync::Arc;

use crate::error::SimError;

use super::types::SimulationResult;

/// Where the latest run stands.
///
/// Results are replaced wholesale; a running or failed run keeps the last
/// successful result available for display.
#[derive(Debug, Clone, Default)]
pub enum RunState {
    /// No run has been requested yet.
    #[default]
    Idle,
    /// A run is in progress.
    Running {
        previous: Option<Arc<SimulationResult>>,
    },
    /// The latest run succeeded.
    Complete(Arc<SimulationResult>),
    /// The latest run failed.
    Failed {
        error: SimError,
        previous: Option<Arc<SimulationResult>>,
    },
}

impl RunState {
    /// Short status label: `idle`, `running`, `complete`, or `failed`.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running { .. } => "running",
            Self::Complete(_) => "complete",
            Self::Failed { .. } => "failed",
        }
    }

    /// Most recent successful result, if any.
    pub fn latest(&self) -> Option<&Arc<SimulationResult>> {
        match self {
            Self::Idle => None,
            Self::Running { previous } | Self::Failed { previous, .. } => previous.as_ref(),
            Self::Complete(result) => Some(result),
        }
    }

    /// Error of the latest run, if it failed.
    pub fn error(&self) -> Option<&SimError> {
        match self {
            Self::Failed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Marks a new run as started.
    pub fn begin(&self) -> Self {
        Self::Running {
            previous: self.latest().cloned(),
        }
    }

    /// Discards the latest result and any error.
    pub fn reset(&self) -> Self {
        Self::Idle
    }

    /// Records the outcome of a run.
    pub fn finish(&self, outcome: Result<SimulationResult, SimError>) -> Self {
        match outcome {
            Ok(result) => Self::Complete(Arc::new(result)),
            Err(error) => Self::Failed {
                error,
                previous: self.latest().cloned(),
            },
        }
    }
}
