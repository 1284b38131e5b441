/// AI-surge profile and attempted-demand composition.
pub mod composer;
pub mod controller;
pub mod engine;
pub mod metrics;
/// Run lifecycle for front ends.
pub mod run_state;
pub mod types;

pub use controller::{KillSwitch, ThrottleController, ThrottleStrategy};
pub use engine::{Engine, run_scenario};
pub use metrics::Metrics;
pub use run_state::RunState;
pub use types::{SimulationResult, TimeStep};
