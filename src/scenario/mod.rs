//! Scenario model and runner
//!
//! Scenarios are ordered groups of steps sharing one browser page,
//! executed serially because later steps depend on the navigation and
//! storage side effects of earlier ones.

pub mod runner;
pub mod step;

pub use runner::{run_scenario, ScenarioReport, StepOutcome, StepReport};
pub use step::{Scenario, Step, StepCtx};
