pub mod config;
pub mod error;
pub mod interpreter;
pub mod io;
pub mod manifest;
pub mod orchestrator;
pub mod package_manager;
pub mod paths;
pub mod plan;
pub mod platform;
pub mod runner;
pub mod step;
pub mod version;

#[cfg(test)]
mod test_support;

pub use error::{ProvisionError, Result};
pub use orchestrator::{Orchestrator, RunResult, StepOutcome, StepRecord};
pub use platform::Platform;
pub use step::ProvisioningStep;
