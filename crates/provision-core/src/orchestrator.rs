//! Sequential, fail-fast execution of provisioning steps.

use crate::error::ProvisionError;
use crate::platform::Platform;
use crate::step::ProvisioningStep;
use serde::{Deserialize, Serialize};

pub const PLATFORM_STEP: &str = "detect platform";

// ---------------------------------------------------------------------------
// StepOutcome / StepRecord / RunResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StepOutcome {
    Skipped,
    Succeeded {
        #[serde(skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Failed {
        error: String,
        remediation: String,
        fatal: bool,
    },
    /// Dry run: the effect does not hold yet and the action was withheld.
    Planned,
}

impl StepOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            StepOutcome::Skipped => "skipped",
            StepOutcome::Succeeded { .. } => "succeeded",
            StepOutcome::Failed { .. } => "failed",
            StepOutcome::Planned => "planned",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, StepOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub name: String,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub platform: Platform,
    pub dry_run: bool,
    pub entries: Vec<StepRecord>,
    pub success: bool,
}

impl RunResult {
    pub fn exit_code(&self) -> i32 {
        if self.success {
            0
        } else {
            1
        }
    }

    pub fn outcome_of(&self, name: &str) -> Option<&StepOutcome> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.outcome)
    }

    /// The failure that stopped the run, if any.
    pub fn fatal_failure(&self) -> Option<&StepRecord> {
        self.entries
            .iter()
            .find(|e| matches!(e.outcome, StepOutcome::Failed { fatal: true, .. }))
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub struct Orchestrator {
    platform: Platform,
    dry_run: bool,
}

impl Orchestrator {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            dry_run: false,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Run `steps` strictly in order. A fatal failure stops the run; later
    /// steps are neither executed nor recorded.
    pub fn run(&self, steps: &[ProvisioningStep<'_>]) -> RunResult {
        let mut result = RunResult {
            platform: self.platform,
            dry_run: self.dry_run,
            entries: Vec::with_capacity(steps.len()),
            success: true,
        };

        if !self.platform.is_supported() {
            let err = ProvisionError::PlatformUnsupported {
                platform: self.platform.to_string(),
            };
            tracing::error!(error = %err, "cannot provision this host");
            result.entries.push(StepRecord {
                name: PLATFORM_STEP.to_string(),
                outcome: self.failure(&err, true),
            });
            result.success = false;
            return result;
        }

        for step in steps {
            let outcome = self.run_step(step);
            let stop = matches!(outcome, StepOutcome::Failed { fatal: true, .. });
            if outcome.is_failure() {
                result.success = false;
            }
            result.entries.push(StepRecord {
                name: step.name.clone(),
                outcome,
            });
            if stop {
                break;
            }
        }

        result
    }

    fn run_step(&self, step: &ProvisioningStep<'_>) -> StepOutcome {
        match step.already_satisfied() {
            Ok(true) => {
                tracing::info!(step = %step.name, "already satisfied, skipping");
                return StepOutcome::Skipped;
            }
            Ok(false) => {}
            Err(e) => return self.fail(step, e),
        }

        if self.dry_run {
            tracing::info!(step = %step.name, "would run");
            return StepOutcome::Planned;
        }

        tracing::info!(step = %step.name, "running");
        match step.execute() {
            Ok(detail) => {
                tracing::info!(step = %step.name, "succeeded");
                StepOutcome::Succeeded { detail }
            }
            Err(e) => self.fail(step, e),
        }
    }

    fn fail(&self, step: &ProvisioningStep<'_>, err: ProvisionError) -> StepOutcome {
        if step.fatal {
            tracing::error!(step = %step.name, error = %err, "fatal step failed, aborting");
        } else {
            tracing::warn!(step = %step.name, error = %err, "step failed, continuing");
        }
        self.failure(&err, step.fatal)
    }

    fn failure(&self, err: &ProvisionError, fatal: bool) -> StepOutcome {
        StepOutcome::Failed {
            error: err.to_string(),
            remediation: err.remediation(self.platform),
            fatal,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
