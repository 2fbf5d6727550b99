use crate::output::{print_json, print_report};
use anyhow::Context;
use provision_core::config::Config;
use provision_core::plan::{standard_plan, PlanContext, PlanOptions};
use provision_core::runner::SystemRunner;
use provision_core::{Orchestrator, Platform, StepOutcome};
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct RunFlags {
    pub dry_run: bool,
    pub skip_system_packages: bool,
}

pub fn run(root: &Path, platform: Platform, flags: RunFlags, json: bool) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(platform).dry_run(flags.dry_run);

    // An unsupported host gets no plan at all: nothing is read or written.
    let result = if platform.is_supported() {
        let config = Config::load(root).context("failed to load provision.yaml")?;
        let runner = SystemRunner::new(root);
        let ctx = PlanContext {
            root,
            config: &config,
            platform,
            runner: &runner,
        };
        let steps = standard_plan(
            ctx,
            PlanOptions {
                skip_system_packages: flags.skip_system_packages,
            },
        )
        .context("invalid configuration")?;
        orchestrator.run(&steps)
    } else {
        orchestrator.run(&[])
    };

    if json {
        print_json(&result)?;
    } else {
        print_report(&result);
    }

    if let Some(record) = result.fatal_failure() {
        if let StepOutcome::Failed {
            error, remediation, ..
        } = &record.outcome
        {
            anyhow::bail!("{}: {error}\n  hint: {remediation}", record.name);
        }
    }
    if !result.success {
        let failed = result
            .entries
            .iter()
            .filter(|e| e.outcome.is_failure())
            .count();
        anyhow::bail!("{failed} step(s) failed");
    }

    if !json {
        if result.dry_run {
            let pending = result
                .entries
                .iter()
                .filter(|e| e.outcome == StepOutcome::Planned)
                .count();
            println!("\nDry run: {pending} step(s) would run.");
        } else {
            println!("\nEnvironment ready.");
        }
    }
    Ok(())
}
