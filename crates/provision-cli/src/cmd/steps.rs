use crate::output::{print_json, print_table};
use anyhow::Context;
use provision_core::config::Config;
use provision_core::plan::{standard_plan, PlanContext, PlanOptions};
use provision_core::runner::SystemRunner;
use provision_core::Platform;
use std::path::Path;

/// List the plan for `platform` without evaluating any step.
pub fn run(
    root: &Path,
    platform: Platform,
    skip_system_packages: bool,
    json: bool,
) -> anyhow::Result<()> {
    if !platform.is_supported() {
        anyhow::bail!("unsupported platform: {platform}; there are no steps to list");
    }

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
            skip_system_packages,
        },
    )
    .context("invalid configuration")?;

    if json {
        let items: Vec<serde_json::Value> = steps
            .iter()
            .map(|s| serde_json::json!({ "name": s.name, "fatal": s.fatal }))
            .collect();
        print_json(&items)?;
        return Ok(());
    }

    let rows = steps
        .iter()
        .enumerate()
        .map(|(i, s)| {
            vec![
                (i + 1).to_string(),
                s.name.clone(),
                if s.fatal { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    print_table(&["#", "STEP", "FATAL"], rows);
    Ok(())
}
