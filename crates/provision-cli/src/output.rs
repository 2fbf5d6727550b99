use provision_core::{RunResult, StepOutcome};
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    // Calculate column widths
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.len());
            }
        }
    }

    let header_row: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_row.join("  ").trim_end());

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("  "));

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        println!("{}", cells.join("  ").trim_end());
    }
}

/// Human-readable run report: one row per recorded step, then the hint for
/// every failure on stderr.
pub fn print_report(result: &RunResult) {
    let rows: Vec<Vec<String>> = result
        .entries
        .iter()
        .map(|e| {
            let detail = match &e.outcome {
                StepOutcome::Succeeded { detail } => detail.clone().unwrap_or_default(),
                StepOutcome::Failed { error, .. } => error.clone(),
                StepOutcome::Skipped => "already satisfied".to_string(),
                StepOutcome::Planned => "would run".to_string(),
            };
            vec![e.name.clone(), e.outcome.label().to_string(), detail]
        })
        .collect();
    print_table(&["STEP", "STATUS", "DETAIL"], rows);

    for entry in &result.entries {
        if let StepOutcome::Failed {
            error,
            remediation,
            fatal: false,
        } = &entry.outcome
        {
            eprintln!("warning: {}: {error}", entry.name);
            eprintln!("  hint: {remediation}");
        }
    }
}
