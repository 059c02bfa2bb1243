use anyhow::{Context, Result};
use colored::Colorize;

use crate::store::CaseStore;
use crate::workflow::diagnose;

use super::common::{section, Workspace};

/// Report status usage and drift without touching any case.
pub fn execute(json: bool) -> Result<()> {
    let workspace = Workspace::open()?;
    let data = workspace.store().snapshot()?;
    let report = diagnose(&data);

    if json {
        let out = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{out}");
        return Ok(());
    }

    section(&format!("Statuses in use ({} cases)", report.total_cases));
    for usage in &report.statuses {
        println!("  {:<32} {}", usage.status, usage.count);
    }

    section("Mismatches");
    if report.is_clean() {
        println!("  {}", "none".green());
        return Ok(());
    }
    for mismatch in &report.mismatches {
        let healed = mismatch.healed_status.as_deref().unwrap_or("-");
        println!(
            "  #{:<6} {:<28} {} → {}",
            mismatch.case_number,
            mismatch.status.red(),
            mismatch.reason.dimmed(),
            healed.cyan()
        );
    }
    println!(
        "\n  {} run {} to heal",
        "·".dimmed(),
        "caseflow reconcile".cyan()
    );
    Ok(())
}
