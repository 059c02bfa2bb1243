use anyhow::Result;
use colored::Colorize;

use super::common::Workspace;

/// Heal every case against the current catalog.
pub fn execute() -> Result<()> {
    let workspace = Workspace::open()?;
    let healed = workspace.engine.reconcile_all()?;
    if healed.is_empty() {
        println!("{} All cases already consistent", "✓".green().bold());
        return Ok(());
    }
    for case in &healed {
        println!(
            "  {} case {}: {} → {}",
            "↻".yellow(),
            case.case_id,
            case.from.dimmed(),
            case.to.cyan()
        );
    }
    println!("{} Healed {} case(s)", "✓".green().bold(), healed.len());
    Ok(())
}
