use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::catalog::{admin, CatalogSeed, StageCatalog};
use crate::store::CaseStore;

use super::common::{section, Workspace};

/// Replace the stage catalog in place. Cases keep their stage pointers and
/// are healed against the new catalog as they are next touched.
pub fn import(path: &Path) -> Result<()> {
    let workspace = Workspace::open()?;
    let seed = CatalogSeed::from_path(path)?;
    let stages = seed.stages.len();
    workspace
        .store()
        .transaction(|tx| admin::import_seed(tx, seed))
        .with_context(|| format!("Failed to import catalog from {}", path.display()))?;
    println!(
        "{} Imported {} stages from {}",
        "✓".green().bold(),
        stages,
        path.display()
    );
    println!(
        "  {} run {} to heal cases now",
        "·".dimmed(),
        "caseflow reconcile".cyan()
    );
    Ok(())
}

pub fn show() -> Result<()> {
    let workspace = Workspace::open()?;
    let data = workspace.store().snapshot()?;
    let catalog = StageCatalog::new(
        data.stages.clone(),
        data.executive_levels.clone(),
        data.role_permissions.clone(),
        data.user_permissions.clone(),
    );

    section("Stages");
    let mut stages: Vec<_> = catalog.stages().iter().collect();
    stages.sort_by_key(|s| (s.sort_order, s.id));
    for stage in stages {
        let marker = if !stage.is_active {
            "inactive".red().to_string()
        } else if catalog.is_executive_stage(stage) {
            "executive".magenta().to_string()
        } else {
            stage.category().to_string().dimmed().to_string()
        };
        println!(
            "  {:>3}  {:<24} {:>4}  {}",
            stage.id,
            stage.stage_key.bold(),
            stage.sort_order,
            marker
        );
        if !stage.associated_statuses.is_empty() {
            println!("       {}", stage.associated_statuses.join(", ").cyan());
        }
        if let Some(next) = stage.next_stage_id {
            println!("       {} {next}", "next →".dimmed());
        }
    }

    section("Executive ladder");
    let levels = catalog.active_levels();
    if levels.is_empty() {
        println!("  {}", "(no active levels)".dimmed());
    }
    for level in levels {
        println!("  {:>3}  {}", level.level_number, level.level_name);
    }
    Ok(())
}
