use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;

use crate::catalog::{admin, CatalogSeed};
use crate::config::Config;
use crate::fs::WorkDir;
use crate::store::{CaseStore, FileStore};

use super::common::section;

/// Create `.caseflow/` and seed the stage catalog.
///
/// Without `catalog_path` the built-in standard pipeline is used.
pub fn execute(catalog_path: Option<PathBuf>) -> Result<()> {
    let seed = match &catalog_path {
        Some(path) => CatalogSeed::from_path(path)?,
        None => CatalogSeed::standard()?,
    };

    section("Initialize");
    let work_dir = WorkDir::discover()?;
    let config = Config::default();
    work_dir.initialize(&config)?;
    println!(
        "  {} Work directory created {}",
        "✓".green().bold(),
        work_dir.root().display().to_string().dimmed()
    );

    let store = FileStore::open(work_dir.store_path(&config));
    let summary = format!(
        "{} stages, {} executive levels, {} users",
        seed.stages.len(),
        seed.executive_levels.len(),
        seed.users.len()
    );
    store
        .transaction(|tx| admin::import_seed(tx, seed))
        .context("Failed to seed stage catalog")?;

    let source = catalog_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "standard pipeline".to_string());
    println!("  {} Catalog imported from {}", "✓".green().bold(), source.dimmed());
    println!("  {} {}", "·".dimmed(), summary);
    Ok(())
}
