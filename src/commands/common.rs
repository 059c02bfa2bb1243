//! Shared setup for commands: work directory, store and actor resolution.

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::Config;
use crate::errors::WorkflowError;
use crate::fs::WorkDir;
use crate::models::{Actor, UserId};
use crate::notify::TracingNotifier;
use crate::store::{CaseStore, FileStore};
use crate::workflow::{TransitionEngine, TransitionResult};

pub type CliEngine = TransitionEngine<FileStore, TracingNotifier>;

/// Loaded work directory with its config and an engine over its store
pub struct Workspace {
    pub work_dir: WorkDir,
    pub config: Config,
    pub engine: CliEngine,
}

impl Workspace {
    pub fn open() -> Result<Self> {
        let work_dir = WorkDir::discover()?;
        let config = work_dir.load()?;
        let store = FileStore::open(work_dir.store_path(&config));
        let engine = TransitionEngine::with_settings(store, TracingNotifier, config.engine_settings());
        Ok(Self {
            work_dir,
            config,
            engine,
        })
    }

    pub fn store(&self) -> &FileStore {
        self.engine.store()
    }

    /// Actor for `--user`; the role comes from the stored user record.
    pub fn actor(&self, user_id: UserId) -> Result<Actor> {
        let data = self.store().snapshot()?;
        let user = data
            .users
            .get(&user_id)
            .ok_or_else(|| WorkflowError::not_found(format!("user {user_id}")))?;
        if !user.is_active {
            return Err(WorkflowError::forbidden(format!("user {user_id} is inactive")).into());
        }
        Ok(user.actor())
    }
}

pub fn print_transition(result: &TransitionResult) {
    println!("{} {}", "✓".green().bold(), result.message);
    let stage = result
        .new_stage_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("  {:<16} {}", "Status:".dimmed(), result.new_status.cyan());
    println!("  {:<16} {}", "Stage:".dimmed(), stage);
    if let Some(level) = result.executive_level {
        println!("  {:<16} {}", "Executive level:".dimmed(), level);
    }
}

pub fn section(title: &str) {
    println!("\n{}", title.bold());
    println!("{}", "─".repeat(40).dimmed());
}

/// Attach the failed action to an engine error, keeping it downcastable
/// for exit code mapping.
pub fn with_case_context<T>(
    result: Result<T, WorkflowError>,
    action: &str,
    case_id: u64,
) -> Result<T> {
    result
        .map_err(anyhow::Error::from)
        .with_context(|| format!("Failed to {action} case {case_id}"))
}
