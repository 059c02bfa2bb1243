use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use super::types_case::CaseCommands;

#[derive(Parser)]
#[command(name = "caseflow")]
#[command(about = "Welfare case workflow engine", long_about = None)]
#[command(version)]
#[command(subcommand_help_heading = "Commands")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize .caseflow/ with a stage catalog
    Init {
        /// Catalog seed (TOML, YAML or JSON); the standard catalog if omitted
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Inspect or replace the stage catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },

    /// Create and move cases through the workflow
    Case {
        #[command(subcommand)]
        command: CaseCommands,
    },

    /// Heal every case whose status drifted from its stage
    Reconcile,

    /// Report status usage and drifted cases without changing anything
    Diagnose {
        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a user's effective permissions on a stage
    Permissions {
        /// User ID
        user: u64,

        /// Stage ID
        stage: u64,
    },
}

#[derive(Subcommand)]
pub enum CatalogCommands {
    /// Replace stages, levels and grants from a seed file
    Import {
        /// Path to the seed file
        path: PathBuf,
    },

    /// List stages in workflow order
    Show,
}
