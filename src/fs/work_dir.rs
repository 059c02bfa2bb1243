use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Name of the work directory created by `caseflow init`
pub const WORK_DIR_NAME: &str = ".caseflow";

/// Overrides the directory `.caseflow/` is looked up in
pub const HOME_ENV: &str = "CASEFLOW_HOME";

pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            root: base_path.as_ref().join(WORK_DIR_NAME),
        }
    }

    /// Work directory under `$CASEFLOW_HOME`, else under the current directory
    pub fn discover() -> Result<Self> {
        match std::env::var_os(HOME_ENV) {
            Some(home) if !home.is_empty() => Ok(Self::new(PathBuf::from(home))),
            _ => {
                let cwd = std::env::current_dir().context("Failed to read current directory")?;
                Ok(Self::new(cwd))
            }
        }
    }

    pub fn initialize(&self, config: &Config) -> Result<()> {
        if self.root.exists() {
            bail!("{WORK_DIR_NAME} directory already exists");
        }
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create {WORK_DIR_NAME} directory"))?;
        config.save(&self.config_path())?;
        self.create_readme()?;
        Ok(())
    }

    pub fn load(&self) -> Result<Config> {
        if !self.root.exists() {
            bail!("{WORK_DIR_NAME} directory does not exist. Run 'caseflow init' first.");
        }
        Config::load(&self.config_path())
    }

    fn create_readme(&self) -> Result<()> {
        let readme_content = r#"# caseflow Work Directory

This directory is managed by the caseflow CLI and contains:

- `config.toml` - Role names, notification and logging settings
- `store.json` - Cases, stage catalog, permissions and audit history
- `store.lock` - Lock file serializing concurrent commands

Edit the stage catalog with `caseflow catalog import`, not by hand.
"#;
        fs::write(self.root.join("README.md"), readme_content)
            .context("Failed to create README.md")?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn store_path(&self, config: &Config) -> PathBuf {
        self.root.join(&config.store.file)
    }
}
