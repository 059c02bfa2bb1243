//! Catalog seed files
//!
//! A seed describes stages, ladder levels, grants, users and checklist
//! items. TOML, YAML and JSON are accepted, chosen by file extension.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::models::{
    ChecklistItem, ExecutiveLevel, RolePermission, User, UserPermission, WorkflowStage,
};

const STANDARD_CATALOG: &str = include_str!("../../demos/catalog.toml");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedFormat {
    Toml,
    Yaml,
    Json,
}

impl SeedFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "toml" => Ok(SeedFormat::Toml),
            "yaml" | "yml" => Ok(SeedFormat::Yaml),
            "json" => Ok(SeedFormat::Json),
            _ => bail!(
                "Unsupported catalog file extension for {}. Use .toml, .yaml or .json",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub stages: Vec<WorkflowStage>,
    #[serde(default)]
    pub executive_levels: Vec<ExecutiveLevel>,
    #[serde(default)]
    pub role_permissions: Vec<RolePermission>,
    #[serde(default)]
    pub user_permissions: Vec<UserPermission>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistItem>,
}

impl CatalogSeed {
    /// The built-in pipeline shipped in `demos/catalog.toml`
    pub fn standard() -> Result<Self> {
        Self::parse(STANDARD_CATALOG, SeedFormat::Toml).context("Failed to parse built-in catalog")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let format = SeedFormat::from_path(path)?;
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {}", path.display()))?;
        Self::parse(&content, format)
            .with_context(|| format!("Failed to parse catalog file: {}", path.display()))
    }

    pub fn parse(content: &str, format: SeedFormat) -> Result<Self> {
        let seed: CatalogSeed = match format {
            SeedFormat::Toml => toml::from_str(content)?,
            SeedFormat::Yaml => serde_yaml::from_str(content)?,
            SeedFormat::Json => serde_json::from_str(content)?,
        };
        seed.validate()?;
        Ok(seed)
    }

    /// Structural checks that do not depend on existing cases
    pub fn validate(&self) -> Result<()> {
        let mut stage_ids = HashSet::new();
        for stage in &self.stages {
            if !stage_ids.insert(stage.id) {
                bail!("Duplicate stage id {}", stage.id);
            }
            if stage.stage_key.trim().is_empty() {
                bail!("Stage {} has an empty stage_key", stage.id);
            }
        }
        for stage in &self.stages {
            if let Some(next) = stage.next_stage_id {
                if next == stage.id {
                    bail!("Stage {} names itself as next stage", stage.id);
                }
                if !stage_ids.contains(&next) {
                    bail!("Stage {} names unknown next stage {}", stage.id, next);
                }
            }
        }

        let mut level_numbers = HashSet::new();
        for level in &self.executive_levels {
            if !level_numbers.insert(level.level_number) {
                bail!("Duplicate executive level {}", level.level_number);
            }
        }

        for perm in &self.role_permissions {
            if !stage_ids.contains(&perm.stage_id) {
                bail!(
                    "Role grant for '{}' references unknown stage {}",
                    perm.role,
                    perm.stage_id
                );
            }
        }
        for perm in &self.user_permissions {
            if !stage_ids.contains(&perm.stage_id) {
                bail!(
                    "User grant for user {} references unknown stage {}",
                    perm.user_id,
                    perm.stage_id
                );
            }
        }

        let mut user_ids = HashSet::new();
        for user in &self.users {
            if !user_ids.insert(user.id) {
                bail!("Duplicate user id {}", user.id);
            }
        }

        Ok(())
    }
}
