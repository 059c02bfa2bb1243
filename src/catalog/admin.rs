//! Catalog administration
//!
//! Stages, levels and grants may change while cases are in flight. None of
//! these operations touch cases; drift they introduce is repaired by the
//! synchronizer the next time each case is read or transitioned.

use tracing::info;

use crate::errors::{WorkflowError, WorkflowResult};
use crate::models::{ExecutiveLevel, RolePermission, StageId, UserPermission, WorkflowStage};
use crate::store::StoreTx;

use super::seed::CatalogSeed;

fn misconfigured(err: impl std::fmt::Display) -> WorkflowError {
    WorkflowError::CatalogMisconfigured(err.to_string())
}

/// Replace stages, levels, grants and checklist items with the seed's.
/// Users are upserted; cases are left untouched.
pub fn import_seed(tx: &mut StoreTx<'_>, seed: CatalogSeed) -> WorkflowResult<()> {
    seed.validate().map_err(misconfigured)?;
    let stage_count = seed.stages.len();
    let level_count = seed.executive_levels.len();

    let data = tx.data_mut();
    data.stages = seed.stages;
    data.executive_levels = seed.executive_levels;
    data.role_permissions = seed.role_permissions;
    data.user_permissions = seed.user_permissions;
    data.checklist_items = seed.checklist_items;
    for user in seed.users {
        data.users.insert(user.id, user);
    }

    info!(stages = stage_count, levels = level_count, "catalog imported");
    Ok(())
}

fn stage_mut<'a>(tx: &'a mut StoreTx<'_>, stage_id: StageId) -> WorkflowResult<&'a mut WorkflowStage> {
    tx.data_mut()
        .stages
        .iter_mut()
        .find(|s| s.id == stage_id)
        .ok_or_else(|| WorkflowError::not_found(format!("stage {stage_id}")))
}

/// Insert a new stage or replace the one with the same id
pub fn upsert_stage(tx: &mut StoreTx<'_>, stage: WorkflowStage) -> WorkflowResult<()> {
    if let Some(next) = stage.next_stage_id {
        if next == stage.id || !tx.data().stages.iter().any(|s| s.id == next) {
            return Err(misconfigured(format!(
                "stage {} names unusable next stage {next}",
                stage.id
            )));
        }
    }
    let stages = &mut tx.data_mut().stages;
    match stages.iter_mut().find(|s| s.id == stage.id) {
        Some(existing) => *existing = stage,
        None => stages.push(stage),
    }
    Ok(())
}

/// Move a stage within the default linear path
pub fn move_stage(tx: &mut StoreTx<'_>, stage_id: StageId, sort_order: i32) -> WorkflowResult<()> {
    stage_mut(tx, stage_id)?.sort_order = sort_order;
    Ok(())
}

pub fn rename_stage(tx: &mut StoreTx<'_>, stage_id: StageId, name: &str) -> WorkflowResult<()> {
    stage_mut(tx, stage_id)?.name = name.to_string();
    Ok(())
}

/// Replace a stage's status set; the first entry becomes canonical
pub fn set_stage_statuses(
    tx: &mut StoreTx<'_>,
    stage_id: StageId,
    statuses: Vec<String>,
) -> WorkflowResult<()> {
    stage_mut(tx, stage_id)?.associated_statuses = statuses;
    Ok(())
}

/// Point a stage at an explicit successor, or clear it with `None`
pub fn set_next_stage(
    tx: &mut StoreTx<'_>,
    stage_id: StageId,
    next: Option<StageId>,
) -> WorkflowResult<()> {
    if let Some(next_id) = next {
        if next_id == stage_id {
            return Err(misconfigured(format!("stage {stage_id} cannot follow itself")));
        }
        if !tx.data().stages.iter().any(|s| s.id == next_id) {
            return Err(WorkflowError::not_found(format!("stage {next_id}")));
        }
    }
    stage_mut(tx, stage_id)?.next_stage_id = next;
    Ok(())
}

pub fn set_stage_active(tx: &mut StoreTx<'_>, stage_id: StageId, active: bool) -> WorkflowResult<()> {
    stage_mut(tx, stage_id)?.is_active = active;
    Ok(())
}

/// Replace the executive ladder
pub fn set_executive_levels(
    tx: &mut StoreTx<'_>,
    levels: Vec<ExecutiveLevel>,
) -> WorkflowResult<()> {
    let mut seen = std::collections::HashSet::new();
    for level in &levels {
        if !seen.insert(level.level_number) {
            return Err(misconfigured(format!(
                "duplicate executive level {}",
                level.level_number
            )));
        }
    }
    tx.data_mut().executive_levels = levels;
    Ok(())
}

/// Set the grant for a (stage, role) pair, replacing any existing one
pub fn grant_role(tx: &mut StoreTx<'_>, permission: RolePermission) -> WorkflowResult<()> {
    stage_mut(tx, permission.stage_id)?;
    let grants = &mut tx.data_mut().role_permissions;
    grants.retain(|p| !(p.stage_id == permission.stage_id && p.role == permission.role));
    grants.push(permission);
    Ok(())
}

/// Set the override for a (stage, user) pair, replacing any existing one
pub fn grant_user(tx: &mut StoreTx<'_>, permission: UserPermission) -> WorkflowResult<()> {
    stage_mut(tx, permission.stage_id)?;
    let grants = &mut tx.data_mut().user_permissions;
    grants.retain(|p| !(p.stage_id == permission.stage_id && p.user_id == permission.user_id));
    grants.push(permission);
    Ok(())
}
