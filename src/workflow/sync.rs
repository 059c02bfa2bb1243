//! Status/stage synchronization
//!
//! A case's free-form `status` must be a member of its current stage's
//! configured status set. Because administrators can change status sets at
//! any time, membership is computed on every read and write instead of
//! being trusted, and drift is repaired by picking a canonical status.

use tracing::{debug, info};

use crate::catalog::StageCatalog;
use crate::errors::WorkflowResult;
use crate::models::status::{ASSIGNED, DRAFT, FINANCE_DISBURSEMENT};
use crate::models::Case;
use crate::store::StoreTx;

/// Status the case should have, or `None` when it is already consistent.
///
/// Rules, in order:
/// - no stage pointer, unknown stage, or empty status set: nothing to heal against
/// - `finance_disbursement` is never downgraded
/// - members (including ladder statuses on the executive stage) are kept
/// - otherwise the canonical status, except that "assigned" is never implied
///   for a case without an assignee
pub fn reconcile_status(case: &Case, catalog: &StageCatalog) -> Option<String> {
    let stage = catalog.stage(case.current_workflow_stage_id?)?;
    if stage.associated_statuses.is_empty() || case.status == FINANCE_DISBURSEMENT {
        return None;
    }
    if catalog.allows_status(stage, &case.status) {
        return None;
    }

    let canonical = stage.canonical_status()?;
    if canonical == ASSIGNED && case.assignee_id.is_none() {
        let substitute = if stage.has_status(DRAFT) {
            DRAFT
        } else {
            stage
                .associated_statuses
                .iter()
                .map(String::as_str)
                .find(|s| *s != ASSIGNED)
                .unwrap_or(canonical)
        };
        return Some(substitute.to_string());
    }
    Some(canonical.to_string())
}

/// Apply [`reconcile_status`] in place. Returns the replaced status when a
/// change was made.
pub fn reconcile(case: &mut Case, catalog: &StageCatalog) -> Option<String> {
    let healed = reconcile_status(case, catalog)?;
    debug!(
        case_id = case.id,
        from = %case.status,
        to = %healed,
        stage_id = ?case.current_workflow_stage_id,
        "status drifted from stage; healing"
    );
    Some(std::mem::replace(&mut case.status, healed))
}

/// Load a case and persist a healed status if it drifted.
///
/// Idempotent: a consistent case is returned unchanged and nothing is
/// written.
pub fn load_reconciled(tx: &mut StoreTx<'_>, catalog: &StageCatalog, case_id: u64) -> WorkflowResult<Case> {
    let mut case = tx.case(case_id)?;
    if let Some(previous) = reconcile(&mut case, catalog) {
        tx.update_case(&mut case)?;
        info!(
            case_id = case.id,
            from = %previous,
            to = %case.status,
            "persisted reconciled status"
        );
    }
    Ok(case)
}
