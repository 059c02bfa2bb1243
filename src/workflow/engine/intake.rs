//! Intake, assignment, checklist and read operations

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::errors::{WorkflowError, WorkflowResult};
use crate::models::status::{self, ASSIGNED, WELFARE_PROCESSING_REWORK};
use crate::models::{
    Actor, Case, CaseId, CaseTypeId, ChecklistProgress, ChecklistResponse, StageAction,
    StageCategory, StatusHistoryEntry,
};
use crate::notify::NotificationSink;
use crate::store::CaseStore;
use crate::workflow::{ladder, sync};

use super::{Move, TransitionEngine, TransitionResult};

/// Action an actor can take on a case right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseAction {
    Approve,
    Reject,
    Rework,
    ForwardRework,
    Assign,
    FillChecklist,
}

impl fmt::Display for CaseAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseAction::Approve => write!(f, "approve"),
            CaseAction::Reject => write!(f, "reject"),
            CaseAction::Rework => write!(f, "rework"),
            CaseAction::ForwardRework => write!(f, "forward-rework"),
            CaseAction::Assign => write!(f, "assign"),
            CaseAction::FillChecklist => write!(f, "checklist"),
        }
    }
}

/// Case whose status was repaired by a reconciliation sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealedCase {
    pub case_id: CaseId,
    pub from: String,
    pub to: String,
}

impl<S: CaseStore, N: NotificationSink> TransitionEngine<S, N> {
    /// Open a case in the first active stage for its type.
    pub fn create_case(
        &self,
        actor: &Actor,
        case_type_id: Option<CaseTypeId>,
        applicant_name: &str,
    ) -> WorkflowResult<Case> {
        let applicant_name = applicant_name.trim();
        if applicant_name.is_empty() {
            return Err(WorkflowError::validation("applicant name is required"));
        }
        self.run(|tx, catalog| {
            let first = catalog.first_stage(case_type_id).ok_or_else(|| {
                WorkflowError::CatalogMisconfigured("no active stages to open a case in".into())
            })?;
            let user = self.user_context(tx, actor);
            if !self.permissions(catalog).can_create_case_in_stage(&user, first) {
                return Err(WorkflowError::forbidden(format!(
                    "user {} may not create cases in stage '{}'",
                    actor.user_id, first.name
                )));
            }

            let now = tx.now();
            let mut case = Case {
                id: 0,
                case_number: 0,
                case_type_id,
                applicant_name: applicant_name.to_string(),
                status: first.entry_status(),
                current_workflow_stage_id: Some(first.id),
                current_executive_level: None,
                rework_requested_level: None,
                assignee_id: None,
                created_by: actor.user_id,
                workflow_history: Vec::new(),
                current_stage_entered_at: now,
                created_at: now,
                updated_at: now,
                version: 0,
            };
            sync::reconcile(&mut case, catalog);
            case.record_history(actor.user_id, "create", now);
            let case = tx.insert_case(case);
            tx.append_status_history(case.id, None, &case.status, actor.user_id, None);
            info!(
                case_id = case.id,
                case_number = case.case_number,
                status = %case.status,
                stage_id = first.id,
                "case created"
            );
            Ok(case)
        })
    }

    /// Assign a case to a user and move it to the assignment stage.
    pub fn assign_case(
        &self,
        case_id: CaseId,
        assignee_id: u64,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            let (mut case, stage) = self.load(tx, catalog, case_id)?;
            let user = self.user_context(tx, actor);
            self.authorize(catalog, &user, &stage, StageAction::Edit)?;
            if !matches!(stage.category(), StageCategory::Draft | StageCategory::Assignment) {
                return Err(WorkflowError::invalid_state(format!(
                    "case {case_id} is in {} stage '{}'; only draft and assignment cases can be assigned",
                    stage.category(),
                    stage.name
                )));
            }
            match tx.user(assignee_id) {
                Some(assignee) if assignee.is_active => {}
                Some(_) => {
                    return Err(WorkflowError::validation(format!(
                        "user {assignee_id} is inactive"
                    )))
                }
                None => return Err(WorkflowError::not_found(format!("user {assignee_id}"))),
            }

            case.assignee_id = Some(assignee_id);
            let mv = Move::to_stage_or_keep(
                "assign",
                catalog.assignment_stage(case.case_type_id),
                ASSIGNED,
                "assignment",
            );
            self.commit(tx, catalog, case, &user, mv, comment)
        })
    }

    /// Record an answer to a checklist item; returns the case's progress.
    pub fn record_checklist_response(
        &self,
        case_id: CaseId,
        item_id: u64,
        answer: &str,
        actor: &Actor,
    ) -> WorkflowResult<ChecklistProgress> {
        if status::is_blank(Some(answer)) {
            return Err(WorkflowError::validation("checklist answer is empty"));
        }
        self.run(|tx, catalog| {
            let (case, stage) = self.load(tx, catalog, case_id)?;
            let user = self.user_context(tx, actor);
            if !self.permissions(catalog).can_fill_case_in_stage(&user, &stage) {
                return Err(WorkflowError::forbidden(format!(
                    "user {} may not fill cases in stage '{}'",
                    actor.user_id, stage.name
                )));
            }
            let item = tx
                .checklist_item(item_id)
                .ok_or_else(|| WorkflowError::not_found(format!("checklist item {item_id}")))?;
            if !item.is_active || !item.applies_to(case.case_type_id) {
                return Err(WorkflowError::validation(format!(
                    "checklist item {item_id} does not apply to case {case_id}"
                )));
            }

            let answered_at = tx.now();
            tx.record_checklist_response(ChecklistResponse {
                case_id,
                item_id,
                responder_id: actor.user_id,
                answer: answer.trim().to_string(),
                answered_at,
            });
            Ok(tx.checklist_progress(&case))
        })
    }

    /// Read a case, persisting a healed status if it drifted.
    pub fn get_case(&self, case_id: CaseId) -> WorkflowResult<Case> {
        self.run(|tx, catalog| sync::load_reconciled(tx, catalog, case_id))
    }

    /// Heal every case against the current catalog.
    pub fn reconcile_all(&self) -> WorkflowResult<Vec<HealedCase>> {
        self.run(|tx, catalog| {
            let ids: Vec<CaseId> = tx.cases().map(|c| c.id).collect();
            let mut healed = Vec::new();
            for case_id in ids {
                let mut case = tx.case(case_id)?;
                if let Some(from) = sync::reconcile(&mut case, catalog) {
                    tx.update_case(&mut case)?;
                    healed.push(HealedCase {
                        case_id,
                        from,
                        to: case.status.clone(),
                    });
                }
            }
            info!(healed = healed.len(), "reconciliation sweep finished");
            Ok(healed)
        })
    }

    /// Actions `actor` may perform on the case in its current state.
    pub fn available_actions(&self, case_id: CaseId, actor: &Actor) -> WorkflowResult<Vec<CaseAction>> {
        self.run(|tx, catalog| {
            let (case, stage) = self.load(tx, catalog, case_id)?;
            let user = self.user_context(tx, actor);
            let resolver = self.permissions(catalog);
            let set = resolver.effective_permissions(&user, &stage);
            let mut actions = Vec::new();

            let on_ladder = catalog.is_executive_stage(&stage) && case.current_executive_level.is_some();
            if on_ladder {
                let holds_level = case.current_executive_level.is_some_and(|level| {
                    ladder::check_level_holder(
                        &user,
                        level,
                        &self.settings.executive_role,
                        &self.settings.superuser_role,
                    )
                    .is_ok()
                });
                if holds_level {
                    if set.can_approve {
                        actions.push(CaseAction::Approve);
                    }
                    if set.can_reject {
                        actions.extend([CaseAction::Reject, CaseAction::Rework]);
                    }
                }
            } else {
                if set.can_approve && case.status != WELFARE_PROCESSING_REWORK {
                    actions.push(CaseAction::Approve);
                }
                if set.can_reject {
                    actions.push(CaseAction::Reject);
                    if case.status == WELFARE_PROCESSING_REWORK {
                        actions.push(CaseAction::ForwardRework);
                    }
                }
            }
            if set.can_edit
                && matches!(stage.category(), StageCategory::Draft | StageCategory::Assignment)
            {
                actions.push(CaseAction::Assign);
            }
            if resolver.can_fill_case_in_stage(&user, &stage) {
                actions.push(CaseAction::FillChecklist);
            }
            Ok(actions)
        })
    }

    /// Audit rows for a case, oldest first
    pub fn history(&self, case_id: CaseId) -> WorkflowResult<Vec<StatusHistoryEntry>> {
        self.run(|tx, _| {
            tx.case(case_id)?;
            Ok(tx.status_history(case_id))
        })
    }
}
