//! Transition engine
//!
//! Every operation is one store transaction:
//! - load the case and heal status drift against a fresh catalog snapshot
//! - authorize the actor on the case's current stage
//! - compute the next status, stage and ladder level
//! - write the case, the audit row, the comment and the outbox rows
//!
//! Notifications are delivered after commit and never fail a transition.

mod generic;
mod intake;
mod specialized;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::catalog::StageCatalog;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::models::status::WELFARE_PROCESSING_REWORK;
use crate::models::{
    Actor, Case, Notification, Severity, StageAction, StageCategory, StageId, UserContext,
    WorkflowStage,
};
use crate::notify::{self, NotificationSink};
use crate::store::{CaseStore, StoreTx};

use super::permissions::PermissionResolver;
use super::sync;

pub use intake::{CaseAction, HealedCase};

/// Roles and switches the engine needs from configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub superuser_role: String,
    pub executive_role: String,
    pub notifications_enabled: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            superuser_role: "super_admin".to_string(),
            executive_role: "executive".to_string(),
            notifications_enabled: true,
        }
    }
}

/// Generic action on a case's current stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionAction {
    Approve,
    Reject,
    /// Move to an administrator-defined status, resolved to a stage
    Custom(String),
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionAction::Approve => write!(f, "approve"),
            TransitionAction::Reject => write!(f, "reject"),
            TransitionAction::Custom(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for TransitionAction {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "" => Err(WorkflowError::validation("transition action is empty")),
            "approve" => Ok(TransitionAction::Approve),
            "reject" => Ok(TransitionAction::Reject),
            _ => Ok(TransitionAction::Custom(trimmed.to_string())),
        }
    }
}

/// Outcome reported to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionResult {
    pub new_status: String,
    pub new_stage_id: Option<StageId>,
    pub executive_level: Option<i32>,
    pub message: String,
}

/// Next state computed by an operation, before it is written
#[derive(Debug, Clone)]
struct Move {
    /// Workflow history label
    action: String,
    /// `None` keeps the current stage pointer
    stage_id: Option<StageId>,
    status: String,
    executive_level: Option<i32>,
    severity: Severity,
    /// Set when the catalog could not supply a target stage
    gap: Option<String>,
}

impl Move {
    fn to_stage(action: &str, stage: &WorkflowStage, status: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            stage_id: Some(stage.id),
            status: status.into(),
            executive_level: None,
            severity: Severity::Info,
            gap: None,
        }
    }

    fn in_place(action: &str, status: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            stage_id: None,
            status: status.into(),
            executive_level: None,
            severity: Severity::Info,
            gap: None,
        }
    }

    /// Target stage lookup failed: keep the stage pointer, still write the
    /// status and history.
    fn degraded(action: &str, status: impl Into<String>, gap: String) -> Self {
        Self {
            gap: Some(gap),
            ..Self::in_place(action, status)
        }
    }

    /// `stage` when found, else a degraded in-place move
    fn to_stage_or_keep(
        action: &str,
        stage: Option<&WorkflowStage>,
        status: impl Into<String>,
        missing: &str,
    ) -> Self {
        match stage {
            Some(stage) => Self::to_stage(action, stage, status),
            None => Self::degraded(action, status, format!("no active {missing} stage configured")),
        }
    }

    fn at_level(mut self, level: Option<i32>) -> Self {
        self.executive_level = level;
        self
    }

    fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

pub struct TransitionEngine<S, N> {
    store: S,
    sink: N,
    settings: EngineSettings,
}

impl<S: CaseStore, N: NotificationSink> TransitionEngine<S, N> {
    pub fn new(store: S, sink: N) -> Self {
        Self::with_settings(store, sink, EngineSettings::default())
    }

    pub fn with_settings(store: S, sink: N, settings: EngineSettings) -> Self {
        Self {
            store,
            sink,
            settings,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Run `f` in one transaction against a fresh catalog snapshot, then
    /// deliver the notifications it queued.
    fn run<T, F>(&self, f: F) -> WorkflowResult<T>
    where
        F: FnOnce(&mut StoreTx<'_>, &StageCatalog) -> WorkflowResult<T>,
    {
        let (output, outbox) = self.store.transaction(|tx| {
            let catalog = tx.catalog();
            let queued_before = tx.data().notifications.len();
            let output = f(tx, &catalog)?;
            let outbox = tx.data().notifications[queued_before..].to_vec();
            Ok((output, outbox))
        })?;
        if !outbox.is_empty() {
            notify::dispatch(&self.sink, &outbox);
        }
        Ok(output)
    }

    fn permissions<'c>(&'c self, catalog: &'c StageCatalog) -> PermissionResolver<'c> {
        PermissionResolver::new(catalog, &self.settings.superuser_role)
    }

    fn user_context(&self, tx: &StoreTx<'_>, actor: &Actor) -> UserContext {
        UserContext::resolve(actor, tx.user(actor.user_id))
    }

    fn authorize(
        &self,
        catalog: &StageCatalog,
        user: &UserContext,
        stage: &WorkflowStage,
        action: StageAction,
    ) -> WorkflowResult<()> {
        if self.permissions(catalog).can(user, stage, action) {
            Ok(())
        } else {
            Err(WorkflowError::forbidden(format!(
                "user {} may not {action} cases in stage '{}'",
                user.user_id, stage.name
            )))
        }
    }

    /// Case with drift healed, plus its current stage
    fn load(
        &self,
        tx: &mut StoreTx<'_>,
        catalog: &StageCatalog,
        case_id: u64,
    ) -> WorkflowResult<(Case, WorkflowStage)> {
        let case = sync::load_reconciled(tx, catalog, case_id)?;
        let stage_id = case.current_workflow_stage_id.ok_or_else(|| {
            WorkflowError::not_found(format!("workflow stage of case {case_id}"))
        })?;
        let stage = catalog
            .stage(stage_id)
            .cloned()
            .ok_or_else(|| WorkflowError::not_found(format!("stage {stage_id}")))?;
        if !stage.is_active {
            return Err(WorkflowError::invalid_state(format!(
                "stage '{}' is inactive",
                stage.name
            )));
        }
        Ok((case, stage))
    }

    fn require_status(case: &Case, expected: &str) -> WorkflowResult<()> {
        if case.status == expected {
            Ok(())
        } else {
            Err(WorkflowError::invalid_state(format!(
                "case {} is '{}', expected '{expected}'",
                case.id, case.status
            )))
        }
    }

    /// A case in welfare rework only leaves through `forward_rework`.
    fn require_not_in_rework(case: &Case) -> WorkflowResult<()> {
        if case.status == WELFARE_PROCESSING_REWORK {
            return Err(WorkflowError::invalid_state(format!(
                "case {} is in executive rework; forward the rework to the assignee instead",
                case.id
            )));
        }
        Ok(())
    }

    fn require_category(
        case: &Case,
        stage: &WorkflowStage,
        expected: StageCategory,
    ) -> WorkflowResult<()> {
        if stage.category() == expected {
            Ok(())
        } else {
            Err(WorkflowError::invalid_state(format!(
                "case {} is in {} stage '{}', expected a {expected} stage",
                case.id,
                stage.category(),
                stage.name
            )))
        }
    }

    /// Welfare sign-off needs every applicable checklist item answered.
    fn require_checklist(tx: &StoreTx<'_>, case: &Case) -> WorkflowResult<()> {
        let progress = tx.checklist_progress(case);
        if progress.is_complete() {
            Ok(())
        } else {
            Err(WorkflowError::validation(format!(
                "checklist incomplete: {progress} items answered"
            )))
        }
    }

    fn require_reject_comment(stage: &WorkflowStage, comment: Option<&str>) -> WorkflowResult<()> {
        if stage.requires_comments_on_reject && crate::models::status::is_blank(comment) {
            return Err(WorkflowError::validation(format!(
                "stage '{}' requires a comment when rejecting",
                stage.name
            )));
        }
        Ok(())
    }

    /// Apply a computed move and write everything it implies.
    fn commit(
        &self,
        tx: &mut StoreTx<'_>,
        catalog: &StageCatalog,
        mut case: Case,
        user: &UserContext,
        mv: Move,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        let now = tx.now();
        let from = case.status.clone();
        if let Some(stage_id) = mv.stage_id {
            case.move_to_stage(Some(stage_id), now);
        }
        case.status = mv.status;
        case.current_executive_level = mv.executive_level;
        // A degraded move records its status even when the kept stage does
        // not list it; the next read heals it.
        if mv.gap.is_none() {
            sync::reconcile(&mut case, catalog);
        }
        if case.status != WELFARE_PROCESSING_REWORK {
            case.rework_requested_level = None;
        }

        let label = match &mv.gap {
            Some(gap) => {
                warn!(
                    case_id = case.id,
                    action = %mv.action,
                    stage_id = ?case.current_workflow_stage_id,
                    "{gap}; stage pointer left unchanged"
                );
                format!("{} ({gap})", mv.action)
            }
            None => mv.action.clone(),
        };
        case.record_history(user.user_id, &label, now);
        tx.update_case(&mut case)?;

        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        tx.append_status_history(case.id, Some(&from), &case.status, user.user_id, comment);
        if let Some(body) = comment {
            tx.append_comment(case.id, user.user_id, body)?;
        }
        if self.settings.notifications_enabled {
            self.queue_notifications(tx, catalog, &case, user, &mv.action, mv.severity);
        }

        info!(
            case_id = case.id,
            action = %mv.action,
            from = %from,
            to = %case.status,
            stage_id = ?case.current_workflow_stage_id,
            executive_level = ?case.current_executive_level,
            "transition committed"
        );

        let mut message = format!(
            "Case #{} {}: {} -> {}",
            case.case_number, mv.action, from, case.status
        );
        if let Some(gap) = mv.gap {
            message.push_str(&format!(" (stage unchanged: {gap})"));
        }
        Ok(TransitionResult {
            new_status: case.status,
            new_stage_id: case.current_workflow_stage_id,
            executive_level: case.current_executive_level,
            message,
        })
    }

    /// Outbox rows for the assignee and for everyone who can view the new
    /// stage and act on it. The actor is never notified of their own action.
    fn queue_notifications(
        &self,
        tx: &mut StoreTx<'_>,
        catalog: &StageCatalog,
        case: &Case,
        user: &UserContext,
        action: &str,
        severity: Severity,
    ) {
        let mut recipients: Vec<u64> = case.assignee_id.into_iter().collect();
        if let Some(stage) = case.current_workflow_stage_id.and_then(|id| catalog.stage(id)) {
            let resolver = self.permissions(catalog);
            let watchers: Vec<u64> = tx
                .users()
                .filter(|u| u.is_active)
                .filter(|u| {
                    let ctx = UserContext::resolve(&u.actor(), Some(u));
                    let set = resolver.effective_permissions(&ctx, stage);
                    set.can_view && (set.can_approve || set.can_edit)
                })
                .map(|u| u.id)
                .collect();
            recipients.extend(watchers);
        }
        recipients.sort_unstable();
        recipients.dedup();
        recipients.retain(|id| *id != user.user_id);

        let title = format!("Case #{} {action}", case.case_number);
        let message = format!(
            "Case #{} ({}) is now '{}'",
            case.case_number, case.applicant_name, case.status
        );
        let now = tx.now();
        for user_id in recipients {
            tx.queue_notification(Notification {
                id: Uuid::new_v4(),
                user_id,
                case_id: case.id,
                title: title.clone(),
                message: message.clone(),
                severity,
                created_at: now,
            });
        }
    }
}

#[cfg(test)]
mod tests;
