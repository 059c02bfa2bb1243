use tracing::{debug, warn};

use crate::catalog::StageCatalog;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::models::status::{self, REWORK_REQUIRED, WELFARE_PROCESSING_REWORK};
use crate::models::{
    Actor, Case, Severity, StageAction, StageCategory, UserContext, WorkflowStage,
};
use crate::notify::NotificationSink;
use crate::store::{CaseStore, StoreTx};
use crate::workflow::ladder;
use crate::workflow::resolver::{self, ResolveContext};

use super::{Move, TransitionAction, TransitionEngine, TransitionResult};

impl<S: CaseStore, N: NotificationSink> TransitionEngine<S, N> {
    /// Approve, reject or move to a named status from the case's current stage.
    pub fn apply_transition(
        &self,
        case_id: u64,
        action: &TransitionAction,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| self.transition_in(tx, catalog, case_id, action, actor, comment))
    }

    /// [`apply_transition`](Self::apply_transition) against the case as the
    /// caller last saw it. Fails with [`WorkflowError::Conflict`] when the
    /// stored case has moved past `expected_version`.
    pub fn apply_transition_at_version(
        &self,
        case_id: u64,
        expected_version: u64,
        action: &TransitionAction,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            tx.require_version(case_id, expected_version)?;
            self.transition_in(tx, catalog, case_id, action, actor, comment)
        })
    }

    fn transition_in(
        &self,
        tx: &mut StoreTx<'_>,
        catalog: &StageCatalog,
        case_id: u64,
        action: &TransitionAction,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        let (case, stage) = self.load(tx, catalog, case_id)?;
        let user = self.user_context(tx, actor);
        debug!(case_id, action = %action, stage = %stage.stage_key, "applying transition");
        match action {
            TransitionAction::Approve => self.approve(tx, catalog, case, &stage, &user, comment),
            TransitionAction::Reject => self.reject(tx, catalog, case, &stage, &user, comment),
            TransitionAction::Custom(target) => {
                self.custom(tx, catalog, case, &stage, &user, target, comment)
            }
        }
    }

    fn approve(
        &self,
        tx: &mut StoreTx<'_>,
        catalog: &StageCatalog,
        case: Case,
        stage: &WorkflowStage,
        user: &UserContext,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.authorize(catalog, user, stage, StageAction::Approve)?;
        Self::require_not_in_rework(&case)?;
        if stage.category() == StageCategory::Welfare {
            Self::require_checklist(tx, &case)?;
        }

        if catalog.is_executive_stage(stage) {
            if let Some(level) = case.current_executive_level {
                let mv = self.ladder_approval(catalog, &case, user, level)?;
                return self.commit(tx, catalog, case, user, mv, comment);
            }
        }

        let mv = match resolver::successor(catalog, stage, case.case_type_id) {
            Some(next) => Self::entry_move("approve", catalog, next),
            None => Move::degraded(
                "approve",
                case.status.clone(),
                format!("no successor stage after '{}'", stage.stage_key),
            )
            .at_level(case.current_executive_level),
        };
        self.commit(tx, catalog, case, user, mv, comment)
    }

    /// Entering `next`: the executive stage starts the ladder at its first
    /// active level, every other stage takes its entry status.
    pub(super) fn entry_move(action: &str, catalog: &StageCatalog, next: &WorkflowStage) -> Move {
        if catalog.is_executive_stage(next) {
            if let Some(step) = ladder::enter(&catalog.active_levels()) {
                return Move::to_stage(action, next, step.new_status).at_level(step.new_level);
            }
            warn!(stage = %next.stage_key, "executive stage entered with no active levels");
        }
        Move::to_stage(action, next, next.entry_status())
    }

    /// One rung up the ladder, or out to finance from the last rung
    pub(super) fn ladder_approval(
        &self,
        catalog: &StageCatalog,
        case: &Case,
        user: &UserContext,
        level: i32,
    ) -> WorkflowResult<Move> {
        ladder::check_level_holder(
            user,
            level,
            &self.settings.executive_role,
            &self.settings.superuser_role,
        )?;
        if let Some(status_level) = status::executive_level_of(&case.status) {
            if status_level != level {
                return Err(WorkflowError::invalid_state(format!(
                    "case {} is '{}' but recorded at executive level {level}",
                    case.id, case.status
                )));
            }
        }

        let step = ladder::advance(level, &catalog.active_levels(), catalog)?;
        if step.exits_ladder() {
            return Ok(Move::to_stage_or_keep(
                "executive_approve",
                catalog.finance_stage(case.case_type_id),
                step.new_status,
                "finance",
            ));
        }
        Ok(Move::in_place("executive_approve", step.new_status).at_level(step.new_level))
    }

    /// Rejection always returns work to the assignment stage.
    fn reject(
        &self,
        tx: &mut StoreTx<'_>,
        catalog: &StageCatalog,
        mut case: Case,
        stage: &WorkflowStage,
        user: &UserContext,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.authorize(catalog, user, stage, StageAction::Reject)?;
        if catalog.is_executive_stage(stage) {
            if let Some(level) = case.current_executive_level {
                ladder::check_level_holder(
                    user,
                    level,
                    &self.settings.executive_role,
                    &self.settings.superuser_role,
                )?;
            }
        }
        Self::require_reject_comment(stage, comment)?;

        case.rework_requested_level = None;
        let mv = Move::to_stage_or_keep(
            "reject",
            catalog.assignment_stage(case.case_type_id),
            REWORK_REQUIRED,
            "assignment",
        )
        .severity(Severity::Warning);
        self.commit(tx, catalog, case, user, mv, comment)
    }

    /// Move to an administrator-defined status. The stage is resolved from
    /// the status; with an empty catalog the stage pointer stays put.
    ///
    /// Custom moves stay inside the reviewed path: they may go back, stay on
    /// the stage, or go forward to the direct successor under the same rules
    /// as an approval. The executive ladder and finance are only reached by
    /// approving.
    #[allow(clippy::too_many_arguments)]
    fn custom(
        &self,
        tx: &mut StoreTx<'_>,
        catalog: &StageCatalog,
        case: Case,
        stage: &WorkflowStage,
        user: &UserContext,
        target: &str,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.authorize(catalog, user, stage, StageAction::Review)?;
        Self::require_not_in_rework(&case)?;
        if Self::approval_only(catalog, stage) {
            return Err(WorkflowError::invalid_state(format!(
                "case {} is in stage '{}'; use approve, reject or rework",
                case.id, stage.name
            )));
        }
        if target == WELFARE_PROCESSING_REWORK {
            return Err(WorkflowError::invalid_state(format!(
                "status '{target}' is only entered by an executive rework"
            )));
        }

        let ctx = ResolveContext {
            catalog,
            case_type_id: case.case_type_id,
            current_stage_id: Some(stage.id),
        };
        let Some(next) = resolver::resolve_stage_for_status(target, &ctx).and_then(|id| catalog.stage(id))
        else {
            let mv = Move::degraded(target, target, "no active stages configured".to_string());
            return self.commit(tx, catalog, case, user, mv, comment);
        };

        if next.id != stage.id {
            if Self::approval_only(catalog, next) {
                return Err(WorkflowError::invalid_state(format!(
                    "status '{target}' belongs to stage '{}', which is only reached by approval",
                    next.name
                )));
            }
            let is_successor = resolver::successor(catalog, stage, case.case_type_id)
                .is_some_and(|s| s.id == next.id);
            if next.sort_order > stage.sort_order && !is_successor {
                return Err(WorkflowError::invalid_state(format!(
                    "status '{target}' would skip from '{}' past the next stage to '{}'",
                    stage.name, next.name
                )));
            }
            if is_successor {
                self.authorize(catalog, user, stage, StageAction::Approve)?;
                if stage.category() == StageCategory::Welfare {
                    Self::require_checklist(tx, &case)?;
                }
            }
        }

        let mv = Move::to_stage(target, next, target);
        self.commit(tx, catalog, case, user, mv, comment)
    }

    /// Ladder and disbursement stages, entered and left only by approval
    fn approval_only(catalog: &StageCatalog, stage: &WorkflowStage) -> bool {
        catalog.is_executive_stage(stage)
            || matches!(stage.category(), StageCategory::Executive | StageCategory::Finance)
    }
}
