//! Fixed-route transitions for stages with their own business rules

use crate::catalog::StageCatalog;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::models::status::{
    FINANCE_DISBURSEMENT, REWORK_REQUIRED, SUBMITTED_TO_WELFARE, SUBMITTED_TO_ZONAL,
    WELFARE_PROCESSING_REWORK, WELFARE_REJECTED, ZONAL_REJECTED,
};
use crate::models::{Actor, Case, Severity, StageAction, StageCategory, WorkflowStage};
use crate::notify::NotificationSink;
use crate::store::CaseStore;
use crate::workflow::ladder;

use super::{Move, TransitionEngine, TransitionResult};

impl<S: CaseStore, N: NotificationSink> TransitionEngine<S, N> {
    /// Welfare sign-off. Every applicable checklist item must have a response.
    pub fn welfare_approve(
        &self,
        case_id: u64,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            let (case, stage) = self.load(tx, catalog, case_id)?;
            Self::require_category(&case, &stage, StageCategory::Welfare)?;
            Self::require_status(&case, SUBMITTED_TO_WELFARE)?;
            let user = self.user_context(tx, actor);
            self.authorize(catalog, &user, &stage, StageAction::Approve)?;

            Self::require_checklist(tx, &case)?;

            let mv = Move::to_stage_or_keep(
                "welfare_approve",
                catalog.zonal_stage(case.case_type_id),
                SUBMITTED_TO_ZONAL,
                "zonal",
            );
            self.commit(tx, catalog, case, &user, mv, comment)
        })
    }

    pub fn welfare_reject(
        &self,
        case_id: u64,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            let (case, stage) = self.load(tx, catalog, case_id)?;
            Self::require_category(&case, &stage, StageCategory::Welfare)?;
            Self::require_status(&case, SUBMITTED_TO_WELFARE)?;
            let user = self.user_context(tx, actor);
            self.authorize(catalog, &user, &stage, StageAction::Reject)?;
            Self::require_reject_comment(&stage, comment)?;

            let mv = Move::to_stage_or_keep(
                "welfare_reject",
                catalog.assignment_stage(case.case_type_id),
                WELFARE_REJECTED,
                "assignment",
            )
            .severity(Severity::Warning);
            self.commit(tx, catalog, case, &user, mv, comment)
        })
    }

    /// Zonal sign-off; enters the executive ladder, or goes straight to
    /// finance when no ladder is configured.
    pub fn zonal_approve(
        &self,
        case_id: u64,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            let (case, stage) = self.load(tx, catalog, case_id)?;
            Self::require_category(&case, &stage, StageCategory::Zonal)?;
            Self::require_status(&case, SUBMITTED_TO_ZONAL)?;
            let user = self.user_context(tx, actor);
            self.authorize(catalog, &user, &stage, StageAction::Approve)?;

            let levels = catalog.active_levels();
            let mv = match (catalog.executive_stage(case.case_type_id), ladder::enter(&levels)) {
                (Some(executive), Some(step)) => {
                    Move::to_stage("zonal_approve", executive, step.new_status).at_level(step.new_level)
                }
                _ => Move::to_stage_or_keep(
                    "zonal_approve",
                    catalog.finance_stage(case.case_type_id),
                    FINANCE_DISBURSEMENT,
                    "finance",
                ),
            };
            self.commit(tx, catalog, case, &user, mv, comment)
        })
    }

    pub fn zonal_reject(
        &self,
        case_id: u64,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            let (case, stage) = self.load(tx, catalog, case_id)?;
            Self::require_category(&case, &stage, StageCategory::Zonal)?;
            Self::require_status(&case, SUBMITTED_TO_ZONAL)?;
            let user = self.user_context(tx, actor);
            self.authorize(catalog, &user, &stage, StageAction::Reject)?;
            Self::require_reject_comment(&stage, comment)?;

            let mv = Move::to_stage_or_keep(
                "zonal_reject",
                catalog.assignment_stage(case.case_type_id),
                ZONAL_REJECTED,
                "assignment",
            )
            .severity(Severity::Warning);
            self.commit(tx, catalog, case, &user, mv, comment)
        })
    }

    /// Approve at the case's current executive level.
    pub fn executive_approve(
        &self,
        case_id: u64,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            let (case, stage) = self.load(tx, catalog, case_id)?;
            let level = Self::require_ladder(catalog, &case, &stage)?;
            let user = self.user_context(tx, actor);
            self.authorize(catalog, &user, &stage, StageAction::Approve)?;
            let mv = self.ladder_approval(catalog, &case, &user, level)?;
            self.commit(tx, catalog, case, &user, mv, comment)
        })
    }

    /// First rework leg: the case leaves the ladder for the welfare stage.
    /// The requesting level is kept on the case until welfare forwards the
    /// rework to the assignee.
    pub fn executive_rework(
        &self,
        case_id: u64,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            let (mut case, stage) = self.load(tx, catalog, case_id)?;
            let level = Self::require_ladder(catalog, &case, &stage)?;
            let user = self.user_context(tx, actor);
            self.authorize(catalog, &user, &stage, StageAction::Reject)?;
            ladder::check_level_holder(
                &user,
                level,
                &self.settings.executive_role,
                &self.settings.superuser_role,
            )?;
            Self::require_reject_comment(&stage, comment)?;

            case.rework_requested_level = Some(level);
            let mv = Move::to_stage_or_keep(
                "executive_rework",
                catalog.welfare_stage(case.case_type_id),
                WELFARE_PROCESSING_REWORK,
                "welfare",
            )
            .at_level(Some(level))
            .severity(Severity::Warning);
            self.commit(tx, catalog, case, &user, mv, comment)
        })
    }

    /// Second rework leg: welfare hands the case back to the assignee and
    /// the ladder state is cleared.
    pub fn forward_rework(
        &self,
        case_id: u64,
        actor: &Actor,
        comment: Option<&str>,
    ) -> WorkflowResult<TransitionResult> {
        self.run(|tx, catalog| {
            let (mut case, stage) = self.load(tx, catalog, case_id)?;
            Self::require_status(&case, WELFARE_PROCESSING_REWORK)?;
            let user = self.user_context(tx, actor);
            self.authorize(catalog, &user, &stage, StageAction::Reject)?;

            case.rework_requested_level = None;
            let mv = Move::to_stage_or_keep(
                "forward_rework",
                catalog.assignment_stage(case.case_type_id),
                REWORK_REQUIRED,
                "assignment",
            )
            .severity(Severity::Warning);
            self.commit(tx, catalog, case, &user, mv, comment)
        })
    }

    fn require_ladder(catalog: &StageCatalog, case: &Case, stage: &WorkflowStage) -> WorkflowResult<i32> {
        if !catalog.is_executive_stage(stage) {
            return Err(WorkflowError::invalid_state(format!(
                "case {} is in stage '{}', not on the executive ladder",
                case.id, stage.name
            )));
        }
        case.current_executive_level.ok_or_else(|| {
            WorkflowError::invalid_state(format!("case {} has no executive level", case.id))
        })
    }
}
