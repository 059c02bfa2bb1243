//! Read-only view of the configured stages, ladder levels and grants.
//!
//! A snapshot is built fresh from the store inside every transaction and
//! dropped with it. Administrators may edit the catalog between any two
//! transitions, so nothing here outlives a single call.

use crate::models::status;
use crate::models::{
    CaseTypeId, ExecutiveLevel, PermissionGrant, RolePermission, StageCategory, StageId,
    UserId, UserPermission, WorkflowStage,
};

#[derive(Debug, Clone, Default)]
pub struct StageCatalog {
    stages: Vec<WorkflowStage>,
    levels: Vec<ExecutiveLevel>,
    role_permissions: Vec<RolePermission>,
    user_permissions: Vec<UserPermission>,
}

impl StageCatalog {
    pub fn new(
        stages: Vec<WorkflowStage>,
        levels: Vec<ExecutiveLevel>,
        role_permissions: Vec<RolePermission>,
        user_permissions: Vec<UserPermission>,
    ) -> Self {
        Self {
            stages,
            levels,
            role_permissions,
            user_permissions,
        }
    }

    pub fn stage(&self, id: StageId) -> Option<&WorkflowStage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn stages(&self) -> &[WorkflowStage] {
        &self.stages
    }

    /// Active stages ordered by `sort_order`, then id
    pub fn active_stages(&self) -> Vec<&WorkflowStage> {
        let mut active: Vec<&WorkflowStage> = self.stages.iter().filter(|s| s.is_active).collect();
        active.sort_by_key(|s| (s.sort_order, s.id));
        active
    }

    /// Active stages usable for a case type (generic or type-specific)
    pub fn active_stages_for(&self, case_type_id: Option<CaseTypeId>) -> Vec<&WorkflowStage> {
        self.active_stages()
            .into_iter()
            .filter(|s| s.applies_to(case_type_id))
            .collect()
    }

    pub fn has_active_stages(&self) -> bool {
        self.stages.iter().any(|s| s.is_active)
    }

    /// First active stage for the case type, else the first active stage overall
    pub fn first_stage(&self, case_type_id: Option<CaseTypeId>) -> Option<&WorkflowStage> {
        self.active_stages_for(case_type_id)
            .into_iter()
            .next()
            .or_else(|| self.active_stages().into_iter().next())
    }

    /// Best active stage among `candidates`: type-specific beats generic,
    /// then ascending `sort_order`.
    fn best<'a>(candidates: impl Iterator<Item = &'a WorkflowStage>) -> Option<&'a WorkflowStage> {
        candidates.min_by_key(|s| (!s.is_type_specific(), s.sort_order, s.id))
    }

    /// Active stage whose key contains `fragment`. Draft stages only match a
    /// `draft` fragment, so "draft_assignment" never stands in for assignment.
    pub fn find_by_key(
        &self,
        fragment: &str,
        case_type_id: Option<CaseTypeId>,
    ) -> Option<&WorkflowStage> {
        let wants_draft = fragment.eq_ignore_ascii_case("draft");
        Self::best(self.active_stages_for(case_type_id).into_iter().filter(|s| {
            s.key_contains(fragment) && (wants_draft || !s.key_contains("draft"))
        }))
    }

    /// Active stage of a category
    pub fn find_by_category(
        &self,
        category: StageCategory,
        case_type_id: Option<CaseTypeId>,
    ) -> Option<&WorkflowStage> {
        Self::best(
            self.active_stages_for(case_type_id)
                .into_iter()
                .filter(|s| s.category() == category),
        )
    }

    /// Rework landing point for rejections
    pub fn assignment_stage(&self, case_type_id: Option<CaseTypeId>) -> Option<&WorkflowStage> {
        self.find_by_key("assign", case_type_id)
    }

    pub fn welfare_stage(&self, case_type_id: Option<CaseTypeId>) -> Option<&WorkflowStage> {
        self.find_by_category(StageCategory::Welfare, case_type_id)
    }

    pub fn zonal_stage(&self, case_type_id: Option<CaseTypeId>) -> Option<&WorkflowStage> {
        self.find_by_category(StageCategory::Zonal, case_type_id)
    }

    pub fn finance_stage(&self, case_type_id: Option<CaseTypeId>) -> Option<&WorkflowStage> {
        self.find_by_key("finance", case_type_id)
            .or_else(|| self.find_by_key("disbursement", case_type_id))
    }

    /// Stage hosting the ladder: the flagged stage, else one keyed "executive"
    pub fn executive_stage(&self, case_type_id: Option<CaseTypeId>) -> Option<&WorkflowStage> {
        Self::best(
            self.active_stages_for(case_type_id)
                .into_iter()
                .filter(|s| s.is_executive),
        )
        .or_else(|| self.find_by_key("executive", case_type_id))
    }

    pub fn is_executive_stage(&self, stage: &WorkflowStage) -> bool {
        self.executive_stage(stage.case_type_id)
            .is_some_and(|exec| exec.id == stage.id)
    }

    /// Active ladder levels ordered by `sort_order`, then level number
    pub fn active_levels(&self) -> Vec<&ExecutiveLevel> {
        let mut active: Vec<&ExecutiveLevel> = self.levels.iter().filter(|l| l.is_active).collect();
        active.sort_by_key(|l| (l.sort_order, l.level_number));
        active
    }

    /// Level by number, active or not
    pub fn level(&self, level_number: i32) -> Option<&ExecutiveLevel> {
        self.levels.iter().find(|l| l.level_number == level_number)
    }

    pub fn levels(&self) -> &[ExecutiveLevel] {
        &self.levels
    }

    /// Whether `status` is a legal resting status for a case in `stage`.
    ///
    /// The executive stage additionally accepts `submitted_to_executive_<n>`
    /// for every active level, since the ladder composes those statuses
    /// independently of the configured set.
    pub fn allows_status(&self, stage: &WorkflowStage, status: &str) -> bool {
        if stage.has_status(status) {
            return true;
        }
        if let Some(level) = status::executive_level_of(status) {
            return self.is_executive_stage(stage)
                && self.active_levels().iter().any(|l| l.level_number == level);
        }
        false
    }

    /// Role grants on a stage for any of the given roles
    pub fn role_grants<'a>(
        &'a self,
        stage_id: StageId,
        roles: &'a [String],
    ) -> impl Iterator<Item = &'a PermissionGrant> + 'a {
        self.role_permissions
            .iter()
            .filter(move |p| p.stage_id == stage_id && roles.contains(&p.role))
            .map(|p| &p.grant)
    }

    pub fn user_grant(&self, stage_id: StageId, user_id: UserId) -> Option<&PermissionGrant> {
        self.user_permissions
            .iter()
            .find(|p| p.stage_id == stage_id && p.user_id == user_id)
            .map(|p| &p.grant)
    }
}
