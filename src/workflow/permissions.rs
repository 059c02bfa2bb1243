//! Per-stage permission resolution
//!
//! Merge order: superuser override, then the OR of every role grant the
//! user holds on the stage, then the user's own grant field-by-field.
//! Anything still unset is denied.

use crate::catalog::StageCatalog;
use crate::models::{PermissionSet, StageAction, UserContext, WorkflowStage};

pub struct PermissionResolver<'a> {
    catalog: &'a StageCatalog,
    superuser_role: &'a str,
}

impl<'a> PermissionResolver<'a> {
    pub fn new(catalog: &'a StageCatalog, superuser_role: &'a str) -> Self {
        Self {
            catalog,
            superuser_role,
        }
    }

    pub fn effective_permissions(&self, user: &UserContext, stage: &WorkflowStage) -> PermissionSet {
        if user.has_role(self.superuser_role) {
            let mut set = PermissionSet::all();
            if stage.category().is_non_approval() {
                set.set(StageAction::Approve, false);
                set.set(StageAction::Reject, false);
            }
            return set;
        }

        let mut set = PermissionSet::default();
        for grant in self.catalog.role_grants(stage.id, &user.roles) {
            for action in StageAction::ALL {
                if grant.get(action) == Some(true) {
                    set.set(action, true);
                }
            }
        }
        if let Some(grant) = self.catalog.user_grant(stage.id, user.user_id) {
            for action in StageAction::ALL {
                if let Some(value) = grant.get(action) {
                    set.set(action, value);
                }
            }
        }
        set
    }

    pub fn can(&self, user: &UserContext, stage: &WorkflowStage, action: StageAction) -> bool {
        self.effective_permissions(user, stage).allows(action)
    }

    /// Stage flag `Some(false)` closes the stage to intake; `None` (an
    /// uninitialized catalog) falls back to create permission anywhere.
    pub fn can_create_case_in_stage(&self, user: &UserContext, stage: &WorkflowStage) -> bool {
        self.capability(user, stage, stage.can_create_case, StageAction::CreateCase)
    }

    pub fn can_fill_case_in_stage(&self, user: &UserContext, stage: &WorkflowStage) -> bool {
        self.capability(user, stage, stage.can_fill_case, StageAction::FillCase)
    }

    fn capability(
        &self,
        user: &UserContext,
        stage: &WorkflowStage,
        flag: Option<bool>,
        action: StageAction,
    ) -> bool {
        match flag {
            Some(false) => false,
            Some(true) => self.can(user, stage, action),
            None => self
                .catalog
                .stages()
                .iter()
                .filter(|s| s.is_active)
                .any(|s| self.can(user, s, action)),
        }
    }
}
