use crate::models::status;
use crate::models::CaseTypeId;

use super::types::{StageCategory, WorkflowStage};

impl WorkflowStage {
    pub fn new(id: u64, stage_key: &str, name: &str, sort_order: i32) -> Self {
        Self {
            id,
            stage_key: stage_key.to_string(),
            name: name.to_string(),
            sort_order,
            case_type_id: None,
            next_stage_id: None,
            associated_statuses: Vec::new(),
            requires_comments_on_reject: false,
            can_create_case: None,
            can_fill_case: None,
            is_active: true,
            is_executive: false,
            sla_hours: None,
        }
    }

    pub fn with_statuses(mut self, statuses: &[&str]) -> Self {
        self.associated_statuses = statuses.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn category(&self) -> StageCategory {
        if self.is_executive {
            return StageCategory::Executive;
        }
        StageCategory::of_key(&self.stage_key)
    }

    /// First configured status, if any
    pub fn canonical_status(&self) -> Option<&str> {
        self.associated_statuses.first().map(String::as_str)
    }

    /// Status a case receives on entering this stage: the canonical status,
    /// or `submitted_to_<stage_key>` when none is configured.
    pub fn entry_status(&self) -> String {
        self.canonical_status()
            .map(str::to_string)
            .unwrap_or_else(|| status::submitted_to(&self.stage_key))
    }

    pub fn has_status(&self, status: &str) -> bool {
        self.associated_statuses.iter().any(|s| s == status)
    }

    /// Whether this stage is usable for a case of the given type.
    /// Generic stages (`case_type_id = None`) apply to every type.
    pub fn applies_to(&self, case_type_id: Option<CaseTypeId>) -> bool {
        match (self.case_type_id, case_type_id) {
            (None, _) => true,
            (Some(own), Some(wanted)) => own == wanted,
            (Some(_), None) => false,
        }
    }

    pub fn is_type_specific(&self) -> bool {
        self.case_type_id.is_some()
    }

    pub fn key_contains(&self, fragment: &str) -> bool {
        self.stage_key.to_lowercase().contains(&fragment.to_lowercase())
    }
}
