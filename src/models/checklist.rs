use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CaseId, CaseTypeId, UserId};

/// Welfare checklist question. Welfare approval requires every active item
/// applicable to the case type to have at least one response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: u64,
    pub question: String,
    #[serde(default)]
    pub case_type_id: Option<CaseTypeId>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ChecklistItem {
    pub fn applies_to(&self, case_type_id: Option<CaseTypeId>) -> bool {
        self.case_type_id.is_none() || self.case_type_id == case_type_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistResponse {
    pub case_id: CaseId,
    pub item_id: u64,
    pub responder_id: UserId,
    pub answer: String,
    pub answered_at: DateTime<Utc>,
}

/// Answered vs configured checklist items for one case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistProgress {
    pub filled: usize,
    pub total: usize,
}

impl ChecklistProgress {
    pub fn is_complete(&self) -> bool {
        self.filled == self.total
    }
}

impl std::fmt::Display for ChecklistProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.filled, self.total)
    }
}
