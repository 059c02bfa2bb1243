use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{
    Case, CaseComment, CaseId, ChecklistItem, ChecklistResponse, ExecutiveLevel, Notification,
    RolePermission, StatusHistoryEntry, User, UserId, UserPermission, WorkflowStage,
};

/// Everything the engine persists, as one serializable document.
///
/// Stores hand a private copy of this to each transaction and only replace
/// the durable copy when the transaction succeeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub last_case_id: CaseId,
    #[serde(default)]
    pub last_case_number: u64,
    #[serde(default)]
    pub last_history_id: u64,
    #[serde(default)]
    pub last_comment_id: u64,
    #[serde(default)]
    pub cases: BTreeMap<CaseId, Case>,
    #[serde(default)]
    pub stages: Vec<WorkflowStage>,
    #[serde(default)]
    pub executive_levels: Vec<ExecutiveLevel>,
    #[serde(default)]
    pub role_permissions: Vec<RolePermission>,
    #[serde(default)]
    pub user_permissions: Vec<UserPermission>,
    #[serde(default)]
    pub users: BTreeMap<UserId, User>,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,
    #[serde(default)]
    pub comments: Vec<CaseComment>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub checklist_items: Vec<ChecklistItem>,
    #[serde(default)]
    pub checklist_responses: Vec<ChecklistResponse>,
}
