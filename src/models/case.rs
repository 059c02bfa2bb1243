use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{CaseId, CaseTypeId, StageId, UserId};

/// A welfare-assistance case moving through the review pipeline.
///
/// Invariant: when `current_workflow_stage_id` is set, `status` is a member of
/// that stage's configured status set. The synchronizer repairs drift on
/// every read and write path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub id: CaseId,
    /// Sequential display number
    pub case_number: u64,
    #[serde(default)]
    pub case_type_id: Option<CaseTypeId>,
    pub applicant_name: String,
    pub status: String,
    pub current_workflow_stage_id: Option<StageId>,
    /// Only meaningful while the case sits on the executive ladder
    #[serde(default)]
    pub current_executive_level: Option<i32>,
    /// Level that sent the case back for rework, kept for display and audit
    #[serde(default)]
    pub rework_requested_level: Option<i32>,
    #[serde(default)]
    pub assignee_id: Option<UserId>,
    pub created_by: UserId,
    #[serde(default)]
    pub workflow_history: Vec<WorkflowHistoryEntry>,
    /// Read by the SLA collaborator; reset whenever the stage pointer moves
    pub current_stage_entered_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency token, bumped on every committed write
    #[serde(default)]
    pub version: u64,
}

impl Case {
    /// Point the case at a stage. Resets the SLA entry timestamp only when
    /// the stage actually changes.
    pub fn move_to_stage(&mut self, stage_id: Option<StageId>, now: DateTime<Utc>) -> bool {
        if self.current_workflow_stage_id == stage_id {
            return false;
        }
        self.current_workflow_stage_id = stage_id;
        self.current_stage_entered_at = now;
        true
    }

    pub fn record_history(&mut self, actor_id: UserId, action: &str, now: DateTime<Utc>) {
        self.workflow_history.push(WorkflowHistoryEntry {
            stage_id: self.current_workflow_stage_id,
            actor_id,
            action: action.to_string(),
            timestamp: now,
        });
    }
}

/// Entry of a case's append-only workflow log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowHistoryEntry {
    pub stage_id: Option<StageId>,
    pub actor_id: UserId,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

/// Immutable audit row, one per committed transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: u64,
    pub case_id: CaseId,
    /// `None` on intake
    pub from_status: Option<String>,
    pub to_status: String,
    pub actor_id: UserId,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseComment {
    pub id: u64,
    pub case_id: CaseId,
    pub author_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
