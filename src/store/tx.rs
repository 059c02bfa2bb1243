//! Transaction handle over a private copy of the dataset.

use chrono::{DateTime, Utc};

use crate::catalog::StageCatalog;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::models::{
    Case, CaseComment, CaseId, ChecklistItem, ChecklistProgress, ChecklistResponse,
    Notification, StatusHistoryEntry, User, UserId,
};

use super::dataset::Dataset;

/// Longest comment body the store accepts
pub const MAX_COMMENT_LEN: usize = 4000;

/// Typed access to the store inside one transaction.
///
/// All writes land in the transaction's working copy; the owning store
/// decides whether to keep or discard them.
pub struct StoreTx<'a> {
    data: &'a mut Dataset,
    now: DateTime<Utc>,
}

impl<'a> StoreTx<'a> {
    pub(crate) fn new(data: &'a mut Dataset) -> Self {
        Self {
            data,
            now: Utc::now(),
        }
    }

    /// Timestamp shared by every write in this transaction
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn data(&self) -> &Dataset {
        &*self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut Dataset {
        &mut *self.data
    }

    /// Fresh catalog snapshot from the transaction's view of the store
    pub fn catalog(&self) -> StageCatalog {
        StageCatalog::new(
            self.data.stages.clone(),
            self.data.executive_levels.clone(),
            self.data.role_permissions.clone(),
            self.data.user_permissions.clone(),
        )
    }

    pub fn case(&self, case_id: CaseId) -> WorkflowResult<Case> {
        self.data
            .cases
            .get(&case_id)
            .cloned()
            .ok_or_else(|| WorkflowError::not_found(format!("case {case_id}")))
    }

    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.data.cases.values()
    }

    /// Insert a new case, assigning its id, display number and first version
    pub fn insert_case(&mut self, mut case: Case) -> Case {
        self.data.last_case_id += 1;
        self.data.last_case_number += 1;
        case.id = self.data.last_case_id;
        case.case_number = self.data.last_case_number;
        case.version = 1;
        case.created_at = self.now;
        case.updated_at = self.now;
        self.data.cases.insert(case.id, case.clone());
        case
    }

    /// Fails with [`WorkflowError::Conflict`] unless the stored case is at
    /// `expected` version.
    pub fn require_version(&self, case_id: CaseId, expected: u64) -> WorkflowResult<()> {
        let stored = self
            .data
            .cases
            .get(&case_id)
            .ok_or_else(|| WorkflowError::not_found(format!("case {case_id}")))?;
        if stored.version != expected {
            return Err(WorkflowError::Conflict(format!(
                "case {case_id} was modified concurrently (expected version {expected}, stored version {})",
                stored.version
            )));
        }
        Ok(())
    }

    /// Write back a case loaded earlier in this or a previous transaction.
    ///
    /// Fails with [`WorkflowError::Conflict`] when the stored version moved
    /// since the case was read; bumps the version on success.
    pub fn update_case(&mut self, case: &mut Case) -> WorkflowResult<()> {
        self.require_version(case.id, case.version)?;
        case.version += 1;
        case.updated_at = self.now;
        self.data.cases.insert(case.id, case.clone());
        Ok(())
    }

    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.data.users.get(&user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.data.users.values()
    }

    pub fn upsert_user(&mut self, user: User) {
        self.data.users.insert(user.id, user);
    }

    pub fn append_status_history(
        &mut self,
        case_id: CaseId,
        from_status: Option<&str>,
        to_status: &str,
        actor_id: UserId,
        comment: Option<&str>,
    ) -> StatusHistoryEntry {
        self.data.last_history_id += 1;
        let entry = StatusHistoryEntry {
            id: self.data.last_history_id,
            case_id,
            from_status: from_status.map(str::to_string),
            to_status: to_status.to_string(),
            actor_id,
            comment: comment.map(str::to_string),
            created_at: self.now,
        };
        self.data.status_history.push(entry.clone());
        entry
    }

    pub fn status_history(&self, case_id: CaseId) -> Vec<StatusHistoryEntry> {
        self.data
            .status_history
            .iter()
            .filter(|e| e.case_id == case_id)
            .cloned()
            .collect()
    }

    /// Append a comment. Bodies over [`MAX_COMMENT_LEN`] characters are
    /// rejected by the store, failing the surrounding transaction.
    pub fn append_comment(
        &mut self,
        case_id: CaseId,
        author_id: UserId,
        body: &str,
    ) -> WorkflowResult<CaseComment> {
        let len = body.chars().count();
        if len > MAX_COMMENT_LEN {
            return Err(WorkflowError::Store(anyhow::anyhow!(
                "comment on case {case_id} is {len} characters (max {MAX_COMMENT_LEN})"
            )));
        }
        self.data.last_comment_id += 1;
        let comment = CaseComment {
            id: self.data.last_comment_id,
            case_id,
            author_id,
            body: body.to_string(),
            created_at: self.now,
        };
        self.data.comments.push(comment.clone());
        Ok(comment)
    }

    pub fn comments(&self, case_id: CaseId) -> Vec<&CaseComment> {
        self.data
            .comments
            .iter()
            .filter(|c| c.case_id == case_id)
            .collect()
    }

    pub fn queue_notification(&mut self, notification: Notification) {
        self.data.notifications.push(notification);
    }

    pub fn checklist_item(&self, item_id: u64) -> Option<&ChecklistItem> {
        self.data.checklist_items.iter().find(|i| i.id == item_id)
    }

    pub fn record_checklist_response(&mut self, response: ChecklistResponse) {
        self.data.checklist_responses.push(response);
    }

    /// Active checklist items applicable to the case vs. those answered at
    /// least once.
    pub fn checklist_progress(&self, case: &Case) -> ChecklistProgress {
        let items: Vec<&ChecklistItem> = self
            .data
            .checklist_items
            .iter()
            .filter(|i| i.is_active && i.applies_to(case.case_type_id))
            .collect();
        let filled = items
            .iter()
            .filter(|item| {
                self.data
                    .checklist_responses
                    .iter()
                    .any(|r| r.case_id == case.id && r.item_id == item.id)
            })
            .count();
        ChecklistProgress {
            filled,
            total: items.len(),
        }
    }
}
