//! Stage permission grants and the merged permission set.

use serde::{Deserialize, Serialize};

use crate::models::{StageId, UserId};

/// Action a user may perform on a case sitting in a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageAction {
    View,
    Edit,
    Delete,
    Approve,
    Reject,
    Review,
    CreateCase,
    FillCase,
}

impl StageAction {
    pub const ALL: [StageAction; 8] = [
        StageAction::View,
        StageAction::Edit,
        StageAction::Delete,
        StageAction::Approve,
        StageAction::Reject,
        StageAction::Review,
        StageAction::CreateCase,
        StageAction::FillCase,
    ];
}

impl std::fmt::Display for StageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageAction::View => write!(f, "view"),
            StageAction::Edit => write!(f, "edit"),
            StageAction::Delete => write!(f, "delete"),
            StageAction::Approve => write!(f, "approve"),
            StageAction::Reject => write!(f, "reject"),
            StageAction::Review => write!(f, "review"),
            StageAction::CreateCase => write!(f, "create"),
            StageAction::FillCase => write!(f, "fill"),
        }
    }
}

impl std::str::FromStr for StageAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(StageAction::View),
            "edit" => Ok(StageAction::Edit),
            "delete" => Ok(StageAction::Delete),
            "approve" => Ok(StageAction::Approve),
            "reject" => Ok(StageAction::Reject),
            "review" => Ok(StageAction::Review),
            "create" | "create_case" => Ok(StageAction::CreateCase),
            "fill" | "fill_case" => Ok(StageAction::FillCase),
            _ => anyhow::bail!(
                "Invalid action: {s}. Use: view, edit, delete, approve, reject, review, create, fill"
            ),
        }
    }
}

/// Nullable per-field grant. `None` means "not specified here".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_view: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_delete: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_approve: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_reject: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_review: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_create_case: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_fill_case: Option<bool>,
}

impl PermissionGrant {
    pub fn get(&self, action: StageAction) -> Option<bool> {
        match action {
            StageAction::View => self.can_view,
            StageAction::Edit => self.can_edit,
            StageAction::Delete => self.can_delete,
            StageAction::Approve => self.can_approve,
            StageAction::Reject => self.can_reject,
            StageAction::Review => self.can_review,
            StageAction::CreateCase => self.can_create_case,
            StageAction::FillCase => self.can_fill_case,
        }
    }

    pub fn set(&mut self, action: StageAction, value: Option<bool>) {
        let slot = match action {
            StageAction::View => &mut self.can_view,
            StageAction::Edit => &mut self.can_edit,
            StageAction::Delete => &mut self.can_delete,
            StageAction::Approve => &mut self.can_approve,
            StageAction::Reject => &mut self.can_reject,
            StageAction::Review => &mut self.can_review,
            StageAction::CreateCase => &mut self.can_create_case,
            StageAction::FillCase => &mut self.can_fill_case,
        };
        *slot = value;
    }

    /// Builder-style helper used by seeds and tests
    pub fn allowing(actions: &[StageAction]) -> Self {
        let mut grant = Self::default();
        for action in actions {
            grant.set(*action, Some(true));
        }
        grant
    }
}

/// Grant for every holder of a role on one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePermission {
    pub stage_id: StageId,
    pub role: String,
    #[serde(flatten)]
    pub grant: PermissionGrant,
}

/// Grant for a single user on one stage; overrides role grants field-by-field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPermission {
    pub stage_id: StageId,
    pub user_id: UserId,
    #[serde(flatten)]
    pub grant: PermissionGrant,
}

/// Effective, fully-resolved permissions of one user on one stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_approve: bool,
    pub can_reject: bool,
    pub can_review: bool,
    pub can_create_case: bool,
    pub can_fill_case: bool,
}

impl PermissionSet {
    pub fn all() -> Self {
        Self {
            can_view: true,
            can_edit: true,
            can_delete: true,
            can_approve: true,
            can_reject: true,
            can_review: true,
            can_create_case: true,
            can_fill_case: true,
        }
    }

    pub fn allows(&self, action: StageAction) -> bool {
        match action {
            StageAction::View => self.can_view,
            StageAction::Edit => self.can_edit,
            StageAction::Delete => self.can_delete,
            StageAction::Approve => self.can_approve,
            StageAction::Reject => self.can_reject,
            StageAction::Review => self.can_review,
            StageAction::CreateCase => self.can_create_case,
            StageAction::FillCase => self.can_fill_case,
        }
    }

    pub fn set(&mut self, action: StageAction, value: bool) {
        let slot = match action {
            StageAction::View => &mut self.can_view,
            StageAction::Edit => &mut self.can_edit,
            StageAction::Delete => &mut self.can_delete,
            StageAction::Approve => &mut self.can_approve,
            StageAction::Reject => &mut self.can_reject,
            StageAction::Review => &mut self.can_review,
            StageAction::CreateCase => &mut self.can_create_case,
            StageAction::FillCase => &mut self.can_fill_case,
        };
        *slot = value;
    }

    /// Actions currently granted, in declaration order
    pub fn granted(&self) -> Vec<StageAction> {
        StageAction::ALL
            .into_iter()
            .filter(|a| self.allows(*a))
            .collect()
    }
}
