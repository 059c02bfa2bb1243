pub mod case;
pub mod checklist;
pub mod executive;
pub mod notification;
pub mod permission;
pub mod stage;
pub mod status;
pub mod user;

pub type CaseId = u64;
pub type StageId = u64;
pub type UserId = u64;
pub type CaseTypeId = u64;

pub use case::{Case, CaseComment, StatusHistoryEntry, WorkflowHistoryEntry};
pub use checklist::{ChecklistItem, ChecklistProgress, ChecklistResponse};
pub use executive::ExecutiveLevel;
pub use notification::{Notification, Severity};
pub use permission::{PermissionGrant, PermissionSet, RolePermission, StageAction, UserPermission};
pub use stage::{StageCategory, WorkflowStage};
pub use user::{Actor, User, UserContext};
