use serde::{Deserialize, Serialize};

use crate::models::{CaseTypeId, StageId};

/// One configured step of the review pipeline.
///
/// Stages are edited by administrators at any time, including while cases
/// are in flight, so nothing derived from a stage is cached on the case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStage {
    pub id: StageId,
    /// Machine key such as `welfare_review`; categories are derived from it
    pub stage_key: String,
    pub name: String,
    /// Defines the default linear path
    pub sort_order: i32,
    /// `None` applies to every case type
    #[serde(default)]
    pub case_type_id: Option<CaseTypeId>,
    /// Explicit successor, overriding order-based lookup
    #[serde(default)]
    pub next_stage_id: Option<StageId>,
    /// Ordered; the first entry is canonical
    #[serde(default)]
    pub associated_statuses: Vec<String>,
    #[serde(default)]
    pub requires_comments_on_reject: bool,
    /// `None` on catalogs migrated before capability flags existed
    #[serde(default)]
    pub can_create_case: Option<bool>,
    #[serde(default)]
    pub can_fill_case: Option<bool>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Marks the stage hosting the executive approval ladder
    #[serde(default)]
    pub is_executive: bool,
    /// SLA budget for the SLA collaborator; the engine only resets entry time
    #[serde(default)]
    pub sla_hours: Option<u32>,
}

fn default_active() -> bool {
    true
}

/// Coarse category of a stage, derived from its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageCategory {
    Draft,
    Assignment,
    Counseling,
    Welfare,
    Zonal,
    Executive,
    Finance,
    Other,
}

impl StageCategory {
    /// Classify a stage key by substring.
    pub fn of_key(stage_key: &str) -> Self {
        let key = stage_key.to_lowercase();
        if key.contains("draft") {
            StageCategory::Draft
        } else if key.contains("assign") {
            StageCategory::Assignment
        } else if key.contains("counsel") {
            StageCategory::Counseling
        } else if key.contains("finance") || key.contains("disburse") {
            StageCategory::Finance
        } else if key.contains("executive") {
            StageCategory::Executive
        } else if key.contains("welfare") {
            StageCategory::Welfare
        } else if key.contains("zonal") {
            StageCategory::Zonal
        } else {
            StageCategory::Other
        }
    }

    /// Administrative or terminal stages where approve/reject has no meaning,
    /// even for a superuser.
    pub fn is_non_approval(&self) -> bool {
        matches!(
            self,
            StageCategory::Draft
                | StageCategory::Assignment
                | StageCategory::Counseling
                | StageCategory::Finance
        )
    }
}

impl std::fmt::Display for StageCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageCategory::Draft => write!(f, "draft"),
            StageCategory::Assignment => write!(f, "assignment"),
            StageCategory::Counseling => write!(f, "counseling"),
            StageCategory::Welfare => write!(f, "welfare"),
            StageCategory::Zonal => write!(f, "zonal"),
            StageCategory::Executive => write!(f, "executive"),
            StageCategory::Finance => write!(f, "finance"),
            StageCategory::Other => write!(f, "other"),
        }
    }
}
