//! Well-known case status values.
//!
//! Status is a free-form string validated against the configured stage's
//! status set, never a closed enum. These are the values the engine itself
//! writes; administrators may add others through the stage catalog.

pub const DRAFT: &str = "draft";
pub const ASSIGNED: &str = "assigned";
pub const IN_COUNSELING: &str = "in_counseling";
pub const SUBMITTED_TO_WELFARE: &str = "submitted_to_welfare";
pub const WELFARE_PROCESSING_REWORK: &str = "welfare_processing_rework";
pub const WELFARE_REJECTED: &str = "welfare_rejected";
pub const SUBMITTED_TO_ZONAL: &str = "submitted_to_zonal";
pub const ZONAL_REJECTED: &str = "zonal_rejected";
pub const REWORK_REQUIRED: &str = "rework_required";

/// Terminal pre-disbursement status. Reconciliation never moves a case off it.
pub const FINANCE_DISBURSEMENT: &str = "finance_disbursement";

const EXECUTIVE_PREFIX: &str = "submitted_to_executive_";

/// Status of a case waiting at the given executive level
pub fn executive_status(level_number: i32) -> String {
    format!("{EXECUTIVE_PREFIX}{level_number}")
}

/// Parse the level number out of a `submitted_to_executive_<n>` status
pub fn executive_level_of(status: &str) -> Option<i32> {
    status.strip_prefix(EXECUTIVE_PREFIX)?.parse().ok()
}

/// Generated status for a stage with no configured status set
pub fn submitted_to(stage_key: &str) -> String {
    format!("submitted_to_{stage_key}")
}

pub fn is_blank(text: Option<&str>) -> bool {
    text.is_none_or(|t| t.trim().is_empty())
}
