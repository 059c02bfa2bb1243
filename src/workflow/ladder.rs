//! Executive approval ladder
//!
//! A strictly ordered walk over active executive levels, nested inside the
//! executive stage. Advancing a rung changes status and level but never the
//! stage pointer; leaving the last rung exits to finance.

use crate::catalog::StageCatalog;
use crate::errors::{WorkflowError, WorkflowResult};
use crate::models::status::{self, FINANCE_DISBURSEMENT};
use crate::models::{ExecutiveLevel, UserContext};

/// Outcome of one ladder move
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LadderStep {
    pub new_status: String,
    /// `None` when the case leaves the ladder
    pub new_level: Option<i32>,
}

impl LadderStep {
    fn at(level: &ExecutiveLevel) -> Self {
        Self {
            new_status: status::executive_status(level.level_number),
            new_level: Some(level.level_number),
        }
    }

    fn exit() -> Self {
        Self {
            new_status: FINANCE_DISBURSEMENT.to_string(),
            new_level: None,
        }
    }

    pub fn exits_ladder(&self) -> bool {
        self.new_level.is_none()
    }
}

/// First rung, for a case entering the executive stage. `None` when no
/// level is active.
pub fn enter(levels: &[&ExecutiveLevel]) -> Option<LadderStep> {
    levels.first().map(|level| LadderStep::at(level))
}

/// Approve at `current_level`.
///
/// `levels` must be the active levels in ladder order. A level deactivated
/// while a case sat on it is resolved through the full catalog: the case
/// moves on to the next active level ordered after it.
pub fn advance(
    current_level: i32,
    levels: &[&ExecutiveLevel],
    catalog: &StageCatalog,
) -> WorkflowResult<LadderStep> {
    let next = match levels.iter().position(|l| l.level_number == current_level) {
        Some(index) => levels.get(index + 1),
        None => {
            let retired = catalog.level(current_level).ok_or_else(|| {
                WorkflowError::not_found(format!("executive level {current_level}"))
            })?;
            levels
                .iter()
                .find(|l| (l.sort_order, l.level_number) > (retired.sort_order, retired.level_number))
        }
    };
    Ok(match next {
        Some(level) => LadderStep::at(level),
        None => LadderStep::exit(),
    })
}

/// Holders of the executive role may only act on their own rung; a
/// superuser acts on any.
pub fn check_level_holder(
    user: &UserContext,
    case_level: i32,
    executive_role: &str,
    superuser_role: &str,
) -> WorkflowResult<()> {
    if user.has_role(superuser_role) || !user.has_role(executive_role) {
        return Ok(());
    }
    match user.executive_level {
        Some(level) if level == case_level => Ok(()),
        Some(level) => Err(WorkflowError::forbidden(format!(
            "user {} signs at executive level {level}, case is waiting at level {case_level}",
            user.user_id
        ))),
        None => Err(WorkflowError::forbidden(format!(
            "user {} holds no executive level; case is waiting at level {case_level}",
            user.user_id
        ))),
    }
}
