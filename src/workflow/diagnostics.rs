//! Case-status diagnostics
//!
//! Read-only audit of the self-healing logic: every status in use, and the
//! cases whose status is not a legal resting status for their stage. Nothing
//! here writes, so drift is reported exactly as stored.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::StageCatalog;
use crate::models::{CaseId, StageId};
use crate::store::Dataset;

use super::sync;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusUsage {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMismatch {
    pub case_id: CaseId,
    pub case_number: u64,
    pub status: String,
    pub stage_id: Option<StageId>,
    pub stage_key: Option<String>,
    /// Status reconciliation would write, when one exists
    pub healed_status: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticsReport {
    pub total_cases: usize,
    /// Sorted by status name
    pub statuses: Vec<StatusUsage>,
    pub mismatches: Vec<StatusMismatch>,
}

impl DiagnosticsReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

pub fn diagnose(data: &Dataset) -> DiagnosticsReport {
    let catalog = StageCatalog::new(
        data.stages.clone(),
        data.executive_levels.clone(),
        data.role_permissions.clone(),
        data.user_permissions.clone(),
    );

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    let mut mismatches = Vec::new();
    for case in data.cases.values() {
        *counts.entry(case.status.as_str()).or_default() += 1;

        let Some(stage_id) = case.current_workflow_stage_id else {
            continue;
        };
        let reason = match catalog.stage(stage_id) {
            None => Some(format!("stage {stage_id} does not exist")),
            Some(stage) if stage.associated_statuses.is_empty() || catalog.allows_status(stage, &case.status) => None,
            Some(stage) => Some(format!(
                "'{}' is not a status of stage '{}'",
                case.status, stage.stage_key
            )),
        };
        if let Some(reason) = reason {
            mismatches.push(StatusMismatch {
                case_id: case.id,
                case_number: case.case_number,
                status: case.status.clone(),
                stage_id: Some(stage_id),
                stage_key: catalog.stage(stage_id).map(|s| s.stage_key.clone()),
                healed_status: sync::reconcile_status(case, &catalog),
                reason,
            });
        }
    }

    DiagnosticsReport {
        total_cases: data.cases.len(),
        statuses: counts
            .into_iter()
            .map(|(status, count)| StatusUsage {
                status: status.to_string(),
                count,
            })
            .collect(),
        mismatches,
    }
}
