//! End-to-end review pipeline over the file store

use caseflow::errors::WorkflowError;
use caseflow::store::CaseStore;
use caseflow::workflow::CaseAction;
use caseflow::TransitionAction;

use super::helpers::*;

#[test]
fn test_case_reaches_finance_across_invocations() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let id = drive_to_welfare(base);
    assert_eq!(stored_case(base, id).status, "submitted_to_welfare");

    complete_checklist(base, id);
    let engine = engine_at(base);
    engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), Some("all verified"))
        .unwrap();
    let engine = engine_at(base);
    engine
        .zonal_approve(id, &actor(&engine, ZONAL_INCHARGE), None)
        .unwrap();
    let engine = engine_at(base);
    let result = engine
        .executive_approve(id, &actor(&engine, DIRECTOR), None)
        .unwrap();
    assert_eq!(result.executive_level, Some(2));
    let engine = engine_at(base);
    let result = engine
        .executive_approve(id, &actor(&engine, TRUSTEE), Some("approved for disbursement"))
        .unwrap();
    assert_eq!(result.new_status, "finance_disbursement");

    let case = stored_case(base, id);
    assert_eq!(case.current_workflow_stage_id, Some(7));
    assert_eq!(case.current_executive_level, None);
    assert_eq!(case.workflow_history.len(), 8);

    let data = store_at(base).snapshot().unwrap();
    assert_eq!(data.status_history.len(), 8);
    assert_eq!(data.comments.len(), 2);
    assert!(data.notifications.iter().all(|n| n.case_id == id));
}

#[test]
fn test_welfare_rejection_loops_back_to_assignment() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let id = drive_to_welfare(base);

    let engine = engine_at(base);
    let officer = actor(&engine, WELFARE_OFFICER);
    let err = engine.welfare_reject(id, &officer, None).unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    engine
        .welfare_reject(id, &officer, Some("bank statement missing"))
        .unwrap();
    let case = stored_case(base, id);
    assert_eq!(case.status, "welfare_rejected");
    assert_eq!(case.current_workflow_stage_id, Some(2));

    // the assignee picks it up again from the assignment stage
    let engine = engine_at(base);
    let result = engine
        .apply_transition(id, &TransitionAction::Approve, &actor(&engine, CASE_WORKER), None)
        .unwrap();
    assert_eq!(result.new_status, "in_counseling");
}

#[test]
fn test_executive_rework_round_trip() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let id = drive_to_welfare(base);
    complete_checklist(base, id);
    let engine = engine_at(base);
    engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap();
    engine
        .zonal_approve(id, &actor(&engine, ZONAL_INCHARGE), None)
        .unwrap();

    let engine = engine_at(base);
    engine
        .executive_rework(id, &actor(&engine, DIRECTOR), Some("recheck income"))
        .unwrap();
    let case = stored_case(base, id);
    assert_eq!(case.status, "welfare_processing_rework");
    assert_eq!(case.rework_requested_level, Some(1));

    let engine = engine_at(base);
    let officer = actor(&engine, WELFARE_OFFICER);
    assert!(engine
        .available_actions(id, &officer)
        .unwrap()
        .contains(&CaseAction::ForwardRework));
    engine.forward_rework(id, &officer, None).unwrap();

    let case = stored_case(base, id);
    assert_eq!(case.status, "rework_required");
    assert_eq!(case.current_workflow_stage_id, Some(2));
    assert_eq!(case.rework_requested_level, None);
}

#[test]
fn test_failed_transition_leaves_file_untouched() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let id = drive_to_welfare(base);
    let before = store_at(base).snapshot().unwrap();

    let engine = engine_at(base);
    let err = engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
    assert_eq!(store_at(base).snapshot().unwrap(), before);
}

#[test]
fn test_case_numbers_are_sequential() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let engine = engine_at(base);
    let worker = actor(&engine, CASE_WORKER);
    let numbers: Vec<u64> = ["A", "B", "C"]
        .iter()
        .map(|name| engine.create_case(&worker, None, name).unwrap().case_number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}
