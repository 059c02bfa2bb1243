use crate::catalog::{admin, CatalogSeed};
use crate::errors::WorkflowError;
use crate::models::status::{
    FINANCE_DISBURSEMENT, REWORK_REQUIRED, SUBMITTED_TO_WELFARE, SUBMITTED_TO_ZONAL,
    WELFARE_PROCESSING_REWORK, WELFARE_REJECTED,
};
use crate::models::{
    Actor, Case, ExecutiveLevel, PermissionGrant, RolePermission, StageAction, User, WorkflowStage,
};
use crate::notify::RecordingNotifier;
use crate::store::{CaseStore, MemoryStore, MAX_COMMENT_LEN};

use super::*;

type TestEngine = TransitionEngine<MemoryStore, RecordingNotifier>;

// Users of the standard catalog
const ADMIN: u64 = 1;
const CASE_WORKER: u64 = 2;
const COUNSELOR: u64 = 3;
const WELFARE_OFFICER: u64 = 4;
const ZONAL_INCHARGE: u64 = 5;
const DIRECTOR: u64 = 6;
const TRUSTEE: u64 = 7;

fn seeded(sink: RecordingNotifier) -> TestEngine {
    let store = MemoryStore::new();
    let seed = CatalogSeed::standard().unwrap();
    store.transaction(|tx| admin::import_seed(tx, seed)).unwrap();
    TransitionEngine::new(store, sink)
}

fn engine() -> TestEngine {
    seeded(RecordingNotifier::new())
}

fn actor(engine: &TestEngine, user_id: u64) -> Actor {
    engine.store().snapshot().unwrap().users[&user_id].actor()
}

fn stored(engine: &TestEngine, case_id: u64) -> Case {
    engine.store().snapshot().unwrap().cases[&case_id].clone()
}

fn open_case(engine: &TestEngine) -> u64 {
    engine
        .create_case(&actor(engine, CASE_WORKER), None, "Amina Yusuf")
        .unwrap()
        .id
}

/// Case waiting at welfare review with its checklist unanswered
fn case_at_welfare(engine: &TestEngine) -> u64 {
    let id = open_case(engine);
    let worker = actor(engine, CASE_WORKER);
    engine.assign_case(id, CASE_WORKER, &worker, None).unwrap();
    engine
        .apply_transition(id, &TransitionAction::Approve, &worker, None)
        .unwrap();
    engine
        .apply_transition(id, &TransitionAction::Approve, &actor(engine, COUNSELOR), None)
        .unwrap();
    id
}

fn answer_checklist(engine: &TestEngine, case_id: u64, items: &[u64]) {
    let officer = actor(engine, WELFARE_OFFICER);
    for item in items {
        engine
            .record_checklist_response(case_id, *item, "yes", &officer)
            .unwrap();
    }
}

/// Case waiting at the first executive level
fn case_on_ladder(engine: &TestEngine) -> u64 {
    let id = case_at_welfare(engine);
    answer_checklist(engine, id, &[1, 2, 3]);
    engine
        .welfare_approve(id, &actor(engine, WELFARE_OFFICER), None)
        .unwrap();
    engine
        .zonal_approve(id, &actor(engine, ZONAL_INCHARGE), None)
        .unwrap();
    id
}

#[test]
fn test_full_pipeline_to_finance() {
    let engine = engine();
    let id = open_case(&engine);
    let case = stored(&engine, id);
    assert_eq!(case.status, "draft");
    assert_eq!(case.current_workflow_stage_id, Some(1));
    assert_eq!(case.case_number, 1);

    let worker = actor(&engine, CASE_WORKER);
    let result = engine.assign_case(id, CASE_WORKER, &worker, Some("taking this one")).unwrap();
    assert_eq!(result.new_status, "assigned");
    assert_eq!(result.new_stage_id, Some(2));

    let result = engine
        .apply_transition(id, &TransitionAction::Approve, &worker, None)
        .unwrap();
    assert_eq!(result.new_status, "in_counseling");
    assert_eq!(result.new_stage_id, Some(3));

    let result = engine
        .apply_transition(id, &TransitionAction::Approve, &actor(&engine, COUNSELOR), None)
        .unwrap();
    assert_eq!(result.new_status, SUBMITTED_TO_WELFARE);
    assert_eq!(result.new_stage_id, Some(4));

    answer_checklist(&engine, id, &[1, 2, 3]);
    let result = engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), Some("documents in order"))
        .unwrap();
    assert_eq!(result.new_status, SUBMITTED_TO_ZONAL);
    assert_eq!(result.new_stage_id, Some(5));

    let result = engine
        .zonal_approve(id, &actor(&engine, ZONAL_INCHARGE), None)
        .unwrap();
    assert_eq!(result.new_status, "submitted_to_executive_1");
    assert_eq!(result.new_stage_id, Some(6));
    assert_eq!(result.executive_level, Some(1));

    let result = engine
        .executive_approve(id, &actor(&engine, DIRECTOR), None)
        .unwrap();
    assert_eq!(result.new_status, "submitted_to_executive_2");
    assert_eq!(result.new_stage_id, Some(6));
    assert_eq!(result.executive_level, Some(2));

    let result = engine
        .executive_approve(id, &actor(&engine, TRUSTEE), None)
        .unwrap();
    assert_eq!(result.new_status, FINANCE_DISBURSEMENT);
    assert_eq!(result.new_stage_id, Some(7));
    assert_eq!(result.executive_level, None);
    assert!(result.message.starts_with("Case #1 executive_approve"));

    let history = engine.history(id).unwrap();
    assert_eq!(history.len(), 8);
    assert_eq!(history[0].from_status, None);
    assert_eq!(history[1].comment.as_deref(), Some("taking this one"));
    assert_eq!(history.last().unwrap().to_status, FINANCE_DISBURSEMENT);

    let case = stored(&engine, id);
    let actions: Vec<&str> = case.workflow_history.iter().map(|h| h.action.as_str()).collect();
    assert_eq!(
        actions,
        vec![
            "create",
            "assign",
            "approve",
            "approve",
            "welfare_approve",
            "zonal_approve",
            "executive_approve",
            "executive_approve",
        ]
    );
    assert_eq!(case.version, 8);
}

#[test]
fn test_create_requires_permission_in_first_stage() {
    let engine = engine();
    let err = engine
        .create_case(&actor(&engine, COUNSELOR), None, "Amina Yusuf")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
    assert!(engine.store().snapshot().unwrap().cases.is_empty());
}

#[test]
fn test_create_rejects_blank_applicant() {
    let engine = engine();
    let err = engine
        .create_case(&actor(&engine, CASE_WORKER), None, "   ")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[test]
fn test_create_with_empty_catalog_is_misconfigured() {
    let engine = TransitionEngine::new(MemoryStore::new(), RecordingNotifier::new());
    let err = engine
        .create_case(&Actor::new(1, "super_admin"), None, "Amina Yusuf")
        .unwrap_err();
    assert!(matches!(err, WorkflowError::CatalogMisconfigured(_)));
}

#[test]
fn test_approve_without_permission_is_forbidden() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    let before = stored(&engine, id);

    let err = engine
        .welfare_approve(id, &actor(&engine, COUNSELOR), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
    assert_eq!(stored(&engine, id), before);
}

#[test]
fn test_welfare_approve_needs_complete_checklist() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    answer_checklist(&engine, id, &[1, 2]);

    let err = engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap_err();
    match err {
        WorkflowError::Validation(msg) => assert!(msg.contains("2/3"), "got: {msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(stored(&engine, id).status, SUBMITTED_TO_WELFARE);
}

#[test]
fn test_generic_approve_on_welfare_stage_checks_checklist() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    let err = engine
        .apply_transition(id, &TransitionAction::Approve, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[test]
fn test_welfare_approve_from_wrong_status_is_invalid_state() {
    let engine = engine();
    let id = open_case(&engine);
    let err = engine
        .welfare_approve(id, &actor(&engine, ADMIN), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(_)));
}

#[test]
fn test_reject_requires_comment_where_configured() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    let officer = actor(&engine, WELFARE_OFFICER);

    for comment in [None, Some(""), Some("   ")] {
        let err = engine.welfare_reject(id, &officer, comment).unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    let result = engine
        .welfare_reject(id, &officer, Some("income proof missing"))
        .unwrap();
    assert_eq!(result.new_status, WELFARE_REJECTED);
    assert_eq!(result.new_stage_id, Some(2));

    let data = engine.store().snapshot().unwrap();
    assert_eq!(data.comments.len(), 1);
    assert_eq!(data.comments[0].body, "income proof missing");
}

#[test]
fn test_zonal_reject_returns_to_assignment() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    answer_checklist(&engine, id, &[1, 2, 3]);
    engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap();

    let result = engine
        .zonal_reject(id, &actor(&engine, ZONAL_INCHARGE), Some("wrong zone"))
        .unwrap();
    assert_eq!(result.new_status, "zonal_rejected");
    assert_eq!(result.new_stage_id, Some(2));
}

#[test]
fn test_ladder_binds_executives_to_their_level() {
    let engine = engine();
    let id = case_on_ladder(&engine);

    let err = engine
        .executive_approve(id, &actor(&engine, TRUSTEE), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    engine
        .executive_approve(id, &actor(&engine, DIRECTOR), None)
        .unwrap();
    let err = engine
        .executive_approve(id, &actor(&engine, DIRECTOR), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[test]
fn test_superuser_acts_on_any_rung() {
    let engine = engine();
    let id = case_on_ladder(&engine);
    let admin = actor(&engine, ADMIN);

    let result = engine
        .apply_transition(id, &TransitionAction::Approve, &admin, None)
        .unwrap();
    assert_eq!(result.executive_level, Some(2));
    let result = engine
        .apply_transition(id, &TransitionAction::Approve, &admin, None)
        .unwrap();
    assert_eq!(result.new_status, FINANCE_DISBURSEMENT);
    assert_eq!(result.new_stage_id, Some(7));
}

#[test]
fn test_retired_level_advances_to_next_active() {
    let engine = engine();
    let id = case_on_ladder(&engine);
    engine
        .store()
        .transaction(|tx| {
            admin::set_executive_levels(
                tx,
                vec![
                    {
                        let mut retired = ExecutiveLevel::new(1, "Program Director", 1);
                        retired.is_active = false;
                        retired
                    },
                    ExecutiveLevel::new(2, "Board Trustee", 2),
                ],
            )
        })
        .unwrap();

    let result = engine
        .executive_approve(id, &actor(&engine, ADMIN), None)
        .unwrap();
    assert_eq!(result.executive_level, Some(2));
    assert_eq!(result.new_status, "submitted_to_executive_2");
}

#[test]
fn test_zonal_approve_without_levels_goes_to_finance() {
    let engine = engine();
    engine
        .store()
        .transaction(|tx| admin::set_executive_levels(tx, Vec::new()))
        .unwrap();
    let id = case_at_welfare(&engine);
    answer_checklist(&engine, id, &[1, 2, 3]);
    engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap();

    let result = engine
        .zonal_approve(id, &actor(&engine, ZONAL_INCHARGE), None)
        .unwrap();
    assert_eq!(result.new_status, FINANCE_DISBURSEMENT);
    assert_eq!(result.new_stage_id, Some(7));
    assert_eq!(result.executive_level, None);
}

#[test]
fn test_rework_runs_in_two_legs() {
    let engine = engine();
    let id = case_on_ladder(&engine);
    engine
        .executive_approve(id, &actor(&engine, DIRECTOR), None)
        .unwrap();
    let trustee = actor(&engine, TRUSTEE);

    let err = engine.executive_rework(id, &trustee, None).unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    let result = engine
        .executive_rework(id, &trustee, Some("verify the home visit"))
        .unwrap();
    assert_eq!(result.new_status, WELFARE_PROCESSING_REWORK);
    assert_eq!(result.new_stage_id, Some(4));
    assert_eq!(result.executive_level, Some(2));
    assert_eq!(stored(&engine, id).rework_requested_level, Some(2));

    let officer = actor(&engine, WELFARE_OFFICER);
    let actions = engine.available_actions(id, &officer).unwrap();
    assert!(actions.contains(&CaseAction::ForwardRework));

    let result = engine.forward_rework(id, &officer, None).unwrap();
    assert_eq!(result.new_status, REWORK_REQUIRED);
    assert_eq!(result.new_stage_id, Some(2));
    assert_eq!(result.executive_level, None);
    let case = stored(&engine, id);
    assert_eq!(case.rework_requested_level, None);
    assert_eq!(case.current_executive_level, None);
}

#[test]
fn test_forward_rework_needs_rework_status() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    let err = engine
        .forward_rework(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(_)));
}

#[test]
fn test_missing_assignment_stage_degrades_in_place() {
    let engine = engine();
    let id = case_on_ladder(&engine);
    engine
        .store()
        .transaction(|tx| admin::set_stage_active(tx, 2, false))
        .unwrap();

    let result = engine
        .apply_transition(
            id,
            &TransitionAction::Reject,
            &actor(&engine, DIRECTOR),
            Some("incomplete file"),
        )
        .unwrap();
    assert_eq!(result.new_stage_id, Some(6));
    assert_eq!(result.new_status, REWORK_REQUIRED);
    assert!(result
        .message
        .contains("stage unchanged: no active assignment stage configured"));

    let case = stored(&engine, id);
    let last = case.workflow_history.last().unwrap();
    assert_eq!(last.action, "reject (no active assignment stage configured)");
    assert_eq!(last.stage_id, Some(6));
}

#[test]
fn test_custom_status_moves_stage() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    answer_checklist(&engine, id, &[1, 2, 3]);
    let action: TransitionAction = "submitted_to_zonal".parse().unwrap();

    let result = engine
        .apply_transition(id, &action, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap();
    assert_eq!(result.new_status, SUBMITTED_TO_ZONAL);
    assert_eq!(result.new_stage_id, Some(5));
    assert_eq!(stored(&engine, id).workflow_history.last().unwrap().action, "submitted_to_zonal");
}

#[test]
fn test_custom_status_needs_review_permission() {
    let engine = engine();
    let id = open_case(&engine);
    let action = TransitionAction::Custom("in_counseling".into());
    let err = engine
        .apply_transition(id, &action, &actor(&engine, CASE_WORKER), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));
}

#[test]
fn test_custom_status_forward_checks_checklist() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    answer_checklist(&engine, id, &[1]);
    let err = engine
        .apply_transition(
            id,
            &TransitionAction::Custom(SUBMITTED_TO_ZONAL.into()),
            &actor(&engine, WELFARE_OFFICER),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(ref m) if m.contains("1/3")));
    assert_eq!(stored(&engine, id).status, SUBMITTED_TO_WELFARE);
}

#[test]
fn test_custom_status_cannot_reach_ladder_or_finance() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    answer_checklist(&engine, id, &[1, 2, 3]);
    let officer = actor(&engine, WELFARE_OFFICER);

    for target in [FINANCE_DISBURSEMENT, "submitted_to_executive_1", "submitted_to_executive"] {
        let err = engine
            .apply_transition(id, &TransitionAction::Custom(target.into()), &officer, None)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidState(_)), "{target}: {err}");
    }
    let case = stored(&engine, id);
    assert_eq!(case.status, SUBMITTED_TO_WELFARE);
    assert_eq!(case.current_workflow_stage_id, Some(4));
    assert_eq!(case.current_executive_level, None);
}

#[test]
fn test_custom_status_cannot_skip_a_stage() {
    let engine = engine();
    engine
        .store()
        .transaction(|tx| {
            let mut followup = WorkflowStage::new(8, "zonal_followup", "Zonal Follow-up", 55);
            followup.associated_statuses = vec!["zonal_followup".into()];
            admin::upsert_stage(tx, followup)
        })
        .unwrap();
    let id = case_at_welfare(&engine);
    answer_checklist(&engine, id, &[1, 2, 3]);

    let err = engine
        .apply_transition(
            id,
            &TransitionAction::Custom("zonal_followup".into()),
            &actor(&engine, WELFARE_OFFICER),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(ref m) if m.contains("skip")));
}

#[test]
fn test_custom_status_moves_back_without_approval() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    let result = engine
        .apply_transition(
            id,
            &TransitionAction::Custom("in_counseling".into()),
            &actor(&engine, WELFARE_OFFICER),
            Some("needs another session"),
        )
        .unwrap();
    assert_eq!(result.new_status, "in_counseling");
    assert_eq!(result.new_stage_id, Some(3));
}

#[test]
fn test_custom_status_not_allowed_on_ladder() {
    let engine = engine();
    engine
        .store()
        .transaction(|tx| {
            admin::grant_role(
                tx,
                RolePermission {
                    stage_id: 6,
                    role: "executive".into(),
                    grant: PermissionGrant::allowing(&[
                        StageAction::View,
                        StageAction::Approve,
                        StageAction::Reject,
                        StageAction::Review,
                    ]),
                },
            )
        })
        .unwrap();
    let id = case_on_ladder(&engine);

    let err = engine
        .apply_transition(
            id,
            &TransitionAction::Custom("submitted_to_executive_2".into()),
            &actor(&engine, DIRECTOR),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(_)));
    let case = stored(&engine, id);
    assert_eq!(case.status, "submitted_to_executive_1");
    assert_eq!(case.current_executive_level, Some(1));
}

#[test]
fn test_degraded_reject_records_status_on_configured_stage() {
    let engine = engine();
    let welfare_case = case_at_welfare(&engine);
    let generic_case = case_at_welfare(&engine);
    engine
        .store()
        .transaction(|tx| admin::set_stage_active(tx, 2, false))
        .unwrap();
    let officer = actor(&engine, WELFARE_OFFICER);

    let result = engine
        .welfare_reject(welfare_case, &officer, Some("bad docs"))
        .unwrap();
    assert_eq!(result.new_status, WELFARE_REJECTED);
    assert_eq!(result.new_stage_id, Some(4));
    assert!(result.message.contains("submitted_to_welfare -> welfare_rejected"));
    assert_eq!(stored(&engine, welfare_case).status, WELFARE_REJECTED);
    let last = engine.history(welfare_case).unwrap().pop().unwrap();
    assert_eq!(last.from_status.as_deref(), Some(SUBMITTED_TO_WELFARE));
    assert_eq!(last.to_status, WELFARE_REJECTED);

    let result = engine
        .apply_transition(generic_case, &TransitionAction::Reject, &officer, Some("bad docs"))
        .unwrap();
    assert_eq!(result.new_status, REWORK_REQUIRED);
    assert_eq!(result.new_stage_id, Some(4));
    assert_eq!(stored(&engine, generic_case).status, REWORK_REQUIRED);
}

#[test]
fn test_rework_blocks_approval_until_forwarded() {
    let engine = engine();
    let id = case_on_ladder(&engine);
    engine
        .executive_rework(id, &actor(&engine, DIRECTOR), Some("recheck income"))
        .unwrap();
    let officer = actor(&engine, WELFARE_OFFICER);

    let err = engine
        .apply_transition(id, &TransitionAction::Approve, &officer, None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(_)));
    let err = engine
        .apply_transition(id, &TransitionAction::Custom(SUBMITTED_TO_ZONAL.into()), &officer, None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(_)));
    assert!(!engine
        .available_actions(id, &officer)
        .unwrap()
        .contains(&CaseAction::Approve));

    let case = stored(&engine, id);
    assert_eq!(case.status, WELFARE_PROCESSING_REWORK);
    assert_eq!(case.rework_requested_level, Some(1));
}

#[test]
fn test_reject_during_rework_clears_requested_level() {
    let engine = engine();
    let id = case_on_ladder(&engine);
    engine
        .executive_rework(id, &actor(&engine, DIRECTOR), Some("recheck income"))
        .unwrap();
    engine
        .apply_transition(
            id,
            &TransitionAction::Reject,
            &actor(&engine, WELFARE_OFFICER),
            Some("start over"),
        )
        .unwrap();
    let case = stored(&engine, id);
    assert_eq!(case.status, REWORK_REQUIRED);
    assert_eq!(case.current_workflow_stage_id, Some(2));
    assert_eq!(case.rework_requested_level, None);
    assert_eq!(case.current_executive_level, None);
}

#[test]
fn test_transition_at_stale_version_is_a_conflict() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    let seen = stored(&engine, id).version;
    let officer = actor(&engine, WELFARE_OFFICER);

    engine
        .apply_transition_at_version(id, seen, &TransitionAction::Reject, &officer, Some("missing payslips"))
        .unwrap();
    let after = stored(&engine, id);
    assert_eq!(after.status, REWORK_REQUIRED);

    let err = engine
        .apply_transition_at_version(
            id,
            seen,
            &TransitionAction::Approve,
            &actor(&engine, CASE_WORKER),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Conflict(_)));
    assert_eq!(stored(&engine, id), after);
}

#[test]
fn test_transition_action_parsing() {
    assert_eq!("Approve".parse::<TransitionAction>().unwrap(), TransitionAction::Approve);
    assert_eq!(" reject ".parse::<TransitionAction>().unwrap(), TransitionAction::Reject);
    assert_eq!(
        "on_hold".parse::<TransitionAction>().unwrap(),
        TransitionAction::Custom("on_hold".into())
    );
    assert!(matches!(
        "  ".parse::<TransitionAction>(),
        Err(WorkflowError::Validation(_))
    ));
}

#[test]
fn test_assign_validates_assignee_and_stage() {
    let engine = engine();
    let id = open_case(&engine);
    let worker = actor(&engine, CASE_WORKER);

    let err = engine.assign_case(id, 99, &worker, None).unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));

    engine
        .store()
        .transaction(|tx| {
            let mut user = User::new(9, "Former Staff", "case_worker");
            user.is_active = false;
            tx.upsert_user(user);
            Ok(())
        })
        .unwrap();
    let err = engine.assign_case(id, 9, &worker, None).unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    let welfare_case = case_at_welfare(&engine);
    let err = engine
        .assign_case(welfare_case, CASE_WORKER, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(_)));
}

#[test]
fn test_checklist_answer_validation() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    let officer = actor(&engine, WELFARE_OFFICER);

    let err = engine.record_checklist_response(id, 1, "  ", &officer).unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
    let err = engine.record_checklist_response(id, 42, "yes", &officer).unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
    let err = engine
        .record_checklist_response(id, 1, "yes", &actor(&engine, ZONAL_INCHARGE))
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Forbidden(_)));

    let progress = engine.record_checklist_response(id, 1, "yes", &officer).unwrap();
    assert_eq!(progress.to_string(), "1/3");
    // a second answer to the same item does not count twice
    let progress = engine.record_checklist_response(id, 1, "confirmed", &officer).unwrap();
    assert_eq!(progress.to_string(), "1/3");
}

#[test]
fn test_notifications_delivered_after_commit() {
    let engine = engine();
    let id = open_case(&engine);
    engine
        .assign_case(id, CASE_WORKER, &actor(&engine, CASE_WORKER), None)
        .unwrap();

    let delivered = engine.sink.delivered();
    let recipients: Vec<u64> = delivered.iter().map(|n| n.user_id).collect();
    assert_eq!(recipients, vec![ADMIN]);
    assert_eq!(delivered[0].case_id, id);
    assert_eq!(delivered[0].title, "Case #1 assign");
}

#[test]
fn test_failing_sink_does_not_abort_transition() {
    let engine = seeded(RecordingNotifier::failing());
    let id = open_case(&engine);
    let result = engine
        .assign_case(id, CASE_WORKER, &actor(&engine, CASE_WORKER), None)
        .unwrap();
    assert_eq!(result.new_status, "assigned");

    let data = engine.store().snapshot().unwrap();
    assert_eq!(data.cases[&id].status, "assigned");
    assert!(!data.notifications.is_empty());
    assert!(engine.sink.delivered().is_empty());
}

#[test]
fn test_notifications_can_be_disabled() {
    let store = MemoryStore::new();
    let seed = CatalogSeed::standard().unwrap();
    store.transaction(|tx| admin::import_seed(tx, seed)).unwrap();
    let settings = EngineSettings {
        notifications_enabled: false,
        ..EngineSettings::default()
    };
    let engine = TransitionEngine::with_settings(store, RecordingNotifier::new(), settings);
    let id = open_case(&engine);
    engine
        .assign_case(id, CASE_WORKER, &actor(&engine, CASE_WORKER), None)
        .unwrap();

    assert!(engine.store().snapshot().unwrap().notifications.is_empty());
    assert!(engine.sink.delivered().is_empty());
}

#[test]
fn test_failed_comment_write_rolls_back_transition() {
    let engine = engine();
    let id = open_case(&engine);
    let before = engine.store().snapshot().unwrap();

    let long_comment = "x".repeat(MAX_COMMENT_LEN + 1);
    let err = engine
        .assign_case(id, CASE_WORKER, &actor(&engine, CASE_WORKER), Some(&long_comment))
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Store(_)));

    let after = engine.store().snapshot().unwrap();
    assert_eq!(after, before);
    assert!(engine.sink.delivered().is_empty());
}

#[test]
fn test_read_heals_drift_without_audit_rows() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    let history_before = engine.history(id).unwrap().len();
    engine
        .store()
        .transaction(|tx| admin::set_stage_statuses(tx, 4, vec!["welfare_pending".into()]))
        .unwrap();

    let version = stored(&engine, id).version;
    let case = engine.get_case(id).unwrap();
    assert_eq!(case.status, "welfare_pending");
    assert_eq!(case.version, version + 1);
    assert_eq!(engine.history(id).unwrap().len(), history_before);

    // second read finds nothing to heal
    assert_eq!(engine.get_case(id).unwrap().version, version + 1);
}

#[test]
fn test_reconcile_all_reports_healed_cases() {
    let engine = engine();
    let welfare = case_at_welfare(&engine);
    let draft = open_case(&engine);
    engine
        .store()
        .transaction(|tx| admin::set_stage_statuses(tx, 4, vec!["welfare_pending".into()]))
        .unwrap();

    let healed = engine.reconcile_all().unwrap();
    assert_eq!(
        healed,
        vec![HealedCase {
            case_id: welfare,
            from: SUBMITTED_TO_WELFARE.into(),
            to: "welfare_pending".into(),
        }]
    );
    assert_eq!(stored(&engine, draft).status, "draft");
    assert!(engine.reconcile_all().unwrap().is_empty());
}

#[test]
fn test_inactive_stage_blocks_transitions() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    engine
        .store()
        .transaction(|tx| admin::set_stage_active(tx, 4, false))
        .unwrap();
    let err = engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(_)));
}

#[test]
fn test_available_actions_follow_permissions() {
    let engine = engine();
    let id = case_at_welfare(&engine);
    assert_eq!(
        engine.available_actions(id, &actor(&engine, WELFARE_OFFICER)).unwrap(),
        vec![CaseAction::Approve, CaseAction::Reject, CaseAction::FillChecklist]
    );
    assert!(engine
        .available_actions(id, &actor(&engine, COUNSELOR))
        .unwrap()
        .is_empty());

    answer_checklist(&engine, id, &[1, 2, 3]);
    engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap();
    engine
        .zonal_approve(id, &actor(&engine, ZONAL_INCHARGE), None)
        .unwrap();
    assert_eq!(
        engine.available_actions(id, &actor(&engine, DIRECTOR)).unwrap(),
        vec![CaseAction::Approve, CaseAction::Reject, CaseAction::Rework]
    );
    assert!(engine
        .available_actions(id, &actor(&engine, TRUSTEE))
        .unwrap()
        .is_empty());
}

#[test]
fn test_history_of_unknown_case_is_not_found() {
    let engine = engine();
    assert!(matches!(engine.history(404), Err(WorkflowError::NotFound(_))));
}
