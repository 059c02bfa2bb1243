//! Catalog edits while cases are in flight

use caseflow::catalog::{admin, CatalogSeed, SeedFormat};
use caseflow::errors::WorkflowError;
use caseflow::models::WorkflowStage;
use caseflow::store::CaseStore;
use caseflow::workflow::diagnose;
use caseflow::TransitionAction;

use super::helpers::*;

#[test]
fn test_status_set_change_heals_on_next_transition() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let id = drive_to_welfare(base);

    store_at(base)
        .transaction(|tx| {
            admin::set_stage_statuses(
                tx,
                4,
                vec!["awaiting_welfare".into(), "welfare_processing_rework".into()],
            )
        })
        .unwrap();

    let report = diagnose(&store_at(base).snapshot().unwrap());
    assert_eq!(report.mismatches.len(), 1);
    assert_eq!(
        report.mismatches[0].healed_status.as_deref(),
        Some("awaiting_welfare")
    );
    // diagnostics never write
    assert_eq!(stored_case(base, id).status, "submitted_to_welfare");

    // welfare_approve expects the old status, and the heal already happened on load
    complete_checklist(base, id);
    assert_eq!(stored_case(base, id).status, "awaiting_welfare");
    let engine = engine_at(base);
    let err = engine
        .welfare_approve(id, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::InvalidState(_)));

    // the generic path does not depend on a fixed status
    let result = engine
        .apply_transition(id, &TransitionAction::Approve, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap();
    assert_eq!(result.new_stage_id, Some(5));
    assert_eq!(result.new_status, "submitted_to_zonal");
}

#[test]
fn test_inserted_stage_joins_the_path() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let engine = engine_at(base);
    let worker = actor(&engine, CASE_WORKER);
    let id = engine.create_case(&worker, None, "Chen Wei").unwrap().id;
    engine.assign_case(id, CASE_WORKER, &worker, None).unwrap();

    store_at(base)
        .transaction(|tx| {
            admin::upsert_stage(
                tx,
                WorkflowStage::new(9, "document_verification", "Document Verification", 25)
                    .with_statuses(&["documents_pending"]),
            )
        })
        .unwrap();

    let result = engine_at(base)
        .apply_transition(id, &TransitionAction::Approve, &worker, None)
        .unwrap();
    assert_eq!(result.new_stage_id, Some(9));
    assert_eq!(result.new_status, "documents_pending");
}

#[test]
fn test_explicit_next_stage_overrides_order() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let engine = engine_at(base);
    let worker = actor(&engine, CASE_WORKER);
    let id = engine.create_case(&worker, None, "Dara Okafor").unwrap().id;
    engine.assign_case(id, CASE_WORKER, &worker, None).unwrap();

    // skip counseling
    store_at(base)
        .transaction(|tx| admin::set_next_stage(tx, 2, Some(4)))
        .unwrap();
    let result = engine_at(base)
        .apply_transition(id, &TransitionAction::Approve, &worker, None)
        .unwrap();
    assert_eq!(result.new_stage_id, Some(4));
    assert_eq!(result.new_status, "submitted_to_welfare");
}

#[test]
fn test_catalog_import_then_reconcile_sweep() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let welfare_case = drive_to_welfare(base);

    let mut seed = CatalogSeed::standard().unwrap();
    for stage in seed.stages.iter_mut().filter(|s| s.id == 4) {
        stage.associated_statuses = vec!["welfare_queue".into()];
    }
    let path = base.join("catalog.yaml");
    std::fs::write(&path, serde_yaml::to_string(&seed).unwrap()).unwrap();

    let imported = CatalogSeed::from_path(&path).unwrap();
    assert_eq!(
        SeedFormat::from_path(&path).unwrap(),
        SeedFormat::Yaml
    );
    store_at(base)
        .transaction(|tx| admin::import_seed(tx, imported))
        .unwrap();

    let healed = engine_at(base).reconcile_all().unwrap();
    assert_eq!(healed.len(), 1);
    assert_eq!(healed[0].case_id, welfare_case);
    assert_eq!(healed[0].to, "welfare_queue");
    assert!(diagnose(&store_at(base).snapshot().unwrap()).is_clean());
}

#[test]
fn test_removed_stage_is_reported_not_guessed() {
    let temp_dir = init_workspace();
    let base = temp_dir.path();
    let id = drive_to_welfare(base);

    let mut seed = CatalogSeed::standard().unwrap();
    seed.stages.retain(|s| s.id != 4);
    seed.role_permissions.retain(|p| p.stage_id != 4);
    store_at(base)
        .transaction(|tx| admin::import_seed(tx, seed))
        .unwrap();

    let report = diagnose(&store_at(base).snapshot().unwrap());
    assert_eq!(report.mismatches.len(), 1);
    assert!(report.mismatches[0].reason.contains("does not exist"));

    let engine = engine_at(base);
    let err = engine
        .apply_transition(id, &TransitionAction::Approve, &actor(&engine, WELFARE_OFFICER), None)
        .unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
    assert!(engine.reconcile_all().unwrap().is_empty());
}
