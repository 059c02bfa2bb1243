//! CLI command layer against a work directory found through `CASEFLOW_HOME`

use serial_test::serial;
use tempfile::TempDir;

use caseflow::commands::common::Workspace;
use caseflow::commands::{case, diagnose, init, permissions, reconcile};
use caseflow::errors::{to_exit_code, WorkflowError};
use caseflow::fs::work_dir::HOME_ENV;
use caseflow::store::CaseStore;

use super::helpers::{stored_case, CASE_WORKER, WELFARE_OFFICER};

/// Point discovery at a fresh temp directory for the duration of a test
struct HomeGuard {
    temp_dir: TempDir,
}

impl HomeGuard {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::env::set_var(HOME_ENV, temp_dir.path());
        Self { temp_dir }
    }
}

impl Drop for HomeGuard {
    fn drop(&mut self) {
        std::env::remove_var(HOME_ENV);
    }
}

#[test]
#[serial]
fn test_init_seeds_standard_catalog() {
    let _home = HomeGuard::new();
    init::execute(None).unwrap();

    let workspace = Workspace::open().unwrap();
    let data = workspace.store().snapshot().unwrap();
    assert_eq!(data.stages.len(), 7);
    assert_eq!(workspace.config.roles.superuser, "super_admin");
}

#[test]
#[serial]
fn test_init_twice_fails() {
    let _home = HomeGuard::new();
    init::execute(None).unwrap();
    let err = init::execute(None).unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[test]
#[serial]
fn test_commands_require_init() {
    let _home = HomeGuard::new();
    let err = reconcile::execute().unwrap_err();
    assert!(format!("{err:#}").contains("caseflow init"));
}

#[test]
#[serial]
fn test_unknown_or_inactive_actor() {
    let _home = HomeGuard::new();
    init::execute(None).unwrap();
    let workspace = Workspace::open().unwrap();

    let err = workspace.actor(99).unwrap_err();
    let code = err.downcast_ref::<WorkflowError>().map(to_exit_code);
    assert_eq!(code, Some(3));
    assert_eq!(workspace.actor(CASE_WORKER).unwrap().role, "case_worker");
}

#[test]
#[serial]
fn test_case_commands_move_a_case() {
    let home = HomeGuard::new();
    init::execute(None).unwrap();

    case::create(CASE_WORKER, "Esther Mensah", None).unwrap();
    case::assign(CASE_WORKER, 1, CASE_WORKER, Some("mine")).unwrap();
    case::approve(CASE_WORKER, 1, None).unwrap();
    case::approve(3, 1, None).unwrap();
    assert_eq!(
        stored_case(home.temp_dir.path(), 1).status,
        "submitted_to_welfare"
    );

    // welfare approval is routed through the checklist rule
    let err = case::approve(WELFARE_OFFICER, 1, None).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to approve case 1"));
    let code = err.downcast_ref::<WorkflowError>().map(to_exit_code);
    assert_eq!(code, Some(6));

    for item in [1, 2, 3] {
        case::checklist(WELFARE_OFFICER, 1, item, "yes").unwrap();
    }
    case::approve(WELFARE_OFFICER, 1, None).unwrap();
    assert_eq!(
        stored_case(home.temp_dir.path(), 1).status,
        "submitted_to_zonal"
    );

    case::reject(5, 1, Some("wrong zone")).unwrap();
    assert_eq!(stored_case(home.temp_dir.path(), 1).status, "zonal_rejected");

    case::show(1).unwrap();
    case::history(1).unwrap();
    case::actions(CASE_WORKER, 1).unwrap();
    diagnose::execute(false).unwrap();
    diagnose::execute(true).unwrap();
    permissions::execute(WELFARE_OFFICER, 4).unwrap();
}

#[test]
#[serial]
fn test_permissions_for_unknown_stage() {
    let _home = HomeGuard::new();
    init::execute(None).unwrap();
    let err = permissions::execute(WELFARE_OFFICER, 42).unwrap_err();
    assert_eq!(err.downcast_ref::<WorkflowError>().map(to_exit_code), Some(3));
}

#[test]
#[serial]
fn test_move_command_guards_version_and_approval_path() {
    let home = HomeGuard::new();
    init::execute(None).unwrap();
    case::create(CASE_WORKER, "Kwame Boateng", None).unwrap();
    case::assign(CASE_WORKER, 1, CASE_WORKER, None).unwrap();
    case::approve(CASE_WORKER, 1, None).unwrap();
    case::approve(3, 1, None).unwrap();

    let err = case::move_to(WELFARE_OFFICER, 1, "finance_disbursement", None, None).unwrap_err();
    assert_eq!(err.downcast_ref::<WorkflowError>().map(to_exit_code), Some(5));

    let version = stored_case(home.temp_dir.path(), 1).version;
    let err = case::move_to(WELFARE_OFFICER, 1, "in_counseling", None, Some(version - 1)).unwrap_err();
    assert_eq!(err.downcast_ref::<WorkflowError>().map(to_exit_code), Some(5));
    assert_eq!(
        stored_case(home.temp_dir.path(), 1).status,
        "submitted_to_welfare"
    );

    case::move_to(WELFARE_OFFICER, 1, "in_counseling", Some("another session"), Some(version)).unwrap();
    assert_eq!(stored_case(home.temp_dir.path(), 1).status, "in_counseling");
}
