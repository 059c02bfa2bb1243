//! Shared helpers: a seeded `.caseflow/` in a temp directory and engines over it

use std::path::Path;
use tempfile::TempDir;

use caseflow::catalog::{admin, CatalogSeed};
use caseflow::config::Config;
use caseflow::fs::WorkDir;
use caseflow::models::{Actor, Case};
use caseflow::notify::RecordingNotifier;
use caseflow::store::{CaseStore, FileStore};
use caseflow::{TransitionAction, TransitionEngine};

pub type FileEngine = TransitionEngine<FileStore, RecordingNotifier>;

pub const CASE_WORKER: u64 = 2;
pub const COUNSELOR: u64 = 3;
pub const WELFARE_OFFICER: u64 = 4;
pub const ZONAL_INCHARGE: u64 = 5;
pub const DIRECTOR: u64 = 6;
pub const TRUSTEE: u64 = 7;

/// Temp directory holding an initialized work directory with the standard catalog
pub fn init_workspace() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let work_dir = WorkDir::new(temp_dir.path());
    let config = Config::default();
    work_dir
        .initialize(&config)
        .expect("Failed to initialize work directory");
    let seed = CatalogSeed::standard().expect("Failed to parse standard catalog");
    store_at(temp_dir.path())
        .transaction(|tx| admin::import_seed(tx, seed))
        .expect("Failed to seed catalog");
    temp_dir
}

pub fn store_at(base: &Path) -> FileStore {
    let work_dir = WorkDir::new(base);
    let config = work_dir.load().expect("Failed to load config");
    FileStore::open(work_dir.store_path(&config))
}

/// Fresh engine over the work directory, as a new CLI invocation would build
pub fn engine_at(base: &Path) -> FileEngine {
    TransitionEngine::new(store_at(base), RecordingNotifier::new())
}

pub fn actor(engine: &FileEngine, user_id: u64) -> Actor {
    engine
        .store()
        .snapshot()
        .expect("Failed to read store")
        .users
        .get(&user_id)
        .map(|u| u.actor())
        .expect("Unknown user")
}

pub fn stored_case(base: &Path, case_id: u64) -> Case {
    store_at(base).snapshot().expect("Failed to read store").cases[&case_id].clone()
}

/// Open a case and walk it to welfare review, one engine per step
pub fn drive_to_welfare(base: &Path) -> u64 {
    let engine = engine_at(base);
    let worker = actor(&engine, CASE_WORKER);
    let id = engine
        .create_case(&worker, None, "Bilal Haddad")
        .expect("create")
        .id;
    engine_at(base)
        .assign_case(id, CASE_WORKER, &worker, None)
        .expect("assign");
    engine_at(base)
        .apply_transition(id, &TransitionAction::Approve, &worker, None)
        .expect("approve assignment");
    let engine = engine_at(base);
    engine
        .apply_transition(id, &TransitionAction::Approve, &actor(&engine, COUNSELOR), None)
        .expect("approve counseling");
    id
}

pub fn complete_checklist(base: &Path, case_id: u64) {
    let engine = engine_at(base);
    let officer = actor(&engine, WELFARE_OFFICER);
    for item in [1, 2, 3] {
        engine
            .record_checklist_response(case_id, item, "verified", &officer)
            .expect("checklist answer");
    }
}
