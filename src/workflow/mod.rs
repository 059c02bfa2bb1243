//! Stage resolution and transition engine

pub mod diagnostics;
pub mod engine;
pub mod ladder;
pub mod permissions;
pub mod resolver;
pub mod sync;


pub use diagnostics::{diagnose, DiagnosticsReport, StatusMismatch, StatusUsage};
pub use engine::{
    CaseAction, EngineSettings, HealedCase, TransitionAction, TransitionEngine, TransitionResult,
};
pub use ladder::LadderStep;
pub use permissions::PermissionResolver;
pub use resolver::{resolve_stage_for_status, ResolveContext};
