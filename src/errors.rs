//! Error taxonomy for workflow operations
//!
//! Engine operations return [`WorkflowError`]; each variant carries a stable
//! code for programmatic handling. Persistence and CLI layers use `anyhow`
//! and are folded into [`WorkflowError::Store`] at the engine boundary.

use thiserror::Error;

/// Result alias for engine operations
pub type WorkflowResult<T> = std::result::Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Case, stage, level, user or checklist item missing
    #[error("Not found: {0}")]
    NotFound(String),

    /// Actor lacks the permission for the requested action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Case is not in a state the requested transition can start from
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Missing comment, incomplete checklist and similar input deficiencies
    #[error("Validation failed: {0}")]
    Validation(String),

    /// No stage resolvable at all. Transitions degrade instead of returning
    /// this; case intake and catalog administration surface it.
    #[error("Catalog misconfigured: {0}")]
    CatalogMisconfigured(String),

    /// Optimistic concurrency check failed on a case write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence layer failure; the surrounding transaction was discarded
    #[error("Store error: {0:#}")]
    Store(#[from] anyhow::Error),
}

impl WorkflowError {
    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            WorkflowError::NotFound(_) => "NOT_FOUND",
            WorkflowError::Forbidden(_) => "FORBIDDEN",
            WorkflowError::InvalidState(_) => "INVALID_STATE",
            WorkflowError::Validation(_) => "VALIDATION_ERROR",
            WorkflowError::CatalogMisconfigured(_) => "CATALOG_MISCONFIGURED",
            WorkflowError::Conflict(_) => "CONFLICT",
            WorkflowError::Store(_) => "STORE_ERROR",
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        WorkflowError::NotFound(what.into())
    }

    pub fn forbidden(what: impl Into<String>) -> Self {
        WorkflowError::Forbidden(what.into())
    }

    pub fn invalid_state(what: impl Into<String>) -> Self {
        WorkflowError::InvalidState(what.into())
    }

    pub fn validation(what: impl Into<String>) -> Self {
        WorkflowError::Validation(what.into())
    }
}

/// Map an error to the CLI process exit code
pub fn to_exit_code(error: &WorkflowError) -> i32 {
    match error {
        WorkflowError::NotFound(_) => 3,
        WorkflowError::Forbidden(_) => 4,
        WorkflowError::InvalidState(_) | WorkflowError::Conflict(_) => 5,
        WorkflowError::Validation(_) => 6,
        WorkflowError::CatalogMisconfigured(_) | WorkflowError::Store(_) => 1,
    }
}
