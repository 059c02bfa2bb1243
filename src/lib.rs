pub mod catalog;
pub mod commands;
pub mod config;
pub mod errors;
pub mod fs;
pub mod models;
pub mod notify;
pub mod store;
pub mod workflow;

pub use errors::{WorkflowError, WorkflowResult};
pub use workflow::{TransitionAction, TransitionEngine, TransitionResult};
