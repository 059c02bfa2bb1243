mod methods;
mod types;


pub use types::{StageCategory, WorkflowStage};
