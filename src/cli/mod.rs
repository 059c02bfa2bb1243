mod dispatch;
mod types;
mod types_case;

pub use dispatch::dispatch;
pub use types::{Cli, Commands};
