use serde::{Deserialize, Serialize};

/// One rung of the executive approval ladder.
///
/// Levels are a finer-grained sequence nested inside the executive stage;
/// a case walks them without its stage pointer moving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutiveLevel {
    pub level_number: i32,
    pub level_name: String,
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ExecutiveLevel {
    pub fn new(level_number: i32, level_name: &str, sort_order: i32) -> Self {
        Self {
            level_number,
            level_name: level_name.to_string(),
            sort_order,
            is_active: true,
        }
    }
}
