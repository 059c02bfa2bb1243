use serde::{Deserialize, Serialize};

use crate::models::UserId;

/// Identity resolved by the caller; the engine never validates credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: String,
}

impl Actor {
    pub fn new(user_id: UserId, role: &str) -> Self {
        Self {
            user_id,
            role: role.to_string(),
        }
    }
}

/// User record in the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    /// Primary role
    pub role: String,
    #[serde(default)]
    pub extra_roles: Vec<String>,
    /// Ladder level this user signs at, for holders of the executive role
    #[serde(default)]
    pub executive_level: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(id: UserId, name: &str, role: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            role: role.to_string(),
            extra_roles: Vec::new(),
            executive_level: None,
            is_active: true,
        }
    }

    pub fn with_executive_level(mut self, level: i32) -> Self {
        self.executive_level = Some(level);
        self
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.id, &self.role)
    }
}

/// Actor merged with what the store knows about them, used for
/// permission resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: UserId,
    pub roles: Vec<String>,
    pub executive_level: Option<i32>,
}

impl UserContext {
    /// Merge the caller-supplied actor with the stored user record, if any.
    pub fn resolve(actor: &Actor, user: Option<&User>) -> Self {
        let mut roles = vec![actor.role.clone()];
        if let Some(user) = user {
            for role in std::iter::once(&user.role).chain(user.extra_roles.iter()) {
                if !roles.contains(role) {
                    roles.push(role.clone());
                }
            }
        }
        Self {
            user_id: actor.user_id,
            roles,
            executive_level: user.and_then(|u| u.executive_level),
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
