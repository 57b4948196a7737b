//! Users and the in-memory user store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::acl::ADMINISTRATOR_ROLE;

/// A user of the aggregation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable numeric id.
    pub id: u32,
    /// Display/login name.
    pub name: String,
    /// Role names granted to the user.
    pub roles: Vec<String>,
}

impl User {
    /// Whether the user holds a role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// In-memory CRUD store for users, seeded with an administrator.
#[derive(Debug)]
pub struct UserStore {
    users: RwLock<HashMap<u32, User>>,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    /// Store seeded with the default admin user (id 1).
    #[must_use]
    pub fn new() -> Self {
        let mut users = HashMap::new();
        users.insert(
            1,
            User {
                id: 1,
                name: "Admin".to_string(),
                roles: vec![ADMINISTRATOR_ROLE.to_string()],
            },
        );
        Self {
            users: RwLock::new(users),
        }
    }

    /// Insert or replace a user.
    pub fn create(&self, user: User) {
        self.users.write().unwrap().insert(user.id, user);
    }

    /// Fetch a user by id.
    #[must_use]
    pub fn read(&self, id: u32) -> Option<User> {
        self.users.read().unwrap().get(&id).cloned()
    }

    /// Replace a user.
    pub fn update(&self, user: User) {
        self.users.write().unwrap().insert(user.id, user);
    }

    /// Remove a user. Returns whether it existed.
    pub fn delete(&self, id: u32) -> bool {
        self.users.write().unwrap().remove(&id).is_some()
    }
}
