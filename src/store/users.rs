//! User accounts and roles

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::db::{Database, StoreError};

pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_ADMIN: &str = "admin";

/// Registered account. The password hash never serializes.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// User store operations
#[derive(Clone)]
pub struct UserStore {
    db: Database,
}

impl UserStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Create a user with the given role. Usernames are unique.
    pub fn create(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, StoreError> {
        let mut tables = self.db.write();

        if tables.users.values().any(|u| u.username == username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' already registered",
                username
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn get(&self, user_id: Uuid) -> Result<User, StoreError> {
        self.db
            .read()
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StoreError::NotFound("user"))
    }

    pub fn get_by_username(&self, username: &str) -> Result<User, StoreError> {
        self.db
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(StoreError::NotFound("user"))
    }

    /// Flip a user's role between manager and admin.
    pub fn toggle_role(&self, username: &str) -> Result<User, StoreError> {
        let mut tables = self.db.write();

        let user = tables
            .users
            .values_mut()
            .find(|u| u.username == username)
            .ok_or(StoreError::NotFound("user"))?;

        user.role = if user.role == ROLE_ADMIN {
            ROLE_MANAGER.to_string()
        } else {
            ROLE_ADMIN.to_string()
        };
        Ok(user.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> UserStore {
        UserStore::new(Database::new())
    }

    #[test]
    fn duplicate_username_is_conflict() {
        let users = store();
        users.create("viktor", "hash", ROLE_MANAGER).unwrap();

        match users.create("viktor", "other", ROLE_MANAGER) {
            Err(StoreError::Conflict(_)) => {}
            other => panic!("expected conflict, got {:?}", other.map(|u| u.username)),
        }
    }

    #[test]
    fn toggle_role_round_trips() {
        let users = store();
        let created = users.create("gwenog", "hash", ROLE_MANAGER).unwrap();
        assert_eq!(created.role, ROLE_MANAGER);

        let promoted = users.toggle_role("gwenog").unwrap();
        assert_eq!(promoted.role, ROLE_ADMIN);

        let demoted = users.toggle_role("gwenog").unwrap();
        assert_eq!(demoted.role, ROLE_MANAGER);
        assert_eq!(demoted.id, created.id);
    }

    #[test]
    fn unknown_user_is_not_found() {
        let users = store();
        assert!(matches!(
            users.get_by_username("nobody"),
            Err(StoreError::NotFound("user"))
        ));
    }
}
