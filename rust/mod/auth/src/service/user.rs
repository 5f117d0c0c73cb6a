use serde_json::Value as Json;
use tracing::info;

use tollgate_core::{FieldErrors, new_id, now_rfc3339};
use tollgate_sql::Value;

use crate::model::User;
use crate::service::password::hash_password;
use crate::service::{AuthError, AuthService};

const DUPLICATE_USERNAME: &str = "A user with that username already exists.";

impl AuthService {
    /// Register a new account from a raw create-user payload.
    ///
    /// The payload goes through the configured create-user schema (field
    /// checks, then the registration form). Nothing is written unless it
    /// validates.
    pub fn register_user(&self, payload: &Json) -> Result<User, AuthError> {
        let account = self.schemas.create_user_schema().clean(payload)?;

        if self.find_user_by_username(&account.username)?.is_some() {
            return Err(FieldErrors::single("username", DUPLICATE_USERNAME).into());
        }

        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            username: account.username,
            password_hash: hash_password(account.password.expose())?,
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            last_login: None,
            date_joined: now.clone(),
            updated_at: now.clone(),
        };

        // The unique index still guards against a concurrent registration.
        match self.insert_record("users", &user.id, &user, &user_indexes(&user)) {
            Err(AuthError::Conflict(_)) => {
                return Err(FieldErrors::single("username", DUPLICATE_USERNAME).into());
            }
            other => other?,
        }

        info!(user_id = %user.id, username = %user.username, "account created");
        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, AuthError> {
        self.get_record("users", id)
    }

    /// Case-insensitive username lookup.
    pub fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        self.find_one(
            "SELECT data FROM users WHERE username = ?1",
            &[Value::Text(username.to_string())],
        )
    }

    /// Apply a raw partial-update payload to a user.
    ///
    /// Fields that are absent, null or empty keep their current value.
    pub fn update_user(&self, id: &str, payload: &Json) -> Result<User, AuthError> {
        let update = self.schemas.update_user_schema().parse(payload)?;
        let mut user = self.get_user(id)?;

        if update.apply_to(&mut user) {
            user.updated_at = now_rfc3339();
            self.save_user(&user)?;
            info!(user_id = %user.id, "account updated");
        }
        Ok(user)
    }

    /// Deactivate a user. The record stays; all its sessions are revoked.
    pub fn deactivate_user(&self, id: &str) -> Result<User, AuthError> {
        let mut user = self.get_user(id)?;
        user.is_active = false;
        user.updated_at = now_rfc3339();
        self.save_user(&user)?;

        let revoked = self.revoke_all_user_sessions(id)?;
        info!(user_id = %id, revoked_sessions = revoked, "account deactivated");
        Ok(user)
    }

    /// Stamp `last_login` with the current time.
    pub(crate) fn touch_last_login(&self, user: &mut User) -> Result<(), AuthError> {
        user.last_login = Some(now_rfc3339());
        self.save_user(user)
    }

    fn save_user(&self, user: &User) -> Result<(), AuthError> {
        let mut indexes = user_indexes(user);
        // date_joined never changes after insert.
        indexes.retain(|(col, _)| *col != "date_joined");
        self.update_record("users", &user.id, user, &indexes)
    }
}

fn user_indexes(user: &User) -> Vec<(&'static str, Value)> {
    vec![
        ("username", Value::Text(user.username.clone())),
        ("email", Value::Text(user.email.clone())),
        ("is_active", Value::from(user.is_active)),
        ("date_joined", Value::Text(user.date_joined.clone())),
        ("updated_at", Value::Text(user.updated_at.clone())),
    ]
}
