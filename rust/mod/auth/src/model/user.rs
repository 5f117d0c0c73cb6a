use std::fmt;

use serde::{Deserialize, Serialize};

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Login name. Unique, compared case-insensitively.
    pub username: String,

    /// Argon2id PHC string. Never rendered by the public user schema.
    pub password_hash: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    /// Deactivated accounts keep their record but can no longer authenticate.
    #[serde(default = "default_true")]
    pub is_active: bool,

    /// RFC 3339 timestamp of the last successful token login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,

    /// RFC 3339 creation timestamp.
    pub date_joined: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

fn default_true() -> bool {
    true
}

/// A string that must not show up in logs or debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**********)")
    }
}

/// Raw registration fields after type checks, before form validation.
#[derive(Debug, Clone)]
pub struct RegistrationInput {
    pub username: String,
    pub password1: Secret,
    pub password2: Secret,
}

/// A registration that passed form validation and is ready to persist.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub password: Secret,
}

/// Partial profile update.
///
/// `None` and empty strings both mean "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UserUpdate {
    /// Copy every non-empty field onto `user`. Returns whether anything changed.
    pub fn apply_to(&self, user: &mut User) -> bool {
        let mut changed = false;
        for (value, target) in [
            (&self.first_name, &mut user.first_name),
            (&self.last_name, &mut user.last_name),
            (&self.email, &mut user.email),
        ] {
            if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
                if target.as_str() != v {
                    *target = v.to_string();
                    changed = true;
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "u1".into(),
            username: "alice".into(),
            password_hash: "hash".into(),
            email: "alice@example.com".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            is_active: true,
            last_login: None,
            date_joined: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_apply_ignores_empty_fields() {
        let mut u = user();
        let update = UserUpdate {
            first_name: Some("Alicia".into()),
            last_name: Some(String::new()),
            email: None,
        };
        assert!(update.apply_to(&mut u));
        assert_eq!(u.first_name, "Alicia");
        assert_eq!(u.last_name, "Liddell");
        assert_eq!(u.email, "alice@example.com");
    }

    #[test]
    fn test_apply_same_value_is_not_a_change() {
        let mut u = user();
        let update = UserUpdate {
            first_name: Some("Alice".into()),
            ..Default::default()
        };
        assert!(!update.apply_to(&mut u));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let s = Secret::new("hunter22");
        assert_eq!(format!("{:?}", s), "Secret(**********)");
        assert_eq!(s.expose(), "hunter22");
    }

    #[test]
    fn test_user_deserialize_defaults() {
        let u: User = serde_json::from_value(serde_json::json!({
            "id": "u1",
            "username": "bob",
            "password_hash": "h",
            "date_joined": "t",
            "updated_at": "t",
        }))
        .unwrap();
        assert!(u.is_active);
        assert!(u.email.is_empty());
        assert!(u.last_login.is_none());
    }
}
