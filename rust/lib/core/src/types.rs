use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Key used for errors that don't belong to a single field.
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Field-level validation errors: field name -> messages.
///
/// Serializes as a plain JSON object, e.g.
/// `{"password2": ["The two password fields didn’t match."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an error set holding a single message.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Append a message for a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for a field.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// `Ok(value)` when no errors were collected, otherwise `Err(self)`.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// One-line summary used as the human-readable error message.
    pub fn summary(&self) -> String {
        self.0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Generate a new random ID (UUIDv4, no dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string().replace('-', "")
}

/// Get the current time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id() {
        let id = new_id();
        assert_eq!(id.len(), 32);
        assert!(!id.contains('-'));
    }

    #[test]
    fn test_now_rfc3339() {
        let ts = now_rfc3339();
        assert!(ts.contains('T'));
    }

    #[test]
    fn test_field_errors_collect() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());

        errors.add("username", "This field is required.");
        errors.add("username", "Too long.");
        errors.add("password2", "Mismatch.");

        assert_eq!(errors.get("username").len(), 2);
        assert!(errors.contains("password2"));
        assert!(errors.get("email").is_empty());
        assert!(errors.clone().into_result(()).is_err());
        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({
                "password2": ["Mismatch."],
                "username": ["This field is required.", "Too long."],
            })
        );
        assert_eq!(
            errors.summary(),
            "password2: Mismatch.; username: This field is required. Too long."
        );
    }

    #[test]
    fn test_empty_field_errors_is_ok() {
        assert_eq!(FieldErrors::new().into_result(7).unwrap(), 7);
    }
}
