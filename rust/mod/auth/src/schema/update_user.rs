use serde_json::Value;

use tollgate_core::FieldErrors;

use super::fields;
use crate::model::UserUpdate;

const NAME_MAX_LENGTH: usize = 150;
const EMAIL_MAX_LENGTH: usize = 254;

/// Input schema for `PATCH /account/`.
///
/// Every field is optional. Unknown fields are ignored.
pub trait UpdateUserSchema: Send + Sync {
    fn parse(&self, payload: &Value) -> Result<UserUpdate, FieldErrors> {
        let obj = fields::object(payload)?;
        let mut errors = FieldErrors::new();

        let first_name = fields::optional_str(obj, "first_name", &mut errors);
        let last_name = fields::optional_str(obj, "last_name", &mut errors);
        let email = fields::optional_str(obj, "email", &mut errors);

        for (field, value) in [("first_name", &first_name), ("last_name", &last_name)] {
            if let Some(v) = value {
                fields::max_length(field, v, NAME_MAX_LENGTH, &mut errors);
            }
        }
        if let Some(email) = email.as_deref().filter(|e| !e.is_empty()) {
            fields::max_length("email", email, EMAIL_MAX_LENGTH, &mut errors);
            if !is_valid_email(email) {
                errors.add("email", "Enter a valid email address.");
            }
        }

        errors.into_result(UserUpdate {
            first_name,
            last_name,
            email,
        })
    }
}

#[derive(Default)]
pub struct DefaultUpdateUserSchema;

impl UpdateUserSchema for DefaultUpdateUserSchema {}

/// `local@domain.tld` with no whitespace and a dot inside the domain.
pub(crate) fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.rsplit_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !domain.contains('@')
        }
        None => false,
    }
}
