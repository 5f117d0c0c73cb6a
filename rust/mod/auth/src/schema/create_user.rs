use serde_json::Value;

use tollgate_core::FieldErrors;

use super::fields;
use crate::forms::{RegistrationForm, UserCreationForm};
use crate::model::{NewAccount, RegistrationInput, Secret};

/// Input schema for `POST /account/`.
///
/// `parse` does field-level checks, `form` supplies the cross-field
/// validation it delegates to, and `clean` chains the two. Implementors
/// usually override only `form`.
pub trait CreateUserSchema: Send + Sync {
    fn form(&self) -> &dyn RegistrationForm;

    fn parse(&self, payload: &Value) -> Result<RegistrationInput, FieldErrors> {
        let obj = fields::object(payload)?;
        let mut errors = FieldErrors::new();
        let username = fields::required_str(obj, "username", &mut errors);
        let password1 = fields::required_str(obj, "password1", &mut errors);
        let password2 = fields::required_str(obj, "password2", &mut errors);

        match (username, password1, password2) {
            (Some(username), Some(password1), Some(password2)) if errors.is_empty() => {
                Ok(RegistrationInput {
                    username,
                    password1: Secret::new(password1),
                    password2: Secret::new(password2),
                })
            }
            _ => Err(errors),
        }
    }

    fn clean(&self, payload: &Value) -> Result<NewAccount, FieldErrors> {
        let input = self.parse(payload)?;
        self.form().validate(input)
    }
}

/// Username + two password fields, validated by [`UserCreationForm`].
#[derive(Default)]
pub struct DefaultCreateUserSchema {
    form: UserCreationForm,
}

impl DefaultCreateUserSchema {
    pub fn with_form(form: UserCreationForm) -> Self {
        Self { form }
    }
}

impl CreateUserSchema for DefaultCreateUserSchema {
    fn form(&self) -> &dyn RegistrationForm {
        &self.form
    }
}
