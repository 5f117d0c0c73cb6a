//! Registration form: cross-field checks and password validation that run
//! after the create-user schema has type-checked the payload.

use tollgate_core::FieldErrors;

use crate::model::{NewAccount, RegistrationInput};

pub const USERNAME_MAX_LENGTH: usize = 150;

const PASSWORD_MISMATCH: &str = "The two password fields didn’t match.";
const INVALID_USERNAME: &str = "Enter a valid username. This value may contain only letters, \
                                numbers, and @/./+/-/_ characters.";

/// A single password rule. Returns the message shown to the user on failure.
pub trait PasswordValidator: Send + Sync {
    fn validate(&self, password: &str, username: &str) -> Result<(), String>;
}

pub struct MinimumLength(pub usize);

impl PasswordValidator for MinimumLength {
    fn validate(&self, password: &str, _username: &str) -> Result<(), String> {
        if password.chars().count() < self.0 {
            return Err(format!(
                "This password is too short. It must contain at least {} characters.",
                self.0
            ));
        }
        Ok(())
    }
}

pub struct NumericPassword;

impl PasswordValidator for NumericPassword {
    fn validate(&self, password: &str, _username: &str) -> Result<(), String> {
        if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
            return Err("This password is entirely numeric.".into());
        }
        Ok(())
    }
}

/// Rejects passwords that contain the username or are contained in it.
pub struct UsernameSimilarity;

impl PasswordValidator for UsernameSimilarity {
    fn validate(&self, password: &str, username: &str) -> Result<(), String> {
        let password = password.to_lowercase();
        let username = username.to_lowercase();
        if username.chars().count() < 3 {
            return Ok(());
        }
        if password.contains(&username) || username.contains(&password) {
            return Err("The password is too similar to the username.".into());
        }
        Ok(())
    }
}

pub struct CommonPassword;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "passw0rd", "12345678", "123456789",
    "1234567890", "11111111", "00000000", "qwerty123", "qwertyuiop", "iloveyou",
    "abc12345", "letmein1", "welcome1", "football", "baseball", "sunshine",
    "princess", "trustno1", "admin123", "changeme", "superman", "starwars",
];

impl PasswordValidator for CommonPassword {
    fn validate(&self, password: &str, _username: &str) -> Result<(), String> {
        let normalized = password.trim().to_lowercase();
        if COMMON_PASSWORDS.contains(&normalized.as_str()) {
            return Err("This password is too common.".into());
        }
        Ok(())
    }
}

/// Validators applied when no custom list is given.
pub fn default_password_validators() -> Vec<Box<dyn PasswordValidator>> {
    vec![
        Box::new(UsernameSimilarity),
        Box::new(MinimumLength(8)),
        Box::new(CommonPassword),
        Box::new(NumericPassword),
    ]
}

/// Turns type-checked registration input into an account ready to persist.
pub trait RegistrationForm: Send + Sync {
    fn validate(&self, input: RegistrationInput) -> Result<NewAccount, FieldErrors>;
}

pub struct UserCreationForm {
    validators: Vec<Box<dyn PasswordValidator>>,
}

impl Default for UserCreationForm {
    fn default() -> Self {
        Self::new(default_password_validators())
    }
}

impl UserCreationForm {
    pub fn new(validators: Vec<Box<dyn PasswordValidator>>) -> Self {
        Self { validators }
    }

    fn check_username(username: &str, errors: &mut FieldErrors) {
        let len = username.chars().count();
        if len > USERNAME_MAX_LENGTH {
            errors.add(
                "username",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    USERNAME_MAX_LENGTH, len
                ),
            );
        }
        if !username
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
        {
            errors.add("username", INVALID_USERNAME);
        }
    }
}

impl RegistrationForm for UserCreationForm {
    fn validate(&self, input: RegistrationInput) -> Result<NewAccount, FieldErrors> {
        let mut errors = FieldErrors::new();
        Self::check_username(&input.username, &mut errors);

        if input.password1 != input.password2 {
            errors.add("password2", PASSWORD_MISMATCH);
        } else {
            // Every failing rule is reported, not just the first.
            for validator in &self.validators {
                if let Err(message) =
                    validator.validate(input.password2.expose(), &input.username)
                {
                    errors.add("password2", message);
                }
            }
        }

        errors.into_result(NewAccount {
            username: input.username,
            password: input.password1,
        })
    }
}
