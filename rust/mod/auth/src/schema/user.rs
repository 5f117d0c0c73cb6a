use serde_json::{Value, json};

use crate::model::User;

/// Output schema: the public representation of a user.
pub trait UserSchema: Send + Sync {
    fn render(&self, user: &User) -> Value;
}

/// `id`, `username`, `email`, `first_name`, `last_name`.
#[derive(Default)]
pub struct DefaultUserSchema;

impl UserSchema for DefaultUserSchema {
    fn render(&self, user: &User) -> Value {
        json!({
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "first_name": user.first_name,
            "last_name": user.last_name,
        })
    }
}
