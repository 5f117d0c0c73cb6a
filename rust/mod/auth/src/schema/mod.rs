//! Input and output schemas for the account endpoints.
//!
//! Each schema is a contract trait plus a built-in implementation. The
//! implementation actually used is picked by a setting and checked against
//! its contract by [`crate::registry::ComponentRegistry`] at startup.

mod create_user;
mod fields;
mod update_user;
mod user;

pub use create_user::{CreateUserSchema, DefaultCreateUserSchema};
pub use update_user::{DefaultUpdateUserSchema, UpdateUserSchema};
pub use user::{DefaultUserSchema, UserSchema};

/// Setting (under `TOLLGATE_`) naming the public user output schema.
pub const USER_SCHEMA: &str = "USER_SCHEMA";
/// Setting (under `TOLLGATE_REGISTRATION_`) naming the create-account input schema.
pub const CREATE_USER_SCHEMA: &str = "CREATE_USER_SCHEMA";
/// Setting (under `TOLLGATE_REGISTRATION_`) naming the update-account input schema.
pub const UPDATE_USER_SCHEMA: &str = "UPDATE_USER_SCHEMA";

pub const DEFAULT_USER_SCHEMA: &str = "tollgate_auth::schema::DefaultUserSchema";
pub const DEFAULT_CREATE_USER_SCHEMA: &str = "tollgate_auth::schema::DefaultCreateUserSchema";
pub const DEFAULT_UPDATE_USER_SCHEMA: &str = "tollgate_auth::schema::DefaultUpdateUserSchema";
