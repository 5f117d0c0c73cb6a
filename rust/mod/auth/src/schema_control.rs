use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::registry::ComponentRegistry;
use crate::schema::{
    CREATE_USER_SCHEMA, CreateUserSchema, DEFAULT_CREATE_USER_SCHEMA, DEFAULT_UPDATE_USER_SCHEMA,
    DEFAULT_USER_SCHEMA, UPDATE_USER_SCHEMA, USER_SCHEMA, UpdateUserSchema, UserSchema,
};
use crate::settings::{AppSettings, CORE_PREFIX, ConfigError, REGISTRATION_PREFIX};

/// The schema components in effect, resolved once from settings.
///
/// Construction fails on the first setting that names an unknown
/// component or one that doesn't implement its contract.
#[derive(Clone)]
pub struct SchemaControl {
    user: Arc<dyn UserSchema>,
    create_user: Arc<dyn CreateUserSchema>,
    update_user: Arc<dyn UpdateUserSchema>,
}

impl SchemaControl {
    pub fn new(
        values: &HashMap<String, String>,
        registry: &ComponentRegistry,
    ) -> Result<Self, ConfigError> {
        let core = AppSettings::new(CORE_PREFIX, values);
        let registration = AppSettings::new(REGISTRATION_PREFIX, values);

        let user =
            registry.resolve_setting::<dyn UserSchema>(&core, USER_SCHEMA, DEFAULT_USER_SCHEMA)?;
        let create_user = registry.resolve_setting::<dyn CreateUserSchema>(
            &registration,
            CREATE_USER_SCHEMA,
            DEFAULT_CREATE_USER_SCHEMA,
        )?;
        let update_user = registry.resolve_setting::<dyn UpdateUserSchema>(
            &registration,
            UPDATE_USER_SCHEMA,
            DEFAULT_UPDATE_USER_SCHEMA,
        )?;

        info!(
            user = %core.setting(USER_SCHEMA, DEFAULT_USER_SCHEMA),
            create_user = %registration.setting(CREATE_USER_SCHEMA, DEFAULT_CREATE_USER_SCHEMA),
            update_user = %registration.setting(UPDATE_USER_SCHEMA, DEFAULT_UPDATE_USER_SCHEMA),
            "schemas resolved"
        );

        Ok(Self {
            user,
            create_user,
            update_user,
        })
    }

    pub fn user_schema(&self) -> &dyn UserSchema {
        self.user.as_ref()
    }

    pub fn create_user_schema(&self) -> &dyn CreateUserSchema {
        self.create_user.as_ref()
    }

    pub fn update_user_schema(&self) -> &dyn UpdateUserSchema {
        self.update_user.as_ref()
    }
}
