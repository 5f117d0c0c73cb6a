//! Component registry for swappable schema implementations.
//!
//! Components are registered at compile time under a string path, once per
//! contract (trait object type) they satisfy. Resolution is a two-step
//! lookup: path to registration, then registration to the requested
//! contract. Either step failing is a [`ConfigError`] naming the setting key
//! that pointed at the path. There is no fallback to the default.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::schema::{
    CreateUserSchema, DEFAULT_CREATE_USER_SCHEMA, DEFAULT_UPDATE_USER_SCHEMA,
    DEFAULT_USER_SCHEMA, DefaultCreateUserSchema, DefaultUpdateUserSchema, DefaultUserSchema,
    UpdateUserSchema, UserSchema,
};
use crate::settings::{AppSettings, ConfigError};

/// One contract view of a registered component: an `Arc<dyn Contract>` behind `Any`.
struct View {
    contract: &'static str,
    component: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct ComponentRegistry {
    entries: HashMap<String, Vec<View>>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in schemas under their default paths.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .provide::<dyn CreateUserSchema>(
                DEFAULT_CREATE_USER_SCHEMA,
                Arc::new(DefaultCreateUserSchema::default()),
            )
            .provide::<dyn UpdateUserSchema>(
                DEFAULT_UPDATE_USER_SCHEMA,
                Arc::new(DefaultUpdateUserSchema),
            )
            .provide::<dyn UserSchema>(DEFAULT_USER_SCHEMA, Arc::new(DefaultUserSchema));
        registry
    }

    /// Register `component` under `path` as an implementation of contract `C`.
    ///
    /// A component satisfying several contracts is registered once per
    /// contract under the same path. Registering the same contract twice
    /// replaces the earlier view.
    pub fn provide<C>(&mut self, path: &str, component: Arc<C>) -> &mut Self
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let views = self.entries.entry(path.to_string()).or_default();
        let contract = type_name::<C>();
        views.retain(|v| v.contract != contract);
        views.push(View {
            contract,
            component: Box::new(component),
        });
        self
    }

    /// Look up `path` and return it as contract `C`.
    ///
    /// `key` is the setting that named `path`; it is carried into the error.
    pub fn resolve<C>(&self, key: &str, path: &str) -> Result<Arc<C>, ConfigError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let views = self
            .entries
            .get(path)
            .ok_or_else(|| ConfigError::UnknownComponent {
                key: key.to_string(),
                path: path.to_string(),
            })?;

        views
            .iter()
            .find_map(|v| v.component.downcast_ref::<Arc<C>>())
            .cloned()
            .ok_or_else(|| ConfigError::ContractMismatch {
                key: key.to_string(),
                path: path.to_string(),
                contract: type_name::<C>(),
                provided: views
                    .iter()
                    .map(|v| v.contract)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Read setting `name` (falling back to `default`) and resolve it as contract `C`.
    pub fn resolve_setting<C>(
        &self,
        settings: &AppSettings<'_>,
        name: &str,
        default: &str,
    ) -> Result<Arc<C>, ConfigError>
    where
        C: ?Sized + Send + Sync + 'static,
    {
        let key = settings.key(name);
        let path = settings.setting(name, default);
        let component = self.resolve::<C>(&key, &path)?;
        debug!("{} resolved to {}", key, path);
        Ok(component)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::model::User;
    use crate::settings::CORE_PREFIX;

    trait Greeter: Send + Sync {
        fn greet(&self) -> String;
    }

    trait Counter: Send + Sync {
        fn count(&self) -> usize;
    }

    struct Hello;

    impl Greeter for Hello {
        fn greet(&self) -> String {
            "hello".into()
        }
    }

    impl Counter for Hello {
        fn count(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_resolve_registered_contract() {
        let mut registry = ComponentRegistry::new();
        registry.provide::<dyn Greeter>("demo::Hello", Arc::new(Hello));

        let greeter = registry.resolve::<dyn Greeter>("KEY", "demo::Hello").unwrap();
        assert_eq!(greeter.greet(), "hello");
    }

    #[test]
    fn test_unknown_path_names_key() {
        let registry = ComponentRegistry::new();
        let err = registry
            .resolve::<dyn Greeter>("TOLLGATE_GREETER", "nope::Missing")
            .err()
            .unwrap();
        match err {
            ConfigError::UnknownComponent { key, path } => {
                assert_eq!(key, "TOLLGATE_GREETER");
                assert_eq!(path, "nope::Missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_contract_mismatch_is_not_a_fallback() {
        let mut registry = ComponentRegistry::new();
        registry.provide::<dyn Counter>("demo::Hello", Arc::new(Hello));

        let err = registry
            .resolve::<dyn Greeter>("TOLLGATE_GREETER", "demo::Hello")
            .err()
            .unwrap();
        match err {
            ConfigError::ContractMismatch { key, contract, provided, .. } => {
                assert_eq!(key, "TOLLGATE_GREETER");
                assert!(contract.contains("Greeter"));
                assert!(provided.contains("Counter"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_one_path_many_contracts() {
        let hello = Arc::new(Hello);
        let mut registry = ComponentRegistry::new();
        registry
            .provide::<dyn Greeter>("demo::Hello", hello.clone())
            .provide::<dyn Counter>("demo::Hello", hello);

        assert!(registry.resolve::<dyn Greeter>("K", "demo::Hello").is_ok());
        assert_eq!(
            registry.resolve::<dyn Counter>("K", "demo::Hello").unwrap().count(),
            1
        );
    }

    #[test]
    fn test_resolve_setting_uses_override() {
        struct Loud;
        impl Greeter for Loud {
            fn greet(&self) -> String {
                "HELLO".into()
            }
        }

        let mut registry = ComponentRegistry::new();
        registry
            .provide::<dyn Greeter>("demo::Hello", Arc::new(Hello))
            .provide::<dyn Greeter>("demo::Loud", Arc::new(Loud));

        let mut values = HashMap::new();
        let greeter = registry
            .resolve_setting::<dyn Greeter>(
                &AppSettings::new(CORE_PREFIX, &values),
                "GREETER",
                "demo::Hello",
            )
            .unwrap();
        assert_eq!(greeter.greet(), "hello");

        values.insert("TOLLGATE_GREETER".to_string(), "demo::Loud".to_string());
        let greeter = registry
            .resolve_setting::<dyn Greeter>(
                &AppSettings::new(CORE_PREFIX, &values),
                "GREETER",
                "demo::Hello",
            )
            .unwrap();
        assert_eq!(greeter.greet(), "HELLO");
    }

    #[test]
    fn test_defaults_are_registered() {
        let registry = ComponentRegistry::with_defaults();
        assert!(registry.resolve::<dyn CreateUserSchema>("K", DEFAULT_CREATE_USER_SCHEMA).is_ok());
        assert!(registry.resolve::<dyn UpdateUserSchema>("K", DEFAULT_UPDATE_USER_SCHEMA).is_ok());
        let schema = registry.resolve::<dyn UserSchema>("K", DEFAULT_USER_SCHEMA).unwrap();

        let user = User {
            id: "u1".into(),
            username: "alice".into(),
            password_hash: "secret-hash".into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            is_active: true,
            last_login: None,
            date_joined: "t".into(),
            updated_at: "t".into(),
        };
        assert_eq!(schema.render(&user)["username"], "alice");

        // The create-user schema is not a user (output) schema.
        assert!(matches!(
            registry.resolve::<dyn UserSchema>("K", DEFAULT_CREATE_USER_SCHEMA),
            Err(ConfigError::ContractMismatch { .. })
        ));
    }
}
