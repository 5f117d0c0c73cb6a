//! Auth module — account registration and JWT authentication.
//!
//! # Endpoints
//!
//! - `POST /account/` — register (public)
//! - `PATCH /account/` — update own profile
//! - `DELETE /account/` — deactivate own account
//! - `GET /csrf` — issue a CSRF cookie (public)
//! - `/auth/login`, `/auth/refresh`, `/auth/verify`, `/auth/logout`, `/auth/me`
//!
//! The input and output schemas used by the account endpoints are chosen
//! by settings (`TOLLGATE_USER_SCHEMA`,
//! `TOLLGATE_REGISTRATION_CREATE_USER_SCHEMA`,
//! `TOLLGATE_REGISTRATION_UPDATE_USER_SCHEMA`) and resolved through a
//! [`registry::ComponentRegistry`] when the module is built.
//!
//! # Usage
//!
//! ```ignore
//! use tollgate_auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(sql, AuthConfig::default())?;
//! let router = module.routes(); // Merge at the root
//! ```

pub mod api;
pub mod forms;
pub mod model;
pub mod registry;
pub mod schema;
pub mod schema_control;
pub mod service;
pub mod settings;

use std::sync::Arc;

use axum::Router;

use tollgate_core::Module;
use tollgate_sql::SQLStore;

use crate::registry::ComponentRegistry;
use crate::service::{AuthConfig, AuthError, AuthService};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create the module with the built-in schema components.
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Self, AuthError> {
        Self::with_registry(sql, config, &ComponentRegistry::with_defaults())
    }

    /// Create the module resolving schema settings against `registry`.
    ///
    /// Fails if any schema setting names an unknown component or one that
    /// does not implement its contract.
    pub fn with_registry(
        sql: Arc<dyn SQLStore>,
        config: AuthConfig,
        registry: &ComponentRegistry,
    ) -> Result<Self, AuthError> {
        let service = AuthService::new(sql, config, registry)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
