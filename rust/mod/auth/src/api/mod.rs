mod account;
mod csrf;
mod json;
mod me;
pub mod middleware;
mod token;

use std::sync::Arc;

use axum::Router;

use crate::service::AuthService;

/// Shared application state.
pub type AppState = Arc<AuthService>;

/// Build the complete auth API router.
///
/// Paths are absolute (`/account/`, `/csrf`, `/auth/...`); the server
/// merges this router at the root.
pub fn build_router(svc: Arc<AuthService>) -> Router {
    Router::new()
        .merge(account::routes())
        .merge(token::routes())
        .merge(me::routes())
        .merge(csrf::routes())
        .layer(axum::middleware::from_fn_with_state(
            svc.clone(),
            middleware::auth_middleware,
        ))
        .with_state(svc)
}
