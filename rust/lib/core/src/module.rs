use axum::Router;

/// A service module that contributes HTTP routes.
///
/// The auth module implements this trait to register its endpoints. The
/// server binary collects modules and merges their routes into one Router.
pub trait Module: Send + Sync {
    /// Module name, used for logging.
    fn name(&self) -> &str;

    /// Return the module's routes. Paths are absolute (`/account/`, `/auth/login`).
    fn routes(&self) -> Router;
}
