//! Route registration — module routes + system endpoints.

use std::sync::Arc;

use axum::Router;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use tracing::info;

use crate::host_guard::{self, AllowedHosts};

/// Build the complete router.
///
/// Module routers carry absolute paths and are merged at the root. The
/// host guard wraps everything, system endpoints included.
pub fn build_router(hosts: Arc<AllowedHosts>, module_routes: Vec<(&str, Router)>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version));

    for (name, router) in module_routes {
        info!(module = name, "routes mounted");
        app = app.merge(router);
    }

    app.layer(middleware::from_fn_with_state(hosts, host_guard::host_guard))
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "tollgated",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
