use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use tollgate_core::ServiceError;

use crate::api::AppState;
use crate::model::{Claims, User};

/// The authenticated caller, available to handlers via `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: Claims,
    pub user: User,
}

/// JWT authentication middleware.
///
/// Public routes pass through. Everything else needs a valid access token
/// belonging to an active user.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    if is_public(req.method(), req.uri().path()) {
        return next.run(req).await;
    }

    let Some(token) = extract_bearer(req.headers()) else {
        return ServiceError::Unauthorized("missing authorization header".into()).into_response();
    };

    match svc.authenticate(token) {
        Ok((claims, user)) => {
            req.extensions_mut().insert(AuthContext { claims, user });
            next.run(req).await
        }
        Err(e) => {
            debug!(error = %e, "rejected bearer token");
            ServiceError::from(e).into_response()
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Routes reachable without a bearer token.
fn is_public(method: &Method, path: &str) -> bool {
    if method == Method::POST {
        matches!(
            path,
            "/account/" | "/account" | "/auth/login" | "/auth/refresh" | "/auth/verify"
        )
    } else if method == Method::GET {
        path == "/csrf"
    } else {
        false
    }
}
