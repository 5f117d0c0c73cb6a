use axum::extract::{Extension, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use crate::api::AppState;
use crate::api::middleware::AuthContext;

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(me))
}

/// GET /auth/me — the caller, rendered through the user schema.
async fn me(State(svc): State<AppState>, Extension(ctx): Extension<AuthContext>) -> Json<Value> {
    Json(svc.schemas().user_schema().render(&ctx.user))
}
