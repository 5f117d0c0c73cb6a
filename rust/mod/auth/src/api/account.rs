use axum::extract::{Extension, State};
use axum::routing::{MethodRouter, post};
use axum::{Json, Router};
use serde_json::Value;

use tollgate_core::ServiceError;

use crate::api::AppState;
use crate::api::json::ApiJson;
use crate::api::middleware::AuthContext;
use crate::model::Success;

pub fn routes() -> Router<AppState> {
    let account: MethodRouter<AppState> = post(create_account)
        .patch(update_account)
        .delete(delete_account);

    Router::new()
        .route("/account/", account.clone())
        .route("/account", account)
}

/// POST /account/ — register a new user. Public.
async fn create_account(
    State(svc): State<AppState>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<Value>, ServiceError> {
    let user = svc.register_user(&payload)?;
    Ok(Json(svc.schemas().user_schema().render(&user)))
}

/// PATCH /account/ — update the caller's profile. Empty fields are ignored.
async fn update_account(
    State(svc): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    ApiJson(payload): ApiJson<Value>,
) -> Result<Json<Value>, ServiceError> {
    let user = svc.update_user(&ctx.user.id, &payload)?;
    Ok(Json(svc.schemas().user_schema().render(&user)))
}

/// DELETE /account/ — deactivate the caller.
async fn delete_account(
    State(svc): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Success>, ServiceError> {
    svc.deactivate_user(&ctx.user.id)?;
    Ok(Json(Success::default()))
}
