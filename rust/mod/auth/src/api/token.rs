use axum::extract::{Extension, State};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};

use tollgate_core::ServiceError;

use crate::api::AppState;
use crate::api::json::ApiJson;
use crate::api::middleware::AuthContext;
use crate::model::{LoginRequest, RefreshRequest, Success, TokenPair, VerifyRequest};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/verify", post(verify))
        .route("/auth/logout", post(logout))
}

/// POST /auth/login — username/password for a token pair.
async fn login(
    State(svc): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<Value>, ServiceError> {
    let (user, tokens) = svc.login(&req.username, &req.password)?;
    Ok(Json(json!({
        "user": svc.schemas().user_schema().render(&user),
        "access": tokens.access,
        "refresh": tokens.refresh,
        "token_type": tokens.token_type,
        "expires_in": tokens.expires_in,
    })))
}

async fn refresh(
    State(svc): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> Result<Json<TokenPair>, ServiceError> {
    Ok(Json(svc.refresh_tokens(&req.refresh)?))
}

/// POST /auth/verify — `{}` for a valid, unrevoked token of either type.
async fn verify(
    State(svc): State<AppState>,
    ApiJson(req): ApiJson<VerifyRequest>,
) -> Result<Json<Value>, ServiceError> {
    svc.verify_token(&req.token, None)?;
    Ok(Json(json!({})))
}

/// POST /auth/logout — revoke the caller's session.
async fn logout(
    State(svc): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Success>, ServiceError> {
    svc.revoke_session(&ctx.claims.sid)?;
    Ok(Json(Success::default()))
}
