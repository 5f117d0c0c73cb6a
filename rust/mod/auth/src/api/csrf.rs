use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::api::AppState;
use crate::service::CsrfConfig;

const TOKEN_LENGTH: usize = 32;

pub fn routes() -> Router<AppState> {
    Router::new().route("/csrf", get(issue_csrf))
}

/// GET /csrf — set a fresh CSRF cookie. Public, empty body.
async fn issue_csrf(State(svc): State<AppState>) -> impl IntoResponse {
    let cookie = csrf_cookie(&svc.config().csrf, &new_token());
    (StatusCode::OK, [(header::SET_COOKIE, cookie)])
}

fn new_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LENGTH)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

fn csrf_cookie(config: &CsrfConfig, token: &str) -> String {
    let mut cookie = format!(
        "{}={}; Max-Age={}; Path={}; SameSite={}",
        config.cookie_name, token, config.cookie_max_age_secs, config.cookie_path, config.cookie_samesite,
    );
    if let Some(domain) = &config.cookie_domain {
        cookie.push_str("; Domain=");
        cookie.push_str(domain);
    }
    if config.cookie_secure {
        cookie.push_str("; Secure");
    }
    cookie
}
