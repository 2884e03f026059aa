use std::sync::Arc;

use axum::{
    extract::{Extension, Request},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_cookies::Cookies;

pub const SESSION_COOKIE: &str = "beanscan_session";

/// Resolves a bearer token to a user id. Issuing tokens happens elsewhere.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<i32>;
}

/// Accepts the numeric user id itself as the token.
pub struct PlainUserIdVerifier;

impl TokenVerifier for PlainUserIdVerifier {
    fn verify(&self, token: &str) -> Option<i32> {
        token.trim().parse::<i32>().ok().filter(|id| *id > 0)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

pub async fn auth_middleware(
    Extension(verifier): Extension<Arc<dyn TokenVerifier>>,
    cookies: Cookies,
    mut request: Request,
    next: Next,
) -> Response {
    let token = bearer_token(request.headers())
        .map(str::to_string)
        .or_else(|| cookies.get(SESSION_COOKIE).map(|c| c.value().to_string()));

    if let Some(user_id) = token.as_deref().and_then(|t| verifier.verify(t)) {
        tracing::Span::current().record("user_id", user_id);
        request.extensions_mut().insert(user_id);
        return next.run(request).await;
    }

    tracing::Span::current().record("error", "unauthorized");
    (StatusCode::UNAUTHORIZED, Json(json!({"error": "Unauthorized"}))).into_response()
}
