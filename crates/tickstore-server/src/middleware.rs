use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The shared webhook trigger secret, checked by middleware.
///
/// There is exactly one deployment-level credential, not per-user identities;
/// a request either carries it or it doesn't. Construction requires a token:
/// config loading already refuses to start the process without one, so auth
/// can never be silently disabled.
#[derive(Clone)]
pub struct WebhookAuth {
    token: Arc<String>,
}

impl WebhookAuth {
    #[must_use]
    pub fn new(token: &str) -> Self {
        Self {
            token: Arc::new(token.to_owned()),
        }
    }

    #[must_use]
    pub fn from_config(config: &tickstore_core::AppConfig) -> Self {
        Self::new(&config.webhook_token)
    }

    /// Constant-time comparison against the configured secret.
    fn allows(&self, presented: &str) -> bool {
        presented.as_bytes().ct_eq(self.token.as_bytes()).into()
    }
}

impl std::fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookAuth")
            .field("token", &"[redacted]")
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for MiddlewareErrorBody {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware enforcing the Bearer trigger secret.
///
/// Runs before any handler on the protected routes, so an unauthorized
/// caller is rejected without ever reaching — or observing — job state.
pub async fn require_bearer_auth(
    State(auth): State<WebhookAuth>,
    req: Request,
    next: Next,
) -> Response {
    let token = extract_bearer_token(req.headers().get(AUTHORIZATION));

    match token {
        Some(token) if auth.allows(token) => next.run(req).await,
        Some(_) => {
            tracing::warn!("rejected request with invalid bearer token");
            unauthorized()
        }
        None => {
            tracing::warn!("rejected request with missing or malformed Authorization header");
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    MiddlewareErrorBody {
        error: MiddlewareError {
            code: "unauthorized",
            message: "missing or invalid bearer token",
        },
    }
    .into_response()
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|s| !s.trim().is_empty())
}
