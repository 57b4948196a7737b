//! Bearer-token authentication middleware.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use super::ApiState;

/// Authenticate a request from its `Authorization: Bearer <token>` header.
///
/// Fails closed with 401 when the header is absent, empty, or carries a
/// token that does not validate. On success the parsed claims are
/// attached to the request's extensions and control moves to the next
/// handler.
pub async fn authenticate(
    State(state): State<ApiState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).trim())
        .unwrap_or_default();

    if token.is_empty() {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match state.tokens.validate(token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => {
            warn!(error = %e, "rejected bearer token");
            StatusCode::UNAUTHORIZED.into_response()
        }
    }
}
