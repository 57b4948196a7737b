//! Request handlers for the aggregation API.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum_extra::headers::authorization::Basic;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use ring::constant_time::verify_slices_are_equal;
use serde::Deserialize;
use tracing::{info, warn};

use super::ApiState;
use crate::auth::{Claims, Permission, User, ADMINISTRATOR_ROLE};
use crate::store::NodeReport;

/// Build the acting user from validated token claims.
fn user_from_claims(claims: &Claims) -> User {
    let roles = if claims.admin {
        vec![ADMINISTRATOR_ROLE.to_string()]
    } else {
        Vec::new()
    };
    User {
        id: 0,
        name: claims.sub.clone(),
        roles,
    }
}

/// `GET /token`: exchange Basic credentials for a signed bearer token.
pub async fn get_token(
    State(state): State<ApiState>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
) -> Response {
    let Some(TypedHeader(auth)) = auth else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let username_ok =
        verify_slices_are_equal(auth.username().as_bytes(), state.username.as_bytes()).is_ok();
    let password_ok =
        verify_slices_are_equal(auth.password().as_bytes(), state.password.as_bytes()).is_ok();

    if !(username_ok && password_ok) {
        warn!(username = %auth.username(), "rejected token request");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let Some(admin) = state.users.read(1) else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    match state.tokens.issue(&admin) {
        Ok(token) => {
            info!(user = %admin.name, "issued bearer token");
            (
                [(
                    header::STRICT_TRANSPORT_SECURITY,
                    "max-age=63072000; includeSubDomains",
                )],
                token,
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "token issuance failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to generate token").into_response()
        }
    }
}

/// `POST /results`: decode and store one node's report.
///
/// A malformed body is this request's problem alone: 400, with the
/// server still serving every other node.
pub async fn post_results(
    State(state): State<ApiState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Response {
    let user = user_from_claims(&claims);
    if let Err(e) = state
        .acl
        .check_permission(Some(&user), Some(&Permission::from("results:write")))
    {
        warn!(error = %e, "results submission denied");
        return StatusCode::FORBIDDEN.into_response();
    }

    let report: NodeReport = match serde_json::from_slice(&body) {
        Ok(report) => report,
        Err(e) => {
            warn!(error = %e, "malformed report body");
            return (StatusCode::BAD_REQUEST, "malformed report body").into_response();
        }
    };

    info!(node = %report.node_id, bytes = report.results.len(), "report received");
    state.store.record(report);
    StatusCode::OK.into_response()
}

/// Query string of `GET /result`.
#[derive(Debug, Deserialize)]
pub struct ResultQuery {
    /// Node identifier to fetch.
    #[serde(rename = "nodeID")]
    pub node_id: Option<String>,
}

/// `GET /result?nodeID=...`: stored blob verbatim; an unknown node id is
/// an empty 200, not an error.
pub async fn get_results(
    State(state): State<ApiState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ResultQuery>,
) -> Response {
    let user = user_from_claims(&claims);
    if let Err(e) = state
        .acl
        .check_permission(Some(&user), Some(&Permission::from("results:read")))
    {
        warn!(error = %e, "results read denied");
        return StatusCode::FORBIDDEN.into_response();
    }

    let Some(node_id) = query.node_id else {
        return (StatusCode::BAD_REQUEST, "nodeID query parameter required").into_response();
    };

    let body = state.store.results_for(&node_id).unwrap_or_default();
    (
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

/// `GET /getNodeList`: the fleet snapshot taken at server start,
/// space-joined. Not refreshed per request.
pub async fn get_node_list(State(state): State<ApiState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/html")],
        state.nodes.join(" "),
    )
        .into_response()
}

/// `POST /checkNode`: body is a raw node id; answers `"true"` when at
/// least one report from that node has been received.
pub async fn check_node(State(state): State<ApiState>, body: Bytes) -> Response {
    let node_id = String::from_utf8_lossy(&body);
    let found = state.store.has_reported(node_id.trim());
    (
        [(header::CONTENT_TYPE, "text/html")],
        if found { "true" } else { "false" },
    )
        .into_response()
}
