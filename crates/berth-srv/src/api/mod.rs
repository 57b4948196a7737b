//! The aggregation HTTP surface.
//!
//! Routes:
//! - `GET /token` -- Basic credentials in, signed bearer token out.
//! - `POST /results` (bearer auth) -- store one node's report.
//! - `GET /result?nodeID=...` (bearer auth) -- stored blob, verbatim.
//! - `GET /getNodeList` -- static fleet snapshot, space-joined.
//! - `POST /checkNode` -- whether a node id has reported yet.
//! - `/` -- viewer UI assets, when configured.

pub mod handlers;
pub mod middleware;

use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{AclService, TokenService, UserStore};
use crate::config::ServerConfig;
use crate::error::Result;
use crate::store::ReportStore;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct ApiState {
    /// Report map + received log, behind one lock.
    pub store: Arc<ReportStore>,
    /// Token issuance/validation with the process signing key.
    pub tokens: Arc<TokenService>,
    /// Permission policy.
    pub acl: AclService,
    /// User accounts.
    pub users: Arc<UserStore>,
    /// Static fleet snapshot taken at server start.
    pub nodes: Arc<Vec<String>>,
    /// Reference username for `GET /token`.
    pub username: Arc<str>,
    /// Reference password for `GET /token`.
    pub password: Arc<str>,
}

impl ApiState {
    /// Assemble state from config, the fleet snapshot and a signing key.
    pub fn new(config: &ServerConfig, nodes: Vec<String>, signing_key: &[u8]) -> Result<Self> {
        let password = config.reference_password()?;
        Ok(Self {
            store: Arc::new(ReportStore::new()),
            tokens: Arc::new(TokenService::new(signing_key, config.token_ttl_hours)),
            acl: AclService::new(),
            users: Arc::new(UserStore::new()),
            nodes: Arc::new(nodes),
            username: Arc::from(config.username.as_str()),
            password: Arc::from(password.as_str()),
        })
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: ApiState, asset_dir: Option<&Path>) -> Router {
    let protected = Router::new()
        .route("/results", post(handlers::post_results))
        .route("/result", get(handlers::get_results))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::authenticate,
        ));

    let router = Router::new()
        .route("/token", get(handlers::get_token))
        .route("/getNodeList", get(handlers::get_node_list))
        .route("/checkNode", post(handlers::check_node))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match asset_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::generate_signing_key;
    use crate::client::AggregatorClient;
    use crate::error::SrvError;
    use futures_util::future::join_all;
    use std::net::SocketAddr;

    const USERNAME: &str = "defaultUser";
    const PASSWORD: &str = "hunter2";

    /// Serve the full router on an ephemeral port.
    async fn spawn_server(nodes: Vec<String>) -> (SocketAddr, ApiState) {
        let config = ServerConfig {
            password: Some(PASSWORD.to_string()),
            ..ServerConfig::default()
        };
        let key = generate_signing_key().unwrap();
        let state = ApiState::new(&config, nodes, &key).unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = router(state.clone(), None);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (addr, state)
    }

    async fn client_for(addr: SocketAddr) -> AggregatorClient {
        AggregatorClient::new(format!("http://{addr}"))
    }

    #[tokio::test]
    async fn test_token_round_trip_and_result_storage() {
        let (addr, _state) = spawn_server(Vec::new()).await;
        let client = client_for(addr).await;

        let token = client.fetch_token(USERNAME, PASSWORD).await.unwrap();
        let results = r#"[{"Name":"kernel_version","Status":"PASS","Output":""}]"#;

        client.push_results("n1", results, &token).await.unwrap();

        let fetched = client.fetch_results("n1", &token).await.unwrap();
        assert_eq!(fetched, results.as_bytes());

        // Idempotent: a second GET with no intervening POST is identical.
        let again = client.fetch_results("n1", &token).await.unwrap();
        assert_eq!(again, fetched);
    }

    #[tokio::test]
    async fn test_unknown_node_returns_empty_200() {
        let (addr, _state) = spawn_server(Vec::new()).await;
        let client = client_for(addr).await;
        let token = client.fetch_token(USERNAME, PASSWORD).await.unwrap();

        let fetched = client.fetch_results("ghost", &token).await.unwrap();
        assert!(fetched.is_empty());
    }

    #[tokio::test]
    async fn test_bad_basic_credentials_rejected() {
        let (addr, _state) = spawn_server(Vec::new()).await;
        let client = client_for(addr).await;

        let err = client.fetch_token(USERNAME, "wrong").await.unwrap_err();
        assert!(matches!(err, SrvError::Unauthorized));
        let err = client.fetch_token("intruder", PASSWORD).await.unwrap_err();
        assert!(matches!(err, SrvError::Unauthorized));
    }

    #[tokio::test]
    async fn test_results_require_valid_token() {
        let (addr, state) = spawn_server(Vec::new()).await;

        let http = reqwest::Client::new();
        let url = format!("http://{addr}/results");
        let body = r#"{"NodeID":"n1","Results":"[]"}"#;

        // No Authorization header.
        let resp = http.post(&url).body(body).send().await.unwrap();
        assert_eq!(resp.status(), 401);

        // Malformed token.
        let resp = http
            .post(&url)
            .bearer_auth("not.a.token")
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);

        // Token signed with a different key.
        let foreign_key = generate_signing_key().unwrap();
        let foreign = crate::auth::TokenService::new(&foreign_key, 24);
        let forged = foreign
            .issue(&crate::auth::User {
                id: 1,
                name: "Admin".to_string(),
                roles: vec![crate::auth::ADMINISTRATOR_ROLE.to_string()],
            })
            .unwrap();
        let resp = http
            .post(&url)
            .bearer_auth(forged)
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 401);

        // Expired token signed with the right key: issue with a 0h TTL
        // service sharing the same key is not reachable from here, so
        // assert instead that nothing was stored by any rejected call.
        assert_eq!(state.store.received_count(), 0);
        assert_eq!(state.store.node_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_body_is_400_and_server_survives() {
        let (addr, state) = spawn_server(Vec::new()).await;
        let client = client_for(addr).await;
        let token = client.fetch_token(USERNAME, PASSWORD).await.unwrap();

        let http = reqwest::Client::new();
        let resp = http
            .post(format!("http://{addr}/results"))
            .bearer_auth(&token)
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(state.store.received_count(), 0);

        // The server is still alive and accepts a good report.
        client.push_results("n1", "[]", &token).await.unwrap();
        assert_eq!(state.store.node_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_node_id_param_is_400() {
        let (addr, _state) = spawn_server(Vec::new()).await;
        let client = client_for(addr).await;
        let token = client.fetch_token(USERNAME, PASSWORD).await.unwrap();

        let http = reqwest::Client::new();
        let resp = http
            .get(format!("http://{addr}/result"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
    }

    #[tokio::test]
    async fn test_check_node_tracks_reports() {
        let (addr, _state) = spawn_server(Vec::new()).await;
        let client = client_for(addr).await;
        let token = client.fetch_token(USERNAME, PASSWORD).await.unwrap();

        assert!(!client.check_node("n1").await.unwrap());

        client.push_results("n1", "[]", &token).await.unwrap();

        assert!(client.check_node("n1").await.unwrap());
        // Other nodes are unaffected.
        assert!(!client.check_node("n2").await.unwrap());
    }

    #[tokio::test]
    async fn test_node_list_is_static_snapshot() {
        let nodes = vec!["node-a".to_string(), "node-b".to_string()];
        let (addr, _state) = spawn_server(nodes).await;

        let body = reqwest::get(format!("http://{addr}/getNodeList"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "node-a node-b");
    }

    #[tokio::test]
    async fn test_concurrent_posts_distinct_nodes_no_lost_updates() {
        let (addr, state) = spawn_server(Vec::new()).await;
        let client = client_for(addr).await;
        let token = client.fetch_token(USERNAME, PASSWORD).await.unwrap();

        let posts = (0..24).map(|i| {
            let client = client.clone();
            let token = token.clone();
            async move {
                client
                    .push_results(&format!("node-{i}"), &format!("[{i}]"), &token)
                    .await
            }
        });
        for outcome in join_all(posts).await {
            outcome.unwrap();
        }

        assert_eq!(state.store.node_count(), 24);
        for i in 0..24 {
            let fetched = client
                .fetch_results(&format!("node-{i}"), &token)
                .await
                .unwrap();
            assert_eq!(fetched, format!("[{i}]").into_bytes());
        }
    }

    #[tokio::test]
    async fn test_overwrite_is_last_write_wins() {
        let (addr, _state) = spawn_server(Vec::new()).await;
        let client = client_for(addr).await;
        let token = client.fetch_token(USERNAME, PASSWORD).await.unwrap();

        client.push_results("n1", "[1]", &token).await.unwrap();
        client.push_results("n1", "[2]", &token).await.unwrap();

        let fetched = client.fetch_results("n1", &token).await.unwrap();
        assert_eq!(fetched, b"[2]".to_vec());
    }
}
