//! Client for the aggregation server: the node side of the wire contract.

use reqwest::Client as HttpClient;
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

use crate::error::{Result, SrvError};
use crate::store::NodeReport;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one aggregation server.
#[derive(Debug, Clone)]
pub struct AggregatorClient {
    http: HttpClient,
    base_url: String,
}

impl AggregatorClient {
    /// Client for the server at `base_url` (scheme + host + port).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = HttpClient::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Exchange Basic credentials for a bearer token.
    pub async fn fetch_token(&self, username: &str, password: &str) -> Result<String> {
        let url = format!("{}/token", self.base_url);
        debug!(url = %url, "fetching token");

        let response = self
            .http
            .get(&url)
            .basic_auth(username, Some(password))
            .send()
            .await
            .map_err(|e| SrvError::Http(e.to_string()))?;

        match response.status() {
            StatusCode::OK => response
                .text()
                .await
                .map_err(|e| SrvError::Http(e.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SrvError::Unauthorized),
            status => Err(SrvError::Status(status.as_u16())),
        }
    }

    /// Submit one node's serialized results.
    pub async fn push_results(&self, node_id: &str, results: &str, token: &str) -> Result<()> {
        let url = format!("{}/results", self.base_url);
        let report = NodeReport {
            node_id: node_id.to_string(),
            results: results.to_string(),
        };
        debug!(url = %url, node = %node_id, "pushing results");

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&report)
            .send()
            .await
            .map_err(|e| SrvError::Http(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SrvError::Unauthorized),
            status => Err(SrvError::Status(status.as_u16())),
        }
    }

    /// Fetch the stored results for a node, verbatim. An empty body means
    /// the node has not reported.
    pub async fn fetch_results(&self, node_id: &str, token: &str) -> Result<Vec<u8>> {
        let url = format!("{}/result", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("nodeID", node_id)])
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SrvError::Http(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(response
                .bytes()
                .await
                .map_err(|e| SrvError::Http(e.to_string()))?
                .to_vec()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SrvError::Unauthorized),
            status => Err(SrvError::Status(status.as_u16())),
        }
    }

    /// Whether the server has received a report from `node_id`.
    pub async fn check_node(&self, node_id: &str) -> Result<bool> {
        let url = format!("{}/checkNode", self.base_url);

        let response = self
            .http
            .post(&url)
            .body(node_id.to_string())
            .send()
            .await
            .map_err(|e| SrvError::Http(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(SrvError::Status(response.status().as_u16()));
        }
        let body = response
            .text()
            .await
            .map_err(|e| SrvError::Http(e.to_string()))?;
        Ok(body.trim() == "true")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let client = AggregatorClient::new("http://localhost:8000/");
        assert_eq!(client.base_url, "http://localhost:8000");
    }
}
