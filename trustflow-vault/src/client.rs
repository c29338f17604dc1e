//! Per-node read protocol.
//!
//! Every configured storage node exposes `POST /api/v1/data/read` behind a
//! bearer JWT. A read is scoped by the agent identifier and the lowercased
//! recipient name; a node returns zero or one records, each carrying the
//! comma-joined share set for that name.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// One storage node in the cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Display name used in logs.
    pub name: String,

    /// Base URL of the node's API.
    pub url: Url,

    /// The node's decentralized identifier.
    pub did: String,

    /// Bearer token authorizing reads against this node.
    pub jwt: String,
}

/// Read query sent to each node.
#[derive(Debug, Serialize)]
struct ReadRequest<'a> {
    schema: &'a str,
    filter: ReadFilter<'a>,
}

#[derive(Debug, Serialize)]
struct ReadFilter<'a> {
    agent: &'a str,
    name: &'a str,
}

/// Envelope returned by a node.
#[derive(Debug, Deserialize)]
struct ReadResponse {
    #[serde(default)]
    data: Vec<ReadRecord>,
}

#[derive(Debug, Deserialize)]
struct ReadRecord {
    /// Comma-joined base64 share set.
    address: Option<String>,
}

/// Client over the full node cluster.
#[derive(Debug, Clone)]
pub struct VaultClient {
    http: reqwest::Client,
    nodes: Vec<NodeConfig>,
    schema_id: String,
    agent_id: String,
    node_timeout: Duration,
}

impl VaultClient {
    /// Default per-node timeout.
    pub const DEFAULT_NODE_TIMEOUT: Duration = Duration::from_secs(5);

    /// Creates a client for the given cluster.
    #[must_use]
    pub fn new(
        nodes: Vec<NodeConfig>,
        schema_id: impl Into<String>,
        agent_id: impl Into<String>,
        node_timeout: Duration,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            nodes,
            schema_id: schema_id.into(),
            agent_id: agent_id.into(),
            node_timeout,
        }
    }

    /// Returns the configured nodes, in configuration order.
    #[must_use]
    pub fn nodes(&self) -> &[NodeConfig] {
        &self.nodes
    }

    /// Reads the share set for `name` from every node concurrently.
    ///
    /// The result preserves configuration order. A slot is `None` when the
    /// node had no record, returned an error status, or did not answer
    /// within the per-node timeout — a transient outage is indistinguishable
    /// from "name does not exist" at this layer by design.
    pub async fn read_share_sets(&self, name: &str) -> Vec<Option<String>> {
        let lowered = name.trim().to_lowercase();
        let reads = self.nodes.iter().map(|node| self.read_node(node, &lowered));
        futures_util::future::join_all(reads).await
    }

    async fn read_node(&self, node: &NodeConfig, name: &str) -> Option<String> {
        let endpoint = node.url.join("api/v1/data/read").ok()?;
        let body = ReadRequest {
            schema: &self.schema_id,
            filter: ReadFilter {
                agent: &self.agent_id,
                name,
            },
        };

        let request = self
            .http
            .post(endpoint)
            .bearer_auth(&node.jwt)
            .json(&body)
            .send();

        let response = match tokio::time::timeout(self.node_timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                tracing::warn!(node = %node.name, error = %e, "vault node unreachable");
                return None;
            }
            Err(_) => {
                tracing::warn!(node = %node.name, timeout = ?self.node_timeout, "vault node timed out");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(node = %node.name, status = %response.status(), "vault node error status");
            return None;
        }

        let parsed: ReadResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(node = %node.name, error = %e, "vault node returned malformed body");
                return None;
            }
        };

        parsed.data.into_iter().next().and_then(|r| r.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn node(name: &str, server: &MockServer) -> NodeConfig {
        NodeConfig {
            name: name.to_owned(),
            url: server.uri().parse().unwrap(),
            did: format!("did:vault:{name}"),
            jwt: format!("jwt-{name}"),
        }
    }

    #[tokio::test]
    async fn test_read_sends_scoped_filter_with_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/data/read"))
            .and(header("authorization", "Bearer jwt-alpha"))
            .and(body_partial_json(json!({
                "schema": "book-schema",
                "filter": {"agent": "agent-1", "name": "designer"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"address": "c2hhcmU="}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = VaultClient::new(
            vec![node("alpha", &server)],
            "book-schema",
            "agent-1",
            Duration::from_secs(1),
        );

        let shares = client.read_share_sets("  Designer ").await;
        assert_eq!(shares, vec![Some("c2hhcmU=".to_owned())]);
    }

    #[tokio::test]
    async fn test_empty_data_is_a_miss() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/data/read"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .mount(&server)
            .await;

        let client = VaultClient::new(
            vec![node("alpha", &server)],
            "book-schema",
            "agent-1",
            Duration::from_secs(1),
        );

        assert_eq!(client.read_share_sets("ghost").await, vec![None]);
    }

    #[tokio::test]
    async fn test_error_status_counts_as_missing_share() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = VaultClient::new(
            vec![node("alpha", &server)],
            "book-schema",
            "agent-1",
            Duration::from_secs(1),
        );

        assert_eq!(client.read_share_sets("designer").await, vec![None]);
    }

    #[tokio::test]
    async fn test_slow_node_is_bounded_by_the_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"address": "c2hhcmU="}]}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = VaultClient::new(
            vec![node("slow", &server)],
            "book-schema",
            "agent-1",
            Duration::from_millis(100),
        );

        assert_eq!(client.read_share_sets("designer").await, vec![None]);
    }
}
