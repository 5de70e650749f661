use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::GraphError;

/// Call parameters: parameter name → arbitrary JSON value.
pub type Params = BTreeMap<String, serde_json::Value>;

/// Caller-supplied correlation token for asynchronous calls. Opaque to the client.
pub type UserToken = serde_json::Value;

/// The HTTP verbs the Graph API is called with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            other => Err(GraphError::Http(format!("unsupported method: {other}"))),
        }
    }
}

/// Shallow merge of two parameter maps into a new map. Entries from
/// `overrides` win on key conflicts; neither input is modified.
pub fn merge(base: Option<&Params>, overrides: Option<&Params>) -> Params {
    let mut merged = base.cloned().unwrap_or_default();
    if let Some(overrides) = overrides {
        for (k, v) in overrides {
            merged.insert(k.clone(), v.clone());
        }
    }
    merged
}

/// Completion event raised after an asynchronous call finishes.
#[derive(Debug)]
pub struct ApiEvent {
    pub method: HttpMethod,
    pub user_token: UserToken,
    pub result: Result<serde_json::Value, GraphError>,
}

impl ApiEvent {
    pub fn new(
        method: HttpMethod,
        user_token: UserToken,
        result: Result<serde_json::Value, GraphError>,
    ) -> Self {
        Self { method, user_token, result }
    }

    pub fn error(&self) -> Option<&GraphError> {
        self.result.as_ref().err()
    }

    pub fn value(&self) -> Option<&serde_json::Value> {
        self.result.as_ref().ok()
    }
}

/// Transport configuration for the HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// Production Graph host
    #[serde(default = "default_graph_url")]
    pub graph_url: String,
    /// Pre-release Graph host, used when beta mode is on
    #[serde(default = "default_beta_graph_url")]
    pub beta_graph_url: String,
}

fn default_timeout() -> u64 {
    10_000
}
fn default_graph_url() -> String {
    "https://graph.facebook.com".into()
}
fn default_beta_graph_url() -> String {
    "https://graph.beta.facebook.com".into()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout(),
            graph_url: default_graph_url(),
            beta_graph_url: default_beta_graph_url(),
        }
    }
}

impl ClientConfig {
    /// Base URL for the selected endpoint, without a trailing slash.
    pub fn base_url(&self, use_beta: bool) -> &str {
        let url = if use_beta { &self.beta_graph_url } else { &self.graph_url };
        url.trim_end_matches('/')
    }
}
