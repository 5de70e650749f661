//! HTTP transport for the Graph API.
//!
//! URL and parameter encoding are plain functions so they can be checked
//! without IO. The client itself is behind the `http` feature.
//!
//! - GET/DELETE carry parameters in the query string, POST as a form body
//! - The access token travels as the `access_token` parameter
//! - Error bodies are classified by [`GraphError::from_response`]

use serde_json::Value;

use crate::error::{GraphError, Result};
use crate::types::{ClientConfig, Params};

/// Full request URL for `path` on the selected Graph host.
pub fn request_url(config: &ClientConfig, use_beta: bool, path: &str) -> String {
    format!("{}/{}", config.base_url(use_beta), path.trim_start_matches('/'))
}

/// Flatten call parameters into wire pairs, appending the access token
/// unless the caller already supplied one.
pub fn wire_params(params: Option<&Params>, access_token: Option<&str>) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = params
        .into_iter()
        .flatten()
        .map(|(k, v)| (k.clone(), wire_value(v)))
        .collect();

    let caller_token = params.is_some_and(|p| p.contains_key("access_token"));
    if let (Some(token), false) = (access_token, caller_token) {
        pairs.push(("access_token".into(), token.to_string()));
    }
    pairs
}

fn wire_value(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Decode a response body and map Graph errors.
pub fn decode_response(status: u16, body: &str) -> Result<Value> {
    let value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
    };
    match GraphError::from_response(status, &value) {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

#[cfg(feature = "http")]
pub use client::{CompletionNotice, HttpGraphClient};

#[cfg(feature = "http")]
mod client {
    use once_cell::sync::OnceCell;
    use serde_json::Value;
    use std::future::Future;
    use std::time::Duration;
    use tokio::sync::broadcast;
    use tracing::{debug, warn};

    use super::{decode_response, request_url, wire_params};
    use crate::api::GraphApi;
    use crate::error::{GraphError, Result};
    use crate::types::{ApiEvent, ClientConfig, HttpMethod, Params, UserToken};

    const EVENT_CAPACITY: usize = 64;

    /// Summary of a completed asynchronous call, published to subscribers.
    #[derive(Debug, Clone)]
    pub struct CompletionNotice {
        pub method: HttpMethod,
        pub user_token: UserToken,
        pub error: Option<String>,
        pub oauth_failure: bool,
    }

    /// reqwest-backed Graph client.
    ///
    /// The synchronous [`GraphApi::api`] uses `reqwest::blocking` and must not
    /// be called from inside an async runtime.
    pub struct HttpGraphClient {
        config: ClientConfig,
        access_token: Option<String>,
        use_beta: bool,
        http: reqwest::Client,
        blocking: OnceCell<reqwest::blocking::Client>,
        events: broadcast::Sender<CompletionNotice>,
    }

    impl HttpGraphClient {
        pub fn new(config: ClientConfig) -> Result<Self> {
            let http = reqwest::Client::builder()
                .timeout(Duration::from_millis(config.timeout_ms))
                .build()
                .map_err(|e| GraphError::Http(e.to_string()))?;
            let (events, _) = broadcast::channel(EVENT_CAPACITY);
            Ok(Self {
                config,
                access_token: None,
                use_beta: false,
                http,
                blocking: OnceCell::new(),
                events,
            })
        }

        pub fn config(&self) -> &ClientConfig {
            &self.config
        }

        /// Receive a notice for every completed asynchronous call.
        pub fn subscribe(&self) -> broadcast::Receiver<CompletionNotice> {
            self.events.subscribe()
        }

        fn blocking(&self) -> Result<&reqwest::blocking::Client> {
            self.blocking.get_or_try_init(|| {
                reqwest::blocking::Client::builder()
                    .timeout(Duration::from_millis(self.config.timeout_ms))
                    .build()
                    .map_err(|e| GraphError::Http(e.to_string()))
            })
        }
    }

    impl GraphApi for HttpGraphClient {
        fn access_token(&self) -> Option<&str> {
            self.access_token.as_deref()
        }

        fn set_access_token(&mut self, token: Option<String>) {
            self.access_token = token;
        }

        fn use_beta(&self) -> bool {
            self.use_beta
        }

        fn set_use_beta(&mut self, use_beta: bool) {
            self.use_beta = use_beta;
        }

        fn api(&self, path: &str, params: Option<&Params>, method: HttpMethod) -> Result<Value> {
            let url = request_url(&self.config, self.use_beta, path);
            let pairs = wire_params(params, self.access_token.as_deref());
            debug!(%method, %url, "graph call");

            let http = self.blocking()?;
            let req = match method {
                HttpMethod::Get => http.get(&url).query(&pairs),
                HttpMethod::Post => http.post(&url).form(&pairs),
                HttpMethod::Delete => http.delete(&url).query(&pairs),
            };
            let resp = req.send().map_err(|e| GraphError::Http(e.to_string()))?;
            let status = resp.status().as_u16();
            let body = resp.text().map_err(|e| GraphError::Http(e.to_string()))?;
            decode_response(status, &body)
        }

        fn api_async(
            &self,
            path: &str,
            params: Option<&Params>,
            method: HttpMethod,
            _user_token: UserToken,
        ) -> impl Future<Output = Result<Value>> + Send {
            let url = request_url(&self.config, self.use_beta, path);
            let pairs = wire_params(params, self.access_token.as_deref());
            debug!(%method, %url, "graph call (async)");

            let req = match method {
                HttpMethod::Get => self.http.get(&url).query(&pairs),
                HttpMethod::Post => self.http.post(&url).form(&pairs),
                HttpMethod::Delete => self.http.delete(&url).query(&pairs),
            };
            async move {
                let resp = req.send().await.map_err(|e| GraphError::Http(e.to_string()))?;
                let status = resp.status().as_u16();
                let body = resp.text().await.map_err(|e| GraphError::Http(e.to_string()))?;
                decode_response(status, &body)
            }
        }

        fn on_completed(&self, event: &ApiEvent) {
            match event.error() {
                Some(err) => warn!(method = %event.method, error = %err, "graph call failed"),
                None => debug!(method = %event.method, "graph call completed"),
            }
            let notice = CompletionNotice {
                method: event.method,
                user_token: event.user_token.clone(),
                error: event.error().map(ToString::to_string),
                oauth_failure: event.error().is_some_and(GraphError::is_oauth),
            };
            // No subscribers is not an error.
            let _ = self.events.send(notice);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn url_selects_beta_host() {
        let cfg = ClientConfig::default();
        assert_eq!(request_url(&cfg, false, "/me"), "https://graph.facebook.com/me");
        assert_eq!(request_url(&cfg, true, "me/feed"), "https://graph.beta.facebook.com/me/feed");
    }

    #[test]
    fn wire_params_stringify_values_and_append_token() {
        let p = params(&[
            ("return_ssl_resources", json!(true)),
            ("limit", json!(5)),
            ("fields", json!("id,name")),
        ]);
        let pairs = wire_params(Some(&p), Some("tok"));
        assert!(pairs.contains(&("return_ssl_resources".into(), "true".into())));
        assert!(pairs.contains(&("limit".into(), "5".into())));
        assert!(pairs.contains(&("fields".into(), "id,name".into())));
        assert_eq!(pairs.last(), Some(&("access_token".into(), "tok".into())));
    }

    #[test]
    fn caller_token_is_not_overridden() {
        let p = params(&[("access_token", json!("mine"))]);
        let pairs = wire_params(Some(&p), Some("ctx"));
        assert_eq!(pairs, vec![("access_token".to_string(), "mine".to_string())]);
    }

    #[test]
    fn no_params_no_token_is_empty() {
        assert!(wire_params(None, None).is_empty());
    }

    #[test]
    fn decode_success_and_plain_text() {
        assert_eq!(decode_response(200, r#"{"id":"4"}"#).unwrap(), json!({"id": "4"}));
        assert_eq!(decode_response(200, "true").unwrap(), json!(true));
        assert_eq!(decode_response(200, "").unwrap(), Value::Null);
    }

    #[test]
    fn decode_oauth_error() {
        let body = r#"{"error":{"type":"OAuthException","message":"Session has expired"}}"#;
        assert!(decode_response(400, body).unwrap_err().is_oauth());
    }
}
