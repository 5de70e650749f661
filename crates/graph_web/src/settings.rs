use serde::{Deserialize, Serialize};

use crate::error::{Result, WebError};

pub const ENV_APP_ID: &str = "FACEBOOK_APP_ID";
pub const ENV_USE_BETA: &str = "FACEBOOK_USE_BETA";
pub const ENV_BASE_DOMAIN: &str = "FACEBOOK_BASE_DOMAIN";

/// Application settings visible to the hosted request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSettings {
    /// Application id; names the auth cookie (`fbs_<app_id>`).
    #[serde(default)]
    pub app_id: Option<String>,
    /// Send Graph calls to the beta endpoint.
    #[serde(default)]
    pub use_facebook_beta: bool,
    /// Cookie domain used when the auth cookie is cleared.
    #[serde(default)]
    pub base_domain: Option<String>,
}

impl WebSettings {
    /// Load from `FACEBOOK_APP_ID`, `FACEBOOK_USE_BETA`, `FACEBOOK_BASE_DOMAIN`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let use_facebook_beta = match non_empty(ENV_USE_BETA) {
            None => false,
            Some(v) => parse_flag(&v).ok_or(WebError::InvalidSetting {
                key: ENV_USE_BETA,
                value: v,
            })?,
        };

        Ok(Self {
            app_id: non_empty(ENV_APP_ID),
            use_facebook_beta,
            base_domain: non_empty(ENV_BASE_DOMAIN),
        })
    }
}

fn parse_flag(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let s = WebSettings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s, WebSettings::default());
    }

    #[test]
    fn reads_all_keys() {
        let s = WebSettings::from_lookup(lookup(&[
            (ENV_APP_ID, "120625701301347"),
            (ENV_USE_BETA, "True"),
            (ENV_BASE_DOMAIN, "example.com"),
        ]))
        .unwrap();
        assert_eq!(s.app_id.as_deref(), Some("120625701301347"));
        assert!(s.use_facebook_beta);
        assert_eq!(s.base_domain.as_deref(), Some("example.com"));
    }

    #[test]
    fn rejects_bad_flag() {
        let err = WebSettings::from_lookup(lookup(&[(ENV_USE_BETA, "maybe")])).unwrap_err();
        assert!(matches!(err, WebError::InvalidSetting { key: ENV_USE_BETA, .. }));
    }

    #[test]
    fn deserializes_with_defaults() {
        let s: WebSettings = serde_json::from_str(r#"{"app_id":"1"}"#).unwrap();
        assert_eq!(s.app_id.as_deref(), Some("1"));
        assert!(!s.use_facebook_beta);
    }
}
