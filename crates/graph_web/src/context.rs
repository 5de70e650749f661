//! The hosted request as seen by the adapter.
//!
//! [`WebContext`] is the narrow surface the adapter reads: token, transport
//! security, settings, referrer host, and auth cookie deletion.
//! [`RequestContext`] implements it over an incoming `http` request.

use axum::http::{header, request::Parts, HeaderMap, HeaderValue, Request, Uri};
use std::sync::Mutex;

use crate::error::CookieError;
use crate::settings::WebSettings;

const AUTH_COOKIE_PREFIX: &str = "fbs_";

pub trait WebContext: Send + Sync {
    fn access_token(&self) -> Option<String>;

    fn is_secure_connection(&self) -> bool;

    fn settings(&self) -> &WebSettings;

    /// Host of the referring page, if the request carried a usable `Referer`.
    fn referrer_host(&self) -> Option<String>;

    /// Clear the session's auth cookie on the outgoing response.
    fn delete_auth_cookie(&self) -> Result<(), CookieError>;
}

/// [`WebContext`] for one incoming request. Cookie deletions are queued as
/// `Set-Cookie` headers for the hosting layer to copy onto its response.
#[derive(Debug)]
pub struct RequestContext {
    settings: WebSettings,
    secure: bool,
    referrer_host: Option<String>,
    access_token: Option<String>,
    response_cookies: Mutex<Vec<HeaderValue>>,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts, settings: WebSettings) -> Self {
        Self::from_uri_and_headers(&parts.uri, &parts.headers, settings)
    }

    pub fn from_request<B>(req: &Request<B>, settings: WebSettings) -> Self {
        Self::from_uri_and_headers(req.uri(), req.headers(), settings)
    }

    fn from_uri_and_headers(uri: &Uri, headers: &HeaderMap, settings: WebSettings) -> Self {
        let access_token = auth_cookie_name(&settings)
            .and_then(|name| cookie_value(headers, &name))
            .and_then(|value| token_from_session_cookie(&value));
        Self {
            secure: is_secure_request(uri, headers),
            referrer_host: referrer_host(headers),
            access_token,
            settings,
            response_cookies: Mutex::new(Vec::new()),
        }
    }

    /// Use an access token obtained elsewhere (e.g. a signed request).
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Override transport detection, for servers that terminate TLS themselves.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn auth_cookie_name(&self) -> Option<String> {
        auth_cookie_name(&self.settings)
    }

    /// Drain the `Set-Cookie` headers queued for the response.
    pub fn take_response_cookies(&self) -> Vec<HeaderValue> {
        let mut jar = self
            .response_cookies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *jar)
    }
}

impl WebContext for RequestContext {
    fn access_token(&self) -> Option<String> {
        self.access_token.clone()
    }

    fn is_secure_connection(&self) -> bool {
        self.secure
    }

    fn settings(&self) -> &WebSettings {
        &self.settings
    }

    fn referrer_host(&self) -> Option<String> {
        self.referrer_host.clone()
    }

    fn delete_auth_cookie(&self) -> Result<(), CookieError> {
        let name = self.auth_cookie_name().ok_or(CookieError::MissingAppId)?;
        let mut cookie = format!("{name}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
        if let Some(domain) = &self.settings.base_domain {
            cookie.push_str(&format!("; Domain=.{}", domain.trim_start_matches('.')));
        }
        let value = HeaderValue::from_str(&cookie).map_err(|e| CookieError::Header(e.to_string()))?;
        self.response_cookies
            .lock()
            .map_err(|_| CookieError::Poisoned)?
            .push(value);
        Ok(())
    }
}

fn auth_cookie_name(settings: &WebSettings) -> Option<String> {
    settings
        .app_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(|id| format!("{AUTH_COOKIE_PREFIX}{id}"))
}

/// Secure when the URI scheme is https, or a proxy says so through
/// `X-Forwarded-Proto` (first hop) or `Forwarded: proto=https`.
pub fn is_secure_request(uri: &Uri, headers: &HeaderMap) -> bool {
    if uri.scheme_str() == Some("https") {
        return true;
    }

    let forwarded_proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim);
    if forwarded_proto.is_some_and(|p| p.eq_ignore_ascii_case("https")) {
        return true;
    }

    headers
        .get(header::FORWARDED)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .is_some_and(|hop| {
            hop.split(';').any(|pair| match pair.split_once('=') {
                Some((k, v)) => {
                    k.trim().eq_ignore_ascii_case("proto")
                        && v.trim().trim_matches('"').eq_ignore_ascii_case("https")
                }
                None => false,
            })
        })
}

pub fn referrer_host(headers: &HeaderMap) -> Option<String> {
    let referer = headers.get(header::REFERER)?.to_str().ok()?;
    let uri: Uri = referer.parse().ok()?;
    uri.host().map(str::to_string)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

/// The session cookie holds a quoted, URL-encoded query string
/// (`"access_token=...&expires=...&sig=..."`).
fn token_from_session_cookie(value: &str) -> Option<String> {
    value
        .trim_matches('"')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "access_token")
        .and_then(|(_, v)| urlencoding::decode(v).ok())
        .map(|v| v.into_owned())
        .filter(|v| !v.is_empty())
}
