use graph_client::{ApiEvent, GraphApi, GraphError, HttpMethod, Params, UserToken};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::context::WebContext;
use crate::error::{CookieError, Result, WebError};
use crate::params::add_return_ssl_resources_if_required;

/// Referrer host of canvas apps running on the beta site.
pub const BETA_REFERRER_HOST: &str = "apps.beta.facebook.com";

/// Graph client bound to one hosted request.
///
/// Wraps an inner [`GraphApi`]. Every call gets `return_ssl_resources=true`
/// when the request is secure, and an OAuth failure clears the session's
/// auth cookie before the error reaches the caller. Cookie cleanup is best
/// effort: its own failure is discarded and never replaces the API error.
pub struct WebClient<C> {
    inner: C,
    context: Arc<dyn WebContext>,
    is_secure_connection: bool,
}

impl<C: GraphApi> WebClient<C> {
    /// Bind `inner` to the request `context`. The context is only read.
    pub fn new(mut inner: C, context: Option<Arc<dyn WebContext>>) -> Result<Self> {
        let context = context.ok_or(WebError::InvalidArgument("context"))?;

        let is_secure_connection = context.is_secure_connection();
        let referrer = context.referrer_host();
        inner.set_use_beta(resolve_use_beta(
            context.settings().use_facebook_beta,
            referrer.as_deref(),
        ));
        inner.set_access_token(context.access_token());

        Ok(Self {
            inner,
            context,
            is_secure_connection,
        })
    }

    pub fn is_secure_connection(&self) -> bool {
        self.is_secure_connection
    }

    pub fn set_is_secure_connection(&mut self, secure: bool) {
        self.is_secure_connection = secure;
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    pub fn context(&self) -> &Arc<dyn WebContext> {
        &self.context
    }

    /// Clear the auth cookie. The outcome is returned for the caller to drop.
    fn delete_auth_cookie_best_effort(&self) -> std::result::Result<(), CookieError> {
        debug!("oauth failure, clearing auth cookie");
        self.context.delete_auth_cookie()
    }
}

/// Beta mode is on when settings ask for it or the request came from the
/// beta site. The host match is exact.
pub fn resolve_use_beta(settings_flag: bool, referrer_host: Option<&str>) -> bool {
    settings_flag || referrer_host == Some(BETA_REFERRER_HOST)
}

impl<C: GraphApi> GraphApi for WebClient<C> {
    fn access_token(&self) -> Option<&str> {
        self.inner.access_token()
    }

    fn set_access_token(&mut self, token: Option<String>) {
        self.inner.set_access_token(token);
    }

    fn use_beta(&self) -> bool {
        self.inner.use_beta()
    }

    fn set_use_beta(&mut self, use_beta: bool) {
        self.inner.set_use_beta(use_beta);
    }

    fn api(&self, path: &str, params: Option<&Params>, method: HttpMethod) -> graph_client::error::Result<Value> {
        let params = add_return_ssl_resources_if_required(params, self.is_secure_connection);
        match self.inner.api(path, Some(&params), method) {
            Err(err) if err.is_oauth() => {
                let _ = self.delete_auth_cookie_best_effort();
                Err(err)
            }
            other => other,
        }
    }

    async fn api_async(
        &self,
        path: &str,
        params: Option<&Params>,
        method: HttpMethod,
        user_token: UserToken,
    ) -> graph_client::error::Result<Value> {
        let params = add_return_ssl_resources_if_required(params, self.is_secure_connection);
        self.inner
            .api_async(path, Some(&params), method, user_token)
            .await
    }

    /// Same rule for GET, POST and DELETE completions: clear the cookie on an
    /// OAuth failure, then hand the event to the inner client.
    fn on_completed(&self, event: &ApiEvent) {
        if event.error().is_some_and(GraphError::is_oauth) {
            let _ = self.delete_auth_cookie_best_effort();
        }
        self.inner.on_completed(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beta_from_settings_or_referrer() {
        assert!(resolve_use_beta(true, None));
        assert!(resolve_use_beta(false, Some("apps.beta.facebook.com")));
        assert!(resolve_use_beta(true, Some("apps.facebook.com")));
        assert!(!resolve_use_beta(false, Some("apps.facebook.com")));
        assert!(!resolve_use_beta(false, None));
    }

    #[test]
    fn beta_host_match_is_case_sensitive() {
        assert!(!resolve_use_beta(false, Some("Apps.Beta.Facebook.com")));
    }
}
