//! The Graph API client contract.
//!
//! Decorators implement [`GraphApi`] by holding an inner client and calling
//! through after their own pre/post logic. [`dispatch_async`] drives an
//! asynchronous call and routes its completion event through the outermost
//! client's [`GraphApi::on_completed`], so every layer of the chain observes
//! the event before the one it wraps.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;

use crate::error::Result;
use crate::types::{ApiEvent, HttpMethod, Params, UserToken};

pub trait GraphApi: Send + Sync {
    fn access_token(&self) -> Option<&str>;

    fn set_access_token(&mut self, token: Option<String>);

    /// Whether calls go to the pre-release (beta) Graph host.
    fn use_beta(&self) -> bool;

    fn set_use_beta(&mut self, use_beta: bool);

    /// Synchronous call.
    fn api(&self, path: &str, params: Option<&Params>, method: HttpMethod) -> Result<Value>;

    /// Synchronous call decoded into `T`.
    fn api_as<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&Params>,
        method: HttpMethod,
    ) -> Result<T>
    where
        Self: Sized,
    {
        let value = self.api(path, params, method)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Asynchronous transport call. `user_token` correlates the call with its
    /// completion event; the transport itself does not inspect it.
    fn api_async(
        &self,
        path: &str,
        params: Option<&Params>,
        method: HttpMethod,
        user_token: UserToken,
    ) -> impl Future<Output = Result<Value>> + Send;

    /// Completion hook, fired once per asynchronous call for every verb.
    fn on_completed(&self, _event: &ApiEvent) {}
}

/// Run an asynchronous call to completion and fire the completion hook.
pub async fn dispatch_async<C: GraphApi>(
    client: &C,
    path: &str,
    params: Option<&Params>,
    method: HttpMethod,
    user_token: UserToken,
) -> ApiEvent {
    let result = client
        .api_async(path, params, method, user_token.clone())
        .await;
    let event = ApiEvent::new(method, user_token, result);
    client.on_completed(&event);
    event
}
