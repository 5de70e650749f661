//! Graph API client contract.
//!
//! ```text
//! caller
//!   │  api / api_async (path, params, method)
//!   ▼
//! decorator(s) implementing GraphApi   (e.g. graph_web::WebClient)
//!   │
//!   ▼
//! HttpGraphClient                      (feature "http")
//!   │
//!   ▼
//! graph.facebook.com / graph.beta.facebook.com
//! ```
//!
//! Asynchronous calls complete through [`dispatch_async`], which hands the
//! resulting [`ApiEvent`] to the outermost client's `on_completed` hook.

pub mod api;
pub mod error;
pub mod http;
pub mod types;

pub use api::{dispatch_async, GraphApi};
pub use error::GraphError;
#[cfg(feature = "http")]
pub use http::{CompletionNotice, HttpGraphClient};
pub use types::{merge, ApiEvent, ClientConfig, HttpMethod, Params, UserToken};
