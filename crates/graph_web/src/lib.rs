//! Graph API calls made on behalf of a hosted web request.
//!
//! ```text
//! incoming request ──► RequestContext (secure? referrer? auth cookie)
//!                           │
//!                           ▼
//! caller ──► WebClient<C> ──► C: GraphApi ──► Graph API
//!              │  + return_ssl_resources on secure requests
//!              └─ OAuth failure ⇒ clear auth cookie, re-raise
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod params;
pub mod settings;

pub use client::{resolve_use_beta, WebClient, BETA_REFERRER_HOST};
pub use context::{RequestContext, WebContext};
pub use error::{CookieError, WebError};
pub use params::{add_return_ssl_resources_if_required, RETURN_SSL_RESOURCES};
pub use settings::WebSettings;
