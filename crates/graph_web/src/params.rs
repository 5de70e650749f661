use graph_client::{merge, Params};
use serde_json::Value;

/// Asks the Graph API to return https URLs for pictures and other resources.
pub const RETURN_SSL_RESOURCES: &str = "return_ssl_resources";

/// Copy `params`, adding `return_ssl_resources=true` on a secure connection
/// unless the caller already set it. The input is never modified.
pub fn add_return_ssl_resources_if_required(params: Option<&Params>, is_secure_connection: bool) -> Params {
    let mut merged = merge(None, params);
    if is_secure_connection && !merged.contains_key(RETURN_SSL_RESOURCES) {
        merged.insert(RETURN_SSL_RESOURCES.into(), Value::Bool(true));
    }
    merged
}
