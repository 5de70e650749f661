use serde_json::Value;
use thiserror::Error;

/// Remote error type the Graph API uses for invalid or expired access tokens.
pub const OAUTH_EXCEPTION: &str = "OAuthException";

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("oauth: {error_type}: {message}")]
    OAuth { error_type: String, message: String },

    #[error("api: {error_type} (HTTP {status}): {message}")]
    Api {
        error_type: String,
        message: String,
        status: u16,
    },

    #[error("http: {0}")]
    Http(String),

    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;

impl GraphError {
    /// True for the authorization failure kind (invalid or expired token).
    pub fn is_oauth(&self) -> bool {
        matches!(self, GraphError::OAuth { .. })
    }

    /// Classify a Graph response. Returns `None` for a successful response.
    ///
    /// Recognises the Graph shape `{"error": {"type", "message"}}` and the
    /// legacy REST shape `{"error_code", "error_msg"}`. A failing status with
    /// no recognisable body maps to `OAuth` for 401 and `Api` otherwise.
    pub fn from_response(status: u16, body: &Value) -> Option<GraphError> {
        let success = (200..300).contains(&status);

        if let Some(err) = body.get("error").filter(|e| e.is_object()) {
            let error_type = err
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("Exception")
                .to_string();
            let message = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Some(Self::typed(error_type, message, status));
        }

        if let Some(code) = body.get("error_code") {
            let message = body
                .get("error_msg")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            // 190 is the REST code for an invalid OAuth access token
            if code.as_i64() == Some(190) {
                return Some(Self::typed(OAUTH_EXCEPTION.into(), message, status));
            }
            return Some(Self::typed(format!("RestError{code}"), message, status));
        }

        if success {
            return None;
        }
        if status == 401 {
            return Some(GraphError::OAuth {
                error_type: OAUTH_EXCEPTION.into(),
                message: "unauthorized".into(),
            });
        }
        Some(GraphError::Api {
            error_type: "HttpError".into(),
            message: body.as_str().map(str::to_string).unwrap_or_else(|| body.to_string()),
            status,
        })
    }

    fn typed(error_type: String, message: String, status: u16) -> GraphError {
        if error_type == OAUTH_EXCEPTION {
            GraphError::OAuth { error_type, message }
        } else {
            GraphError::Api { error_type, message, status }
        }
    }
}
