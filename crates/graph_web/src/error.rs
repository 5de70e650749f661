use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("invalid argument: {0} is required")]
    InvalidArgument(&'static str),

    #[error("setting {key}: invalid value '{value}'")]
    InvalidSetting { key: &'static str, value: String },
}

/// Failure while clearing the auth cookie. Never surfaced by the adapter.
#[derive(Error, Debug)]
pub enum CookieError {
    #[error("cookie: no app id configured, auth cookie name unknown")]
    MissingAppId,

    #[error("cookie: invalid Set-Cookie header: {0}")]
    Header(String),

    #[error("cookie: response cookie jar poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, WebError>;
