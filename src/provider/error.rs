use thiserror::Error;

/// Errors from the external provider's REST and auth planes
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid provider URL: {0}")]
    InvalidUrl(String),

    #[error("Provider unreachable: {0}")]
    Unreachable(String),

    #[error("Provider rejected credentials: {0}")]
    Unauthorized(String),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Constraint(String),

    #[error("Provider error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid provider response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ProviderError::Unreachable(err.to_string())
        } else if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Api {
                status: err.status().map(|s| s.as_u16()).unwrap_or(0),
                message: err.to_string(),
            }
        }
    }
}
