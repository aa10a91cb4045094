use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication failed with status {0}")]
    AuthenticationFailed(reqwest::StatusCode),

    #[error("Authentication response did not contain an access token")]
    MissingToken,

    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Unauthorized - token may be expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Shown when the login endpoint rejects the credentials
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Check credentials.";

/// Shown when the login endpoint answers without a token
pub const NO_TOKEN_MESSAGE: &str = "No token received.";

/// Shown for transport failures
pub const NETWORK_ERROR_MESSAGE: &str = "Network error.";

/// Shown for any other failed request
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed. Please try again.";

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut = (0..=MAX_ERROR_BODY_LENGTH)
                .rev()
                .find(|i| body.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}... (truncated, {} total bytes)", &body[..cut], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::AccessDenied(truncated),
            404 => ApiError::NotFound(truncated),
            500..=599 => ApiError::ServerError(truncated),
            _ => ApiError::InvalidResponse(format!("Status {}: {}", status, truncated)),
        }
    }

    /// The fixed message a view shows for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::AuthenticationFailed(_) => LOGIN_FAILED_MESSAGE,
            ApiError::MissingToken => NO_TOKEN_MESSAGE,
            ApiError::NetworkError(_) => NETWORK_ERROR_MESSAGE,
            _ => REQUEST_FAILED_MESSAGE,
        }
    }

    /// User-facing message for an error returned by the API client.
    pub fn user_message_for(err: &anyhow::Error) -> &'static str {
        match err.downcast_ref::<ApiError>() {
            Some(api) => api.user_message(),
            None if err.downcast_ref::<reqwest::Error>().is_some() => NETWORK_ERROR_MESSAGE,
            None => REQUEST_FAILED_MESSAGE,
        }
    }
}
