//! Error types for the sift domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Failures of the language-model gateway.
///
/// The agent loop does not distinguish between variants: any of them ends
/// the request with a service-unavailable answer.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors a tool raises instead of reporting them as result text. Remote
/// failures are never raised; they come back as `Ok` text with an error
/// marker.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Invalid tool input: {0}")]
    InvalidInput(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        };
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = ToolError::InvalidInput("fetcher needs a URL".into());
        assert_eq!(err.to_string(), "Invalid tool input: fetcher needs a URL");
    }
}
