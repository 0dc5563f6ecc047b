//! LLM provider errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited: retry after {retry_after_seconds} seconds")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The model answered, but not in the requested shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_api_error() {
        let err = ProviderError::ApiError {
            status: 500,
            message: "Internal Server Error".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[test]
    fn test_provider_error_rate_limited() {
        let err = ProviderError::RateLimited {
            retry_after_seconds: 60,
        };
        assert!(err.to_string().contains("Rate limited"));
        assert!(err.to_string().contains("60"));
    }

    #[test]
    fn test_provider_error_invalid_response() {
        let err = ProviderError::InvalidResponse("missing `actions`".to_string());
        assert!(err.to_string().contains("Invalid response"));
    }

    #[test]
    fn test_provider_error_network() {
        let err = ProviderError::Network("connection reset".to_string());
        assert_eq!(err.to_string(), "Network error: connection reset");
    }

    #[test]
    fn test_provider_error_timeout() {
        let err = ProviderError::Timeout(30);
        assert_eq!(err.to_string(), "Timeout after 30 seconds");
    }
}
