//! Error types for slackop

use std::time::Duration;
use thiserror::Error;

/// Result type alias for slackop operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl Error {
    /// Classify this error for retry handling. Non-API errors end the phase.
    pub fn class(&self) -> FailureClass {
        match self {
            Error::Api(api) => api.class(),
            _ => FailureClass::FatalForPhase,
        }
    }
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Slack Web API errors
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Authentication failed. Run `slackop init` to set up your token.")]
    Unauthorized,

    #[error("Access denied. The token is missing a required scope.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Slack API error: {0}")]
    Slack(String),
}

/// How a failed upstream call should be treated by a population phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Upstream mandated a wait; retry the same page afterwards.
    RateLimited(Duration),
    /// Retry is reasonable, no wait was mandated.
    Transient,
    /// Give up on the current phase.
    FatalForPhase,
}

impl ApiError {
    /// Classify this error for retry handling.
    pub fn class(&self) -> FailureClass {
        match self {
            ApiError::RateLimit(retry_after) => FailureClass::RateLimited(*retry_after),
            ApiError::Network(_) | ApiError::ServerError(_) => FailureClass::Transient,
            _ => FailureClass::FatalForPhase,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `slackop init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("Slack token not configured. Run `slackop init` or set SLACKOP_TOKEN.")]
    MissingToken,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Local snapshot errors.
///
/// None of these reach a caller of the catalog; a failed load means cold start.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Could not determine cache directory")]
    NoHome,

    #[error("Snapshot not found: {0}")]
    NotFound(String),

    #[error("Snapshot is corrupt: {0}")]
    Corrupt(String),

    #[error("Snapshot version {found} does not match expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("Snapshot I/O error: {0}")]
    Io(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_unauthorized_message() {
        let err = ApiError::Unauthorized;
        assert!(err.to_string().contains("slackop init"));
    }

    #[test]
    fn test_api_error_not_found() {
        let err = ApiError::NotFound("channel C0123456789".to_string());
        assert!(err.to_string().contains("C0123456789"));
    }

    #[test]
    fn test_api_error_rate_limit() {
        let err = ApiError::RateLimit(Duration::from_secs(30));
        let msg = err.to_string();
        assert!(msg.contains("Rate limit"));
        assert!(msg.contains("30"));
    }

    #[test]
    fn test_api_error_slack_code() {
        let err = ApiError::Slack("missing_scope".to_string());
        assert!(err.to_string().contains("missing_scope"));
    }

    #[test]
    fn test_failure_class_rate_limited() {
        let err = ApiError::RateLimit(Duration::from_secs(12));
        assert_eq!(
            err.class(),
            FailureClass::RateLimited(Duration::from_secs(12))
        );
    }

    #[test]
    fn test_failure_class_transient() {
        assert_eq!(
            ApiError::Network("reset".to_string()).class(),
            FailureClass::Transient
        );
        assert_eq!(
            ApiError::ServerError("502".to_string()).class(),
            FailureClass::Transient
        );
    }

    #[test]
    fn test_failure_class_fatal() {
        assert_eq!(ApiError::Unauthorized.class(), FailureClass::FatalForPhase);
        assert_eq!(
            ApiError::InvalidResponse("bad json".to_string()).class(),
            FailureClass::FatalForPhase
        );
        assert_eq!(
            ApiError::Slack("account_inactive".to_string()).class(),
            FailureClass::FatalForPhase
        );
    }

    #[test]
    fn test_config_error_missing_token() {
        let err = ConfigError::MissingToken;
        assert!(err.to_string().contains("SLACKOP_TOKEN"));
    }

    #[test]
    fn test_catalog_error_version_mismatch() {
        let err = CatalogError::VersionMismatch {
            found: 7,
            expected: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains('7'));
        assert!(msg.contains('1'));
    }

    #[test]
    fn test_error_from_api_error() {
        let err: Error = ApiError::Unauthorized.into();

        match err {
            Error::Api(ApiError::Unauthorized) => (),
            _ => panic!("Expected Error::Api(ApiError::Unauthorized)"),
        }
    }

    #[test]
    fn test_error_from_catalog_error() {
        let err: Error = CatalogError::NoHome.into();

        match err {
            Error::Catalog(CatalogError::NoHome) => (),
            _ => panic!("Expected Error::Catalog(CatalogError::NoHome)"),
        }
    }

    #[test]
    fn test_config_error_from_yaml_error() {
        let yaml_str = "invalid: [yaml: content";
        let yaml_err = serde_yaml::from_str::<serde_yaml::Value>(yaml_str).unwrap_err();
        let config_err: ConfigError = yaml_err.into();

        match config_err {
            ConfigError::ParseError(_) => (),
            _ => panic!("Expected ConfigError::ParseError"),
        }
    }
}
