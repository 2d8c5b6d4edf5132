//! Error types for ConoHa operations.
//!
//! Every HTTP failure is surfaced as one [`Error`] variant chosen from the
//! response status. API failures carry an [`ApiError`] with the status code,
//! the extracted message and the raw body for diagnostics.

use reqwest::StatusCode;
use std::fmt;
use thiserror::Error;

/// Details of a failed API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code returned by the service
    pub status_code: u16,
    /// Message extracted from the response body
    pub message: String,
    /// Raw response body, if one was received
    pub body: Option<String>,
}

impl ApiError {
    /// Create a new API error record.
    #[must_use]
    pub fn new(status_code: u16, message: impl Into<String>, body: Option<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            body,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (HTTP {})", self.message, self.status_code)
    }
}

/// Main error type for ConoHa operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Credentials are missing or invalid, or the identity exchange failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The service rejected the token and it could not be refreshed
    #[error("Token expired: {0}")]
    TokenExpired(ApiError),

    /// HTTP 400
    #[error("Bad request: {0}")]
    BadRequest(ApiError),

    /// HTTP 403
    #[error("Forbidden: {0}")]
    Forbidden(ApiError),

    /// HTTP 404
    #[error("Not found: {0}")]
    NotFound(ApiError),

    /// HTTP 409
    #[error("Conflict: {0}")]
    Conflict(ApiError),

    /// Any other HTTP status at or above 400
    #[error("API error: {0}")]
    Api(ApiError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The request could not be assembled
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Operation timed out
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Response body did not have the expected shape
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Specialized result type for ConoHa operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build the error variant for a failed HTTP status.
    ///
    /// 400, 401, 403, 404 and 409 have dedicated variants; every other status
    /// becomes [`Error::Api`].
    #[must_use]
    pub fn from_status(status: u16, message: impl Into<String>, body: Option<String>) -> Self {
        let detail = ApiError::new(status, message, body);
        match status {
            400 => Self::BadRequest(detail),
            401 => Self::TokenExpired(detail),
            403 => Self::Forbidden(detail),
            404 => Self::NotFound(detail),
            409 => Self::Conflict(detail),
            _ => Self::Api(detail),
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "AUTHENTICATION_FAILED",
            Self::TokenExpired(_) => "TOKEN_EXPIRED",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Api(_) => "API_ERROR",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::Timeout(_) => "TIMEOUT",
            Self::ParseError(_) => "PARSE_ERROR",
            Self::ValidationError(_) => "VALIDATION_ERROR",
        }
    }

    /// Returns the API error details when the failure came from an HTTP status.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::TokenExpired(detail)
            | Self::BadRequest(detail)
            | Self::Forbidden(detail)
            | Self::NotFound(detail)
            | Self::Conflict(detail)
            | Self::Api(detail) => Some(detail),
            _ => None,
        }
    }

    /// Returns the HTTP status code for API failures.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.api_error().map(|detail| detail.status_code)
    }

    /// True for authentication failures, including expired tokens.
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_) | Self::TokenExpired(_))
    }

    /// True when the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::ConfigError(_) | Self::Api(_) | Self::HttpError(_)
        )
    }
}

/// Extract a human readable message from an error response body.
///
/// Looks for `error.message`, then a top-level `message`, then falls back to
/// the raw text and finally to `HTTP <status>`.
#[must_use]
pub fn extract_message(status: StatusCode, text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<serde_json::Value>(text) {
        let nested = body
            .get("error")
            .and_then(|error| error.get("message"))
            .and_then(serde_json::Value::as_str);
        if let Some(message) = nested {
            return message.to_string();
        }
        if let Some(message) = body.get("message").and_then(serde_json::Value::as_str) {
            return message.to_string();
        }
    }

    if text.trim().is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        text.to_string()
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::ParseError(err.to_string())
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_mapping() {
        let cases = [
            (400, "BAD_REQUEST"),
            (401, "TOKEN_EXPIRED"),
            (403, "FORBIDDEN"),
            (404, "NOT_FOUND"),
            (409, "CONFLICT"),
            (500, "API_ERROR"),
            (418, "API_ERROR"),
        ];

        for (status, code) in cases {
            let err = Error::from_status(status, "boom", None);
            assert_eq!(err.error_code(), code, "status {status}");
            assert_eq!(err.status_code(), Some(status));
        }
    }

    #[test]
    fn test_token_expired_is_authentication() {
        let err = Error::from_status(401, "expired", None);
        assert!(err.is_authentication());
        assert!(Error::Authentication("bad".into()).is_authentication());
        assert!(!Error::from_status(403, "nope", None).is_authentication());
    }

    #[test]
    fn test_error_display() {
        let err = Error::from_status(404, "Server not found", None);
        assert_eq!(err.to_string(), "Not found: Server not found (HTTP 404)");

        let err = Error::ConfigError("Unknown service: foo".to_string());
        assert_eq!(err.to_string(), "Configuration error: Unknown service: foo");
    }

    #[test]
    fn test_api_error_keeps_body() {
        let err = Error::from_status(409, "in use", Some("{\"x\":1}".into()));
        let detail = err.api_error().unwrap();
        assert_eq!(detail.body.as_deref(), Some("{\"x\":1}"));
        assert!(Error::Timeout("t".into()).api_error().is_none());
    }

    #[test]
    fn test_extract_message_prefers_nested_error() {
        let text = r#"{"error": {"message": "nested"}, "message": "top"}"#;
        assert_eq!(extract_message(StatusCode::BAD_REQUEST, text), "nested");
    }

    #[test]
    fn test_extract_message_top_level() {
        let text = r#"{"message": "top level"}"#;
        assert_eq!(extract_message(StatusCode::FORBIDDEN, text), "top level");
    }

    #[test]
    fn test_extract_message_raw_text() {
        assert_eq!(
            extract_message(StatusCode::INTERNAL_SERVER_ERROR, "Internal failure"),
            "Internal failure"
        );
    }

    #[test]
    fn test_extract_message_empty_body() {
        assert_eq!(extract_message(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
    }

    #[test]
    fn test_should_log() {
        assert!(Error::ConfigError("test".to_string()).should_log());
        assert!(Error::Authentication("test".to_string()).should_log());
        assert!(!Error::from_status(404, "gone", None).should_log());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let conoha_err: Error = err.into();
        assert!(matches!(conoha_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let conoha_err: Error = err.into();
        assert!(matches!(conoha_err, Error::ParseError(_)));
    }
}
