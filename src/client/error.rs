// src/client/error.rs
use reqwest::StatusCode;

/// Raised whenever a call does not end in a 2xx response.
///
/// The message is fixed per endpoint. The status (if a response arrived) and
/// the transport error are kept alongside for callers that want them.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    message: &'static str,
    status: Option<StatusCode>,
    #[source]
    source: Option<reqwest::Error>,
}

impl RequestError {
    pub(crate) fn status(message: &'static str, status: StatusCode) -> Self {
        Self {
            message,
            status: Some(status),
            source: None,
        }
    }

    pub(crate) fn transport(message: &'static str, source: reqwest::Error) -> Self {
        Self {
            message,
            status: source.status(),
            source: Some(source),
        }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    /// HTTP status of the failed response, `None` when no response was received.
    pub fn http_status(&self) -> Option<StatusCode> {
        self.status
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Invalid JSON in response body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn is_request(&self) -> bool {
        matches!(self, ApiError::Request(_))
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, ApiError::Parse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_message_excludes_status() {
        let err = RequestError::status("Health check failed", StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Health check failed");
        assert_eq!(err.http_status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_api_error_is_transparent_over_request_error() {
        let err: ApiError = RequestError::status("Request failed", StatusCode::NOT_FOUND).into();
        assert_eq!(err.to_string(), "Request failed");
        assert!(err.is_request());
        assert!(!err.is_parse());
    }

    #[test]
    fn test_parse_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ApiError = json_err.into();
        assert!(err.is_parse());
    }
}
