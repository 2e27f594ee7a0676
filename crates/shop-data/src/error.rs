//! HTTP client error types.

use thiserror::Error;

/// Errors from backend calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request could not be sent or no response arrived.
    #[error("Request failed: {0}")]
    RequestError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status} for {url}")]
    HttpError {
        status: u16,
        url: String,
        message: String,
    },

    /// The body was not the expected JSON.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(String),
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// A 4xx answer, i.e. the backend rejected the input.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// The `detail` or first field message of a DRF-style error body, if any.
    pub fn backend_message(&self) -> Option<String> {
        let FetchError::HttpError { message, .. } = self else {
            return None;
        };
        let value: serde_json::Value = serde_json::from_str(message).ok()?;
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return Some(detail.to_string());
        }
        value.as_object()?.values().find_map(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Array(items) => {
                items.first().and_then(|i| i.as_str()).map(str::to_string)
            }
            _ => None,
        })
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, message: &str) -> FetchError {
        FetchError::HttpError {
            status,
            url: "http://api/x".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_status_helpers() {
        assert!(http(404, "").is_not_found());
        assert!(http(400, "").is_client_error());
        assert!(!http(502, "").is_client_error());
        assert_eq!(FetchError::RequestError("x".into()).status(), None);
    }

    #[test]
    fn test_backend_message() {
        assert_eq!(
            http(404, r#"{"detail":"Not found."}"#).backend_message().as_deref(),
            Some("Not found.")
        );
        assert_eq!(
            http(400, r#"{"email":["Enter a valid email address."]}"#)
                .backend_message()
                .as_deref(),
            Some("Enter a valid email address.")
        );
        assert!(http(500, "<html>").backend_message().is_none());
    }
}
