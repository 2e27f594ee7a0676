//! Request handling errors.

use http::StatusCode;

/// Error type for page and action handlers.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    #[error("Shell not sent before sections")]
    ShellNotSent,

    #[error("Streaming error: {0}")]
    StreamError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method {0} not allowed")]
    MethodNotAllowed(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    Unprocessable(String),

    #[error("Backend error: {0}")]
    Upstream(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl PageError {
    pub fn status(&self) -> StatusCode {
        match self {
            PageError::NotFound(_) => StatusCode::NOT_FOUND,
            PageError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            PageError::BadRequest(_) => StatusCode::BAD_REQUEST,
            PageError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PageError::Upstream(_) => StatusCode::BAD_GATEWAY,
            PageError::ShellNotSent
            | PageError::StreamError(_)
            | PageError::Session(_)
            | PageError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show a shopper.
    pub fn public_message(&self) -> String {
        match self {
            PageError::NotFound(_) => "We couldn't find the page you were looking for.".to_string(),
            PageError::MethodNotAllowed(_) => "That action isn't available here.".to_string(),
            PageError::BadRequest(msg) | PageError::Unprocessable(msg) => msg.clone(),
            PageError::Upstream(_) => {
                "Our store is having trouble loading this right now. Please try again shortly."
                    .to_string()
            }
            _ => "Something went wrong on our side. Please try again.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(PageError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(PageError::Upstream("x".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            PageError::from(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_public_message_hides_internals() {
        let err = PageError::Upstream("connection refused to 10.0.0.3".into());
        assert!(!err.public_message().contains("10.0.0.3"));
        assert_eq!(PageError::BadRequest("Bad quantity".into()).public_message(), "Bad quantity");
    }
}
