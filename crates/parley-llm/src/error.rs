use http::StatusCode;
use parley_core::HttpError;
use thiserror::Error;

/// Errors that can occur while orchestrating a completion
#[derive(Debug, Error)]
pub enum LlmError {
    /// Caller omitted a required field or sent a malformed request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Transport or backend failure, with the upstream status when known
    #[error("backend error: {message}")]
    Backend {
        /// HTTP status returned by the backend
        status: Option<u16>,
        /// Message reported by the backend
        message: String,
    },

    /// Backend event stream broke mid-response
    #[error("streaming error: {0}")]
    Streaming(String),

    /// Model produced a function call whose arguments are not valid JSON
    #[error("invalid arguments for function '{name}': {message}")]
    InvalidFunctionArguments {
        /// Function the model tried to call
        name: String,
        /// Parser diagnostic
        message: String,
    },

    /// A registered tool returned an error
    #[error("tool '{name}' failed: {message}")]
    ToolFailed {
        /// Tool name
        name: String,
        /// Error reported by the tool
        message: String,
    },

    /// Retrieved context could not be produced
    #[error("context unavailable: {0}")]
    Context(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Backend { .. } | Self::Streaming(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidFunctionArguments { .. } | Self::ToolFailed { .. } | Self::Context(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Backend { .. } => "backend_error",
            Self::Streaming(_) => "streaming_error",
            Self::InvalidFunctionArguments { .. } => "invalid_function_arguments",
            Self::ToolFailed { .. } => "tool_error",
            Self::Context(_) => "context_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_errors_map_to_bad_request() {
        let err = LlmError::InvalidRequest("messages is required".to_owned());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type(), "invalid_request_error");
    }

    #[test]
    fn backend_message_is_preserved() {
        let err = LlmError::Backend {
            status: Some(429),
            message: "quota exceeded".to_owned(),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
        assert!(err.client_message().contains("quota exceeded"));
    }

    #[test]
    fn malformed_arguments_are_server_errors() {
        let err = LlmError::InvalidFunctionArguments {
            name: "send_photo".to_owned(),
            message: "EOF while parsing".to_owned(),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn internal_details_are_hidden() {
        let err = LlmError::Internal(anyhow::anyhow!("secret detail"));
        assert_eq!(err.client_message(), "an internal error occurred");
    }
}
