//! Error types for postsync

use thiserror::Error;

use crate::lifecycle::Operation;

pub type Result<T> = std::result::Result<T, PostSyncError>;

#[derive(Error, Debug)]
pub enum PostSyncError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl PostSyncError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PostSyncError::InvalidInput(_) => 3,
            PostSyncError::Request(error) if error.is_unauthorized() => 2,
            PostSyncError::Request(_) => 1,
            PostSyncError::Transport(_) => 1,
            PostSyncError::Config(_) => 1,
            PostSyncError::Output(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failure below the HTTP layer: nothing came back from the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Why an operation ended in `rejected`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("expected status {expected}, got {status} {status_text}")]
    ContractViolation {
        expected: u16,
        status: u16,
        status_text: String,
    },

    #[error("missing payload: {0}")]
    MissingPayload(String),

    #[error("malformed payload: {0}")]
    Decode(String),

    /// The caller dropped the operation before it settled
    #[error("cancelled before settlement")]
    Cancelled,
}

/// A rejected operation together with its structured reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} rejected: {kind}")]
pub struct RequestError {
    pub operation: Operation,
    pub kind: ErrorKind,
}

impl RequestError {
    pub fn new(operation: Operation, kind: ErrorKind) -> Self {
        Self { operation, kind }
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::ContractViolation { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the server refused the authorization value.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }

    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ErrorKind::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(status: u16, status_text: &str) -> RequestError {
        RequestError::new(
            Operation::Like,
            ErrorKind::ContractViolation {
                expected: 201,
                status,
                status_text: status_text.to_string(),
            },
        )
    }

    #[test]
    fn test_exit_code_invalid_input() {
        let error = PostSyncError::InvalidInput("Empty content".to_string());
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn test_exit_code_output() {
        let error = PostSyncError::Output("stdout closed".to_string());
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_unauthorized() {
        assert_eq!(PostSyncError::Request(violation(401, "Unauthorized")).exit_code(), 2);
        assert_eq!(PostSyncError::Request(violation(403, "Forbidden")).exit_code(), 2);
    }

    #[test]
    fn test_exit_code_server_error() {
        let error = PostSyncError::Request(violation(500, "Internal Server Error"));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_transport_failure() {
        let error = PostSyncError::Request(RequestError::new(
            Operation::FetchAll,
            TransportError::Network("connection refused".to_string()).into(),
        ));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_code_config_error() {
        let error = PostSyncError::Config(ConfigError::MissingField("api.base_url".to_string()));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_error_message_formatting_contract_violation() {
        let error = violation(200, "OK");
        assert_eq!(error.to_string(), "like rejected: expected status 201, got 200 OK");
    }

    #[test]
    fn test_error_message_formatting_transport() {
        let error = PostSyncError::Request(RequestError::new(
            Operation::FetchOne,
            TransportError::Timeout("after 10s".to_string()).into(),
        ));
        assert_eq!(
            error.to_string(),
            "Request error: fetch-one rejected: Request timed out: after 10s"
        );
    }

    #[test]
    fn test_error_message_formatting_config() {
        let error = PostSyncError::Config(ConfigError::InvalidValue {
            field: "api.timeout".to_string(),
            reason: "must be greater than zero".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Configuration error: Invalid value for api.timeout: must be greater than zero"
        );
    }

    #[test]
    fn test_request_error_status() {
        assert_eq!(violation(404, "Not Found").status(), Some(404));

        let missing = RequestError::new(
            Operation::Edit,
            ErrorKind::MissingPayload("posts".to_string()),
        );
        assert_eq!(missing.status(), None);
        assert!(!missing.is_transport());
    }

    #[test]
    fn test_error_conversion_from_config_error() {
        let config_error = ConfigError::MissingField("test".to_string());
        let error: PostSyncError = config_error.into();

        match error {
            PostSyncError::Config(_) => {
                // Success - correct conversion
            }
            _ => panic!("Expected PostSyncError::Config"),
        }
    }
}
