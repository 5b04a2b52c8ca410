//! Error types for telemetry backend requests

use std::fmt;

/// Result type alias for backend requests
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while talking to the telemetry backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Request could not be sent or the connection broke
    Transport(String),

    /// Backend answered with a non-success status code
    Status(u16),

    /// Response body could not be decoded
    Decode(String),

    /// Backend has no value to report (e.g. no readings in the averaging window)
    NoData,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(msg) => write!(f, "request failed: {}", msg),
            ClientError::Status(code) => write!(f, "backend returned HTTP {}", code),
            ClientError::Decode(msg) => write!(f, "failed to decode response: {}", msg),
            ClientError::NoData => write!(f, "backend has no data to report"),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Status(status.as_u16())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
