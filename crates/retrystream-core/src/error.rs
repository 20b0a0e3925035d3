//! Shared error type across retrystream crates.

use thiserror::Error;

/// Stable error codes (used in logs and metric labels).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Subscriber went away.
    SinkClosed,
    /// Subscriber cannot keep up.
    SinkFull,
    /// Statistics source failed.
    Source,
    /// Payload could not be encoded.
    Encode,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::SinkClosed => "SINK_CLOSED",
            ErrorCode::SinkFull => "SINK_FULL",
            ErrorCode::Source => "SOURCE",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, StreamError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("subscriber closed")]
    SinkClosed,
    #[error("subscriber queue full")]
    SinkFull,
    #[error("statistics source: {0}")]
    Source(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl StreamError {
    pub fn code(&self) -> ErrorCode {
        match self {
            StreamError::BadRequest(_) => ErrorCode::BadRequest,
            StreamError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            StreamError::SinkClosed => ErrorCode::SinkClosed,
            StreamError::SinkFull => ErrorCode::SinkFull,
            StreamError::Source(_) => ErrorCode::Source,
            StreamError::Encode(_) => ErrorCode::Encode,
            StreamError::Internal(_) => ErrorCode::Internal,
        }
    }

    /// Disconnects and slow consumers are expected traffic, not anomalies.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, StreamError::SinkClosed | StreamError::SinkFull)
    }
}
