//! Error handling module for the admin core.
//!
//! Provides centralized error types with stable string codes for the presentation layer.

use std::fmt;

/// Error codes as constants to avoid stringly-typed errors.
#[allow(dead_code)]
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
    pub const SERVER_ERROR: &str = "SERVER_ERROR";
    pub const STALE_STATE: &str = "STALE_STATE";
    pub const DECODE_ERROR: &str = "DECODE_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
}

/// Synchronization error type.
#[derive(Debug)]
pub enum SyncError {
    /// A required field or attachment is missing or malformed; detected before any network call
    Validation { field: String, message: String },
    /// The request could not be completed (connectivity, timeout)
    Network(String),
    /// Non-success HTTP status with the extracted server message
    Server { status: u16, message: String },
    /// A mutation referred to an identifier no longer present locally
    Stale(String),
    /// A success response whose body could not be decoded into a record or list
    Decode(String),
    /// Engine misuse: operating on a closed session, unknown field, bad slot index
    BadRequest(String),
}

impl SyncError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            SyncError::Validation { .. } => codes::VALIDATION_ERROR,
            SyncError::Network(_) => codes::NETWORK_ERROR,
            SyncError::Server { .. } => codes::SERVER_ERROR,
            SyncError::Stale(_) => codes::STALE_STATE,
            SyncError::Decode(_) => codes::DECODE_ERROR,
            SyncError::BadRequest(_) => codes::BAD_REQUEST,
        }
    }

    /// Get the user-facing error message.
    pub fn message(&self) -> String {
        match self {
            SyncError::Validation { message, .. } => message.clone(),
            SyncError::Network(msg) => msg.clone(),
            SyncError::Server { message, .. } => message.clone(),
            SyncError::Stale(msg) => msg.clone(),
            SyncError::Decode(msg) => msg.clone(),
            SyncError::BadRequest(msg) => msg.clone(),
        }
    }

    /// The draft field a validation error is anchored to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            SyncError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Shortcut for building a field-level validation error.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SyncError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for SyncError {}

impl From<reqwest::Error> for SyncError {
    fn from(err: reqwest::Error) -> Self {
        tracing::error!("Transport error: {:?}", err);
        if err.is_timeout() {
            SyncError::Network(format!("Request timed out: {}", err))
        } else {
            SyncError::Network(format!("Network error: {}", err))
        }
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        SyncError::Decode(format!("JSON error: {}", err))
    }
}
