//! Error types for the clinic client
//!
//! This module defines all error types used throughout the library and CLI,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for clinic client operations
///
/// This enum covers configuration problems, transport failures, server-side
/// rejections, session lifecycle outcomes, and local persistence errors.
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request never produced a response (connection refused, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-success status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the server
        status: u16,
        /// The server's `error` field, or the status text when absent
        message: String,
    },

    /// The server rejected the bearer token; the session has already been
    /// cleared and a `SessionEvent::Expired` emitted.
    #[error("Session ended: the server rejected the stored credentials")]
    SessionEnded,

    /// Login refused, or a command needs a session and none is stored
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// A success response whose body could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Session persistence errors (file store)
    #[error("Session store error: {0}")]
    SessionStore(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Keyring/credential storage errors
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for clinic operations
///
/// Uses `anyhow::Error` so callers get context chains; the concrete
/// [`ClinicError`] can be recovered with `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;
