//! Error types for the Dribbble pager
//!
//! Every operation reports failures through [`Error`]. Pager loads and facade
//! calls never return it directly; it travels inside the error slot of a
//! [`Response`](crate::response::Response).

use thiserror::Error;

/// The main error type for the pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Feed '{feed}' requires a player")]
    MissingPlayer { feed: String },

    #[error("Invalid page number: {page}")]
    InvalidPage { page: u32 },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Concurrency Errors
    // ============================================================================
    #[error("A load is already in progress for this pager")]
    ConcurrentLoad,

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Decoding Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Persistence Errors
    // ============================================================================
    #[error("Failed to serialize pager: {message}")]
    Serialization { message: String },

    #[error("Failed to deserialize pager: {message}")]
    Deserialization { message: String },

    // ============================================================================
    // Embedding Errors
    // ============================================================================
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid construction or arguments
    Configuration,
    /// A load was requested while another was in flight
    ConcurrentLoad,
    /// Network or HTTP failure
    Transport,
    /// Malformed response body
    Decoding,
    /// Writing pager state failed
    Serialization,
    /// Reading pager state failed
    Deserialization,
    /// Anything else
    Other,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing player error
    pub fn missing_player(feed: impl Into<String>) -> Self {
        Self::MissingPlayer { feed: feed.into() }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a deserialization error
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingPlayer { .. }
            | Error::InvalidPage { .. }
            | Error::YamlParse(_) => ErrorKind::Configuration,
            Error::ConcurrentLoad => ErrorKind::ConcurrentLoad,
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::Timeout { .. }
            | Error::InvalidUrl(_) => ErrorKind::Transport,
            Error::Decode { .. } => ErrorKind::Decoding,
            Error::Serialization { .. } => ErrorKind::Serialization,
            Error::Deserialization { .. } => ErrorKind::Deserialization,
            Error::Anyhow(_) => ErrorKind::Other,
        }
    }

    /// Check if this is a network/HTTP failure
    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    /// Check if this is a response decoding failure
    pub fn is_decoding(&self) -> bool {
        self.kind() == ErrorKind::Decoding
    }

    /// HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for the pager
pub type Result<T> = std::result::Result<T, Error>;
