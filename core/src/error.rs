//! Error types for the todos API client.
//!
//! # Design
//! `ApiError` is the closed set of failures every calling style reports.
//! `Unauthorized` and `NoContent` get dedicated variants because callers
//! branch on them; all other non-2xx responses land in `BadStatus` with the
//! raw status code. Transport failures carry their cause so it can be logged.
//!
//! Both enums are `Clone + Eq` so the same failure can be compared across the
//! callback, future and stream deliveries.

use thiserror::Error;

/// Coarse classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// DNS resolution or TCP/TLS connection failed.
    Connect,
    /// The transport's own timeout elapsed.
    Timeout,
    Other,
}

/// A failure reported by the transport before any HTTP status was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind:?}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Errors produced by the request/response pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Base URL plus path did not form a valid URL.
    #[error("not allowed url")]
    NotAllowedUrl,

    /// The server returned 401.
    #[error("unauthorized")]
    Unauthorized,

    /// 204 on a single-item endpoint, or a 2xx whose payload is absent/empty.
    #[error("no content")]
    NoContent,

    /// Any non-2xx status not covered by a more specific variant.
    #[error("bad status: {0}")]
    BadStatus(u16),

    /// The response body did not match the expected envelope.
    #[error("decoding failed: {0}")]
    Decoding(String),

    /// The JSON request body could not be built.
    #[error("json encoding failed: {0}")]
    JsonEncoding(String),

    /// Transport failure or anything else that could not be classified.
    #[error("unknown error: {0}")]
    Unknown(#[source] TransportError),
}

impl ApiError {
    /// Human-readable message for presentation layers.
    pub fn info(&self) -> String {
        match self {
            ApiError::NotAllowedUrl => "The request URL is not allowed.".to_string(),
            ApiError::Unauthorized => "You are not authorized. Please sign in again.".to_string(),
            ApiError::NoContent => "There is no content.".to_string(),
            ApiError::BadStatus(code) => format!("The server responded with status {code}."),
            ApiError::Decoding(_) => "The response could not be read.".to_string(),
            ApiError::JsonEncoding(_) => "The request could not be encoded.".to_string(),
            ApiError::Unknown(cause) => match cause.kind {
                TransportErrorKind::Timeout => "The request timed out.".to_string(),
                TransportErrorKind::Connect => "Could not reach the server.".to_string(),
                TransportErrorKind::Other => format!("Unknown error: {}", cause.message),
            },
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(cause: TransportError) -> Self {
        ApiError::Unknown(cause)
    }
}
