//! Error types for restsftp.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for restsftp operations.
pub type Result<T> = std::result::Result<T, RestSftpError>;

/// Errors surfaced by every client operation.
#[derive(Debug, Error)]
pub enum RestSftpError {
    /// The network call itself failed (connection refused, DNS, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Obtaining a credential failed.
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// The server answered with a status code >= 400.
    #[error(transparent)]
    RemoteOperation(#[from] RemoteOperationError),

    /// A body expected to be JSON could not be parsed.
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Local file access failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A header value could not be encoded.
    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    /// Packing or unpacking a zip archive failed.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl RestSftpError {
    /// HTTP status of a failed remote operation, if this is one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RemoteOperation(e) => Some(e.status),
            _ => None,
        }
    }
}

/// Token acquisition failures.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("token endpoint returned {status}{}", excerpt_suffix(.body_excerpt))]
    Rejected {
        status: StatusCode,
        body_excerpt: Option<String>,
    },

    #[error("malformed token response: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The token contains bytes that cannot go into an HTTP header.
    #[error("access token is not a valid header value")]
    InvalidToken,
}

/// A server-side failure, carrying enough context to diagnose the call.
#[derive(Debug, Error)]
#[error("{operation}: {params} - {status}{}", excerpt_suffix(.body_excerpt))]
pub struct RemoteOperationError {
    /// Name of the client operation, e.g. `delete_file`.
    pub operation: String,
    /// Rendering of the operation's input parameters.
    pub params: String,
    pub status: StatusCode,
    /// Response body, only kept when shorter than
    /// [`BODY_EXCERPT_LIMIT`](crate::config::BODY_EXCERPT_LIMIT) bytes.
    pub body_excerpt: Option<String>,
}

/// Response body text, or `None` when it is too large to attach to an error.
pub(crate) fn body_excerpt(body: &[u8]) -> Option<String> {
    if body.len() < crate::config::BODY_EXCERPT_LIMIT {
        Some(String::from_utf8_lossy(body).into_owned())
    } else {
        None
    }
}

fn excerpt_suffix(excerpt: &Option<String>) -> String {
    match excerpt {
        Some(body) if !body.is_empty() => format!(" - {body}"),
        _ => String::new(),
    }
}
