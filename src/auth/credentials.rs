//! Credential types handed from an auth strategy to the dispatcher.

use base64::Engine;
use std::fmt;

/// How a credential is attached to an outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentMode {
    /// Passed to the transport's own basic-auth support
    BasicInline,
    /// Sent as an `Authorization: Bearer` header
    BearerHeader,
}

/// A credential ready to be applied to one request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// HTTP Basic Authentication pair.
    Basic { username: String, password: String },
    /// OAuth2 access token.
    Bearer(String),
}

impl Credential {
    /// Create a Basic Auth credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Create a Bearer token credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Attachment mode implied by this credential.
    pub fn attachment_mode(&self) -> AttachmentMode {
        match self {
            Self::Basic { .. } => AttachmentMode::BasicInline,
            Self::Bearer(_) => AttachmentMode::BearerHeader,
        }
    }

    /// Get the Authorization header value for this credential.
    pub fn auth_header(&self) -> String {
        match self {
            Self::Basic { username, password } => {
                let combined = format!("{}:{}", username, password);
                let encoded = base64::engine::general_purpose::STANDARD.encode(&combined);
                format!("Basic {}", encoded)
            }
            Self::Bearer(token) => format!("Bearer {}", token),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
        }
    }
}
