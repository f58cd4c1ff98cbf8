//! Authentication strategies for the REST-SFTP server.
//!
//! Two strategies are supported: static HTTP Basic credentials, and OAuth2
//! tokens fetched from an OpenID Connect realm and cached until they expire.
//! The dispatcher only sees the [`AuthStrategy`] trait.

pub mod basic;
pub mod credentials;
pub mod token;

pub use basic::BasicAuth;
pub use credentials::{AttachmentMode, Credential};
pub use token::{GrantType, TokenAuth};

use crate::error::AuthError;
use async_trait::async_trait;

/// Produces the credential attached to each outgoing request.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    /// How credentials from this strategy are attached.
    fn attachment_mode(&self) -> AttachmentMode;

    /// Return a credential usable right now, fetching one if needed.
    async fn produce_credential(&self) -> Result<Credential, AuthError>;
}
