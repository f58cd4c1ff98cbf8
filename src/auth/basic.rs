//! Static username/password authentication.

use super::{AttachmentMode, AuthStrategy, Credential};
use crate::error::AuthError;
use async_trait::async_trait;
use std::fmt;

/// HTTP Basic credentials, fixed at construction.
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthStrategy for BasicAuth {
    fn attachment_mode(&self) -> AttachmentMode {
        AttachmentMode::BasicInline
    }

    async fn produce_credential(&self) -> Result<Credential, AuthError> {
        Ok(Credential::basic(&self.username, &self.password))
    }
}
