//! restsftp - client library for a REST front-end to an SFTP file store.
//!
//! A [`FileClient`] lists remote trees, uploads and downloads files, moves and
//! deletes them, and asks the server to fetch files from URLs. Requests are
//! authenticated either with static HTTP Basic credentials ([`BasicAuth`]) or
//! with OAuth2 tokens that are fetched and renewed on demand ([`TokenAuth`]).
//!
//! ```no_run
//! use restsftp::{FileClient, TokenAuth, TreeOptions};
//!
//! # async fn run() -> restsftp::Result<()> {
//! let auth = TokenAuth::new("https://sso.example.com", "files", "my-client", "secret");
//! let client = FileClient::new("https://files.example.com", auth);
//!
//! let tree = client.list_tree("/docs", TreeOptions::default().recursive(true)).await?;
//! for node in tree.walk() {
//!     println!("{}", node.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;

pub use auth::{AttachmentMode, AuthStrategy, BasicAuth, Credential, GrantType, TokenAuth};
pub use client::{
    FileClient, NoopObserver, OperationParams, RequestBody, RequestDispatcher, RequestObserver,
    ResponseValidator, TracingObserver, TreeNode, TreeOptions,
};
pub use error::{AuthError, RemoteOperationError, RestSftpError, Result};
