//! HTTP client for the REST-SFTP server.
//!
//! Every file operation goes through the same pipeline: the
//! [`RequestDispatcher`] attaches credentials and sends the request, then the
//! [`ResponseValidator`] rejects error statuses. A [`RequestObserver`] is
//! notified before dispatch and after validation.

pub mod dispatcher;
pub mod file_client;
pub mod observer;
pub mod tree;
pub mod validator;

pub use dispatcher::{RequestBody, RequestDispatcher};
pub use file_client::FileClient;
pub use observer::{NoopObserver, RequestObserver, TracingObserver};
pub use tree::{TreeNode, TreeOptions};
pub use validator::ResponseValidator;

use std::fmt;

/// Diagnostic rendering of an operation's input parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationParams(String);

impl OperationParams {
    /// Render any parameter tuple with its `Debug` form.
    pub fn new<T: fmt::Debug + ?Sized>(params: &T) -> Self {
        Self(format!("{:?}", params))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
