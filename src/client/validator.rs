//! Response status validation.

use super::OperationParams;
use super::observer::RequestObserver;
use crate::error::{RemoteOperationError, Result, body_excerpt};
use reqwest::{Response, StatusCode};
use std::sync::Arc;

/// Turns error statuses into [`RemoteOperationError`]s.
#[derive(Clone)]
pub struct ResponseValidator {
    observer: Arc<dyn RequestObserver>,
}

impl ResponseValidator {
    pub fn new(observer: Arc<dyn RequestObserver>) -> Self {
        Self { observer }
    }

    /// Check `response` on behalf of `operation`.
    ///
    /// Successful responses are handed back untouched so their body can still
    /// be streamed. For a status >= 400 the body is read to build the error.
    ///
    /// # Errors
    /// Returns [`RemoteOperationError`] when the status code is 400 or above.
    pub async fn validate(
        &self,
        response: Response,
        operation: &str,
        params: &OperationParams,
    ) -> Result<Response> {
        let status = response.status();
        if !is_failure(status) {
            self.observer.after_validation(operation, params, status, None);
            return Ok(response);
        }

        // A body that cannot be read still leaves the status to report.
        let body = response.bytes().await.unwrap_or_default();
        let err = failure(status, &body, operation, params);
        self.observer
            .after_validation(operation, params, status, Some(&err));
        Err(err.into())
    }
}

/// Pure form of the status check.
pub fn check_status(
    status: StatusCode,
    body: &[u8],
    operation: &str,
    params: &OperationParams,
) -> std::result::Result<(), RemoteOperationError> {
    if is_failure(status) {
        Err(failure(status, body, operation, params))
    } else {
        Ok(())
    }
}

fn is_failure(status: StatusCode) -> bool {
    status.as_u16() >= 400
}

fn failure(
    status: StatusCode,
    body: &[u8],
    operation: &str,
    params: &OperationParams,
) -> RemoteOperationError {
    RemoteOperationError {
        operation: operation.to_string(),
        params: params.to_string(),
        status,
        body_excerpt: body_excerpt(body),
    }
}
