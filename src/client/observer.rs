//! Observation hooks around each remote operation.

use super::OperationParams;
use crate::error::RemoteOperationError;
use reqwest::StatusCode;
use tracing::{debug, error};

/// Receives diagnostics at fixed points of every operation.
///
/// Implementations must not affect control flow; the default methods do
/// nothing.
pub trait RequestObserver: Send + Sync {
    /// Called once before the request is dispatched.
    fn before_dispatch(&self, _operation: &str, _params: &OperationParams) {}

    /// Called once the response status has been checked. `failure` is set
    /// when the status was >= 400.
    fn after_validation(
        &self,
        _operation: &str,
        _params: &OperationParams,
        _status: StatusCode,
        _failure: Option<&RemoteOperationError>,
    ) {
    }
}

/// Default observer, logging through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn before_dispatch(&self, operation: &str, params: &OperationParams) {
        debug!("{}: {}", operation, params);
    }

    fn after_validation(
        &self,
        operation: &str,
        params: &OperationParams,
        status: StatusCode,
        failure: Option<&RemoteOperationError>,
    ) {
        match failure {
            Some(e) => error!("{}", e),
            None => debug!("{}: {} - {}", operation, params, status),
        }
    }
}

/// Observer that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RequestObserver for NoopObserver {}
