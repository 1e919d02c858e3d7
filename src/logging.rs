use std::fmt;

use crate::kind::CapabilityKind;
use crate::request::RequestId;

/// Request-scoped logger.
///
/// Every line carries the request id and capability kind so the dispatch,
/// the authority's answer and the final delivery of one request can be
/// correlated even when they happen on different threads.
///
/// Cheap to clone; continuations carry their own copy.
#[derive(Debug, Clone)]
pub struct RequestLog {
    request_id: RequestId,
    kind: CapabilityKind,
}

impl RequestLog {
    /// Creates a logger for one request.
    pub fn new(request_id: RequestId, kind: CapabilityKind) -> Self {
        Self { request_id, kind }
    }

    /// Returns the request id attached to every line.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the capability kind attached to every line.
    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// Logs an info-level message.
    ///
    /// ```
    /// # use permission_broker::{CapabilityKind, RequestId, RequestLog};
    /// let log = RequestLog::new(RequestId::new(), CapabilityKind::Fullscreen);
    /// log.info(format_args!("dispatching to {}", "authority"));
    /// ```
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, kind = %self.kind, "{}", args);
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, kind = %self.kind, "{}", args);
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, kind = %self.kind, "{}", args);
    }
}
