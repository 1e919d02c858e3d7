//! Audit event schema.

use std::fmt;

use url::Url;

use crate::kind::CapabilityKind;
use crate::request::RequestId;

/// How a permission request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The authority granted the request.
    Granted,
    /// The authority denied it, or answered with anything but a grant.
    Denied,
    /// The broker declined without asking: the session was gone.
    Declined,
    /// The authority did not answer before the decision timeout.
    TimedOut,
}

impl AuditOutcome {
    /// Whether the caller was told "allowed".
    pub fn is_granted(&self) -> bool {
        matches!(self, AuditOutcome::Granted)
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Granted => write!(f, "granted"),
            AuditOutcome::Denied => write!(f, "denied"),
            AuditOutcome::Declined => write!(f, "declined"),
            AuditOutcome::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// One delivered permission decision.
///
/// # Example
///
/// ```
/// use permission_broker::CapabilityKind;
/// use permission_broker::RequestId;
/// use permission_broker::audit::{AuditOutcome, PermissionAuditEvent};
/// use url::Url;
///
/// let origin = Url::parse("https://maps.example.com/route?from=home").unwrap();
/// let event = PermissionAuditEvent::new(
///     RequestId::new(),
///     CapabilityKind::Notification,
///     AuditOutcome::Denied,
/// )
/// .with_origin(&origin);
///
/// assert_eq!(event.origin(), Some("https://maps.example.com"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionAuditEvent {
    request_id: RequestId,
    kind: CapabilityKind,
    outcome: AuditOutcome,
    /// Scheme, host and port only.
    origin: Option<String>,
    user_gesture: bool,
}

impl PermissionAuditEvent {
    /// Creates an event with no origin and no gesture.
    pub fn new(request_id: RequestId, kind: CapabilityKind, outcome: AuditOutcome) -> Self {
        Self {
            request_id,
            kind,
            outcome,
            origin: None,
            user_gesture: false,
        }
    }

    /// Records the requesting origin, dropping path, query and fragment.
    pub fn with_origin(mut self, url: &Url) -> Self {
        self.origin = Some(url.origin().ascii_serialization());
        self
    }

    /// Replaces the outcome.
    pub fn with_outcome(mut self, outcome: AuditOutcome) -> Self {
        self.outcome = outcome;
        self
    }

    /// Records the user-gesture flag.
    pub fn with_user_gesture(mut self, user_gesture: bool) -> Self {
        self.user_gesture = user_gesture;
        self
    }

    /// Returns the request id.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the capability kind.
    pub fn kind(&self) -> CapabilityKind {
        self.kind
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the redacted origin, if known.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Returns the user-gesture flag.
    pub fn user_gesture(&self) -> bool {
        self.user_gesture
    }

    /// Emits the event as a structured `tracing` record.
    pub fn emit(&self) {
        tracing::info!(
            target: "permission_audit",
            request_id = %self.request_id,
            kind = %self.kind,
            outcome = %self.outcome,
            origin = ?self.origin,
            user_gesture = self.user_gesture,
            "permission decision"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_redacted() {
        let url = Url::parse("https://user:pw@example.com:8443/a/b?token=secret#frag").unwrap();
        let event = PermissionAuditEvent::new(
            RequestId::new(),
            CapabilityKind::OpenExternal,
            AuditOutcome::Granted,
        )
        .with_origin(&url);

        let origin = event.origin().unwrap();
        assert_eq!(origin, "https://example.com:8443");
        assert!(!origin.contains("secret"));
        assert!(!origin.contains("pw"));
    }

    #[test]
    fn outcome_display() {
        assert_eq!(AuditOutcome::Granted.to_string(), "granted");
        assert_eq!(AuditOutcome::Denied.to_string(), "denied");
        assert_eq!(AuditOutcome::Declined.to_string(), "declined");
        assert_eq!(AuditOutcome::TimedOut.to_string(), "timed_out");
    }

    #[test]
    fn only_granted_outcome_is_granted() {
        assert!(AuditOutcome::Granted.is_granted());
        assert!(!AuditOutcome::Denied.is_granted());
        assert!(!AuditOutcome::Declined.is_granted());
        assert!(!AuditOutcome::TimedOut.is_granted());
    }

    #[test]
    fn emit_does_not_panic() {
        PermissionAuditEvent::new(
            RequestId::new(),
            CapabilityKind::Fullscreen,
            AuditOutcome::Denied,
        )
        .with_user_gesture(true)
        .emit();
    }
}
