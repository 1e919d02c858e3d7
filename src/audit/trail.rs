//! In-memory audit trail recorder.

use parking_lot::Mutex;

use super::PermissionAuditEvent;

/// In-memory recorder for permission decisions.
///
/// Decisions arrive on whatever thread the authority answers on, so the
/// trail is shared behind an `Arc` and locks internally.
///
/// # Example
///
/// ```
/// use permission_broker::{CapabilityKind, RequestId};
/// use permission_broker::audit::{AuditOutcome, AuditTrail, PermissionAuditEvent};
///
/// let trail = AuditTrail::new();
/// trail.record(PermissionAuditEvent::new(
///     RequestId::new(),
///     CapabilityKind::Fullscreen,
///     AuditOutcome::Granted,
/// ));
///
/// assert_eq!(trail.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct AuditTrail {
    events: Mutex<Vec<PermissionAuditEvent>>,
}

impl AuditTrail {
    /// Creates an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an event. Events are kept in arrival order.
    pub fn record(&self, event: PermissionAuditEvent) {
        self.events.lock().push(event);
    }

    /// Returns a snapshot of all recorded events.
    pub fn events(&self) -> Vec<PermissionAuditEvent> {
        self.events.lock().clone()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Clears all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditOutcome;
    use crate::kind::CapabilityKind;
    use crate::request::RequestId;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn audit_trail_starts_empty() {
        let trail = AuditTrail::new();
        assert!(trail.is_empty());
        assert_eq!(trail.len(), 0);
    }

    #[test]
    fn audit_trail_records_in_order() {
        let trail = AuditTrail::new();
        let first = RequestId::new();
        let second = RequestId::new();

        trail.record(PermissionAuditEvent::new(
            first,
            CapabilityKind::Notification,
            AuditOutcome::Denied,
        ));
        trail.record(PermissionAuditEvent::new(
            second,
            CapabilityKind::Fullscreen,
            AuditOutcome::Granted,
        ));

        let events = trail.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].request_id(), first);
        assert_eq!(events[1].request_id(), second);
    }

    #[test]
    fn audit_trail_can_be_cleared() {
        let trail = AuditTrail::new();
        trail.record(PermissionAuditEvent::new(
            RequestId::new(),
            CapabilityKind::PointerLock,
            AuditOutcome::Declined,
        ));

        trail.clear();

        assert!(trail.is_empty());
    }

    #[test]
    fn audit_trail_accepts_events_from_many_threads() {
        let trail = Arc::new(AuditTrail::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let trail = Arc::clone(&trail);
                thread::spawn(move || {
                    trail.record(PermissionAuditEvent::new(
                        RequestId::new(),
                        CapabilityKind::MediaCapture,
                        AuditOutcome::Granted,
                    ));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(trail.len(), 8);
    }
}
