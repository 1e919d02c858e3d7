use std::fmt;

use serde::{Deserialize, Serialize};

/// The category of sensitive action a request asks for.
///
/// Every canonical request carries exactly one kind. The kind selects the
/// response path used once the authority has decided: most kinds answer a
/// boolean callback, `MediaCapture` continues into device negotiation and
/// `PointerLock` notifies the session directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    /// Camera and/or microphone capture.
    MediaCapture,
    /// Entering fullscreen.
    Fullscreen,
    /// Showing desktop notifications.
    Notification,
    /// Capturing the mouse pointer.
    PointerLock,
    /// Handing a URL to an external application.
    OpenExternal,
    /// Registering the page as a protocol handler.
    ProtocolRegistration,
}

impl CapabilityKind {
    /// Every capability kind, in declaration order.
    pub const ALL: [CapabilityKind; 6] = [
        CapabilityKind::MediaCapture,
        CapabilityKind::Fullscreen,
        CapabilityKind::Notification,
        CapabilityKind::PointerLock,
        CapabilityKind::OpenExternal,
        CapabilityKind::ProtocolRegistration,
    ];

    /// Returns the stable snake_case name used in logs and audit events.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::MediaCapture => "media_capture",
            CapabilityKind::Fullscreen => "fullscreen",
            CapabilityKind::Notification => "notification",
            CapabilityKind::PointerLock => "pointer_lock",
            CapabilityKind::OpenExternal => "open_external",
            CapabilityKind::ProtocolRegistration => "protocol_registration",
        }
    }

    /// Whether the caller supplies the user-gesture flag for this kind.
    ///
    /// Fullscreen and notification requests always go out with `false`.
    pub fn takes_user_gesture(&self) -> bool {
        matches!(
            self,
            CapabilityKind::PointerLock
                | CapabilityKind::OpenExternal
                | CapabilityKind::ProtocolRegistration
                | CapabilityKind::MediaCapture
        )
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_serde_name() {
        for kind in CapabilityKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind));
        }
    }

    #[test]
    fn all_kinds_are_distinct() {
        let mut names: Vec<_> = CapabilityKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CapabilityKind::ALL.len());
    }

    #[test]
    fn gesture_defaults_for_fullscreen_and_notification() {
        assert!(!CapabilityKind::Fullscreen.takes_user_gesture());
        assert!(!CapabilityKind::Notification.takes_user_gesture());
        assert!(CapabilityKind::PointerLock.takes_user_gesture());
        assert!(CapabilityKind::OpenExternal.takes_user_gesture());
    }
}
