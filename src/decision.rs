use std::fmt;

use serde::{Deserialize, Serialize};

use crate::continuation::{Continuation, FailClosed};

/// Decision reported by the authorization authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionStatus {
    /// The request is allowed.
    Granted,
    /// The request is refused.
    Denied,
    /// The authority has not settled on an answer. Never treated as a grant.
    Ask,
}

impl PermissionStatus {
    /// Returns true only for [`PermissionStatus::Granted`].
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

impl FailClosed for PermissionStatus {
    fn fail_closed() -> Self {
        PermissionStatus::Denied
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionStatus::Granted => write!(f, "granted"),
            PermissionStatus::Denied => write!(f, "denied"),
            PermissionStatus::Ask => write!(f, "ask"),
        }
    }
}

/// Adapts a boolean callback to receive an authority decision.
///
/// Only an explicit grant becomes `true`; every other status becomes `false`.
pub fn boolean_response(allowed: Continuation<bool>) -> Continuation<PermissionStatus> {
    allowed.map(|status: PermissionStatus| status.is_granted())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn deliver(status: PermissionStatus) -> bool {
        let (tx, rx) = mpsc::channel();
        boolean_response(Continuation::new(move |v| tx.send(v).unwrap())).run(status);
        rx.recv().unwrap()
    }

    #[test]
    fn only_granted_is_true() {
        assert!(deliver(PermissionStatus::Granted));
        assert!(!deliver(PermissionStatus::Denied));
        assert!(!deliver(PermissionStatus::Ask));
    }

    #[test]
    fn unanswered_status_is_denied() {
        let (tx, rx) = mpsc::channel();
        let responder = boolean_response(Continuation::new(move |v| tx.send(v).unwrap()));
        drop(responder);
        assert!(!rx.recv().unwrap());
    }

    #[test]
    fn status_display() {
        assert_eq!(PermissionStatus::Granted.to_string(), "granted");
        assert_eq!(PermissionStatus::Ask.to_string(), "ask");
    }
}
