//! The hosting session as seen from the broker.
//!
//! The broker never owns a session. It keeps a [`SessionHandle`] (a weak
//! reference) so a closed session is observable as "gone" instead of being
//! kept alive by outstanding permission requests.

use std::fmt;
use std::sync::{Arc, Weak};

use url::Url;

/// Identifier of a session's primary execution frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u64);

impl FrameId {
    /// Wraps a host-assigned frame identifier.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the host-assigned identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

/// The host's rendering/session object.
///
/// Implementations must be safe to call from whichever thread the
/// authorization authority answers on.
pub trait Session: Send + Sync {
    /// The location the session last committed to. Used as the origin when a
    /// request carries none.
    fn last_committed_url(&self) -> Url;

    /// The session's primary execution frame, or `None` once it is torn down.
    fn main_frame(&self) -> Option<FrameId>;

    /// Whether the session still accepts work. A session may stay allocated
    /// for a while after it has been closed.
    fn is_live(&self) -> bool {
        true
    }

    /// Answers a pending pointer-lock request.
    fn lock_mouse_response(&self, allowed: bool);
}

/// Non-owning reference to the session a broker is bound to.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Weak<dyn Session>,
}

impl SessionHandle {
    /// Creates a handle that does not keep `session` alive.
    pub fn new<S: Session + 'static>(session: &Arc<S>) -> Self {
        let inner: Weak<S> = Arc::downgrade(session);
        Self { inner }
    }

    /// Returns the session if it is still allocated and live.
    pub fn upgrade(&self) -> Option<Arc<dyn Session>> {
        self.inner.upgrade().filter(|session| session.is_live())
    }

    /// Returns true while [`upgrade`](Self::upgrade) would succeed.
    pub fn is_live(&self) -> bool {
        self.upgrade().is_some()
    }
}

impl fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionHandle")
            .field("live", &self.is_live())
            .finish()
    }
}
