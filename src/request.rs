use std::fmt;

use url::Url;
use uuid::Uuid;

use crate::kind::CapabilityKind;
use crate::media::MediaStreamRequest;

/// Correlation id for one permission request.
///
/// Only used to tie log lines and audit events together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "perm-{}", self.0.simple())
    }
}

/// Kind-specific data carried along with a request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestPayload {
    /// Nothing beyond kind, origin and gesture.
    None,
    /// The streams a media capture request asks for.
    Media(MediaStreamRequest),
}

/// A permission ask in its kind-agnostic form.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRequest {
    /// Correlation id.
    pub id: RequestId,
    /// What is being asked for.
    pub kind: CapabilityKind,
    /// Requesting origin. `None` means "whatever the session last committed".
    pub origin: Option<Url>,
    /// Whether the request was triggered by a user gesture.
    pub user_gesture: bool,
    /// Kind-specific data.
    pub payload: RequestPayload,
}

impl CanonicalRequest {
    /// Creates a request with no origin, no gesture and no payload.
    pub fn new(kind: CapabilityKind) -> Self {
        Self {
            id: RequestId::new(),
            kind,
            origin: None,
            user_gesture: false,
            payload: RequestPayload::None,
        }
    }

    /// Sets the requesting origin.
    pub fn with_origin(mut self, origin: Option<Url>) -> Self {
        self.origin = origin;
        self
    }

    /// Sets the user-gesture flag.
    pub fn with_user_gesture(mut self, user_gesture: bool) -> Self {
        self.user_gesture = user_gesture;
        self
    }

    /// Attaches a kind-specific payload.
    pub fn with_payload(mut self, payload: RequestPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Returns the media payload, if any.
    pub fn media(&self) -> Option<&MediaStreamRequest> {
        match &self.payload {
            RequestPayload::Media(media) => Some(media),
            RequestPayload::None => None,
        }
    }
}
