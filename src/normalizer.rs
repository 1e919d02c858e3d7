//! One entry point per capability kind.
//!
//! Each function turns kind-specific arguments into a [`NormalizedRequest`]:
//! the canonical request plus a boolean continuation that already knows how
//! to deliver the decision in the shape the caller expects. The broker can
//! then dispatch every kind the same way.
//!
//! Nothing here has side effects; the returned continuation only acts once it
//! is run (or dropped).
//!
//! Media capture forwards the user-gesture flag carried by the
//! [`MediaStreamRequest`] instead of always reporting `false`.

use std::sync::Arc;

use crate::continuation::Continuation;
use crate::kind::CapabilityKind;
use crate::logging::RequestLog;
use crate::media::{DeviceSelector, MediaNegotiation, MediaResponse, MediaStreamRequest};
use crate::request::{CanonicalRequest, RequestPayload};
use crate::session::SessionHandle;

/// A canonical request paired with its boolean response path.
#[derive(Debug)]
pub struct NormalizedRequest {
    /// The kind-agnostic request.
    pub request: CanonicalRequest,
    /// Receives the authorization outcome.
    pub respond: Continuation<bool>,
}

impl NormalizedRequest {
    /// Pairs a request with a plain boolean callback.
    pub fn new(request: CanonicalRequest, callback: impl FnOnce(bool) + Send + 'static) -> Self {
        Self {
            request,
            respond: Continuation::new(callback),
        }
    }

    /// Returns a logger tagged with this request's id and kind.
    pub fn log(&self) -> RequestLog {
        RequestLog::new(self.request.id, self.request.kind)
    }
}

/// Fullscreen entry. No gesture; origin is the session's location.
pub fn fullscreen(callback: impl FnOnce(bool) + Send + 'static) -> NormalizedRequest {
    NormalizedRequest::new(CanonicalRequest::new(CapabilityKind::Fullscreen), callback)
}

/// Desktop notifications. No gesture; origin is the session's location.
pub fn notification(callback: impl FnOnce(bool) + Send + 'static) -> NormalizedRequest {
    NormalizedRequest::new(CanonicalRequest::new(CapabilityKind::Notification), callback)
}

/// Handing a URL to an external application.
pub fn open_external(
    callback: impl FnOnce(bool) + Send + 'static,
    user_gesture: bool,
) -> NormalizedRequest {
    NormalizedRequest::new(
        CanonicalRequest::new(CapabilityKind::OpenExternal).with_user_gesture(user_gesture),
        callback,
    )
}

/// Registering as a protocol handler.
pub fn protocol_registration(
    callback: impl FnOnce(bool) + Send + 'static,
    user_gesture: bool,
) -> NormalizedRequest {
    NormalizedRequest::new(
        CanonicalRequest::new(CapabilityKind::ProtocolRegistration)
            .with_user_gesture(user_gesture),
        callback,
    )
}

/// Pointer lock. The answer goes straight back to the session, and is
/// dropped if the session has gone away in the meantime.
pub fn pointer_lock(session: SessionHandle, user_gesture: bool) -> NormalizedRequest {
    let request =
        CanonicalRequest::new(CapabilityKind::PointerLock).with_user_gesture(user_gesture);
    let log = RequestLog::new(request.id, request.kind);

    let respond = Continuation::new(move |allowed: bool| match session.upgrade() {
        Some(session) => session.lock_mouse_response(allowed),
        None => log.debug(format_args!(
            "session gone; dropping pointer-lock response (allowed={})",
            allowed
        )),
    });

    NormalizedRequest { request, respond }
}

/// Media capture. Authorization is a boolean step; device negotiation runs
/// after it, and only while the session is still live.
pub fn media_capture(
    session: SessionHandle,
    selector: Arc<dyn DeviceSelector>,
    media: MediaStreamRequest,
    callback: impl FnOnce(MediaResponse) + Send + 'static,
) -> NormalizedRequest {
    let request = CanonicalRequest::new(CapabilityKind::MediaCapture)
        .with_origin(media.security_origin().cloned())
        .with_user_gesture(media.user_gesture())
        .with_payload(RequestPayload::Media(media.clone()));
    let log = RequestLog::new(request.id, request.kind);

    let negotiation = MediaNegotiation::new(media, selector, Continuation::new(callback), log);
    let respond = Continuation::new(move |allowed: bool| {
        if session.is_live() {
            negotiation.resolve(allowed);
        } else {
            negotiation.abandon();
        }
    });

    NormalizedRequest { request, respond }
}
