//! Media capture: the device-selection boundary and the negotiation step that
//! runs once authorization has been decided.
//!
//! ```text
//! AwaitingAuthorization --true--> NegotiatingDevices --selector--> Resolved
//! AwaitingAuthorization --false-> DeniedResolved
//! AwaitingAuthorization --session gone--> DeniedResolved
//! ```
//!
//! Each negotiation is single-shot: [`MediaNegotiation::resolve`] consumes it.
//! A [`NegotiationProgress`] taken beforehand keeps reporting the state after
//! that.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

use crate::continuation::{Continuation, FailClosed};
use crate::logging::RequestLog;

/// A kind of capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaStreamType {
    /// Microphone.
    Audio,
    /// Camera.
    Video,
}

impl fmt::Display for MediaStreamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaStreamType::Audio => write!(f, "audio"),
            MediaStreamType::Video => write!(f, "video"),
        }
    }
}

/// One requested stream, optionally pinned to a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    /// Stream kind.
    pub kind: MediaStreamType,
    /// Preferred device id, if the page named one.
    pub device_id: Option<String>,
}

/// The page's request for capture streams.
///
/// # Examples
///
/// ```
/// use permission_broker::{MediaStreamRequest, MediaStreamType};
///
/// let request = MediaStreamRequest::new()
///     .audio()
///     .video_device("cam-front");
///
/// assert!(request.wants(MediaStreamType::Audio));
/// assert_eq!(request.streams()[1].device_id.as_deref(), Some("cam-front"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaStreamRequest {
    security_origin: Option<Url>,
    user_gesture: bool,
    streams: Vec<StreamRequest>,
}

impl MediaStreamRequest {
    /// Creates a request for no streams.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the origin of the frame that asked for capture.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.security_origin = Some(origin);
        self
    }

    /// Sets the user-gesture flag.
    pub fn with_user_gesture(mut self, user_gesture: bool) -> Self {
        self.user_gesture = user_gesture;
        self
    }

    /// Asks for any microphone.
    pub fn audio(self) -> Self {
        self.stream(MediaStreamType::Audio, None)
    }

    /// Asks for any camera.
    pub fn video(self) -> Self {
        self.stream(MediaStreamType::Video, None)
    }

    /// Asks for a specific microphone.
    pub fn audio_device(self, device_id: impl Into<String>) -> Self {
        self.stream(MediaStreamType::Audio, Some(device_id.into()))
    }

    /// Asks for a specific camera.
    pub fn video_device(self, device_id: impl Into<String>) -> Self {
        self.stream(MediaStreamType::Video, Some(device_id.into()))
    }

    fn stream(mut self, kind: MediaStreamType, device_id: Option<String>) -> Self {
        self.streams.push(StreamRequest { kind, device_id });
        self
    }

    /// The origin the page reported, if any.
    pub fn security_origin(&self) -> Option<&Url> {
        self.security_origin.as_ref()
    }

    /// Whether a user gesture triggered the request.
    pub fn user_gesture(&self) -> bool {
        self.user_gesture
    }

    /// The requested streams, in request order.
    pub fn streams(&self) -> &[StreamRequest] {
        &self.streams
    }

    /// Whether any stream of `kind` was requested.
    pub fn wants(&self, kind: MediaStreamType) -> bool {
        self.streams.iter().any(|s| s.kind == kind)
    }
}

/// A concrete capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDevice {
    /// Host-assigned device id.
    pub id: String,
    /// Human-readable label.
    pub name: String,
    /// What the device captures.
    pub kind: MediaStreamType,
}

impl MediaDevice {
    /// Creates a device description.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: MediaStreamType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
        }
    }
}

/// Why a media request ended without devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaDenial {
    /// The authority (user or policy) refused.
    PermissionDenied,
    /// Authorized, but no matching device exists.
    NoHardware,
    /// The request could not be completed: the session went away or a
    /// service dropped the request unanswered.
    InvalidState,
}

impl fmt::Display for MediaDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaDenial::PermissionDenied => write!(f, "permission denied"),
            MediaDenial::NoHardware => write!(f, "no hardware"),
            MediaDenial::InvalidState => write!(f, "invalid state"),
        }
    }
}

/// Final answer to a media request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaResponse {
    /// Capture may start on these devices.
    Granted(Vec<MediaDevice>),
    /// Capture is refused.
    Denied(MediaDenial),
}

impl MediaResponse {
    /// The granted devices; empty for a denial.
    pub fn devices(&self) -> &[MediaDevice] {
        match self {
            MediaResponse::Granted(devices) => devices,
            MediaResponse::Denied(_) => &[],
        }
    }

    /// The denial reason, if denied.
    pub fn denial(&self) -> Option<MediaDenial> {
        match self {
            MediaResponse::Granted(_) => None,
            MediaResponse::Denied(reason) => Some(*reason),
        }
    }
}

impl FailClosed for MediaResponse {
    fn fail_closed() -> Self {
        MediaResponse::Denied(MediaDenial::InvalidState)
    }
}

/// The external device-selection service.
///
/// Implementations answer through `respond` exactly once, on any thread.
pub trait DeviceSelector: Send + Sync {
    /// Enumerates devices matching `request` and reports the selection.
    fn select_devices(&self, request: MediaStreamRequest, respond: Continuation<MediaResponse>);

    /// Reports a denial for `request`.
    ///
    /// The default answers immediately with `reason`. Hosts that need to
    /// release state tied to the request override it.
    fn deny(
        &self,
        _request: MediaStreamRequest,
        reason: MediaDenial,
        respond: Continuation<MediaResponse>,
    ) {
        respond.run(MediaResponse::Denied(reason));
    }
}

/// Where a media negotiation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    /// Waiting for the authority.
    AwaitingAuthorization,
    /// Handed to the device selector.
    NegotiatingDevices,
    /// The selector answered.
    Resolved,
    /// Authorization was refused and the denial has been reported.
    DeniedResolved,
}

/// Observes where a negotiation stands, including after it was consumed.
#[derive(Debug, Clone)]
pub struct NegotiationProgress {
    state: Arc<Mutex<NegotiationState>>,
}

impl NegotiationProgress {
    fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(NegotiationState::AwaitingAuthorization)),
        }
    }

    /// The current state.
    pub fn get(&self) -> NegotiationState {
        *self.state.lock()
    }

    fn set(&self, state: NegotiationState) {
        *self.state.lock() = state;
    }
}

/// Device negotiation for one authorized (or refused) media request.
pub struct MediaNegotiation {
    request: MediaStreamRequest,
    selector: Arc<dyn DeviceSelector>,
    respond: Continuation<MediaResponse>,
    progress: NegotiationProgress,
    log: RequestLog,
}

impl MediaNegotiation {
    /// Prepares a negotiation that will answer `respond`.
    pub fn new(
        request: MediaStreamRequest,
        selector: Arc<dyn DeviceSelector>,
        respond: Continuation<MediaResponse>,
        log: RequestLog,
    ) -> Self {
        Self {
            request,
            selector,
            respond,
            progress: NegotiationProgress::new(),
            log,
        }
    }

    /// The current state.
    pub fn state(&self) -> NegotiationState {
        self.progress.get()
    }

    /// A handle that keeps tracking the state once this negotiation has
    /// been resolved or abandoned.
    pub fn progress(&self) -> NegotiationProgress {
        self.progress.clone()
    }

    /// The request being negotiated.
    pub fn request(&self) -> &MediaStreamRequest {
        &self.request
    }

    /// Continues with the authorization outcome.
    ///
    /// `true` hands the request to the selector and moves to
    /// [`NegotiationState::Resolved`] once the selector answers. `false` asks
    /// the selector to report [`MediaDenial::PermissionDenied`]. Returns the
    /// state entered.
    pub fn resolve(self, authorized: bool) -> NegotiationState {
        let Self {
            request,
            selector,
            respond,
            progress,
            log,
        } = self;

        if authorized {
            log.debug(format_args!(
                "negotiating devices for {} stream(s)",
                request.streams().len()
            ));
            progress.set(NegotiationState::NegotiatingDevices);
            let resolved = progress.clone();
            let respond = respond.map(move |response: MediaResponse| {
                resolved.set(NegotiationState::Resolved);
                log.debug(format_args!(
                    "device negotiation resolved with {} device(s)",
                    response.devices().len()
                ));
                response
            });
            selector.select_devices(request, respond);
            NegotiationState::NegotiatingDevices
        } else {
            log.debug(format_args!("media access refused; reporting denial"));
            progress.set(NegotiationState::DeniedResolved);
            selector.deny(request, MediaDenial::PermissionDenied, respond);
            NegotiationState::DeniedResolved
        }
    }

    /// Answers with [`MediaDenial::InvalidState`] without involving the
    /// selector. Used when the session is gone by the time authorization
    /// arrives.
    pub fn abandon(self) {
        self.progress.set(NegotiationState::DeniedResolved);
        self.log
            .debug(format_args!("session gone before negotiation; skipping selector"));
        self.respond.run(MediaResponse::Denied(MediaDenial::InvalidState));
    }
}

impl fmt::Debug for MediaNegotiation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaNegotiation")
            .field("request", &self.request)
            .field("state", &self.state())
            .finish()
    }
}
