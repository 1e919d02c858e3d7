//! Per-session permission broker.
//!
//! A hosting shell funnels every request for a sensitive capability through
//! one [`PermissionBroker`] per session. The broker normalizes the request,
//! asks the [`AuthorizationAuthority`], and delivers the decision back in the
//! shape the caller expects:
//!
//! - **Boolean callbacks** for fullscreen, notifications, opening external
//!   applications and protocol registration
//! - **Device negotiation** for media capture, via a [`DeviceSelector`], only
//!   after authorization has been decided
//! - **Session notification** for pointer lock, dropped if the session is gone
//!
//! # Core Types
//!
//! - [`CapabilityKind`]: What is being asked for
//! - [`CanonicalRequest`]: Kind-agnostic request record
//! - [`Continuation`]: Single-shot callback that fails closed when dropped
//! - [`PermissionStatus`]: The authority's tri-state answer
//! - [`PermissionBroker`]: Origin resolution and dispatch
//!
//! Anything other than an explicit grant reaches the caller as a denial.
//!
//! # Examples
//!
//! ```
//! use std::sync::{mpsc, Arc};
//! use permission_broker::{
//!     AuthorizationAuthority, AuthorizationRequest, CapabilityKind, Continuation,
//!     DeviceSelector, FrameId, MediaResponse, MediaStreamRequest, PermissionBroker,
//!     PermissionStatus, Session,
//! };
//! use url::Url;
//!
//! struct Tab;
//! impl Session for Tab {
//!     fn last_committed_url(&self) -> Url { Url::parse("https://example.com/").unwrap() }
//!     fn main_frame(&self) -> Option<FrameId> { Some(FrameId::new(1)) }
//!     fn lock_mouse_response(&self, _allowed: bool) {}
//! }
//!
//! // Allows fullscreen, refuses everything else.
//! struct FullscreenOnly;
//! impl AuthorizationAuthority for FullscreenOnly {
//!     fn request_permission(
//!         &self,
//!         request: AuthorizationRequest,
//!         respond: Continuation<PermissionStatus>,
//!     ) {
//!         let status = if request.kind == CapabilityKind::Fullscreen {
//!             PermissionStatus::Granted
//!         } else {
//!             PermissionStatus::Denied
//!         };
//!         std::thread::spawn(move || respond.run(status));
//!     }
//! }
//!
//! struct NoDevices;
//! impl DeviceSelector for NoDevices {
//!     fn select_devices(&self, _: MediaStreamRequest, respond: Continuation<MediaResponse>) {
//!         respond.run(MediaResponse::Granted(Vec::new()));
//!     }
//! }
//!
//! let tab = Arc::new(Tab);
//! let broker = PermissionBroker::new(&tab, Arc::new(FullscreenOnly), Arc::new(NoDevices));
//!
//! let (tx, rx) = mpsc::channel();
//! let notify_tx = tx.clone();
//! broker.request_fullscreen_permission(move |allowed| {
//!     tx.send(("fullscreen", allowed)).unwrap();
//! });
//! broker.request_web_notification_permission(move |allowed| {
//!     notify_tx.send(("notify", allowed)).unwrap();
//! });
//!
//! let mut answers: Vec<_> = rx.iter().take(2).collect();
//! answers.sort();
//! assert_eq!(answers, vec![("fullscreen", true), ("notify", false)]);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
mod authority;
mod broker;
mod config;
mod continuation;
mod decision;
mod error;
mod kind;
mod logging;
mod media;
pub mod normalizer;
mod request;
mod session;

pub use authority::{AuthorizationAuthority, AuthorizationRequest};
pub use broker::PermissionBroker;
pub use config::BrokerConfig;
pub use continuation::{Continuation, FailClosed};
pub use decision::{PermissionStatus, boolean_response};
pub use error::{BrokerError, ConfigError};
pub use kind::CapabilityKind;
pub use logging::RequestLog;
pub use media::{
    DeviceSelector, MediaDenial, MediaDevice, MediaNegotiation, MediaResponse,
    MediaStreamRequest, MediaStreamType, NegotiationProgress, NegotiationState, StreamRequest,
};
pub use normalizer::NormalizedRequest;
pub use request::{CanonicalRequest, RequestId, RequestPayload};
pub use session::{FrameId, Session, SessionHandle};
