use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use url::Url;

use crate::audit::{AuditOutcome, AuditTrail, PermissionAuditEvent};
use crate::authority::{AuthorizationAuthority, AuthorizationRequest};
use crate::config::BrokerConfig;
use crate::continuation::Continuation;
use crate::decision::boolean_response;
use crate::error::{BrokerError, ConfigError};
use crate::logging::RequestLog;
use crate::media::{DeviceSelector, MediaResponse, MediaStreamRequest};
use crate::normalizer::{self, NormalizedRequest};
use crate::request::CanonicalRequest;
use crate::session::{FrameId, Session, SessionHandle};

/// Routes one session's permission requests to the authorization authority.
///
/// The broker is bound to a single session for its whole lifetime and keeps
/// no per-request state of its own: every request is resolved, dispatched
/// and forgotten. Each `request_*` method returns immediately; the callback
/// fires exactly once, later, on whichever thread the authority answers on.
///
/// If the session is gone when a request is made, the request is declined
/// without asking the authority. The decline is still delivered after the
/// `request_*` call has returned.
///
/// # Examples
///
/// ```
/// use std::sync::{mpsc, Arc};
/// use permission_broker::{
///     AuthorizationAuthority, AuthorizationRequest, Continuation, DeviceSelector, FrameId,
///     MediaResponse, MediaStreamRequest, PermissionBroker, PermissionStatus, Session,
/// };
/// use url::Url;
///
/// struct Tab;
/// impl Session for Tab {
///     fn last_committed_url(&self) -> Url { Url::parse("https://example.com/").unwrap() }
///     fn main_frame(&self) -> Option<FrameId> { Some(FrameId::new(1)) }
///     fn lock_mouse_response(&self, _allowed: bool) {}
/// }
///
/// struct AllowAll;
/// impl AuthorizationAuthority for AllowAll {
///     fn request_permission(
///         &self,
///         _: AuthorizationRequest,
///         respond: Continuation<PermissionStatus>,
///     ) {
///         std::thread::spawn(move || respond.run(PermissionStatus::Granted));
///     }
/// }
///
/// struct NoDevices;
/// impl DeviceSelector for NoDevices {
///     fn select_devices(&self, _: MediaStreamRequest, respond: Continuation<MediaResponse>) {
///         respond.run(MediaResponse::Granted(Vec::new()));
///     }
/// }
///
/// let tab = Arc::new(Tab);
/// let broker = PermissionBroker::new(&tab, Arc::new(AllowAll), Arc::new(NoDevices));
///
/// let (tx, rx) = mpsc::channel();
/// broker.request_fullscreen_permission(move |allowed| tx.send(allowed).unwrap());
/// assert!(rx.recv().unwrap());
/// ```
pub struct PermissionBroker {
    session: SessionHandle,
    authority: Arc<dyn AuthorizationAuthority>,
    devices: Arc<dyn DeviceSelector>,
    config: BrokerConfig,
    audit_trail: Option<Arc<AuditTrail>>,
}

impl PermissionBroker {
    /// Binds a broker to `session`.
    ///
    /// The broker does not keep the session alive.
    pub fn new<S: Session + 'static>(
        session: &Arc<S>,
        authority: Arc<dyn AuthorizationAuthority>,
        devices: Arc<dyn DeviceSelector>,
    ) -> Self {
        Self {
            session: SessionHandle::new(session),
            authority,
            devices,
            config: BrokerConfig::default(),
            audit_trail: None,
        }
    }

    /// Replaces the default configuration.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] reported by
    /// [`BrokerConfig::validate`].
    pub fn with_config(mut self, config: BrokerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Records every delivered decision into `trail`.
    pub fn with_audit_trail(mut self, trail: Arc<AuditTrail>) -> Self {
        self.audit_trail = Some(trail);
        self
    }

    /// The session this broker is bound to.
    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// The active configuration.
    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Whether the bound session is still live.
    pub fn is_attached(&self) -> bool {
        self.session.is_live()
    }

    /// Asks to enter fullscreen.
    pub fn request_fullscreen_permission(&self, callback: impl FnOnce(bool) + Send + 'static) {
        self.request_permission(normalizer::fullscreen(callback));
    }

    /// Asks to show desktop notifications.
    pub fn request_web_notification_permission(
        &self,
        callback: impl FnOnce(bool) + Send + 'static,
    ) {
        self.request_permission(normalizer::notification(callback));
    }

    /// Asks to lock the pointer. The answer is delivered to the session via
    /// [`Session::lock_mouse_response`].
    pub fn request_pointer_lock_permission(&self, user_gesture: bool) {
        self.request_permission(normalizer::pointer_lock(self.session.clone(), user_gesture));
    }

    /// Asks to hand a URL to an external application.
    pub fn request_open_external_permission(
        &self,
        callback: impl FnOnce(bool) + Send + 'static,
        user_gesture: bool,
    ) {
        self.request_permission(normalizer::open_external(callback, user_gesture));
    }

    /// Asks to register as a protocol handler.
    pub fn request_protocol_registration_permission(
        &self,
        callback: impl FnOnce(bool) + Send + 'static,
        user_gesture: bool,
    ) {
        self.request_permission(normalizer::protocol_registration(callback, user_gesture));
    }

    /// Asks for camera/microphone access, then negotiates devices.
    pub fn request_media_access_permission(
        &self,
        request: MediaStreamRequest,
        callback: impl FnOnce(MediaResponse) + Send + 'static,
    ) {
        self.request_permission(normalizer::media_capture(
            self.session.clone(),
            Arc::clone(&self.devices),
            request,
            callback,
        ));
    }

    /// Dispatches a normalized request to the authority.
    ///
    /// Every other entry point funnels through here.
    pub fn request_permission(&self, normalized: NormalizedRequest) {
        let log = normalized.log();
        let NormalizedRequest { request, respond } = normalized;

        let (frame, origin) = match self.resolve(&request) {
            Ok(resolved) => resolved,
            Err(err) => {
                log.warn(format_args!("declining without asking: {}", err));
                self.audit(&request, request.origin.as_ref(), AuditOutcome::Declined);
                self.decline(respond, &log);
                return;
            }
        };

        log.info(format_args!(
            "requesting permission for {} (gesture={})",
            origin.origin().ascii_serialization(),
            request.user_gesture
        ));

        let delivery = Delivery::new(respond, log, self.audit_sink(&request, &origin));
        self.arm_deadline(&delivery);

        let authorization = AuthorizationRequest {
            id: request.id,
            kind: request.kind,
            frame,
            origin,
            user_gesture: request.user_gesture,
        };
        let answer = delivery.clone();
        self.authority.request_permission(
            authorization,
            boolean_response(Continuation::new(move |allowed: bool| {
                let outcome = if allowed {
                    AuditOutcome::Granted
                } else {
                    AuditOutcome::Denied
                };
                answer.settle(allowed, outcome);
            })),
        );
    }

    /// The origin the authority would see for a request carrying `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::SessionGone`] if the bound session is gone.
    pub fn effective_origin(&self, origin: Option<&Url>) -> Result<Url, BrokerError> {
        match origin {
            Some(origin) => Ok(origin.clone()),
            None => {
                let session = self.session.upgrade().ok_or(BrokerError::SessionGone)?;
                Ok(session.last_committed_url())
            }
        }
    }

    fn resolve(&self, request: &CanonicalRequest) -> Result<(FrameId, Url), BrokerError> {
        let session = self.session.upgrade().ok_or(BrokerError::SessionGone)?;
        let frame = session.main_frame().ok_or(BrokerError::NoMainFrame)?;
        let origin = match &request.origin {
            Some(origin) => origin.clone(),
            None => session.last_committed_url(),
        };
        Ok((frame, origin))
    }

    /// Answers `false` after the caller has returned: on the current tokio
    /// runtime if there is one, on a short-lived thread otherwise.
    fn decline(&self, respond: Continuation<bool>, log: &RequestLog) {
        if let Ok(handle) = Handle::try_current() {
            handle.spawn(async move { respond.run(false) });
            return;
        }

        let spawned = std::thread::Builder::new()
            .name("permission-decline".into())
            .spawn(move || respond.run(false));
        if let Err(err) = spawned {
            // The continuation was dropped with the closure and has already
            // delivered its denial.
            log.warn(format_args!("could not defer decline: {}", err));
        }
    }

    fn arm_deadline(&self, delivery: &Delivery) {
        let Some(timeout) = self.config.decision_timeout() else {
            return;
        };

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                delivery.log().warn(format_args!(
                    "no async runtime; decision timeout of {:?} not armed",
                    timeout
                ));
                return;
            }
        };

        let expired = delivery.clone();
        let task = handle.spawn(async move {
            tokio::time::sleep(timeout).await;
            if expired.settle(false, AuditOutcome::TimedOut) {
                expired.log().warn(format_args!(
                    "authority did not answer within {:?}; denied",
                    timeout
                ));
            }
        });
        delivery.set_deadline(task.abort_handle());
    }

    fn audit_sink(&self, request: &CanonicalRequest, origin: &Url) -> Option<AuditSink> {
        self.config.audit.then(|| AuditSink {
            trail: self.audit_trail.clone(),
            template: PermissionAuditEvent::new(request.id, request.kind, AuditOutcome::Denied)
                .with_origin(origin)
                .with_user_gesture(request.user_gesture),
        })
    }

    fn audit(&self, request: &CanonicalRequest, origin: Option<&Url>, outcome: AuditOutcome) {
        if !self.config.audit {
            return;
        }
        let mut event = PermissionAuditEvent::new(request.id, request.kind, outcome)
            .with_user_gesture(request.user_gesture);
        if let Some(origin) = origin {
            event = event.with_origin(origin);
        }
        record(self.audit_trail.as_deref(), event);
    }
}

impl fmt::Debug for PermissionBroker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PermissionBroker")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("audit_trail", &self.audit_trail.is_some())
            .finish_non_exhaustive()
    }
}

fn record(trail: Option<&AuditTrail>, event: PermissionAuditEvent) {
    event.emit();
    if let Some(trail) = trail {
        trail.record(event);
    }
}

#[derive(Clone)]
struct AuditSink {
    trail: Option<Arc<AuditTrail>>,
    template: PermissionAuditEvent,
}

impl AuditSink {
    fn record(&self, outcome: AuditOutcome) {
        record(
            self.trail.as_deref(),
            self.template.clone().with_outcome(outcome),
        );
    }
}

/// The single way a dispatched request's callback gets run.
///
/// Shared between the authority's responder and the deadline task; the first
/// to settle wins.
#[derive(Clone)]
struct Delivery {
    inner: Arc<DeliveryState>,
}

struct DeliveryState {
    respond: Mutex<Option<Continuation<bool>>>,
    deadline: Mutex<Option<AbortHandle>>,
    log: RequestLog,
    audit: Option<AuditSink>,
}

impl Delivery {
    fn new(respond: Continuation<bool>, log: RequestLog, audit: Option<AuditSink>) -> Self {
        Self {
            inner: Arc::new(DeliveryState {
                respond: Mutex::new(Some(respond)),
                deadline: Mutex::new(None),
                log,
                audit,
            }),
        }
    }

    fn log(&self) -> &RequestLog {
        &self.inner.log
    }

    fn set_deadline(&self, deadline: AbortHandle) {
        *self.inner.deadline.lock() = Some(deadline);
    }

    /// Runs the callback with `allowed` unless it already ran. Returns
    /// whether this call was the one that delivered.
    fn settle(&self, allowed: bool, outcome: AuditOutcome) -> bool {
        let pending = self.inner.respond.lock().take();
        let Some(respond) = pending else {
            self.inner.log.debug(format_args!(
                "ignoring {} outcome; request already settled",
                outcome
            ));
            return false;
        };

        if outcome != AuditOutcome::TimedOut {
            if let Some(deadline) = self.inner.deadline.lock().take() {
                deadline.abort();
            }
        }
        if let Some(audit) = &self.inner.audit {
            audit.record(outcome);
        }
        self.inner
            .log
            .debug(format_args!("delivering {} (allowed={})", outcome, allowed));
        respond.run(allowed);
        true
    }
}
