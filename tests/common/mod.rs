//! Shared fakes for broker integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use permission_broker::{
    AuthorizationAuthority, AuthorizationRequest, Continuation, DeviceSelector, FrameId,
    MediaDenial, MediaDevice, MediaResponse, MediaStreamRequest, MediaStreamType,
    PermissionBroker, PermissionStatus, Session,
};
use url::Url;

/// A tab that can navigate and be closed.
pub struct FakeSession {
    url: Mutex<Url>,
    live: AtomicBool,
    pub lock_responses: Mutex<Vec<bool>>,
}

impl FakeSession {
    pub fn new(url: &str) -> Arc<Self> {
        Arc::new(Self {
            url: Mutex::new(Url::parse(url).expect("valid test url")),
            live: AtomicBool::new(true),
            lock_responses: Mutex::new(Vec::new()),
        })
    }

    pub fn navigate(&self, url: &str) {
        *self.url.lock() = Url::parse(url).expect("valid test url");
    }

    /// Marks the session closed while it is still allocated.
    pub fn close(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

impl Session for FakeSession {
    fn last_committed_url(&self) -> Url {
        self.url.lock().clone()
    }

    fn main_frame(&self) -> Option<FrameId> {
        self.is_live().then(|| FrameId::new(42))
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn lock_mouse_response(&self, allowed: bool) {
        self.lock_responses.lock().push(allowed);
    }
}

/// Authority that parks every request until the test answers it.
#[derive(Default)]
pub struct QueueAuthority {
    pending: Mutex<Vec<(AuthorizationRequest, Continuation<PermissionStatus>)>>,
    seen: Mutex<Vec<AuthorizationRequest>>,
}

impl QueueAuthority {
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Every request ever received, in arrival order.
    pub fn seen(&self) -> Vec<AuthorizationRequest> {
        self.seen.lock().clone()
    }

    /// Answers the oldest parked request.
    pub fn answer_next(&self, status: PermissionStatus) -> AuthorizationRequest {
        let (request, respond) = self.pending.lock().remove(0);
        respond.run(status);
        request
    }

    /// Answers the newest parked request.
    pub fn answer_last(&self, status: PermissionStatus) -> AuthorizationRequest {
        let (request, respond) = self.pending.lock().pop().expect("a pending request");
        respond.run(status);
        request
    }

    /// Takes all parked responders without answering them.
    pub fn take_all(&self) -> Vec<(AuthorizationRequest, Continuation<PermissionStatus>)> {
        std::mem::take(&mut *self.pending.lock())
    }
}

impl AuthorizationAuthority for QueueAuthority {
    fn request_permission(
        &self,
        request: AuthorizationRequest,
        respond: Continuation<PermissionStatus>,
    ) {
        self.seen.lock().push(request.clone());
        self.pending.lock().push((request, respond));
    }
}

/// Picks the first device of each requested kind from a fixed catalog.
pub struct FakeDevices {
    catalog: Vec<MediaDevice>,
    pub selections: Mutex<Vec<MediaStreamRequest>>,
    pub denials: Mutex<Vec<MediaDenial>>,
}

impl FakeDevices {
    pub fn new(catalog: Vec<MediaDevice>) -> Arc<Self> {
        Arc::new(Self {
            catalog,
            selections: Mutex::new(Vec::new()),
            denials: Mutex::new(Vec::new()),
        })
    }

    /// One microphone and one camera.
    pub fn standard() -> Arc<Self> {
        Self::new(vec![
            MediaDevice::new("mic-1", "Built-in Microphone", MediaStreamType::Audio),
            MediaDevice::new("mic-2", "USB Microphone", MediaStreamType::Audio),
            MediaDevice::new("cam-1", "FaceTime Camera", MediaStreamType::Video),
        ])
    }

    pub fn selection_count(&self) -> usize {
        self.selections.lock().len()
    }
}

impl DeviceSelector for FakeDevices {
    fn select_devices(&self, request: MediaStreamRequest, respond: Continuation<MediaResponse>) {
        let chosen: Option<Vec<MediaDevice>> = request
            .streams()
            .iter()
            .map(|stream| {
                self.catalog
                    .iter()
                    .find(|d| {
                        d.kind == stream.kind
                            && stream.device_id.as_ref().map_or(true, |id| *id == d.id)
                    })
                    .cloned()
            })
            .collect();
        self.selections.lock().push(request);

        match chosen {
            Some(devices) => respond.run(MediaResponse::Granted(devices)),
            None => respond.run(MediaResponse::Denied(MediaDenial::NoHardware)),
        }
    }

    fn deny(
        &self,
        _request: MediaStreamRequest,
        reason: MediaDenial,
        respond: Continuation<MediaResponse>,
    ) {
        self.denials.lock().push(reason);
        respond.run(MediaResponse::Denied(reason));
    }
}

/// Collects every value a callback receives, on any thread.
#[derive(Clone)]
pub struct Probe<T> {
    values: Arc<(Mutex<Vec<T>>, Condvar)>,
}

impl<T: Clone + Send + 'static> Probe<T> {
    pub fn new() -> Self {
        Self {
            values: Arc::new((Mutex::new(Vec::new()), Condvar::new())),
        }
    }

    pub fn callback(&self) -> impl FnOnce(T) + Send + 'static {
        let values = Arc::clone(&self.values);
        move |value| {
            values.0.lock().push(value);
            values.1.notify_all();
        }
    }

    pub fn values(&self) -> Vec<T> {
        self.values.0.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.values.0.lock().len()
    }

    /// Blocks until at least `count` values arrived or five seconds passed.
    pub fn wait_for(&self, count: usize) -> Vec<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let (values, arrived) = &*self.values;
        let mut values = values.lock();
        while values.len() < count {
            if arrived.wait_until(&mut values, deadline).timed_out() {
                break;
            }
        }
        values.clone()
    }
}

pub struct Harness {
    pub session: Arc<FakeSession>,
    pub authority: Arc<QueueAuthority>,
    pub devices: Arc<FakeDevices>,
    pub broker: PermissionBroker,
}

impl Harness {
    pub fn new(url: &str) -> Self {
        let session = FakeSession::new(url);
        let authority = Arc::new(QueueAuthority::default());
        let devices = FakeDevices::standard();
        let broker = PermissionBroker::new(&session, authority.clone(), devices.clone());
        Self {
            session,
            authority,
            devices,
            broker,
        }
    }
}

/// Routes broker logs to the test harness output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
