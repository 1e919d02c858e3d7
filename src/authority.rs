use url::Url;

use crate::continuation::Continuation;
use crate::decision::PermissionStatus;
use crate::kind::CapabilityKind;
use crate::request::RequestId;
use crate::session::FrameId;

/// What the broker hands to the authorization authority.
///
/// The origin is always resolved: requests without one carry the session's
/// last committed URL.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorizationRequest {
    /// Correlation id shared with the broker's logs.
    pub id: RequestId,
    /// What is being asked for.
    pub kind: CapabilityKind,
    /// The session's primary execution frame.
    pub frame: FrameId,
    /// The effective requesting origin.
    pub origin: Url,
    /// Whether a user gesture triggered the request.
    pub user_gesture: bool,
}

/// The external decision-maker for permission requests.
///
/// Policy evaluation, prompting and grant persistence all live behind this
/// trait. The broker relies on two properties of every implementation:
///
/// - `request_permission` returns without running `respond`;
/// - `respond` is run exactly once, on any thread.
///
/// Dropping `respond` unanswered counts as [`PermissionStatus::Denied`].
pub trait AuthorizationAuthority: Send + Sync {
    /// Starts deciding `request`.
    fn request_permission(
        &self,
        request: AuthorizationRequest,
        respond: Continuation<PermissionStatus>,
    );
}
