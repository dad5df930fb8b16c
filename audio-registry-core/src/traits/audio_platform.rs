use std::sync::Arc;

use crate::models::device_models::{DataFlow, DeviceRole};
use crate::models::error::DeviceError;
use crate::traits::audio_endpoint::AudioEndpoint;
use crate::traits::audio_session::AudioSession;
use crate::traits::notification_client::NotificationClient;

/// Callback receiving audio sessions surfaced by a resolved endpoint.
///
/// Fired from native callback threads; implementations must not block.
pub type SessionSink = Arc<dyn Fn(Arc<dyn AudioSession>) + Send + Sync + 'static>;

/// Interface to the native audio subsystem's endpoint queries.
///
/// Implemented by:
/// - `MmDevicePlatform` (Windows, `audio-registry-windows`)
/// - `MockPlatform` (scriptable, for hardware-free tests)
pub trait AudioPlatform: Send + Sync {
    /// Ids of every currently active render endpoint, in native order.
    fn enumerate_render_endpoints(&self) -> Result<Vec<String>, DeviceError>;

    /// Id of the current default endpoint for `flow`/`role`.
    ///
    /// Fails with `DeviceError::NotFound` when no default is assigned;
    /// callers normalize that to "no default" rather than treating it as a
    /// failure.
    fn default_endpoint(&self, flow: DataFlow, role: DeviceRole) -> Result<String, DeviceError>;

    /// Resolve `device_id` to a live endpoint handle.
    ///
    /// Sessions the endpoint surfaces later are pushed into `sessions`.
    /// Fails with `NotFound` or `Invalidated` when the id went stale between
    /// notification and resolution.
    fn endpoint(
        &self,
        device_id: &str,
        sessions: SessionSink,
    ) -> Result<Arc<dyn AudioEndpoint>, DeviceError>;

    /// Register `client` for device notifications. The registration stays
    /// live until `unregister_notifications`.
    fn register_notifications(&self, client: Arc<dyn NotificationClient>)
        -> Result<(), DeviceError>;

    /// Drop the notification registration. Called exactly once, at teardown.
    fn unregister_notifications(&self) -> Result<(), DeviceError>;
}
