use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::mock::endpoint::MockEndpoint;
use crate::models::device_models::{DataFlow, DeviceRole};
use crate::models::error::DeviceError;
use crate::traits::audio_endpoint::AudioEndpoint;
use crate::traits::audio_platform::{AudioPlatform, SessionSink};
use crate::traits::default_endpoint_service::DefaultEndpointService;
use crate::traits::notification_client::NotificationClient;

/// A scriptable native audio subsystem.
///
/// Holds a table of endpoints and per-role render defaults, and captures
/// the registered notification client so tests can push notifications the
/// way native callback threads would. Clones share the same scripted state.
#[derive(Clone)]
pub struct MockPlatform {
    inner: Arc<PlatformInner>,
}

struct PlatformInner {
    endpoints: Mutex<Vec<Arc<MockEndpoint>>>,
    defaults: Mutex<HashMap<DeviceRole, String>>,
    client: Mutex<Option<Arc<dyn NotificationClient>>>,
    registrations: AtomicUsize,
    unregistrations: AtomicUsize,
    fail_default_queries: AtomicBool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PlatformInner {
                endpoints: Mutex::new(Vec::new()),
                defaults: Mutex::new(HashMap::new()),
                client: Mutex::new(None),
                registrations: AtomicUsize::new(0),
                unregistrations: AtomicUsize::new(0),
                fail_default_queries: AtomicBool::new(false),
            }),
        }
    }

    /// Add a render endpoint to the native table and return its script
    /// handle. Does not raise a notification.
    pub fn add_render_endpoint(&self, id: &str, display_name: &str) -> Arc<MockEndpoint> {
        self.add_endpoint(id, display_name, DataFlow::Render)
    }

    pub fn add_capture_endpoint(&self, id: &str, display_name: &str) -> Arc<MockEndpoint> {
        self.add_endpoint(id, display_name, DataFlow::Capture)
    }

    fn add_endpoint(&self, id: &str, display_name: &str, flow: DataFlow) -> Arc<MockEndpoint> {
        let endpoint = Arc::new(MockEndpoint::new(id, display_name, flow));
        self.inner.endpoints.lock().push(Arc::clone(&endpoint));
        endpoint
    }

    /// Drop an endpoint from the native table. Ids removed here fail
    /// resolution with `NotFound`, like a handle that went stale between
    /// notification and lookup.
    pub fn remove_endpoint(&self, id: &str) {
        self.inner.endpoints.lock().retain(|e| e.id() != id);
    }

    /// Script the default render endpoint for `role`. `None` clears it, so
    /// default queries report `NotFound`.
    pub fn set_default(&self, role: DeviceRole, device_id: Option<&str>) {
        let mut defaults = self.inner.defaults.lock();
        match device_id {
            Some(id) => {
                defaults.insert(role, id.to_string());
            }
            None => {
                defaults.remove(&role);
            }
        }
    }

    /// Make every default query fail with an `Unexpected` error.
    pub fn fail_default_queries(&self, fail: bool) {
        self.inner.fail_default_queries.store(fail, Ordering::SeqCst);
    }

    /// The client registered by the registry, for pushing notifications.
    pub fn client(&self) -> Option<Arc<dyn NotificationClient>> {
        self.inner.client.lock().clone()
    }

    pub fn registrations(&self) -> usize {
        self.inner.registrations.load(Ordering::SeqCst)
    }

    pub fn unregistrations(&self) -> usize {
        self.inner.unregistrations.load(Ordering::SeqCst)
    }
}

impl Default for MockPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlatform for MockPlatform {
    fn enumerate_render_endpoints(&self) -> Result<Vec<String>, DeviceError> {
        Ok(self
            .inner
            .endpoints
            .lock()
            .iter()
            .filter(|e| e.data_flow() == DataFlow::Render)
            .map(|e| e.id().to_string())
            .collect())
    }

    fn default_endpoint(&self, flow: DataFlow, role: DeviceRole) -> Result<String, DeviceError> {
        if self.inner.fail_default_queries.load(Ordering::SeqCst) {
            return Err(DeviceError::Unexpected("default query failed".into()));
        }
        if flow != DataFlow::Render {
            return Err(DeviceError::NotFound);
        }
        self.inner
            .defaults
            .lock()
            .get(&role)
            .cloned()
            .ok_or(DeviceError::NotFound)
    }

    fn endpoint(
        &self,
        device_id: &str,
        sessions: SessionSink,
    ) -> Result<Arc<dyn AudioEndpoint>, DeviceError> {
        let endpoint = self
            .inner
            .endpoints
            .lock()
            .iter()
            .find(|e| e.id() == device_id)
            .cloned()
            .ok_or(DeviceError::NotFound)?;
        if endpoint.is_invalidated() {
            return Err(DeviceError::Invalidated);
        }
        endpoint.bind_session_sink(sessions);
        Ok(endpoint)
    }

    fn register_notifications(
        &self,
        client: Arc<dyn NotificationClient>,
    ) -> Result<(), DeviceError> {
        *self.inner.client.lock() = Some(client);
        self.inner.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unregister_notifications(&self) -> Result<(), DeviceError> {
        *self.inner.client.lock() = None;
        self.inner.unregistrations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Records default-reassignment requests instead of performing them.
#[derive(Default)]
pub struct MockDefaultService {
    requests: Mutex<Vec<(String, DeviceRole)>>,
    fail: AtomicBool,
}

impl MockDefaultService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request recorded so far, in order.
    pub fn requests(&self) -> Vec<(String, DeviceRole)> {
        self.requests.lock().clone()
    }

    /// Make subsequent requests fail with an `Unexpected` error.
    pub fn fail_requests(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl DefaultEndpointService for MockDefaultService {
    fn request_set_default(&self, device_id: &str, role: DeviceRole) -> Result<(), DeviceError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DeviceError::Unexpected("set-default rejected".into()));
        }
        self.requests.lock().push((device_id.to_string(), role));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumeration_skips_capture_endpoints() {
        let platform = MockPlatform::new();
        platform.add_render_endpoint("render-1", "Speakers");
        platform.add_capture_endpoint("capture-1", "Microphone");
        platform.add_render_endpoint("render-2", "Headphones");

        assert_eq!(
            platform.enumerate_render_endpoints(),
            Ok(vec!["render-1".to_string(), "render-2".to_string()])
        );
    }

    #[test]
    fn default_query_without_assignment_is_not_found() {
        let platform = MockPlatform::new();
        platform.add_render_endpoint("render-1", "Speakers");

        assert_eq!(
            platform.default_endpoint(DataFlow::Render, DeviceRole::Multimedia),
            Err(DeviceError::NotFound)
        );

        platform.set_default(DeviceRole::Multimedia, Some("render-1"));
        assert_eq!(
            platform.default_endpoint(DataFlow::Render, DeviceRole::Multimedia),
            Ok("render-1".to_string())
        );
    }

    #[test]
    fn stale_id_resolution_is_not_found() {
        let platform = MockPlatform::new();
        platform.add_render_endpoint("render-1", "Speakers");
        platform.remove_endpoint("render-1");

        let sink: SessionSink = Arc::new(|_| {});
        let result = platform.endpoint("render-1", sink);
        assert_eq!(result.err(), Some(DeviceError::NotFound));
    }

    #[test]
    fn invalidated_endpoint_fails_resolution() {
        let platform = MockPlatform::new();
        let endpoint = platform.add_render_endpoint("render-1", "Speakers");
        endpoint.invalidate();

        let sink: SessionSink = Arc::new(|_| {});
        let result = platform.endpoint("render-1", sink);
        assert_eq!(result.err(), Some(DeviceError::Invalidated));
    }
}
