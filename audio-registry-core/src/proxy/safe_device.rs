//! Invalidation-absorbing device proxy.
//!
//! A removed endpoint keeps receiving property calls from UI bindings until
//! the removal propagates through the registry. `SafeDevice` sits between
//! the UI and the native handle so that window never surfaces errors:
//! invalidated reads yield the type default, invalidated writes are dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::device_models::DataFlow;
use crate::models::error::DeviceError;
use crate::traits::audio_endpoint::{AudioEndpoint, PropertyChangedCallback};

/// Wrapper around exactly one `AudioEndpoint`.
///
/// Forwards property reads and writes, absorbing `DeviceError::Invalidated`
/// (reads return the type default, writes become no-ops). Other error
/// classes pass through unchanged. Property-change events from the endpoint
/// are re-broadcast verbatim to every registered listener.
///
/// Identity is cached at wrap time, so `id()` stays valid after the native
/// handle dies.
pub struct SafeDevice {
    id: String,
    endpoint: Arc<dyn AudioEndpoint>,
    listeners: Arc<Mutex<Vec<PropertyChangedCallback>>>,
    detached: AtomicBool,
}

impl SafeDevice {
    pub fn new(endpoint: Arc<dyn AudioEndpoint>) -> Self {
        let listeners: Arc<Mutex<Vec<PropertyChangedCallback>>> =
            Arc::new(Mutex::new(Vec::new()));

        let fan_out = Arc::clone(&listeners);
        endpoint.subscribe_property_changes(Arc::new(move |key: &str| {
            // Snapshot outside the lock so a listener may re-register.
            let current: Vec<PropertyChangedCallback> = fan_out.lock().clone();
            for listener in current {
                listener(key);
            }
        }));

        Self {
            id: endpoint.id().to_string(),
            endpoint,
            listeners,
            detached: AtomicBool::new(false),
        }
    }

    /// Opaque endpoint id, cached at construction.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data_flow(&self) -> DataFlow {
        self.endpoint.data_flow()
    }

    pub fn display_name(&self) -> Result<String, DeviceError> {
        absorb(self.endpoint.display_name())
    }

    pub fn is_muted(&self) -> Result<bool, DeviceError> {
        absorb(self.endpoint.is_muted())
    }

    pub fn set_muted(&self, muted: bool) -> Result<(), DeviceError> {
        absorb(self.endpoint.set_muted(muted))
    }

    pub fn volume(&self) -> Result<f32, DeviceError> {
        absorb(self.endpoint.volume())
    }

    pub fn set_volume(&self, level: f32) -> Result<(), DeviceError> {
        absorb(self.endpoint.set_volume(level))
    }

    pub fn peak_level(&self) -> Result<f32, DeviceError> {
        absorb(self.endpoint.peak_level())
    }

    /// Register a listener for re-broadcast property-change events.
    pub fn on_property_changed(&self, listener: PropertyChangedCallback) {
        self.listeners.lock().push(listener);
    }

    /// Stop forwarding property-change events and drop all listeners.
    ///
    /// One-way and idempotent: the upstream subscription is released exactly
    /// once no matter how often this is called. Also runs on drop.
    pub fn detach(&self) {
        if self.detached.swap(true, Ordering::SeqCst) {
            return;
        }
        self.endpoint.unsubscribe_property_changes();
        self.listeners.lock().clear();
    }
}

impl Drop for SafeDevice {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Invalidation policy for forwarded calls: a dead handle reads as the type
/// default and swallows writes; every other error class is the caller's.
fn absorb<T: Default>(result: Result<T, DeviceError>) -> Result<T, DeviceError> {
    match result {
        Err(DeviceError::Invalidated) => Ok(T::default()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEndpoint;
    use crate::models::device_models::DataFlow;

    fn render_endpoint(id: &str) -> Arc<MockEndpoint> {
        Arc::new(MockEndpoint::new(id, "Speakers", DataFlow::Render))
    }

    #[test]
    fn forwards_reads_from_live_endpoint() {
        let endpoint = render_endpoint("dev-1");
        endpoint.set_native_volume(0.25);
        let device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);

        assert_eq!(device.id(), "dev-1");
        assert_eq!(device.display_name(), Ok("Speakers".to_string()));
        assert_eq!(device.volume(), Ok(0.25));
        assert_eq!(device.is_muted(), Ok(false));
    }

    #[test]
    fn invalidated_reads_return_type_defaults() {
        let endpoint = render_endpoint("dev-1");
        let device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);

        endpoint.invalidate();

        assert_eq!(device.display_name(), Ok(String::new()));
        assert_eq!(device.is_muted(), Ok(false));
        assert_eq!(device.volume(), Ok(0.0));
        assert_eq!(device.peak_level(), Ok(0.0));
    }

    #[test]
    fn invalidated_writes_are_dropped() {
        let endpoint = render_endpoint("dev-1");
        endpoint.set_native_volume(0.5);
        let device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);

        endpoint.invalidate();

        assert_eq!(device.set_volume(0.9), Ok(()));
        assert_eq!(device.set_muted(true), Ok(()));

        endpoint.revive();
        assert_eq!(device.volume(), Ok(0.5));
        assert_eq!(device.is_muted(), Ok(false));
    }

    #[test]
    fn id_survives_invalidation() {
        let endpoint = render_endpoint("dev-1");
        let device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);

        endpoint.invalidate();
        assert_eq!(device.id(), "dev-1");
    }

    #[test]
    fn non_invalidation_errors_propagate() {
        let endpoint = render_endpoint("dev-1");
        let device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);

        endpoint.fail_with(DeviceError::Unexpected("access denied".into()));

        assert_eq!(
            device.volume(),
            Err(DeviceError::Unexpected("access denied".into()))
        );
        assert_eq!(
            device.set_muted(true),
            Err(DeviceError::Unexpected("access denied".into()))
        );
    }

    #[test]
    fn rebroadcasts_property_changes_verbatim() {
        let endpoint = render_endpoint("dev-1");
        let device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        device.on_property_changed(Arc::new(move |key: &str| {
            sink.lock().push(key.to_string());
        }));

        endpoint.raise_property_change("volume");
        endpoint.raise_property_change("mute");

        assert_eq!(*seen.lock(), vec!["volume".to_string(), "mute".to_string()]);
    }

    #[test]
    fn detach_unsubscribes_exactly_once() {
        let endpoint = render_endpoint("dev-1");
        let device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);
        assert!(endpoint.has_property_listener());

        device.detach();
        device.detach();

        assert!(!endpoint.has_property_listener());
        assert_eq!(endpoint.unsubscribe_calls(), 1);
    }

    #[test]
    fn drop_detaches() {
        let endpoint = render_endpoint("dev-1");
        {
            let _device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);
            assert!(endpoint.has_property_listener());
        }
        assert!(!endpoint.has_property_listener());
        assert_eq!(endpoint.unsubscribe_calls(), 1);
    }

    #[test]
    fn detached_device_stops_rebroadcasting() {
        let endpoint = render_endpoint("dev-1");
        let device = SafeDevice::new(endpoint.clone() as Arc<dyn AudioEndpoint>);

        let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        device.on_property_changed(Arc::new(move |key: &str| {
            sink.lock().push(key.to_string());
        }));

        device.detach();
        endpoint.raise_property_change("volume");

        assert!(seen.lock().is_empty());
    }
}
