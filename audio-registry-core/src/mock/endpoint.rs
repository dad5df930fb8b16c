use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::device_models::DataFlow;
use crate::models::error::DeviceError;
use crate::traits::audio_endpoint::{AudioEndpoint, PropertyChangedCallback};
use crate::traits::audio_platform::SessionSink;
use crate::traits::audio_session::AudioSession;

/// A scriptable endpoint.
///
/// Behaves like a live native endpoint until `invalidate()` flips it into
/// the removed-handle failure mode, or `fail_with()` forces an arbitrary
/// error class. Tests drive native-side activity through the `raise_*` and
/// `set_native_*` methods.
pub struct MockEndpoint {
    id: String,
    data_flow: DataFlow,
    inner: Mutex<Inner>,
}

struct Inner {
    display_name: String,
    volume: f32,
    muted: bool,
    peak: f32,
    invalidated: bool,
    forced_error: Option<DeviceError>,
    listener: Option<PropertyChangedCallback>,
    sessions: Option<SessionSink>,
    unsubscribe_calls: usize,
}

impl MockEndpoint {
    pub fn new(id: &str, display_name: &str, data_flow: DataFlow) -> Self {
        Self {
            id: id.to_string(),
            data_flow,
            inner: Mutex::new(Inner {
                display_name: display_name.to_string(),
                volume: 0.5,
                muted: false,
                peak: 0.0,
                invalidated: false,
                forced_error: None,
                listener: None,
                sessions: None,
                unsubscribe_calls: 0,
            }),
        }
    }

    /// Flip into the removed-handle failure mode: every property call now
    /// fails with `DeviceError::Invalidated`.
    pub fn invalidate(&self) {
        self.inner.lock().invalidated = true;
    }

    /// Undo `invalidate()`.
    pub fn revive(&self) {
        self.inner.lock().invalidated = false;
    }

    pub fn is_invalidated(&self) -> bool {
        self.inner.lock().invalidated
    }

    /// Force every property call to fail with `error` until cleared.
    pub fn fail_with(&self, error: DeviceError) {
        self.inner.lock().forced_error = Some(error);
    }

    pub fn clear_failure(&self) {
        self.inner.lock().forced_error = None;
    }

    /// Script the volume without going through the trait (and without
    /// raising a property change).
    pub fn set_native_volume(&self, volume: f32) {
        self.inner.lock().volume = volume;
    }

    pub fn set_native_peak(&self, peak: f32) {
        self.inner.lock().peak = peak;
    }

    /// Fire the property-change listener, as native code would.
    pub fn raise_property_change(&self, key: &str) {
        let listener = self.inner.lock().listener.clone();
        if let Some(listener) = listener {
            listener(key);
        }
    }

    /// Push a session into the sink bound at resolution time.
    pub fn raise_session(&self, session: Arc<dyn AudioSession>) {
        let sink = self.inner.lock().sessions.clone();
        if let Some(sink) = sink {
            sink(session);
        }
    }

    /// Wire the sink sessions are delivered through. `MockPlatform` calls
    /// this when the endpoint is resolved.
    pub fn bind_session_sink(&self, sink: SessionSink) {
        self.inner.lock().sessions = Some(sink);
    }

    pub fn has_property_listener(&self) -> bool {
        self.inner.lock().listener.is_some()
    }

    pub fn unsubscribe_calls(&self) -> usize {
        self.inner.lock().unsubscribe_calls
    }
}

fn guarded<T>(inner: &Inner, value: T) -> Result<T, DeviceError> {
    if let Some(error) = &inner.forced_error {
        return Err(error.clone());
    }
    if inner.invalidated {
        return Err(DeviceError::Invalidated);
    }
    Ok(value)
}

impl AudioEndpoint for MockEndpoint {
    fn id(&self) -> &str {
        &self.id
    }

    fn data_flow(&self) -> DataFlow {
        self.data_flow
    }

    fn display_name(&self) -> Result<String, DeviceError> {
        let inner = self.inner.lock();
        let name = inner.display_name.clone();
        guarded(&inner, name)
    }

    fn is_muted(&self) -> Result<bool, DeviceError> {
        let inner = self.inner.lock();
        let muted = inner.muted;
        guarded(&inner, muted)
    }

    fn set_muted(&self, muted: bool) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        guarded(&inner, ())?;
        inner.muted = muted;
        Ok(())
    }

    fn volume(&self) -> Result<f32, DeviceError> {
        let inner = self.inner.lock();
        let volume = inner.volume;
        guarded(&inner, volume)
    }

    fn set_volume(&self, level: f32) -> Result<(), DeviceError> {
        let mut inner = self.inner.lock();
        guarded(&inner, ())?;
        inner.volume = level;
        Ok(())
    }

    fn peak_level(&self) -> Result<f32, DeviceError> {
        let inner = self.inner.lock();
        let peak = inner.peak;
        guarded(&inner, peak)
    }

    fn subscribe_property_changes(&self, listener: PropertyChangedCallback) {
        self.inner.lock().listener = Some(listener);
    }

    fn unsubscribe_property_changes(&self) {
        let mut inner = self.inner.lock();
        inner.listener = None;
        inner.unsubscribe_calls += 1;
    }
}

/// Minimal opaque session payload.
pub struct MockSession {
    id: String,
}

impl MockSession {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

impl AudioSession for MockSession {
    fn id(&self) -> &str {
        &self.id
    }
}
