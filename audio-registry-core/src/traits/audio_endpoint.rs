use std::sync::Arc;

use crate::models::device_models::DataFlow;
use crate::models::error::DeviceError;

/// Callback invoked when an endpoint property changes natively.
///
/// The payload is an opaque property key (for example `"volume"`). Fired
/// from native callback threads.
pub type PropertyChangedCallback = Arc<dyn Fn(&str) + Send + Sync + 'static>;

/// A live native audio endpoint.
///
/// Property accessors perform synchronous native calls and fail with
/// `DeviceError::Invalidated` once the underlying endpoint is gone.
/// `SafeDevice` wraps this trait to absorb those failures at the UI
/// boundary.
pub trait AudioEndpoint: Send + Sync {
    /// Opaque endpoint id, stable for the endpoint's lifetime.
    fn id(&self) -> &str;

    /// Direction, cached at construction.
    fn data_flow(&self) -> DataFlow;

    fn display_name(&self) -> Result<String, DeviceError>;

    fn is_muted(&self) -> Result<bool, DeviceError>;

    fn set_muted(&self, muted: bool) -> Result<(), DeviceError>;

    /// Master volume scalar in `0.0..=1.0`.
    fn volume(&self) -> Result<f32, DeviceError>;

    fn set_volume(&self, level: f32) -> Result<(), DeviceError>;

    /// Instantaneous peak meter value in `0.0..=1.0`.
    fn peak_level(&self) -> Result<f32, DeviceError>;

    /// Install the property-change listener, replacing any previous one.
    fn subscribe_property_changes(&self, listener: PropertyChangedCallback);

    /// Remove the property-change listener. Idempotent.
    fn unsubscribe_property_changes(&self);
}
