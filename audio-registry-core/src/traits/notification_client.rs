use crate::models::device_models::{DataFlow, DeviceRole, DeviceState};

/// Receiver for native device notifications.
///
/// Methods are invoked from arbitrary native threads, possibly concurrently
/// with each other and in any order relative to the hardware events that
/// produced them. Implementations must not block and must not call back
/// into the native subsystem.
pub trait NotificationClient: Send + Sync {
    fn on_device_added(&self, device_id: &str);

    fn on_device_removed(&self, device_id: &str);

    fn on_device_state_changed(&self, device_id: &str, state: DeviceState);

    /// `device_id` is `None` when the role no longer has a default.
    fn on_default_device_changed(&self, flow: DataFlow, role: DeviceRole, device_id: Option<&str>);

    fn on_property_value_changed(&self, device_id: &str, key: &str);
}
