use std::sync::Arc;

use crate::proxy::safe_device::SafeDevice;
use crate::traits::audio_session::AudioSession;

/// Event delegate for registry changes.
///
/// All methods are called from the registry's owner thread, not the UI
/// thread. Implementations should marshal to the UI thread if needed, and
/// may call back into the registry.
pub trait RegistryDelegate: Send + Sync {
    /// Called after a device is appended to the collection.
    fn on_device_added(&self, device: &Arc<SafeDevice>);

    /// Called after a device is removed from the collection.
    fn on_device_removed(&self, device_id: &str);

    /// Called when the multimedia default resolves to a different id.
    ///
    /// `None` means no default is assigned, or the new default id is not
    /// present in the collection.
    fn on_default_playback_device_changed(&self, device: Option<&Arc<SafeDevice>>);

    /// Called when an endpoint surfaces a new audio session.
    fn on_session_created(&self, session: &Arc<dyn AudioSession>);
}
