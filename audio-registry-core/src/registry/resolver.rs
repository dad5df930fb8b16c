use std::sync::Arc;

use crate::models::device_models::{DataFlow, DeviceRole};
use crate::proxy::safe_device::SafeDevice;
use crate::traits::audio_platform::AudioPlatform;

/// Cached default-endpoint selection for the two render roles.
///
/// A selection only changes by re-querying the platform; the default id
/// carried in a notification payload is ignored in favor of a fresh query.
pub(crate) struct DefaultDeviceResolver {
    playback: Option<Arc<SafeDevice>>,
    communications: Option<Arc<SafeDevice>>,
}

impl DefaultDeviceResolver {
    pub(crate) fn new() -> Self {
        Self {
            playback: None,
            communications: None,
        }
    }

    pub(crate) fn playback(&self) -> Option<&Arc<SafeDevice>> {
        self.playback.as_ref()
    }

    pub(crate) fn communications(&self) -> Option<&Arc<SafeDevice>> {
        self.communications.as_ref()
    }

    /// Re-query the default for `role` and update the cached selection.
    ///
    /// Returns whether the selection's id changed. `NotFound` from the query
    /// means no default is assigned (not a failure); any other error is
    /// logged and leaves the selection as it was. A resolved id with no
    /// matching collection entry selects `None` and still counts as a
    /// change.
    pub(crate) fn refresh(
        &mut self,
        platform: &dyn AudioPlatform,
        devices: &[Arc<SafeDevice>],
        role: DeviceRole,
    ) -> bool {
        let resolved_id = match platform.default_endpoint(DataFlow::Render, role) {
            Ok(id) => Some(id),
            Err(error) if error.is_not_found() => None,
            Err(error) => {
                log::warn!("default endpoint query failed for {:?}: {}", role, error);
                return false;
            }
        };

        let current_id = self.selection(role).map(|device| device.id().to_string());
        if current_id.as_deref() == resolved_id.as_deref() {
            return false;
        }

        let selection = resolved_id
            .as_deref()
            .and_then(|id| devices.iter().find(|device| device.id() == id).cloned());
        *self.selection_mut(role) = selection;
        true
    }

    fn selection(&self, role: DeviceRole) -> Option<&Arc<SafeDevice>> {
        match role {
            DeviceRole::Multimedia => self.playback.as_ref(),
            DeviceRole::Communications => self.communications.as_ref(),
        }
    }

    fn selection_mut(&mut self, role: DeviceRole) -> &mut Option<Arc<SafeDevice>> {
        match role {
            DeviceRole::Multimedia => &mut self.playback,
            DeviceRole::Communications => &mut self.communications,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockEndpoint, MockPlatform};
    use crate::traits::audio_endpoint::AudioEndpoint;

    fn device(id: &str) -> Arc<SafeDevice> {
        let endpoint = Arc::new(MockEndpoint::new(id, "Speakers", DataFlow::Render));
        Arc::new(SafeDevice::new(endpoint as Arc<dyn AudioEndpoint>))
    }

    #[test]
    fn missing_default_stays_none_without_change() {
        let platform = MockPlatform::new();
        let mut resolver = DefaultDeviceResolver::new();

        let changed = resolver.refresh(&platform, &[], DeviceRole::Multimedia);

        assert!(!changed);
        assert!(resolver.playback().is_none());
    }

    #[test]
    fn new_default_selects_collection_entry() {
        let platform = MockPlatform::new();
        platform.set_default(DeviceRole::Multimedia, Some("a"));
        let devices = vec![device("a"), device("b")];
        let mut resolver = DefaultDeviceResolver::new();

        let changed = resolver.refresh(&platform, &devices, DeviceRole::Multimedia);

        assert!(changed);
        assert_eq!(resolver.playback().map(|d| d.id()), Some("a"));
    }

    #[test]
    fn unchanged_default_reports_no_change() {
        let platform = MockPlatform::new();
        platform.set_default(DeviceRole::Multimedia, Some("a"));
        let devices = vec![device("a")];
        let mut resolver = DefaultDeviceResolver::new();

        assert!(resolver.refresh(&platform, &devices, DeviceRole::Multimedia));
        assert!(!resolver.refresh(&platform, &devices, DeviceRole::Multimedia));
        assert_eq!(resolver.playback().map(|d| d.id()), Some("a"));
    }

    #[test]
    fn default_id_missing_from_collection_selects_none() {
        let platform = MockPlatform::new();
        platform.set_default(DeviceRole::Multimedia, Some("ghost"));
        let devices = vec![device("a")];
        let mut resolver = DefaultDeviceResolver::new();

        let changed = resolver.refresh(&platform, &devices, DeviceRole::Multimedia);

        assert!(changed);
        assert!(resolver.playback().is_none());
    }

    #[test]
    fn cleared_default_resolves_to_none() {
        let platform = MockPlatform::new();
        platform.set_default(DeviceRole::Multimedia, Some("a"));
        let devices = vec![device("a")];
        let mut resolver = DefaultDeviceResolver::new();
        resolver.refresh(&platform, &devices, DeviceRole::Multimedia);

        platform.set_default(DeviceRole::Multimedia, None);
        let changed = resolver.refresh(&platform, &devices, DeviceRole::Multimedia);

        assert!(changed);
        assert!(resolver.playback().is_none());
    }

    #[test]
    fn failed_query_keeps_previous_selection() {
        let platform = MockPlatform::new();
        platform.set_default(DeviceRole::Multimedia, Some("a"));
        let devices = vec![device("a")];
        let mut resolver = DefaultDeviceResolver::new();
        resolver.refresh(&platform, &devices, DeviceRole::Multimedia);

        platform.fail_default_queries(true);
        platform.set_default(DeviceRole::Multimedia, Some("b"));
        let changed = resolver.refresh(&platform, &devices, DeviceRole::Multimedia);

        assert!(!changed);
        assert_eq!(resolver.playback().map(|d| d.id()), Some("a"));
    }

    #[test]
    fn roles_are_tracked_independently() {
        let platform = MockPlatform::new();
        platform.set_default(DeviceRole::Multimedia, Some("a"));
        platform.set_default(DeviceRole::Communications, Some("b"));
        let devices = vec![device("a"), device("b")];
        let mut resolver = DefaultDeviceResolver::new();

        assert!(resolver.refresh(&platform, &devices, DeviceRole::Multimedia));
        assert!(resolver.refresh(&platform, &devices, DeviceRole::Communications));

        assert_eq!(resolver.playback().map(|d| d.id()), Some("a"));
        assert_eq!(resolver.communications().map(|d| d.id()), Some("b"));
    }
}
