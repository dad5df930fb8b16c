use crate::models::device_models::DeviceRole;
use crate::models::error::DeviceError;

/// Platform service that reassigns the default endpoint for a role.
///
/// Requests are fire-and-forget: a successful return means the request was
/// issued, not that the default changed. The observable effect, if any,
/// arrives later as a default-changed notification. A failed or ignored
/// request leaves the registry's selection unchanged.
pub trait DefaultEndpointService: Send + Sync {
    fn request_set_default(&self, device_id: &str, role: DeviceRole) -> Result<(), DeviceError>;
}
