//! Native endpoint queries via the MMDevice API.
//!
//! Wraps `IMMDeviceEnumerator` behind the core `AudioPlatform` trait:
//! render-endpoint enumeration, per-role default lookup, id-to-endpoint
//! resolution, and the endpoint notification registration.

use std::sync::Arc;

use parking_lot::Mutex;
use windows::core::{HRESULT, PCWSTR, PWSTR};
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::*;

use audio_registry_core::models::device_models::{DataFlow, DeviceRole};
use audio_registry_core::models::error::DeviceError;
use audio_registry_core::traits::audio_endpoint::AudioEndpoint;
use audio_registry_core::traits::audio_platform::{AudioPlatform, SessionSink};
use audio_registry_core::traits::notification_client::NotificationClient;

use crate::endpoint::MmDeviceEndpoint;
use crate::notification_client::EndpointNotificationClient;

/// HRESULT_FROM_WIN32(ERROR_NOT_FOUND): the query had no matching element.
const E_NOTFOUND: HRESULT = HRESULT(0x80070490_u32 as i32);

/// Map a raw COM failure into the core error taxonomy.
///
/// `ERROR_NOT_FOUND` means the element does not exist (no default assigned,
/// or a device id that went stale); `AUDCLNT_E_DEVICE_INVALIDATED` means
/// the handle outlived its endpoint. Everything else is unexpected.
pub(crate) fn classify(operation: &str, error: windows::core::Error) -> DeviceError {
    let code = error.code();
    if code == E_NOTFOUND {
        DeviceError::NotFound
    } else if code == AUDCLNT_E_DEVICE_INVALIDATED {
        DeviceError::Invalidated
    } else {
        DeviceError::Unexpected(format!("{} failed: {}", operation, error))
    }
}

/// Copy a PWSTR returned by the MMDevice API and free the native buffer.
pub(crate) unsafe fn take_com_string(text: PWSTR) -> String {
    let copied = text.to_string().unwrap_or_default();
    CoTaskMemFree(Some(text.as_ptr() as *const _));
    copied
}

pub(crate) fn to_data_flow(flow: DataFlow) -> EDataFlow {
    match flow {
        DataFlow::Render => eRender,
        DataFlow::Capture => eCapture,
    }
}

pub(crate) fn to_role(role: DeviceRole) -> ERole {
    match role {
        DeviceRole::Multimedia => eMultimedia,
        DeviceRole::Communications => eCommunications,
    }
}

/// `AudioPlatform` over the Windows MMDevice API.
pub struct MmDevicePlatform {
    enumerator: IMMDeviceEnumerator,
    registration: Mutex<Option<IMMNotificationClient>>,
}

// SAFETY: the MMDevice enumerator is a free-threaded COM object; calls may
// come from any thread in the multithreaded apartment.
unsafe impl Send for MmDevicePlatform {}
unsafe impl Sync for MmDevicePlatform {}

impl MmDevicePlatform {
    /// Create a new platform handle.
    ///
    /// Requires COM to be initialized on the calling thread, in the
    /// multithreaded apartment: the registry's owner thread issues calls
    /// through this handle without initializing COM itself.
    pub fn new() -> Result<Self, DeviceError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(|e| classify("CoCreateInstance(MMDeviceEnumerator)", e))?;
            Ok(Self {
                enumerator,
                registration: Mutex::new(None),
            })
        }
    }
}

impl AudioPlatform for MmDevicePlatform {
    fn enumerate_render_endpoints(&self) -> Result<Vec<String>, DeviceError> {
        unsafe {
            let collection = self
                .enumerator
                .EnumAudioEndpoints(eRender, DEVICE_STATE_ACTIVE)
                .map_err(|e| classify("EnumAudioEndpoints", e))?;

            let count = collection
                .GetCount()
                .map_err(|e| classify("GetCount", e))?;

            let mut ids = Vec::with_capacity(count as usize);
            for i in 0..count {
                let device = match collection.Item(i) {
                    Ok(device) => device,
                    Err(_) => continue,
                };
                match device.GetId() {
                    Ok(id) => ids.push(take_com_string(id)),
                    Err(_) => continue,
                }
            }
            Ok(ids)
        }
    }

    fn default_endpoint(&self, flow: DataFlow, role: DeviceRole) -> Result<String, DeviceError> {
        unsafe {
            let device = self
                .enumerator
                .GetDefaultAudioEndpoint(to_data_flow(flow), to_role(role))
                .map_err(|e| classify("GetDefaultAudioEndpoint", e))?;

            let id = device.GetId().map_err(|e| classify("GetId", e))?;
            Ok(take_com_string(id))
        }
    }

    fn endpoint(
        &self,
        device_id: &str,
        sessions: SessionSink,
    ) -> Result<Arc<dyn AudioEndpoint>, DeviceError> {
        let wide: Vec<u16> = device_id.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe {
            let device = self
                .enumerator
                .GetDevice(PCWSTR(wide.as_ptr()))
                .map_err(|e| classify("GetDevice", e))?;
            Ok(Arc::new(MmDeviceEndpoint::new(device, sessions)?))
        }
    }

    fn register_notifications(
        &self,
        client: Arc<dyn NotificationClient>,
    ) -> Result<(), DeviceError> {
        let com_client: IMMNotificationClient = EndpointNotificationClient::new(client).into();
        unsafe {
            self.enumerator
                .RegisterEndpointNotificationCallback(&com_client)
                .map_err(|e| classify("RegisterEndpointNotificationCallback", e))?;
        }
        // Hold the callback so the registration outlives this call.
        *self.registration.lock() = Some(com_client);
        Ok(())
    }

    fn unregister_notifications(&self) -> Result<(), DeviceError> {
        let Some(client) = self.registration.lock().take() else {
            return Ok(());
        };
        unsafe {
            self.enumerator
                .UnregisterEndpointNotificationCallback(&client)
                .map_err(|e| classify("UnregisterEndpointNotificationCallback", e))
        }
    }
}
