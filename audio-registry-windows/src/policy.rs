//! Default-endpoint reassignment through the shell's policy store.
//!
//! Windows exposes no documented API for changing the default audio
//! endpoint; the shell does it through `IPolicyConfig`. The interface id
//! and vtable layout have been stable since Windows 7.

use windows::core::{interface, IUnknown, IUnknown_Vtbl, BOOL, GUID, HRESULT, PCWSTR};
use windows::Win32::Media::Audio::{ERole, WAVEFORMATEX};
use windows::Win32::System::Com::StructuredStorage::PROPVARIANT;
use windows::Win32::System::Com::{CoCreateInstance, CLSCTX_ALL};
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;

use audio_registry_core::models::device_models::DeviceRole;
use audio_registry_core::models::error::DeviceError;
use audio_registry_core::traits::default_endpoint_service::DefaultEndpointService;

use crate::platform::{classify, to_role};

/// CLSID of the shell's `CPolicyConfigClient` coclass.
const POLICY_CONFIG_CLIENT: GUID = GUID::from_u128(0x870af99c_171d_4f9e_af0d_e63df40c2bc9);

// Only SetDefaultEndpoint is ever called; the earlier methods exist to put
// it at the right vtable slot.
#[interface("f8679f50-850a-41cf-9c72-430f290290c8")]
unsafe trait IPolicyConfig: IUnknown {
    fn GetMixFormat(&self, device_id: PCWSTR, format: *mut *mut WAVEFORMATEX) -> HRESULT;
    fn GetDeviceFormat(
        &self,
        device_id: PCWSTR,
        default: BOOL,
        format: *mut *mut WAVEFORMATEX,
    ) -> HRESULT;
    fn ResetDeviceFormat(&self, device_id: PCWSTR) -> HRESULT;
    fn SetDeviceFormat(
        &self,
        device_id: PCWSTR,
        endpoint_format: *mut WAVEFORMATEX,
        mix_format: *mut WAVEFORMATEX,
    ) -> HRESULT;
    fn GetProcessingPeriod(
        &self,
        device_id: PCWSTR,
        default: BOOL,
        default_period: *mut i64,
        minimum_period: *mut i64,
    ) -> HRESULT;
    fn SetProcessingPeriod(&self, device_id: PCWSTR, period: *mut i64) -> HRESULT;
    fn GetShareMode(&self, device_id: PCWSTR, mode: *mut core::ffi::c_void) -> HRESULT;
    fn SetShareMode(&self, device_id: PCWSTR, mode: *mut core::ffi::c_void) -> HRESULT;
    fn GetPropertyValue(
        &self,
        device_id: PCWSTR,
        fx_store: BOOL,
        key: *const PROPERTYKEY,
        value: *mut PROPVARIANT,
    ) -> HRESULT;
    fn SetPropertyValue(
        &self,
        device_id: PCWSTR,
        fx_store: BOOL,
        key: *const PROPERTYKEY,
        value: *mut PROPVARIANT,
    ) -> HRESULT;
    fn SetDefaultEndpoint(&self, device_id: PCWSTR, role: ERole) -> HRESULT;
    fn SetEndpointVisibility(&self, device_id: PCWSTR, visible: BOOL) -> HRESULT;
}

/// `DefaultEndpointService` backed by the shell's policy config object.
pub struct PolicyConfigService {
    policy: IPolicyConfig,
}

// SAFETY: the policy config object is a free-threaded shell COM object;
// requests may come from any thread in the multithreaded apartment.
unsafe impl Send for PolicyConfigService {}
unsafe impl Sync for PolicyConfigService {}

impl PolicyConfigService {
    /// Create a new service handle.
    ///
    /// Requires COM to be initialized on the calling thread.
    pub fn new() -> Result<Self, DeviceError> {
        unsafe {
            let policy: IPolicyConfig =
                CoCreateInstance(&POLICY_CONFIG_CLIENT, None, CLSCTX_ALL)
                    .map_err(|e| classify("CoCreateInstance(CPolicyConfigClient)", e))?;
            Ok(Self { policy })
        }
    }
}

impl DefaultEndpointService for PolicyConfigService {
    fn request_set_default(&self, device_id: &str, role: DeviceRole) -> Result<(), DeviceError> {
        let wide: Vec<u16> = device_id.encode_utf16().chain(std::iter::once(0)).collect();
        unsafe {
            self.policy
                .SetDefaultEndpoint(PCWSTR(wide.as_ptr()), to_role(role))
                .ok()
                .map_err(|e| classify("SetDefaultEndpoint", e))
        }
    }
}
