//! Per-endpoint control surface over WASAPI endpoint interfaces.
//!
//! Each `MmDeviceEndpoint` owns the COM interfaces for one audio endpoint:
//! `IAudioEndpointVolume` for volume and mute, `IAudioMeterInformation` for
//! peak metering, and `IAudioSessionManager2` for session-created events.
//! Volume-change and session callbacks arrive on MMDevice worker threads and
//! are forwarded as-is; serialization happens upstream in the registry.

use std::sync::Arc;

use parking_lot::Mutex;
use windows::core::{implement, Interface, Ref, GUID};
use windows::Win32::Devices::FunctionDiscovery::PKEY_Device_FriendlyName;
use windows::Win32::Media::Audio::Endpoints::*;
use windows::Win32::Media::Audio::*;
use windows::Win32::System::Com::StructuredStorage::{PropVariantClear, PROPVARIANT};
use windows::Win32::System::Com::*;
use windows::Win32::System::Variant::VT_LPWSTR;

use audio_registry_core::models::device_models::DataFlow;
use audio_registry_core::models::error::DeviceError;
use audio_registry_core::traits::audio_endpoint::{AudioEndpoint, PropertyChangedCallback};
use audio_registry_core::traits::audio_platform::SessionSink;
use audio_registry_core::traits::audio_session::AudioSession;

use crate::platform::{classify, take_com_string};

type SharedListener = Arc<Mutex<Option<PropertyChangedCallback>>>;

/// `AudioEndpoint` backed by a live MMDevice endpoint.
///
/// Identity and the friendly name are read once at construction so they
/// survive the endpoint itself going away.
pub struct MmDeviceEndpoint {
    id: String,
    display_name: String,
    data_flow: DataFlow,
    volume: IAudioEndpointVolume,
    meter: IAudioMeterInformation,
    session_manager: IAudioSessionManager2,
    volume_callback: IAudioEndpointVolumeCallback,
    session_callback: IAudioSessionNotification,
    listener: SharedListener,
}

// SAFETY: WASAPI endpoint interfaces are free-threaded COM objects; the
// registry serializes all mutation on its owner thread.
unsafe impl Send for MmDeviceEndpoint {}
unsafe impl Sync for MmDeviceEndpoint {}

impl MmDeviceEndpoint {
    pub(crate) fn new(device: IMMDevice, sessions: SessionSink) -> Result<Self, DeviceError> {
        unsafe {
            let id = take_com_string(device.GetId().map_err(|e| classify("GetId", e))?);

            let endpoint: IMMEndpoint = device
                .cast()
                .map_err(|e| classify("IMMEndpoint cast", e))?;
            let flow = endpoint
                .GetDataFlow()
                .map_err(|e| classify("GetDataFlow", e))?;
            let data_flow = if flow == eCapture {
                DataFlow::Capture
            } else {
                DataFlow::Render
            };

            let display_name = read_friendly_name(&device).unwrap_or_else(|| id.clone());

            let volume: IAudioEndpointVolume = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| classify("Activate(IAudioEndpointVolume)", e))?;
            let meter: IAudioMeterInformation = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| classify("Activate(IAudioMeterInformation)", e))?;
            let session_manager: IAudioSessionManager2 = device
                .Activate(CLSCTX_ALL, None)
                .map_err(|e| classify("Activate(IAudioSessionManager2)", e))?;

            let listener: SharedListener = Arc::new(Mutex::new(None));
            let volume_callback: IAudioEndpointVolumeCallback = VolumeChangeForwarder {
                listener: Arc::clone(&listener),
            }
            .into();
            volume
                .RegisterControlChangeNotify(&volume_callback)
                .map_err(|e| classify("RegisterControlChangeNotify", e))?;

            let session_callback: IAudioSessionNotification =
                SessionCreatedForwarder { sink: sessions }.into();
            session_manager
                .RegisterSessionNotification(&session_callback)
                .map_err(|e| classify("RegisterSessionNotification", e))?;
            // Session callbacks only start flowing once the session list has
            // been enumerated at least once.
            let _ = session_manager.GetSessionEnumerator();

            Ok(Self {
                id,
                display_name,
                data_flow,
                volume,
                meter,
                session_manager,
                volume_callback,
                session_callback,
                listener,
            })
        }
    }
}

impl AudioEndpoint for MmDeviceEndpoint {
    fn id(&self) -> &str {
        &self.id
    }

    fn data_flow(&self) -> DataFlow {
        self.data_flow
    }

    fn display_name(&self) -> Result<String, DeviceError> {
        Ok(self.display_name.clone())
    }

    fn is_muted(&self) -> Result<bool, DeviceError> {
        unsafe {
            let muted = self
                .volume
                .GetMute()
                .map_err(|e| classify("GetMute", e))?;
            Ok(muted.as_bool())
        }
    }

    fn set_muted(&self, muted: bool) -> Result<(), DeviceError> {
        unsafe {
            self.volume
                .SetMute(muted, std::ptr::null::<GUID>())
                .map_err(|e| classify("SetMute", e))
        }
    }

    fn volume(&self) -> Result<f32, DeviceError> {
        unsafe {
            self.volume
                .GetMasterVolumeLevelScalar()
                .map_err(|e| classify("GetMasterVolumeLevelScalar", e))
        }
    }

    fn set_volume(&self, level: f32) -> Result<(), DeviceError> {
        let level = level.clamp(0.0, 1.0);
        unsafe {
            self.volume
                .SetMasterVolumeLevelScalar(level, std::ptr::null::<GUID>())
                .map_err(|e| classify("SetMasterVolumeLevelScalar", e))
        }
    }

    fn peak_level(&self) -> Result<f32, DeviceError> {
        unsafe {
            self.meter
                .GetPeakValue()
                .map_err(|e| classify("GetPeakValue", e))
        }
    }

    fn subscribe_property_changes(&self, callback: PropertyChangedCallback) {
        *self.listener.lock() = Some(callback);
    }

    fn unsubscribe_property_changes(&self) {
        *self.listener.lock() = None;
    }
}

impl Drop for MmDeviceEndpoint {
    fn drop(&mut self) {
        unsafe {
            let _ = self.volume.UnregisterControlChangeNotify(&self.volume_callback);
            let _ = self
                .session_manager
                .UnregisterSessionNotification(&self.session_callback);
        }
    }
}

/// Audio session handle surfaced through session-created events.
pub struct MmAudioSession {
    id: String,
}

impl AudioSession for MmAudioSession {
    fn id(&self) -> &str {
        &self.id
    }
}

#[implement(IAudioEndpointVolumeCallback)]
struct VolumeChangeForwarder {
    listener: SharedListener,
}

impl IAudioEndpointVolumeCallback_Impl for VolumeChangeForwarder_Impl {
    fn OnNotify(
        &self,
        _pnotify: *mut AUDIO_VOLUME_NOTIFICATION_DATA,
    ) -> windows::core::Result<()> {
        // Clone the listener out of the lock; it may call back into us.
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener("volume");
            listener("mute");
        }
        Ok(())
    }
}

#[implement(IAudioSessionNotification)]
struct SessionCreatedForwarder {
    sink: SessionSink,
}

impl IAudioSessionNotification_Impl for SessionCreatedForwarder_Impl {
    fn OnSessionCreated(
        &self,
        newsession: Ref<'_, IAudioSessionControl>,
    ) -> windows::core::Result<()> {
        if let Some(session) = newsession.as_ref() {
            match session_identity(session) {
                Ok(id) => (self.sink)(Arc::new(MmAudioSession { id })),
                Err(error) => log::debug!("failed to read session identity: {}", error),
            }
        }
        Ok(())
    }
}

fn session_identity(session: &IAudioSessionControl) -> windows::core::Result<String> {
    unsafe {
        let session: IAudioSessionControl2 = session.cast()?;
        let id = session.GetSessionIdentifier()?;
        Ok(take_com_string(id))
    }
}

fn read_friendly_name(device: &IMMDevice) -> Option<String> {
    unsafe {
        let store = device.OpenPropertyStore(STGM_READ).ok()?;
        let mut value: PROPVARIANT = store.GetValue(&PKEY_Device_FriendlyName).ok()?;
        let name = if value.Anonymous.Anonymous.vt == VT_LPWSTR {
            let text = value.Anonymous.Anonymous.Anonymous.pwszVal;
            if text.is_null() {
                None
            } else {
                text.to_string().ok()
            }
        } else {
            None
        };
        let _ = PropVariantClear(&mut value);
        name
    }
}
