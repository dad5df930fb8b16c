//! COM-to-core translation for endpoint notifications.
//!
//! The MMDevice API delivers `IMMNotificationClient` callbacks on arbitrary
//! worker threads. This adapter only translates the native payloads into
//! core types and hands them to the registered `NotificationClient`; the
//! registry's bridge takes care of serializing them onto one thread.

use std::sync::Arc;

use windows::core::{implement, PCWSTR};
use windows::Win32::Media::Audio::*;
use windows::Win32::UI::Shell::PropertiesSystem::PROPERTYKEY;

use audio_registry_core::models::device_models::{DataFlow, DeviceRole, DeviceState};
use audio_registry_core::traits::notification_client::NotificationClient;

#[implement(IMMNotificationClient)]
pub(crate) struct EndpointNotificationClient {
    sink: Arc<dyn NotificationClient>,
}

impl EndpointNotificationClient {
    pub(crate) fn new(sink: Arc<dyn NotificationClient>) -> Self {
        Self { sink }
    }
}

impl IMMNotificationClient_Impl for EndpointNotificationClient_Impl {
    fn OnDeviceStateChanged(
        &self,
        pwstrdeviceid: &PCWSTR,
        dwnewstate: DEVICE_STATE,
    ) -> windows::core::Result<()> {
        self.sink
            .on_device_state_changed(&read_id(pwstrdeviceid), from_device_state(dwnewstate));
        Ok(())
    }

    fn OnDeviceAdded(&self, pwstrdeviceid: &PCWSTR) -> windows::core::Result<()> {
        self.sink.on_device_added(&read_id(pwstrdeviceid));
        Ok(())
    }

    fn OnDeviceRemoved(&self, pwstrdeviceid: &PCWSTR) -> windows::core::Result<()> {
        self.sink.on_device_removed(&read_id(pwstrdeviceid));
        Ok(())
    }

    fn OnDefaultDeviceChanged(
        &self,
        flow: EDataFlow,
        role: ERole,
        pwstrdefaultdeviceid: &PCWSTR,
    ) -> windows::core::Result<()> {
        // A null id means the role lost its default entirely.
        let id = if pwstrdefaultdeviceid.is_null() {
            None
        } else {
            Some(unsafe { pwstrdefaultdeviceid.to_string().unwrap_or_default() })
        };
        self.sink
            .on_default_device_changed(from_data_flow(flow), from_role(role), id.as_deref());
        Ok(())
    }

    fn OnPropertyValueChanged(
        &self,
        pwstrdeviceid: &PCWSTR,
        key: &PROPERTYKEY,
    ) -> windows::core::Result<()> {
        let key = format!("{:?}:{}", key.fmtid, key.pid);
        self.sink
            .on_property_value_changed(&read_id(pwstrdeviceid), &key);
        Ok(())
    }
}

fn read_id(id: &PCWSTR) -> String {
    if id.is_null() {
        return String::new();
    }
    unsafe { id.to_string().unwrap_or_default() }
}

fn from_device_state(state: DEVICE_STATE) -> DeviceState {
    if state == DEVICE_STATE_ACTIVE {
        DeviceState::Active
    } else if state == DEVICE_STATE_DISABLED {
        DeviceState::Disabled
    } else if state == DEVICE_STATE_NOTPRESENT {
        DeviceState::NotPresent
    } else if state == DEVICE_STATE_UNPLUGGED {
        DeviceState::Unplugged
    } else {
        DeviceState::Other(state.0)
    }
}

fn from_data_flow(flow: EDataFlow) -> DataFlow {
    // OnDefaultDeviceChanged only ever reports eRender or eCapture.
    if flow == eCapture {
        DataFlow::Capture
    } else {
        DataFlow::Render
    }
}

fn from_role(role: ERole) -> DeviceRole {
    if role == eCommunications {
        DeviceRole::Communications
    } else {
        DeviceRole::Multimedia
    }
}
