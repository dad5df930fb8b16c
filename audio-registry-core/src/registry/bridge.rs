use std::sync::Arc;

use crossbeam_channel::Sender;

use crate::models::device_models::{DataFlow, DeviceNotification, DeviceRole, DeviceState};
use crate::traits::audio_session::AudioSession;
use crate::traits::notification_client::NotificationClient;

/// One unit of work for the registry's owner thread.
pub(crate) enum OwnerTask {
    Notification(DeviceNotification),
    SessionCreated(Arc<dyn AudioSession>),
    /// Rendezvous marker: the owner thread replies once everything queued
    /// before it has been processed.
    Flush(Sender<()>),
    Shutdown,
}

/// Marshals native callbacks onto the owner queue.
///
/// Callback threads return as soon as the task is enqueued; no registry
/// state is touched here. The channel preserves arrival order, so
/// notifications from one source are processed in the order they fired.
pub(crate) struct NotificationBridge {
    tasks: Sender<OwnerTask>,
}

impl NotificationBridge {
    pub(crate) fn new(tasks: Sender<OwnerTask>) -> Self {
        Self { tasks }
    }

    fn enqueue(&self, notification: DeviceNotification) {
        if self
            .tasks
            .send(OwnerTask::Notification(notification))
            .is_err()
        {
            log::debug!("device notification dropped after registry shutdown");
        }
    }
}

impl NotificationClient for NotificationBridge {
    fn on_device_added(&self, device_id: &str) {
        self.enqueue(DeviceNotification::Added {
            device_id: device_id.to_string(),
        });
    }

    fn on_device_removed(&self, device_id: &str) {
        self.enqueue(DeviceNotification::Removed {
            device_id: device_id.to_string(),
        });
    }

    fn on_device_state_changed(&self, device_id: &str, state: DeviceState) {
        self.enqueue(DeviceNotification::StateChanged {
            device_id: device_id.to_string(),
            state,
        });
    }

    fn on_default_device_changed(&self, flow: DataFlow, role: DeviceRole, device_id: Option<&str>) {
        self.enqueue(DeviceNotification::DefaultChanged {
            flow,
            role,
            device_id: device_id.map(str::to_string),
        });
    }

    fn on_property_value_changed(&self, device_id: &str, key: &str) {
        self.enqueue(DeviceNotification::PropertyChanged {
            device_id: device_id.to_string(),
            key: key.to_string(),
        });
    }
}
