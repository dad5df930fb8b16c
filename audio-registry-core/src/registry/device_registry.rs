//! Endpoint registry: the single owner of the device collection.
//!
//! Data flow:
//! ```text
//! native callbacks (any thread)
//!   → NotificationBridge → channel (arrival order)
//!   → owner thread → collection / default selections → RegistryDelegate
//! ```
//!
//! Native notifications may arrive out of order relative to hardware events
//! (an add can be processed after the endpoint is already gone). All
//! handlers are idempotent and treat stale-handle failures as expected
//! outcomes, so any interleaving converges on the native truth.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;

use crate::models::device_models::{DataFlow, DeviceNotification, DeviceRole, DeviceState};
use crate::models::error::DeviceError;
use crate::proxy::safe_device::SafeDevice;
use crate::registry::bridge::{NotificationBridge, OwnerTask};
use crate::registry::resolver::DefaultDeviceResolver;
use crate::traits::audio_platform::{AudioPlatform, SessionSink};
use crate::traits::audio_session::AudioSession;
use crate::traits::default_endpoint_service::DefaultEndpointService;
use crate::traits::registry_delegate::RegistryDelegate;

/// Internal mutable registry state, protected by `parking_lot::Mutex`.
///
/// Written only by the owner thread (and the constructor, before the owner
/// thread starts); read from any thread through the public snapshot
/// accessors.
struct RegistryState {
    devices: Vec<Arc<SafeDevice>>,
    resolver: DefaultDeviceResolver,
}

impl RegistryState {
    fn new() -> Self {
        Self {
            devices: Vec::new(),
            resolver: DefaultDeviceResolver::new(),
        }
    }
}

/// State shared between the public handle, the owner thread, and the
/// session sink handed to resolved endpoints.
struct RegistryShared {
    platform: Arc<dyn AudioPlatform>,
    default_service: Arc<dyn DefaultEndpointService>,
    state: Mutex<RegistryState>,
    delegate: Mutex<Option<Arc<dyn RegistryDelegate>>>,
    session_sink: SessionSink,
}

impl RegistryShared {
    /// Single dispatch point for every notification, live or seeded.
    fn apply_notification(&self, notification: DeviceNotification) {
        match notification {
            DeviceNotification::Added { device_id } => self.add_device(&device_id),
            DeviceNotification::Removed { device_id } => self.remove_device(&device_id),
            DeviceNotification::StateChanged { device_id, state } => match state {
                DeviceState::Active => self.add_device(&device_id),
                DeviceState::Disabled | DeviceState::NotPresent | DeviceState::Unplugged => {
                    self.remove_device(&device_id)
                }
                other => {
                    log::warn!(
                        "ignoring unknown state {:?} for device {}",
                        other,
                        device_id
                    );
                }
            },
            // The payload id is advisory only; both roles are re-queried.
            DeviceNotification::DefaultChanged { .. } => self.refresh_defaults(),
            DeviceNotification::PropertyChanged { .. } => {}
        }
    }

    fn add_device(&self, device_id: &str) {
        if self
            .state
            .lock()
            .devices
            .iter()
            .any(|device| device.id() == device_id)
        {
            return;
        }

        let endpoint = match self
            .platform
            .endpoint(device_id, Arc::clone(&self.session_sink))
        {
            Ok(endpoint) => endpoint,
            // A remove raced this add; the handle is already stale.
            Err(error) if error.is_not_found() || error.is_invalidated() => {
                log::debug!("device {} vanished before resolution: {}", device_id, error);
                return;
            }
            Err(error) => {
                log::warn!("failed to resolve device {}: {}", device_id, error);
                return;
            }
        };

        if endpoint.data_flow() != DataFlow::Render {
            return;
        }

        let device = Arc::new(SafeDevice::new(endpoint));
        self.state.lock().devices.push(Arc::clone(&device));
        self.notify_delegate(|delegate| delegate.on_device_added(&device));
    }

    fn remove_device(&self, device_id: &str) {
        let removed = {
            let mut state = self.state.lock();
            state
                .devices
                .iter()
                .position(|device| device.id() == device_id)
                .map(|index| state.devices.remove(index))
        };
        if removed.is_some() {
            self.notify_delegate(|delegate| delegate.on_device_removed(device_id));
        }
    }

    /// Re-query both role defaults. Only a playback change raises the
    /// public event; the communications selection updates silently.
    fn refresh_defaults(&self) {
        let playback_change = {
            let mut state = self.state.lock();
            let RegistryState { devices, resolver } = &mut *state;
            let playback_changed =
                resolver.refresh(self.platform.as_ref(), devices, DeviceRole::Multimedia);
            resolver.refresh(self.platform.as_ref(), devices, DeviceRole::Communications);
            playback_changed.then(|| resolver.playback().cloned())
        };

        if let Some(selection) = playback_change {
            self.notify_delegate(|delegate| {
                delegate.on_default_playback_device_changed(selection.as_ref())
            });
        }
    }

    fn forward_session(&self, session: Arc<dyn AudioSession>) {
        self.notify_delegate(|delegate| delegate.on_session_created(&session));
    }

    /// Delegate calls run outside the state lock so a delegate may call
    /// back into the registry.
    fn notify_delegate(&self, notify: impl FnOnce(&dyn RegistryDelegate)) {
        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            notify(delegate.as_ref());
        }
    }
}

/// Live registry of render endpoints with per-role default tracking.
///
/// Construction seeds the collection from the currently active endpoints
/// and resolves both role defaults; after that, a dedicated owner thread
/// applies native notifications strictly in arrival order. Consumers read
/// snapshots from any thread and observe changes through the
/// `RegistryDelegate`.
pub struct DeviceRegistry {
    shared: Arc<RegistryShared>,
    tasks: Sender<OwnerTask>,
    owner_handle: Mutex<Option<thread::JoinHandle<()>>>,
    closed: AtomicBool,
}

impl DeviceRegistry {
    /// Register for notifications, seed the collection, resolve both role
    /// defaults, then start the owner thread.
    ///
    /// Seeding runs each enumerated id through the same code path live
    /// add notifications take, on the constructing thread, before the owner
    /// thread exists; the single-writer rule holds throughout.
    pub fn new(
        platform: Arc<dyn AudioPlatform>,
        default_service: Arc<dyn DefaultEndpointService>,
    ) -> Result<Self, DeviceError> {
        let (tasks, queue) = crossbeam_channel::unbounded();

        let session_sink: SessionSink = {
            let tasks = tasks.clone();
            Arc::new(move |session: Arc<dyn AudioSession>| {
                if tasks.send(OwnerTask::SessionCreated(session)).is_err() {
                    log::debug!("audio session dropped after registry shutdown");
                }
            })
        };

        let shared = Arc::new(RegistryShared {
            platform,
            default_service,
            state: Mutex::new(RegistryState::new()),
            delegate: Mutex::new(None),
            session_sink,
        });

        let bridge = Arc::new(NotificationBridge::new(tasks.clone()));
        shared.platform.register_notifications(bridge)?;

        match shared.platform.enumerate_render_endpoints() {
            Ok(device_ids) => {
                for device_id in &device_ids {
                    shared.add_device(device_id);
                }
                shared.refresh_defaults();
            }
            Err(error) => {
                let _ = shared.platform.unregister_notifications();
                return Err(error);
            }
        }

        let owner_handle = {
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name("device-registry".into())
                .spawn(move || owner_loop(shared, queue))
        };
        let owner_handle = match owner_handle {
            Ok(handle) => handle,
            Err(error) => {
                let _ = shared.platform.unregister_notifications();
                return Err(DeviceError::Unexpected(format!(
                    "failed to spawn owner thread: {}",
                    error
                )));
            }
        };

        Ok(Self {
            shared,
            tasks,
            owner_handle: Mutex::new(Some(owner_handle)),
            closed: AtomicBool::new(false),
        })
    }

    pub fn set_delegate(&self, delegate: Arc<dyn RegistryDelegate>) {
        *self.shared.delegate.lock() = Some(delegate);
    }

    /// Snapshot of the collection, in discovery order.
    pub fn devices(&self) -> Vec<Arc<SafeDevice>> {
        self.shared.state.lock().devices.clone()
    }

    pub fn default_playback_device(&self) -> Option<Arc<SafeDevice>> {
        self.shared.state.lock().resolver.playback().cloned()
    }

    pub fn default_communication_device(&self) -> Option<Arc<SafeDevice>> {
        self.shared.state.lock().resolver.communications().cloned()
    }

    /// Ask the platform to make `device` the multimedia default.
    ///
    /// Fire-and-forget: no local mutation happens here. If the platform
    /// honors the request, the change arrives as a default-changed
    /// notification. Requesting the current default does nothing.
    pub fn set_default_playback_device(&self, device: &SafeDevice) {
        self.request_set_default(device, DeviceRole::Multimedia);
    }

    /// Communications-role counterpart of `set_default_playback_device`.
    pub fn set_default_communication_device(&self, device: &SafeDevice) {
        self.request_set_default(device, DeviceRole::Communications);
    }

    fn request_set_default(&self, device: &SafeDevice, role: DeviceRole) {
        let current = {
            let state = self.shared.state.lock();
            let selection = match role {
                DeviceRole::Multimedia => state.resolver.playback(),
                DeviceRole::Communications => state.resolver.communications(),
            };
            selection.map(|selected| selected.id().to_string())
        };
        if current.as_deref() == Some(device.id()) {
            return;
        }
        if let Err(error) = self
            .shared
            .default_service
            .request_set_default(device.id(), role)
        {
            log::warn!("set-default request for {} failed: {}", device.id(), error);
        }
    }

    /// Block until every task queued before this call has been processed.
    ///
    /// Must not be called from a `RegistryDelegate` callback: delegates run
    /// on the owner thread, and the rendezvous would wait on itself.
    pub fn flush(&self) {
        let (done, wait) = crossbeam_channel::bounded(1);
        if self.tasks.send(OwnerTask::Flush(done)).is_ok() {
            let _ = wait.recv();
        }
    }

    /// Tear down: unregister notifications exactly once and stop the owner
    /// thread. Idempotent; also runs on drop. Tasks already queued are
    /// processed, anything arriving later is dropped.
    ///
    /// Must not be called from a `RegistryDelegate` callback: the owner
    /// thread cannot join itself.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Err(error) = self.shared.platform.unregister_notifications() {
            log::warn!("failed to unregister device notifications: {}", error);
        }
        let _ = self.tasks.send(OwnerTask::Shutdown);
        if let Some(handle) = self.owner_handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DeviceRegistry {
    fn drop(&mut self) {
        self.close();
    }
}

fn owner_loop(shared: Arc<RegistryShared>, tasks: Receiver<OwnerTask>) {
    while let Ok(task) = tasks.recv() {
        match task {
            OwnerTask::Notification(notification) => shared.apply_notification(notification),
            OwnerTask::SessionCreated(session) => shared.forward_session(session),
            OwnerTask::Flush(done) => {
                let _ = done.send(());
            }
            OwnerTask::Shutdown => break,
        }
    }
}
