//! # audio-registry-core
//!
//! Platform-agnostic audio endpoint registry core library.
//!
//! Maintains a live, UI-consumable view of a host's render (playback)
//! endpoints, tracking the default endpoint for the multimedia and
//! communications roles and absorbing the failures of endpoints removed
//! mid-use. Platform backends (Windows MMDevice) implement the
//! `AudioPlatform` trait family and plug into the generic `DeviceRegistry`.
//!
//! ## Architecture
//!
//! ```text
//! audio-registry-core (this crate)
//! ├── traits/     ← AudioPlatform, AudioEndpoint, NotificationClient,
//! │                 RegistryDelegate, DefaultEndpointService, AudioSession
//! ├── models/     ← DeviceError, DataFlow, DeviceRole, DeviceState, DeviceNotification
//! ├── proxy/      ← SafeDevice (invalidation-absorbing wrapper)
//! ├── registry/   ← DeviceRegistry, default-role resolution, notification bridge
//! └── mock/       ← scriptable platform for hardware-free tests
//! ```

pub mod mock;
pub mod models;
pub mod proxy;
pub mod registry;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::device_models::{DataFlow, DeviceNotification, DeviceRole, DeviceState};
pub use models::error::DeviceError;
pub use proxy::safe_device::SafeDevice;
pub use registry::device_registry::DeviceRegistry;
pub use traits::audio_endpoint::{AudioEndpoint, PropertyChangedCallback};
pub use traits::audio_platform::{AudioPlatform, SessionSink};
pub use traits::audio_session::AudioSession;
pub use traits::default_endpoint_service::DefaultEndpointService;
pub use traits::notification_client::NotificationClient;
pub use traits::registry_delegate::RegistryDelegate;
