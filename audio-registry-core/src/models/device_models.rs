use serde::{Deserialize, Serialize};

/// Direction of an audio endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataFlow {
    Render,
    Capture,
}

/// Role a default endpoint is assigned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRole {
    /// Music, media, games. The role UI surfaces as "playback".
    Multimedia,
    /// Voice chat and telephony.
    Communications,
}

/// Native endpoint state as reported by state-change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceState {
    Active,
    Disabled,
    NotPresent,
    Unplugged,
    /// A state value outside the known vocabulary, kept raw for logging.
    Other(u32),
}

/// One native notification, as queued for the owner thread.
///
/// Notifications are transient: consumed once, in arrival order, never
/// stored. Payload ids are opaque endpoint identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceNotification {
    Added {
        device_id: String,
    },
    Removed {
        device_id: String,
    },
    StateChanged {
        device_id: String,
        state: DeviceState,
    },
    DefaultChanged {
        flow: DataFlow,
        role: DeviceRole,
        device_id: Option<String>,
    },
    PropertyChanged {
        device_id: String,
        key: String,
    },
}
