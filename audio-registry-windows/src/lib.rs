//! # audio-registry-windows
//!
//! Windows MMDevice backend for audio-registry-core.
//!
//! Provides:
//! - `MmDevicePlatform` — Endpoint enumeration, default lookup, and device notifications via the MMDevice API
//! - `MmDeviceEndpoint` — Per-endpoint volume, mute, and peak metering via WASAPI endpoint interfaces
//! - `PolicyConfigService` — Default-endpoint reassignment via the shell's `IPolicyConfig`
//!
//! ## Platform Requirements
//! - Windows 7+ for `IPolicyConfig`; the MMDevice API itself is Vista+
//! - COM initialized in the multithreaded apartment before constructing either service
//!
//! ## Usage
//! ```ignore
//! use audio_registry_core::DeviceRegistry;
//! use audio_registry_windows::{MmDevicePlatform, PolicyConfigService};
//! use std::sync::Arc;
//!
//! let platform = Arc::new(MmDevicePlatform::new().unwrap());
//! let policy = Arc::new(PolicyConfigService::new().unwrap());
//! let registry = DeviceRegistry::new(platform, policy).unwrap();
//! ```

#[cfg(target_os = "windows")]
pub mod endpoint;
#[cfg(target_os = "windows")]
mod notification_client;
#[cfg(target_os = "windows")]
pub mod platform;
#[cfg(target_os = "windows")]
pub mod policy;

#[cfg(target_os = "windows")]
pub use endpoint::MmDeviceEndpoint;
#[cfg(target_os = "windows")]
pub use platform::MmDevicePlatform;
#[cfg(target_os = "windows")]
pub use policy::PolicyConfigService;
