//! Scriptable audio platform for testing without hardware.
//!
//! The mocks implement every native-seam trait so the registry, resolver,
//! and proxy can be driven end to end from tests (or from a downstream
//! crate's CI) with no audio subsystem present: endpoints appear, vanish,
//! invalidate, change state, and raise property/session events entirely
//! under script control.

pub mod endpoint;
pub mod platform;

pub use endpoint::{MockEndpoint, MockSession};
pub use platform::{MockDefaultService, MockPlatform};
