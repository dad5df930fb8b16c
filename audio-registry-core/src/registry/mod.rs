pub(crate) mod bridge;
pub mod device_registry;
pub(crate) mod resolver;
