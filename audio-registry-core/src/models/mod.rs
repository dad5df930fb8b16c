pub mod device_models;
pub mod error;
