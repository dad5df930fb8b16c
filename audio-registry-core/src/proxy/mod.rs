pub mod safe_device;
