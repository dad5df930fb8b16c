pub mod audio_endpoint;
pub mod audio_platform;
pub mod audio_session;
pub mod default_endpoint_service;
pub mod notification_client;
pub mod registry_delegate;
