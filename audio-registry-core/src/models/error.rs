use thiserror::Error;

/// Classified outcome of a failed native audio call.
///
/// Backends map raw platform errors into these classes at the call boundary;
/// call sites apply policy (normalize, absorb, or log) based on the class.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeviceError {
    /// The requested element does not exist. For default-endpoint queries
    /// this is a valid terminal outcome, not a failure.
    #[error("device not found")]
    NotFound,

    /// The handle refers to an endpoint that has been removed or disabled.
    #[error("device invalidated")]
    Invalidated,

    /// Any other native failure. Logged, never retried, never surfaced
    /// through the public registry API.
    #[error("unexpected device error: {0}")]
    Unexpected(String),
}

impl DeviceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    pub fn is_invalidated(&self) -> bool {
        matches!(self, Self::Invalidated)
    }
}
