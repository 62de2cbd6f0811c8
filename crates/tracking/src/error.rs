//! Errors raised by location providers and their collaborators.

use livelocator_domain::DomainError;
use thiserror::Error;

/// Result alias for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors surfaced by [`FusedLocationProvider`](crate::provider::FusedLocationProvider).
///
/// The first three are returned synchronously from `configure`/`start`. The
/// last two happen on the delivery task and only ever reach the listener's
/// `on_provider_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Malformed quality-of-service configuration.
    #[error("invalid provider configuration: {0}")]
    InvalidConfig(#[from] DomainError),

    /// No location source or no async runtime to run on.
    #[error("no execution context bound to the provider")]
    MissingContext,

    /// No listener to deliver fixes to.
    #[error("no location listener registered")]
    MissingCallback,

    /// The platform location service refused the connection.
    #[error("connection to location service failed: {0}")]
    ConnectionFailure(String),

    /// The connection dropped mid-stream.
    #[error("connection to location service suspended (cause {0})")]
    TransientSuspension(i32),
}

/// Error reported by a [`LocationSource`](crate::source::LocationSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct SourceError(pub String);

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
