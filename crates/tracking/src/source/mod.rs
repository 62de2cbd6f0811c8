//! Location stream collaborator.
//!
//! A [`LocationSource`] is the platform side of a fused location provider:
//! it connects, pushes [`SourceEvent`]s through a channel once updates are
//! requested, and can report the most recent cached fix.
//!
//! Connection outcomes map onto the platform callbacks as follows:
//! - `connect()` returning `Ok` is "connected"
//! - `connect()` returning `Err` is "connection failed"
//! - a [`SourceEvent::Suspended`] on the stream, or the stream closing, is
//!   "connection suspended"

use crate::error::SourceError;
use async_trait::async_trait;
use livelocator_domain::{Fix, ProviderConfig};
use tokio::sync::mpsc;

/// Event pushed by a location source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A new location sample.
    Fix(Fix),
    /// The connection was suspended, with the platform's cause code.
    Suspended(i32),
}

/// Push-based platform location service.
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Connects to the location service.
    async fn connect(&self) -> Result<(), SourceError>;

    /// Starts updates at the requested quality of service.
    async fn request_updates(
        &self,
        config: &ProviderConfig,
    ) -> Result<mpsc::Receiver<SourceEvent>, SourceError>;

    /// Stops updates previously requested. Must tolerate being called when
    /// nothing is requested.
    async fn remove_updates(&self);

    /// The most recent fix known to the service, if any.
    async fn last_known_fix(&self) -> Option<Fix>;

    /// Disconnects from the location service.
    async fn disconnect(&self);
}
