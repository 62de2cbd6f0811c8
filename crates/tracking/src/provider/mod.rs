//! Location stream provider.
//!
//! Wraps a [`LocationSource`](crate::source::LocationSource) connect/request
//! handshake behind a start/stop lifecycle:
//! - validates configuration before anything connects
//! - delivers the cached last-known fix right after connecting
//! - forwards pushed fixes to a [`LocationListener`]
//! - stops itself on connection failure or suspension, without retrying

mod fused;

pub use fused::*;
