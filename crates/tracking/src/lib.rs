//! Live location tracking on a map surface.
//!
//! This crate drives a marker and an accuracy circle from a stream of
//! location fixes:
//! - A fused provider that turns a push-based location source into
//!   start/stop listener callbacks
//! - Radius and pulse animations for the accuracy indicator
//! - The tracker state machine that reconciles fixes with the map
//! - In-memory map and source implementations for hosts without a platform
//!   map, and for tests

/// Prelude module for convenient imports.
pub mod prelude;

/// Indicator animations.
pub mod animator;
/// Provider and source errors.
pub mod error;
/// In-memory collaborators.
pub mod memory;
/// Fused location provider.
pub mod provider;
/// Location source collaborator.
pub mod source;
/// Map surface collaborator.
pub mod surface;
/// Live location tracker.
pub mod tracker;
