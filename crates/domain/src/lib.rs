//! Domain types for live location tracking.
//!
//! This crate holds the pure, platform-independent pieces:
//! - Geographic points and reported location fixes
//! - ARGB colours parsed from hex strings
//! - Provider and tracker configuration
//! - Coordinate utilities (equality, midpoint, distance)

/// Enumerations shared across the workspace.
pub mod enums;
/// Domain errors.
pub mod error;
/// Reported location samples.
pub mod entities;
/// Coordinate math.
pub mod math;
/// Immutable value objects.
pub mod value_objects;

pub use entities::fix::Fix;
pub use enums::ProviderPriority;
pub use error::{DomainError, DomainResult};
pub use math::coordinates::{distance_m, midpoint, points_equal};
pub use value_objects::color::Color;
pub use value_objects::geo_point::GeoPoint;
pub use value_objects::provider_config::ProviderConfig;
pub use value_objects::tracker_config::{ResourceRef, TrackerConfig, TrackerConfigBuilder};
