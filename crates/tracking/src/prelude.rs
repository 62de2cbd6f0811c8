//! Prelude module for convenient imports.
//!
//! # Example
//!
//! ```rust
//! use livelocator_tracking::prelude::*;
//! ```

// Animator
pub use crate::animator::{AnimationHandle, PulseAnimator, RadiusAnimator, STABILITY_WINDOW};

// Errors
pub use crate::error::{ProviderError, ProviderResult, SourceError};

// Memory
pub use crate::memory::{MapEvent, MemoryMap, RandomWalk, ScriptedLocationSource, SourceStatus};

// Provider
pub use crate::provider::{FusedLocationProvider, LocationListener, ProviderHandle};

// Source
pub use crate::source::{LocationSource, SourceEvent};

// Surface
pub use crate::surface::{IndicatorHandle, IndicatorOptions, MapSurface, MarkerHandle};

// Tracker
pub use crate::tracker::{LiveLocationTracker, TrackerPhase};

// Domain
pub use livelocator_domain::{
    Color, Fix, GeoPoint, ProviderConfig, ProviderPriority, ResourceRef, TrackerConfig,
    distance_m, midpoint, points_equal,
};
