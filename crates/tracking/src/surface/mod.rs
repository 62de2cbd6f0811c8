//! Map surface collaborator.
//!
//! The host's map renders markers and circles and hands back handles to
//! them. Handle methods take `&self`; implementations are expected to use
//! interior mutability, as platform map handles do.

use livelocator_domain::{Color, GeoPoint, ResourceRef};
use std::sync::Arc;

/// Parameters of a new accuracy indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorOptions {
    /// Circle center.
    pub center: GeoPoint,
    /// Circle radius in meters.
    pub radius: f64,
    /// Fill colour.
    pub fill: Color,
    /// Outline colour.
    pub stroke: Color,
    /// Outline width in screen units.
    pub stroke_width: f32,
}

/// A marker drawn on the map.
pub trait MarkerHandle: Send + Sync {
    fn position(&self) -> GeoPoint;
    fn set_position(&self, position: GeoPoint);
    fn remove(&self);
}

/// A circle drawn on the map.
pub trait IndicatorHandle: Send + Sync {
    fn center(&self) -> GeoPoint;
    fn set_center(&self, center: GeoPoint);
    fn radius(&self) -> f64;
    fn set_radius(&self, radius: f64);
    fn remove(&self);
}

/// The rendering surface trackers draw on.
pub trait MapSurface: Send + Sync {
    /// Adds a marker and returns its handle.
    fn add_marker(
        &self,
        position: GeoPoint,
        icon: &ResourceRef,
        draggable: bool,
    ) -> Arc<dyn MarkerHandle>;

    /// Adds a circle and returns its handle.
    fn add_indicator(&self, options: IndicatorOptions) -> Arc<dyn IndicatorHandle>;

    /// Centers the camera on `target` at `zoom`.
    fn move_camera(&self, target: GeoPoint, zoom: f32);
}
