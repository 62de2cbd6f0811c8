//! Live location tracking on a map surface.
//!
//! A [`LiveLocationTracker`] keeps one marker and, optionally, one accuracy
//! indicator in sync with incoming fixes:
//! - the first fix places both and centers the camera
//! - later fixes move them when the point changed, animating the radius
//! - `stop` removes both and ends any owned provider subscription

mod locator;

pub use locator::*;
