use crate::error::DomainResult;
use crate::value_objects::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default fill of the accuracy indicator, translucent blue.
pub const DEFAULT_FILL_COLOR: &str = "#3273b7ff";
/// Default outline of the accuracy indicator.
pub const DEFAULT_STROKE_COLOR: &str = "#4487f2";
/// Default marker icon resource.
pub const DEFAULT_MARKER_ICON: &str = "ic_current_location";

/// Opaque reference to a host-side drawable resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceRef(pub String);

impl ResourceRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a tracker draws the current location.
///
/// Built once and handed to the tracker by value; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Whether the accuracy indicator is drawn at all.
    pub show_accuracy_indicator: bool,
    /// Indicator fill.
    pub fill_color: Color,
    /// Indicator outline.
    pub stroke_color: Color,
    /// Icon of the location marker.
    pub marker_icon: ResourceRef,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            show_accuracy_indicator: true,
            fill_color: Color(0x3273_B7FF),
            stroke_color: Color(0xFF44_87F2),
            marker_icon: ResourceRef::new(DEFAULT_MARKER_ICON),
        }
    }
}

impl TrackerConfig {
    pub fn builder() -> TrackerConfigBuilder {
        TrackerConfigBuilder::default()
    }
}

/// Fluent builder for [`TrackerConfig`].
///
/// Colours are kept as strings until [`build`](Self::build) so a malformed
/// value fails there, before any tracker exists.
#[derive(Debug, Clone)]
pub struct TrackerConfigBuilder {
    show_accuracy_indicator: bool,
    fill_color: String,
    stroke_color: String,
    marker_icon: ResourceRef,
}

impl Default for TrackerConfigBuilder {
    fn default() -> Self {
        Self {
            show_accuracy_indicator: true,
            fill_color: DEFAULT_FILL_COLOR.to_string(),
            stroke_color: DEFAULT_STROKE_COLOR.to_string(),
            marker_icon: ResourceRef::new(DEFAULT_MARKER_ICON),
        }
    }
}

impl TrackerConfigBuilder {
    #[must_use]
    pub fn accuracy_indicator(mut self, show: bool) -> Self {
        self.show_accuracy_indicator = show;
        self
    }

    #[must_use]
    pub fn fill_color(mut self, hex: impl Into<String>) -> Self {
        self.fill_color = hex.into();
        self
    }

    #[must_use]
    pub fn stroke_color(mut self, hex: impl Into<String>) -> Self {
        self.stroke_color = hex.into();
        self
    }

    #[must_use]
    pub fn marker_icon(mut self, icon: impl Into<String>) -> Self {
        self.marker_icon = ResourceRef::new(icon);
        self
    }

    /// Parses the colours and yields the immutable configuration.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidColor`](crate::DomainError::InvalidColor)
    /// if either colour is malformed.
    pub fn build(self) -> DomainResult<TrackerConfig> {
        Ok(TrackerConfig {
            show_accuracy_indicator: self.show_accuracy_indicator,
            fill_color: Color::from_hex(&self.fill_color)?,
            stroke_color: Color::from_hex(&self.stroke_color)?,
            marker_icon: self.marker_icon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DomainError;

    #[test]
    fn test_builder_defaults_match_default() {
        let built = TrackerConfig::builder().build().unwrap();
        assert_eq!(built, TrackerConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = TrackerConfig::builder()
            .accuracy_indicator(false)
            .fill_color("#80ff0000")
            .stroke_color("#00ff00")
            .marker_icon("ic_pin")
            .build()
            .unwrap();

        assert!(!config.show_accuracy_indicator);
        assert_eq!(config.fill_color, Color(0x80FF_0000));
        assert_eq!(config.stroke_color, Color(0xFF00_FF00));
        assert_eq!(config.marker_icon.as_str(), "ic_pin");
    }

    #[test]
    fn test_builder_fails_fast_on_bad_colour() {
        let result = TrackerConfig::builder().stroke_color("red").build();
        assert_eq!(result, Err(DomainError::InvalidColor("red".to_string())));
    }
}
