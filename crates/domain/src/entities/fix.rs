use crate::math::coordinates::{distance_m, points_equal};
use crate::value_objects::geo_point::GeoPoint;
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// A single location sample reported by a location stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub point: GeoPoint,
    /// Estimated horizontal accuracy radius, in meters.
    pub accuracy_m: f32,
    /// Unix time of the sample, in milliseconds.
    #[serde(default)]
    pub timestamp_ms: i64,
    /// Name of the source that produced the sample (`fused`, `gps`, ...).
    #[serde(default)]
    pub provider: String,
    /// Ground speed in meters per second.
    #[serde(default)]
    pub speed: f32,
}

impl Fix {
    pub fn new(point: GeoPoint, accuracy_m: f32) -> Self {
        Self {
            point,
            accuracy_m,
            timestamp_ms: 0,
            provider: String::new(),
            speed: 0.0,
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = timestamp_ms;
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Whether both fixes report exactly the same coordinates.
    pub fn same_point(&self, other: &Fix) -> bool {
        points_equal(self.point, other.point)
    }

    /// Distance to another fix in meters.
    pub fn distance_to(&self, other: &Fix) -> f64 {
        distance_m(self.point, other.point)
    }

    /// One-line summary for logs.
    ///
    /// When `recent` is given the distance from it is appended.
    pub fn describe(&self, recent: Option<&Fix>) -> String {
        let time = DateTime::from_timestamp_millis(self.timestamp_ms)
            .map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
            .unwrap_or_else(|| self.timestamp_ms.to_string());

        let mut line = format!(
            "Accuracy: {}|Speed: {}|LatLng: {}|Time: {}|Provider: {}",
            self.accuracy_m,
            self.speed,
            self.point,
            time,
            self.provider.to_uppercase()
        );
        if let Some(recent) = recent {
            line.push_str(&format!("|Distance: {:.2}", self.distance_to(recent)));
        }
        line
    }
}
