//! Random walk fix generator.

use livelocator_domain::{Fix, GeoPoint};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal, NormalError};

/// Meters per degree of latitude.
const METERS_PER_DEGREE: f64 = 111_320.0;

/// Generates a walk of fixes around a start point.
///
/// Each step moves by a Gaussian offset in meters on both axes. Accuracy is
/// drawn independently per fix and clamped to at least one meter.
pub struct RandomWalk {
    pub start: GeoPoint,
    pub start_time_ms: i64,
    pub interval_ms: i64,
    step: Normal<f64>,
    accuracy: Normal<f32>,
    seed: Option<u64>,
}

impl RandomWalk {
    /// # Errors
    /// Returns an error if either standard deviation is not finite.
    pub fn new(
        start: GeoPoint,
        step_sigma_m: f64,
        accuracy_mean_m: f32,
        accuracy_sigma_m: f32,
    ) -> Result<Self, NormalError> {
        Ok(Self {
            start,
            start_time_ms: 0,
            interval_ms: 1_000,
            step: Normal::new(0.0, step_sigma_m.abs())?,
            accuracy: Normal::new(accuracy_mean_m, accuracy_sigma_m.abs())?,
            seed: None,
        })
    }

    /// Makes the walk reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_timing(mut self, start_time_ms: i64, interval_ms: i64) -> Self {
        self.start_time_ms = start_time_ms;
        self.interval_ms = interval_ms;
        self
    }

    pub fn generate(&self, steps: usize) -> Vec<Fix> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let mut fixes = Vec::with_capacity(steps);
        let mut point = self.start;
        let mut timestamp = self.start_time_ms;

        for i in 0..steps {
            if i > 0 {
                let north = self.step.sample(&mut rng);
                let east = self.step.sample(&mut rng);
                let lon_scale = (METERS_PER_DEGREE * point.latitude.to_radians().cos()).max(1.0);
                point = GeoPoint::new(
                    (point.latitude + north / METERS_PER_DEGREE).clamp(-90.0, 90.0),
                    point.longitude + east / lon_scale,
                );
                timestamp += self.interval_ms;
            }
            let accuracy = self.accuracy.sample(&mut rng).max(1.0);
            fixes.push(
                Fix::new(point, accuracy)
                    .with_timestamp(timestamp)
                    .with_provider("fused"),
            );
        }

        fixes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_walk_starts_at_start() {
        let start = GeoPoint::new(26.4498954, 74.6399163);
        let walk = RandomWalk::new(start, 5.0, 15.0, 5.0).unwrap().with_seed(7);
        let fixes = walk.generate(20);

        assert_eq!(fixes.len(), 20);
        assert_eq!(fixes[0].point, start);
        assert!(fixes.iter().all(|f| f.accuracy_m >= 1.0));
        assert!(fixes.windows(2).all(|w| w[1].timestamp_ms - w[0].timestamp_ms == 1_000));
    }

    #[test]
    fn test_seeded_walk_is_reproducible() {
        let start = GeoPoint::new(28.0, 77.0);
        let a = RandomWalk::new(start, 5.0, 15.0, 5.0).unwrap().with_seed(42);
        let b = RandomWalk::new(start, 5.0, 15.0, 5.0).unwrap().with_seed(42);
        assert_eq!(a.generate(10), b.generate(10));
    }

    #[test]
    fn test_zero_sigma_stays_put() {
        let start = GeoPoint::new(28.0, 77.0);
        let walk = RandomWalk::new(start, 0.0, 10.0, 0.0).unwrap().with_seed(1);
        assert!(walk.generate(5).iter().all(|f| f.point == start && f.accuracy_m == 10.0));
    }

    #[test]
    fn test_non_finite_sigma_is_rejected() {
        let start = GeoPoint::new(28.0, 77.0);
        assert!(RandomWalk::new(start, f64::NAN, 10.0, 1.0).is_err());
    }
}
