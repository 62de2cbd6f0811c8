//! Endless "pulse" animation of an indicator.

use super::{AnimationHandle, runtime};
use crate::surface::IndicatorHandle;
use std::f64::consts::PI;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Eases in and out: slow at both ends, fastest mid-way.
pub fn accelerate_decelerate(t: f64) -> f64 {
    ((t + 1.0) * PI).cos() / 2.0 + 0.5
}

/// Repeatedly grows an indicator from zero to `max_radius` over `period`.
#[derive(Debug, Clone)]
pub struct PulseAnimator {
    runtime: Option<Handle>,
    /// Radius at the end of each period, in meters.
    pub max_radius: f64,
    /// Length of one pulse.
    pub period: Duration,
    /// Time between two radius updates.
    pub frame: Duration,
}

impl Default for PulseAnimator {
    fn default() -> Self {
        Self {
            runtime: None,
            max_radius: 100.0,
            period: Duration::from_secs(1),
            frame: Duration::from_millis(16),
        }
    }
}

impl PulseAnimator {
    pub fn new(max_radius: f64, period: Duration) -> Self {
        Self {
            max_radius,
            period,
            ..Self::default()
        }
    }

    /// Spawns on `runtime` instead of the caller's runtime.
    #[must_use]
    pub fn on(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Radius `elapsed` into the animation.
    pub fn radius_at(&self, elapsed: Duration) -> f64 {
        let period = self.period.as_secs_f64();
        if period <= 0.0 {
            return self.max_radius;
        }
        let fraction = (elapsed.as_secs_f64() % period) / period;
        accelerate_decelerate(fraction) * self.max_radius
    }

    /// Starts pulsing until `token` is cancelled.
    ///
    /// Returns `None` if there is no runtime to run on or the period is zero.
    pub fn start(
        &self,
        indicator: Arc<dyn IndicatorHandle>,
        token: CancellationToken,
    ) -> Option<AnimationHandle> {
        if self.period.is_zero() {
            warn!("Pulse period is zero, not animating");
            return None;
        }
        let Some(runtime) = runtime(&self.runtime) else {
            warn!("No runtime to pulse on");
            return None;
        };

        debug!(
            max_radius = self.max_radius,
            period_ms = self.period.as_millis() as u64,
            "Pulsing indicator"
        );
        let pulse = self.clone();
        let task = runtime.spawn(pulse.run(indicator, token.clone()));
        Some(AnimationHandle::new(token, task))
    }

    async fn run(self, indicator: Arc<dyn IndicatorHandle>, token: CancellationToken) {
        let started = Instant::now();
        let mut frames = tokio::time::interval(self.frame.max(Duration::from_millis(1)));

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = frames.tick() => {}
            }
            if token.is_cancelled() {
                return;
            }
            indicator.set_radius(self.radius_at(started.elapsed()));
        }
    }
}
