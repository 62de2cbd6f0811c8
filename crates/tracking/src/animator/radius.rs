//! Step-wise radius animation toward an accuracy target.

use super::{AnimationHandle, runtime};
use crate::surface::IndicatorHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Distance from the target, in meters, within which the radius is left alone.
pub const STABILITY_WINDOW: i64 = 1;

/// Largest indicator radius in meters, about half the Earth's circumference.
pub const MAX_RADIUS_M: i64 = 20_000_000;

/// Gaps wider than this many meters are applied at once instead of stepped.
pub const MAX_ANIMATED_GAP_M: u64 = 1_000;

/// Bounds a radius to `0..=MAX_RADIUS_M`; NaN becomes zero.
pub fn clamp_radius(radius: f64) -> f64 {
    if radius.is_nan() {
        return 0.0;
    }
    radius.clamp(0.0, MAX_RADIUS_M as f64)
}

/// Rounds a radius to the nearest whole meter within `0..=MAX_RADIUS_M`.
pub fn snap_radius(radius: f64) -> i64 {
    clamp_radius(radius).round() as i64
}

/// Whether `current` is close enough to `target` to not animate at all.
pub fn is_converged(current: i64, target: i64) -> bool {
    current.abs_diff(target) <= STABILITY_WINDOW.unsigned_abs()
}

/// Pause between two one-meter steps, or `None` when converged.
///
/// `(1000 + delta) / delta` milliseconds: larger gaps step faster, and the
/// whole animation takes roughly one second regardless of the gap.
pub fn step_delay(current: i64, target: i64) -> Option<Duration> {
    if is_converged(current, target) {
        return None;
    }
    let delta = current.abs_diff(target);
    Some(Duration::from_millis((1000 + delta) / delta))
}

/// One meter closer to `target`.
pub fn next_radius(current: f64, target: i64) -> f64 {
    if current < target as f64 {
        current + 1.0
    } else {
        current - 1.0
    }
}

/// Moves an indicator's radius to a target one meter at a time.
#[derive(Debug, Clone, Default)]
pub struct RadiusAnimator {
    runtime: Option<Handle>,
}

impl RadiusAnimator {
    /// Animator spawning on the runtime `animate` is called from.
    pub fn new() -> Self {
        Self::default()
    }

    /// Animator spawning on a specific runtime, such as the host's UI thread
    /// executor.
    pub fn on(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }

    /// Starts animating `indicator` toward `target` meters.
    ///
    /// The radius is first snapped to a whole meter and `target` is bounded
    /// to `0..=MAX_RADIUS_M`. Returns `None` when the snapped radius is
    /// already within [`STABILITY_WINDOW`] of the target; nothing is
    /// scheduled then. A gap wider than [`MAX_ANIMATED_GAP_M`] is applied at
    /// once, also returning `None`. Otherwise the first step is taken right
    /// away and every further one after [`step_delay`], until the target is
    /// reached or `token` is cancelled.
    pub fn animate(
        &self,
        indicator: Arc<dyn IndicatorHandle>,
        target: i64,
        token: CancellationToken,
    ) -> Option<AnimationHandle> {
        let target = target.clamp(0, MAX_RADIUS_M);
        let current = snap_radius(indicator.radius());
        indicator.set_radius(current as f64);

        let delay = step_delay(current, target)?;

        if current.abs_diff(target) > MAX_ANIMATED_GAP_M {
            debug!(from = current, to = target, "Radius gap too wide, jumping to target");
            indicator.set_radius(target as f64);
            return None;
        }

        let Some(runtime) = runtime(&self.runtime) else {
            warn!(target, "No runtime to animate on, jumping to target radius");
            indicator.set_radius(target as f64);
            return None;
        };

        debug!(
            from = current,
            to = target,
            step_ms = delay.as_millis() as u64,
            "Animating indicator radius"
        );
        let task = runtime.spawn(step_toward(indicator, target, delay, token.clone()));
        Some(AnimationHandle::new(token, task))
    }
}

async fn step_toward(
    indicator: Arc<dyn IndicatorHandle>,
    target: i64,
    delay: Duration,
    token: CancellationToken,
) {
    loop {
        if token.is_cancelled() {
            return;
        }

        let current = indicator.radius();
        let mut radius = next_radius(current, target);
        if radius == current || !radius.is_finite() {
            radius = target as f64;
        }
        indicator.set_radius(radius);
        if snap_radius(radius) == target {
            debug!(radius, "Indicator radius reached target");
            return;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
