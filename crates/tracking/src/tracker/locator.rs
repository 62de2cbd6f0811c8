//! The tracker state machine.

use crate::animator::{AnimationHandle, PulseAnimator, RadiusAnimator, clamp_radius, snap_radius};
use crate::error::{ProviderError, ProviderResult};
use crate::provider::{FusedLocationProvider, LocationListener, ProviderHandle};
use crate::source::LocationSource;
use crate::surface::{IndicatorHandle, IndicatorOptions, MapSurface, MarkerHandle};
use async_trait::async_trait;
use livelocator_domain::{Fix, ProviderConfig, TrackerConfig};
use std::sync::{Arc, Weak};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Camera zoom used when the first fix arrives.
pub const TRACKING_ZOOM: f32 = 15.0;
/// Outline width of the accuracy indicator.
pub const ACCURACY_STROKE_WIDTH: f32 = 0.8;
/// Update interval requested by [`LiveLocationTracker::locate_me`].
pub const LOCATE_ME_INTERVAL_MS: u64 = 5_000;

/// Where a tracker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// No fix accepted since creation or the last stop.
    NoMarker,
    /// Marker (and indicator, if enabled) on the map.
    Tracking,
}

/// Everything the tracker mutates, guarded by one lock.
struct TrackerState {
    marker: Option<Arc<dyn MarkerHandle>>,
    indicator: Option<Arc<dyn IndicatorHandle>>,
    last_fix: Option<Fix>,
    animation: Option<AnimationHandle>,
    /// Parent of every animation token; cancelled on stop.
    cancel: CancellationToken,
}

impl TrackerState {
    fn new() -> Self {
        Self {
            marker: None,
            indicator: None,
            last_fix: None,
            animation: None,
            cancel: CancellationToken::new(),
        }
    }

    async fn cancel_animation(&mut self) {
        if let Some(animation) = self.animation.take() {
            animation.cancel().await;
        }
    }
}

/// Shows the current location on a map as a marker plus accuracy circle.
///
/// Calls are serialized through an internal lock, so fixes can arrive from a
/// provider task while the host calls `locate` or `stop` directly. Several
/// trackers may share one map; each only touches the overlays it created.
pub struct LiveLocationTracker {
    id: Uuid,
    map: Arc<dyn MapSurface>,
    config: TrackerConfig,
    animator: RadiusAnimator,
    state: Mutex<TrackerState>,
    provider: Mutex<Option<ProviderHandle>>,
}

impl LiveLocationTracker {
    /// Creates a tracker drawing on `map`.
    pub fn new(map: Arc<dyn MapSurface>, config: TrackerConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            map,
            config,
            animator: RadiusAnimator::new(),
            state: Mutex::new(TrackerState::new()),
            provider: Mutex::new(None),
        }
    }

    /// Uses `animator` for radius changes instead of the default one.
    #[must_use]
    pub fn with_animator(mut self, animator: RadiusAnimator) -> Self {
        self.animator = animator;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub async fn phase(&self) -> TrackerPhase {
        if self.state.lock().await.marker.is_some() {
            TrackerPhase::Tracking
        } else {
            TrackerPhase::NoMarker
        }
    }

    /// The most recently accepted fix.
    pub async fn last_fix(&self) -> Option<Fix> {
        self.state.lock().await.last_fix.clone()
    }

    /// Whether an indicator animation is still running.
    pub async fn is_animating(&self) -> bool {
        self.state
            .lock()
            .await
            .animation
            .as_ref()
            .is_some_and(|animation| !animation.is_finished())
    }

    /// Applies a fix to the map.
    ///
    /// `None` is ignored. The first fix places the marker and indicator and
    /// centers the camera. Later fixes move them only if the point changed,
    /// and then animate the indicator toward the new accuracy. The fix is
    /// remembered either way.
    pub async fn locate(&self, fix: impl Into<Option<Fix>>) {
        let Some(fix) = fix.into() else {
            debug!(tracker = %self.id, "Ignoring empty fix");
            return;
        };

        let mut state = self.state.lock().await;
        debug!(
            tracker = %self.id,
            fix = %fix.describe(state.last_fix.as_ref()),
            "Locating"
        );

        match state.marker.clone() {
            None => self.place(&mut state, &fix),
            Some(marker) => {
                let moved = state
                    .last_fix
                    .as_ref()
                    .is_none_or(|last| !last.same_point(&fix));

                if moved {
                    marker.set_position(fix.point);
                    if let Some(indicator) = state.indicator.clone() {
                        indicator.set_center(fix.point);
                        let target = snap_radius(f64::from(fix.accuracy_m));
                        state.cancel_animation().await;
                        let token = state.cancel.child_token();
                        state.animation = self.animator.animate(indicator, target, token);
                    }
                }
            }
        }

        state.last_fix = Some(fix);
    }

    /// Draws the first marker and indicator and centers the camera.
    fn place(&self, state: &mut TrackerState, fix: &Fix) {
        state.marker = Some(
            self.map
                .add_marker(fix.point, &self.config.marker_icon, true),
        );

        if self.config.show_accuracy_indicator {
            state.indicator = Some(self.map.add_indicator(IndicatorOptions {
                center: fix.point,
                radius: clamp_radius(f64::from(fix.accuracy_m)),
                fill: self.config.fill_color,
                stroke: self.config.stroke_color,
                stroke_width: ACCURACY_STROKE_WIDTH,
            }));
        }

        self.map.move_camera(fix.point, TRACKING_ZOOM);

        info!(
            tracker = %self.id,
            lat = fix.point.latitude,
            lon = fix.point.longitude,
            accuracy = fix.accuracy_m,
            "Tracking started"
        );
    }

    /// Replaces any radius animation with an endless pulse.
    ///
    /// Returns false if there is no indicator to pulse. The next moving fix
    /// or [`stop`](Self::stop) ends the pulse.
    pub async fn pulse(&self, pulse: &PulseAnimator) -> bool {
        let mut state = self.state.lock().await;
        let Some(indicator) = state.indicator.clone() else {
            return false;
        };
        state.cancel_animation().await;
        let token = state.cancel.child_token();
        state.animation = pulse.start(indicator, token);
        state.animation.is_some()
    }

    /// Removes the marker and indicator and stops the owned provider.
    ///
    /// Idempotent. When it returns, no provider delivery and no animation
    /// tick is in progress or will follow.
    pub async fn stop(&self) {
        let provider = self.provider.lock().await.take();
        if let Some(provider) = provider {
            provider.stop().await;
        }

        let mut state = self.state.lock().await;
        state.cancel.cancel();
        state.cancel_animation().await;

        let had_marker = state.marker.is_some();
        if let Some(indicator) = state.indicator.take() {
            indicator.remove();
        }
        if let Some(marker) = state.marker.take() {
            marker.remove();
        }
        state.last_fix = None;
        state.cancel = CancellationToken::new();

        if had_marker {
            info!(tracker = %self.id, "Tracking stopped");
        }
    }

    /// Tracks the device location from `source`.
    ///
    /// Starts a provider at high accuracy with a five second interval whose
    /// fixes feed [`locate`](Self::locate). The returned handle stops only
    /// the provider; [`stop`](Self::stop) stops it too. A previous
    /// `locate_me` subscription is stopped first.
    ///
    /// # Errors
    /// Whatever [`FusedLocationProvider::start`] returns.
    pub async fn locate_me(
        self: &Arc<Self>,
        source: Arc<dyn LocationSource>,
    ) -> ProviderResult<ProviderHandle> {
        let listener = Arc::new(TrackerListener {
            tracker: Arc::downgrade(self),
        });

        let mut provider = FusedLocationProvider::new()
            .with_source(source)
            .with_listener(listener)
            .with_config(ProviderConfig::high_accuracy(LOCATE_ME_INTERVAL_MS));

        let mut owned = self.provider.lock().await;
        if let Some(previous) = owned.take() {
            previous.stop().await;
        }
        let handle = provider.start().await?;
        *owned = Some(handle.clone());

        info!(tracker = %self.id, "Locating device");
        Ok(handle)
    }
}

#[async_trait]
impl LocationListener for LiveLocationTracker {
    async fn on_location_changed(&self, fix: Option<Fix>) {
        self.locate(fix).await;
    }

    async fn on_provider_error(&self, error: &ProviderError) {
        warn!(tracker = %self.id, error = %error, "Location updates ended");
    }
}

/// Listener that does not keep its tracker alive.
struct TrackerListener {
    tracker: Weak<LiveLocationTracker>,
}

#[async_trait]
impl LocationListener for TrackerListener {
    async fn on_location_changed(&self, fix: Option<Fix>) {
        if let Some(tracker) = self.tracker.upgrade() {
            tracker.locate(fix).await;
        }
    }

    async fn on_provider_error(&self, error: &ProviderError) {
        if let Some(tracker) = self.tracker.upgrade() {
            tracker.on_provider_error(error).await;
        }
    }
}
