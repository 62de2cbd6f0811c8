//! Fused location provider.

use crate::error::{ProviderError, ProviderResult};
use crate::source::{LocationSource, SourceEvent};
use async_trait::async_trait;
use livelocator_domain::{Fix, ProviderConfig, ProviderPriority};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Cause reported when the source closes its stream without saying why.
pub const CAUSE_STREAM_CLOSED: i32 = 0;

/// Receives fixes from a running provider.
#[async_trait]
pub trait LocationListener: Send + Sync {
    /// Called for every delivered fix.
    ///
    /// The cached fix delivered right after connecting may be `None`.
    async fn on_location_changed(&self, fix: Option<Fix>);

    /// Called once when the provider stopped itself because of a failure.
    async fn on_provider_error(&self, _error: &ProviderError) {}
}

/// State shared between a [`ProviderHandle`] and its delivery task.
struct Subscription {
    config: ProviderConfig,
    cancel: CancellationToken,
    active: AtomicBool,
    /// Held for the whole duration of every listener call.
    delivery: Mutex<()>,
    /// Held by `stop` while it awaits the delivery task.
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl Subscription {
    /// Runs `call` unless the subscription was cancelled.
    ///
    /// Returns false if it was cancelled and nothing was delivered.
    async fn deliver<F>(&self, call: F) -> bool
    where
        F: std::future::Future<Output = ()>,
    {
        let _guard = self.delivery.lock().await;
        if self.cancel.is_cancelled() {
            return false;
        }
        call.await;
        true
    }

    /// Connects, then forwards events until cancelled or failed.
    async fn stream(
        &self,
        source: &dyn LocationSource,
        listener: &dyn LocationListener,
    ) -> ProviderResult<()> {
        let connected = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(()),
            result = source.connect() => result,
        };
        connected.map_err(|e| ProviderError::ConnectionFailure(e.to_string()))?;
        debug!("Location source connected");

        let requested = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Ok(()),
            result = source.request_updates(&self.config) => result,
        };
        let mut updates: mpsc::Receiver<SourceEvent> =
            requested.map_err(|e| ProviderError::ConnectionFailure(e.to_string()))?;

        let cached = source.last_known_fix().await;
        if !self.deliver(listener.on_location_changed(cached)).await {
            return Ok(());
        }

        loop {
            let event = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Ok(()),
                event = updates.recv() => event,
            };

            match event {
                Some(SourceEvent::Fix(fix)) => {
                    debug!(
                        lat = fix.point.latitude,
                        lon = fix.point.longitude,
                        accuracy = fix.accuracy_m,
                        "Delivering fix"
                    );
                    if !self.deliver(listener.on_location_changed(Some(fix))).await {
                        return Ok(());
                    }
                }
                Some(SourceEvent::Suspended(cause)) => {
                    return Err(ProviderError::TransientSuspension(cause));
                }
                None => return Err(ProviderError::TransientSuspension(CAUSE_STREAM_CLOSED)),
            }
        }
    }

    /// Delivery task body: stream, then always tear the connection down.
    async fn run(
        self: Arc<Self>,
        source: Arc<dyn LocationSource>,
        listener: Arc<dyn LocationListener>,
    ) {
        let outcome = self.stream(source.as_ref(), listener.as_ref()).await;

        source.remove_updates().await;
        source.disconnect().await;

        match outcome {
            Ok(()) => {
                self.active.store(false, Ordering::SeqCst);
                info!("Location provider stopped");
            }
            Err(error) => {
                match &error {
                    ProviderError::TransientSuspension(cause) => {
                        warn!(cause = *cause, "Location connection suspended, stopping provider");
                    }
                    other => error!(error = %other, "Location connection failed, stopping provider"),
                }
                self.deliver(listener.on_provider_error(&error)).await;
                self.cancel.cancel();
                self.active.store(false, Ordering::SeqCst);
            }
        }
    }
}

/// Handle to a running provider subscription.
///
/// Cheap to clone; every clone controls the same subscription.
#[derive(Clone)]
pub struct ProviderHandle {
    inner: Arc<Subscription>,
}

impl ProviderHandle {
    /// Stops the subscription and waits for the connection teardown.
    ///
    /// Idempotent. Concurrent callers all return only after the teardown
    /// finished. Once this returns no listener call is running and none
    /// will start. Must not be awaited from inside the listener's own
    /// callbacks; use [`cancel`](Self::cancel) there.
    pub async fn stop(&self) {
        self.inner.cancel.cancel();
        drop(self.inner.delivery.lock().await);

        let mut driver = self.inner.driver.lock().await;
        if let Some(task) = driver.take()
            && let Err(e) = task.await
            && e.is_panic()
        {
            error!(error = %e, "Location delivery task panicked");
        }
        self.inner.active.store(false, Ordering::SeqCst);
    }

    /// Signals the subscription to stop without waiting.
    pub fn cancel(&self) {
        self.inner.cancel.cancel();
    }

    /// True until the subscription stopped, by request or by failure.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Configuration the subscription was started with.
    pub fn config(&self) -> ProviderConfig {
        self.inner.config
    }
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("config", &self.inner.config)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Start/stop wrapper around a push-based [`LocationSource`].
pub struct FusedLocationProvider {
    source: Option<Arc<dyn LocationSource>>,
    listener: Option<Arc<dyn LocationListener>>,
    config: ProviderConfig,
    running: Option<ProviderHandle>,
}

impl FusedLocationProvider {
    /// Creates a provider with the default configuration and nothing bound.
    pub fn new() -> Self {
        Self {
            source: None,
            listener: None,
            config: ProviderConfig::default(),
            running: None,
        }
    }

    /// Binds the location source the provider connects to.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn LocationSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Registers the listener fixes are delivered to.
    #[must_use]
    pub fn with_listener(mut self, listener: Arc<dyn LocationListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Replaces the configuration. Validated on [`start`](Self::start).
    #[must_use]
    pub fn with_config(mut self, config: ProviderConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the requested quality of service.
    ///
    /// Applies to the next [`start`](Self::start).
    ///
    /// # Errors
    /// Returns [`ProviderError::InvalidConfig`] if `fastest_interval_ms`
    /// exceeds `interval_ms`; the previous configuration is kept.
    pub fn configure(
        &mut self,
        priority: ProviderPriority,
        interval_ms: u64,
        fastest_interval_ms: u64,
    ) -> ProviderResult<()> {
        self.config = ProviderConfig::new(priority, interval_ms, fastest_interval_ms)?;
        Ok(())
    }

    pub fn config(&self) -> ProviderConfig {
        self.config
    }

    /// Starts delivering fixes.
    ///
    /// Connection happens on a spawned task; failures from then on are
    /// reported to the listener, not returned here. A subscription that is
    /// already running is stopped first.
    ///
    /// # Errors
    /// - [`ProviderError::MissingContext`] without a source or tokio runtime
    /// - [`ProviderError::MissingCallback`] without a listener
    /// - [`ProviderError::InvalidConfig`] for an invalid configuration
    pub async fn start(&mut self) -> ProviderResult<ProviderHandle> {
        let source = self.source.clone().ok_or(ProviderError::MissingContext)?;
        let listener = self.listener.clone().ok_or(ProviderError::MissingCallback)?;
        self.config.validate()?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| ProviderError::MissingContext)?;

        self.stop().await;

        let subscription = Arc::new(Subscription {
            config: self.config,
            cancel: CancellationToken::new(),
            active: AtomicBool::new(true),
            delivery: Mutex::new(()),
            driver: Mutex::new(None),
        });

        let driver = runtime.spawn(subscription.clone().run(source, listener));
        *subscription.driver.lock().await = Some(driver);

        info!(
            priority = %self.config.priority,
            interval_ms = self.config.interval_ms,
            fastest_interval_ms = self.config.fastest_interval_ms,
            "Location provider started"
        );

        let handle = ProviderHandle {
            inner: subscription,
        };
        self.running = Some(handle.clone());
        Ok(handle)
    }

    /// Stops the running subscription, if any. Idempotent.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.running.take() {
            handle.stop().await;
        }
    }

    /// Handle of the running subscription.
    pub fn handle(&self) -> Option<&ProviderHandle> {
        self.running.as_ref()
    }
}

impl Default for FusedLocationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{SUSPENDED_SERVICE_DISCONNECTED, ScriptedLocationSource};
    use livelocator_domain::{DomainError, GeoPoint};
    use std::time::Duration;

    #[derive(Default)]
    struct RecordingListener {
        fixes: Mutex<Vec<Option<Fix>>>,
        errors: Mutex<Vec<ProviderError>>,
    }

    impl RecordingListener {
        async fn fixes(&self) -> Vec<Option<Fix>> {
            self.fixes.lock().await.clone()
        }

        async fn errors(&self) -> Vec<ProviderError> {
            self.errors.lock().await.clone()
        }
    }

    #[async_trait]
    impl LocationListener for RecordingListener {
        async fn on_location_changed(&self, fix: Option<Fix>) {
            self.fixes.lock().await.push(fix);
        }

        async fn on_provider_error(&self, error: &ProviderError) {
            self.errors.lock().await.push(error.clone());
        }
    }

    fn fix(lat: f64) -> Fix {
        Fix::new(GeoPoint::new(lat, 77.0), 10.0)
    }

    fn provider(
        source: &Arc<ScriptedLocationSource>,
        listener: &Arc<RecordingListener>,
    ) -> FusedLocationProvider {
        FusedLocationProvider::new()
            .with_source(source.clone())
            .with_listener(listener.clone())
    }

    #[test]
    fn test_configure_rejects_fastest_above_interval() {
        let mut provider = FusedLocationProvider::new();
        let result = provider.configure(ProviderPriority::HighAccuracy, 5_000, 10_000);

        assert_eq!(
            result,
            Err(ProviderError::InvalidConfig(DomainError::InvalidConfig {
                interval_ms: 5_000,
                fastest_interval_ms: 10_000,
            }))
        );
        assert_eq!(provider.config(), ProviderConfig::default());
    }

    #[tokio::test]
    async fn test_start_requires_source_and_listener() {
        let listener = Arc::new(RecordingListener::default());
        let mut no_source = FusedLocationProvider::new().with_listener(listener);
        assert_eq!(
            no_source.start().await.err(),
            Some(ProviderError::MissingContext)
        );

        let source = Arc::new(ScriptedLocationSource::new(vec![]));
        let mut no_listener = FusedLocationProvider::new().with_source(source.clone());
        assert_eq!(
            no_listener.start().await.err(),
            Some(ProviderError::MissingCallback)
        );
        assert_eq!(source.status().connects, 0);
    }

    #[tokio::test]
    async fn test_start_rejects_invalid_config() {
        let source = Arc::new(ScriptedLocationSource::new(vec![]));
        let listener = Arc::new(RecordingListener::default());
        let mut provider = provider(&source, &listener).with_config(ProviderConfig {
            priority: ProviderPriority::LowPower,
            interval_ms: 1_000,
            fastest_interval_ms: 2_000,
        });

        assert!(matches!(
            provider.start().await,
            Err(ProviderError::InvalidConfig(_))
        ));
        assert_eq!(source.status().connects, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivers_cached_fix_then_stream() {
        let source = Arc::new(
            ScriptedLocationSource::new(vec![fix(1.0), fix(2.0), fix(3.0)])
                .with_last_known(fix(0.0)),
        );
        let listener = Arc::new(RecordingListener::default());
        let mut provider = provider(&source, &listener);
        provider
            .configure(ProviderPriority::BalancedPower, 2_000, 1_000)
            .unwrap();

        let handle = provider.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(
            listener.fixes().await,
            vec![Some(fix(0.0)), Some(fix(1.0)), Some(fix(2.0)), Some(fix(3.0))]
        );
        assert!(handle.is_active());
        let status = source.status();
        assert!(status.connected && status.requesting);
        assert_eq!(status.requests, vec![handle.config()]);
        assert_eq!(handle.config().priority, ProviderPriority::BalancedPower);

        provider.stop().await;
        assert!(!handle.is_active());
        let status = source.status();
        assert!(!status.connected && !status.requesting);
        assert_eq!(status.disconnects, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_cached_fix_is_delivered_as_none() {
        let source = Arc::new(ScriptedLocationSource::new(vec![]));
        let listener = Arc::new(RecordingListener::default());
        let mut provider = provider(&source, &listener);

        provider.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(listener.fixes().await, vec![None]);
        provider.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_delivery_after_stop() {
        let fixes = (1..=10).map(|i| fix(i as f64)).collect();
        let source = Arc::new(ScriptedLocationSource::new(fixes));
        let listener = Arc::new(RecordingListener::default());
        let mut provider = provider(&source, &listener);

        let handle = provider.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        handle.stop().await;
        let delivered = listener.fixes().await.len();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(listener.fixes().await.len(), delivered);
        assert_eq!(delivered, 3);
        assert!(listener.errors().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let source = Arc::new(ScriptedLocationSource::new(vec![fix(1.0)]));
        let listener = Arc::new(RecordingListener::default());

        let mut never_started = provider(&source, &listener);
        never_started.stop().await;
        never_started.stop().await;

        let mut provider = provider(&source, &listener);
        let handle = provider.start().await.unwrap();
        handle.stop().await;
        handle.stop().await;
        provider.stop().await;

        assert!(!handle.is_active());
        assert_eq!(source.status().disconnects, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_connection_failure_stops_without_retry() {
        let source = Arc::new(
            ScriptedLocationSource::new(vec![fix(1.0)]).failing_connect("service missing"),
        );
        let listener = Arc::new(RecordingListener::default());
        let mut provider = provider(&source, &listener);

        let handle = provider.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert!(!handle.is_active());
        assert!(listener.fixes().await.is_empty());
        assert_eq!(
            listener.errors().await,
            vec![ProviderError::ConnectionFailure("service missing".to_string())]
        );
        assert_eq!(source.status().connects, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suspension_stops_provider() {
        let source = Arc::new(
            ScriptedLocationSource::new(vec![fix(1.0), fix(2.0), fix(3.0)]).suspending_after(2),
        );
        let listener = Arc::new(RecordingListener::default());
        let mut provider = provider(&source, &listener);

        let handle = provider.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(!handle.is_active());
        assert_eq!(
            listener.fixes().await,
            vec![None, Some(fix(1.0)), Some(fix(2.0))]
        );
        assert_eq!(
            listener.errors().await,
            vec![ProviderError::TransientSuspension(
                SUSPENDED_SERVICE_DISCONNECTED
            )]
        );
        let status = source.status();
        assert!(!status.connected && !status.requesting);

        // stopping an already failed provider is still fine
        provider.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_stops_both_wait_for_teardown() {
        let source = Arc::new(ScriptedLocationSource::new(vec![fix(1.0), fix(2.0)]));
        let listener = Arc::new(RecordingListener::default());
        let mut provider = provider(&source, &listener);

        let handle = provider.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_500)).await;

        let first = handle.clone();
        let second = handle.clone();
        let observed = source.clone();
        let (_, status) = tokio::join!(first.stop(), async move {
            second.stop().await;
            observed.status()
        });

        assert!(!status.connected && !status.requesting);
        assert_eq!(status.disconnects, 1);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_error_callback_is_a_no_op() {
        struct FixesOnly(Mutex<usize>);

        #[async_trait]
        impl LocationListener for FixesOnly {
            async fn on_location_changed(&self, _fix: Option<Fix>) {
                *self.0.lock().await += 1;
            }
        }

        let source = Arc::new(ScriptedLocationSource::new(vec![]).failing_connect("offline"));
        let listener = Arc::new(FixesOnly(Mutex::new(0)));
        let mut provider = FusedLocationProvider::new()
            .with_source(source)
            .with_listener(listener.clone());

        let handle = provider.start().await.unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(!handle.is_active());
        assert_eq!(*listener.0.lock().await, 0);
        provider.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_running_subscription() {
        let source = Arc::new(ScriptedLocationSource::new(vec![fix(1.0)]));
        let listener = Arc::new(RecordingListener::default());
        let mut provider = provider(&source, &listener);

        let first = provider.start().await.unwrap();
        let second = provider.start().await.unwrap();

        assert!(!first.is_active());
        assert!(second.is_active());
        assert_eq!(source.status().disconnects, 1);
        provider.stop().await;
    }
}
