//! Location source that plays back a script.

use crate::error::SourceError;
use crate::source::{LocationSource, SourceEvent};
use async_trait::async_trait;
use livelocator_domain::{Fix, ProviderConfig};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Cause code reported for scripted suspensions (service disconnected).
pub const SUSPENDED_SERVICE_DISCONNECTED: i32 = 1;

/// Snapshot of what a [`ScriptedLocationSource`] has been asked to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceStatus {
    /// Currently connected.
    pub connected: bool,
    /// Updates currently requested.
    pub requesting: bool,
    /// Number of `connect` calls.
    pub connects: u32,
    /// Number of `disconnect` calls.
    pub disconnects: u32,
    /// Configurations passed to `request_updates`, in order.
    pub requests: Vec<ProviderConfig>,
}

#[derive(Default)]
struct ScriptState {
    status: SourceStatus,
    feeder: Option<JoinHandle<()>>,
}

/// A [`LocationSource`] that emits a fixed list of fixes.
///
/// Each fix is sent `delay` after the previous one once updates are
/// requested. The stream then stays open until updates are removed.
pub struct ScriptedLocationSource {
    fixes: Vec<Fix>,
    delay: Duration,
    last_known: Option<Fix>,
    connect_error: Option<String>,
    suspend_after: Option<usize>,
    state: Mutex<ScriptState>,
}

impl ScriptedLocationSource {
    pub fn new(fixes: Vec<Fix>) -> Self {
        Self {
            fixes,
            delay: Duration::from_secs(1),
            last_known: None,
            connect_error: None,
            suspend_after: None,
            state: Mutex::new(ScriptState::default()),
        }
    }

    /// Delay before each scripted fix.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Fix reported by `last_known_fix`.
    #[must_use]
    pub fn with_last_known(mut self, fix: Fix) -> Self {
        self.last_known = Some(fix);
        self
    }

    /// Makes every `connect` fail with `message`.
    #[must_use]
    pub fn failing_connect(mut self, message: impl Into<String>) -> Self {
        self.connect_error = Some(message.into());
        self
    }

    /// Suspends the stream after `count` fixes were sent.
    #[must_use]
    pub fn suspending_after(mut self, count: usize) -> Self {
        self.suspend_after = Some(count);
        self
    }

    pub fn status(&self) -> SourceStatus {
        self.lock().status.clone()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl LocationSource for ScriptedLocationSource {
    async fn connect(&self) -> Result<(), SourceError> {
        let mut state = self.lock();
        state.status.connects += 1;
        if let Some(message) = &self.connect_error {
            return Err(SourceError::new(message.clone()));
        }
        state.status.connected = true;
        Ok(())
    }

    async fn request_updates(
        &self,
        config: &ProviderConfig,
    ) -> Result<mpsc::Receiver<SourceEvent>, SourceError> {
        let mut state = self.lock();
        if !state.status.connected {
            return Err(SourceError::new("not connected"));
        }

        let (tx, rx) = mpsc::channel(64);
        let fixes = self.fixes.clone();
        let delay = self.delay;
        let suspend_after = self.suspend_after;

        let feeder = tokio::spawn(async move {
            for (sent, fix) in fixes.into_iter().enumerate() {
                if suspend_after == Some(sent) {
                    let _ = tx
                        .send(SourceEvent::Suspended(SUSPENDED_SERVICE_DISCONNECTED))
                        .await;
                    return;
                }
                tokio::time::sleep(delay).await;
                if tx.send(SourceEvent::Fix(fix)).await.is_err() {
                    return;
                }
            }
            if suspend_after.is_some() {
                let _ = tx
                    .send(SourceEvent::Suspended(SUSPENDED_SERVICE_DISCONNECTED))
                    .await;
                return;
            }
            tx.closed().await;
        });

        if let Some(previous) = state.feeder.replace(feeder) {
            previous.abort();
        }
        state.status.requesting = true;
        state.status.requests.push(*config);
        debug!(fixes = self.fixes.len(), "Scripted updates requested");
        Ok(rx)
    }

    async fn remove_updates(&self) {
        let mut state = self.lock();
        if let Some(feeder) = state.feeder.take() {
            feeder.abort();
        }
        state.status.requesting = false;
    }

    async fn last_known_fix(&self) -> Option<Fix> {
        self.last_known.clone()
    }

    async fn disconnect(&self) {
        let mut state = self.lock();
        state.status.connected = false;
        state.status.disconnects += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livelocator_domain::GeoPoint;

    fn fix(lat: f64) -> Fix {
        Fix::new(GeoPoint::new(lat, 77.0), 10.0)
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_source_emits_fixes_in_order() {
        let source = ScriptedLocationSource::new(vec![fix(1.0), fix(2.0)]);
        source.connect().await.unwrap();

        let mut rx = source
            .request_updates(&ProviderConfig::default())
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(SourceEvent::Fix(fix(1.0))));
        assert_eq!(rx.recv().await, Some(SourceEvent::Fix(fix(2.0))));
        assert!(source.status().requesting);

        source.remove_updates().await;
        assert_eq!(rx.recv().await, None);
        assert!(!source.status().requesting);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scripted_source_suspends() {
        let source = ScriptedLocationSource::new(vec![fix(1.0), fix(2.0)]).suspending_after(1);
        source.connect().await.unwrap();
        let mut rx = source
            .request_updates(&ProviderConfig::default())
            .await
            .unwrap();

        assert_eq!(rx.recv().await, Some(SourceEvent::Fix(fix(1.0))));
        assert_eq!(
            rx.recv().await,
            Some(SourceEvent::Suspended(SUSPENDED_SERVICE_DISCONNECTED))
        );
    }

    #[tokio::test]
    async fn test_request_requires_connection() {
        let source = ScriptedLocationSource::new(vec![]).failing_connect("offline");
        assert_eq!(source.connect().await, Err(SourceError::new("offline")));
        assert!(
            source
                .request_updates(&ProviderConfig::default())
                .await
                .is_err()
        );
        assert_eq!(source.status().connects, 1);
    }
}
