//! Indicator animations.
//!
//! Animations run as tasks on a host-chosen tokio runtime and are driven by
//! a [`CancellationToken`](tokio_util::sync::CancellationToken) the caller
//! owns. [`AnimationHandle::cancel`] waits for the task, so no tick lands on
//! an indicator after it returns.

mod pulse;
mod radius;

pub use pulse::*;
pub use radius::*;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::error;

/// A running animation.
#[derive(Debug)]
pub struct AnimationHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl AnimationHandle {
    fn new(token: CancellationToken, task: JoinHandle<()>) -> Self {
        Self { token, task }
    }

    /// Cancels the animation and waits until its task has exited.
    pub async fn cancel(self) {
        self.token.cancel();
        self.join().await;
    }

    /// Waits for the animation to finish on its own.
    pub async fn join(self) {
        if let Err(e) = self.task.await
            && e.is_panic()
        {
            error!(error = %e, "Animation task panicked");
        }
    }

    /// True once the animation reached its end or was cancelled.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// The runtime animations are spawned on: the configured one, else the
/// runtime of the caller.
fn runtime(configured: &Option<Handle>) -> Option<Handle> {
    configured.clone().or_else(|| Handle::try_current().ok())
}
