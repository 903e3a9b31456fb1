//! Cancellable one-shot timer for proactive token refresh.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{trace, warn};

struct Armed {
    id: u64,
    deadline: Instant,
    handle: JoinHandle<()>,
}

/// Holds at most one pending task.
///
/// Arming always aborts the previous task under the same lock. A task
/// that has started running calls [`RefreshTimer::detach`] with its id so
/// that re-arming from inside the task does not abort it.
#[derive(Default)]
pub(crate) struct RefreshTimer {
    slot: Mutex<Option<Armed>>,
    next_id: AtomicU64,
}

impl RefreshTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Run the future built by `task` after `delay`, replacing any pending
    /// task. `task` receives the id to detach with.
    ///
    /// Returns false, leaving nothing armed, when called outside a tokio
    /// runtime or when `delay` overflows the clock.
    pub(crate) fn arm<F, Fut>(&self, delay: Duration, task: F) -> bool
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = self.lock();
        if let Some(previous) = slot.take() {
            trace!(id = previous.id, "cancelling pending refresh");
            previous.handle.abort();
        }

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                warn!("no async runtime available, refresh not scheduled");
                return false;
            }
        };

        let Some(deadline) = Instant::now().checked_add(delay) else {
            warn!(delay_ms = delay.as_millis() as u64, "refresh delay out of range, not scheduled");
            return false;
        };

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let fut = task(id);
        let handle = runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            fut.await;
        });

        *slot = Some(Armed {
            id,
            deadline,
            handle,
        });
        true
    }

    /// Abort the pending task, if any.
    pub(crate) fn cancel(&self) {
        if let Some(armed) = self.lock().take() {
            trace!(id = armed.id, "cancelling pending refresh");
            armed.handle.abort();
        }
    }

    /// Forget task `id` without aborting it.
    ///
    /// Does nothing if a newer task has been armed since.
    pub(crate) fn detach(&self, id: u64) {
        let mut slot = self.lock();
        if slot.as_ref().is_some_and(|armed| armed.id == id) {
            *slot = None;
        }
    }

    /// Time left until the pending task fires.
    pub(crate) fn remaining(&self) -> Option<Duration> {
        self.lock()
            .as_ref()
            .map(|armed| armed.deadline.saturating_duration_since(Instant::now()))
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Armed>> {
        self.slot
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
