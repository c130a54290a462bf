//! Default timer primitives for hosts running a Tokio runtime.
use core::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{DelayTimer, TimerCallback};

/// [`DelayTimer`] spawning one Tokio task per scheduled callback.
///
/// Without an explicit runtime handle the task is spawned on the runtime that
/// is current when [`DelayTimer::schedule`] is called, which panics outside of
/// a Tokio context (same contract as `tokio::spawn`).
#[derive(Debug, Clone, Default)]
pub struct TokioTimer {
    runtime: Option<Handle>,
}

impl TokioTimer {
    /// Timer bound to whichever runtime is current at schedule time.
    pub const fn new() -> Self {
        Self { runtime: None }
    }

    /// Timer bound to a specific runtime, usable from threads outside of it.
    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }
}

impl DelayTimer for TokioTimer {
    type Handle = JoinHandle<()>;
    type Instant = Instant;

    fn schedule(&self, callback: TimerCallback, millis: u64) -> Self::Handle {
        let task = async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            callback();
        };
        match &self.runtime {
            Some(runtime) => runtime.spawn(task),
            None => tokio::spawn(task),
        }
    }

    fn cancel(&self, handle: Self::Handle) {
        handle.abort();
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn millis_since(&self, earlier: Self::Instant) -> u64 {
        let elapsed = Instant::now().saturating_duration_since(earlier);
        u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
    }
}
