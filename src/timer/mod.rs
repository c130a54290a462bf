//! Timer primitives consumed by the delay factory: schedule a callback after a
//! number of milliseconds, cancel it by handle, and read a monotonic clock.
//!
//! The library never talks to a hardware timer or an executor directly. A host
//! (firmware, Tokio application, test harness) plugs its own implementation in
//! through [`DelayTimer`].
use alloc::boxed::Box;

#[cfg(feature = "tokio")]
pub mod tokio_timer;

/// One-shot action run by the timer once the requested duration has elapsed.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Timer trait abstraction; implementations are shared between the delay
/// factory and every pending delay, so they must be thread-safe.
pub trait DelayTimer: Send + Sync + 'static {
    /// Opaque handle identifying one scheduled callback.
    type Handle: Send + 'static;
    /// Point on the timer's own monotonic timeline.
    type Instant: Copy + Send + Sync + 'static;

    /// Run `callback` once after `millis` milliseconds.
    ///
    /// The value of `millis` is passed through untouched; clamping or other
    /// host quirks are the implementation's business. The callback may be run
    /// from inside this call.
    fn schedule(&self, callback: TimerCallback, millis: u64) -> Self::Handle;

    /// Release a scheduled callback so it never runs.
    ///
    /// Called at most once per handle, and never for a callback that already ran.
    fn cancel(&self, handle: Self::Handle);

    /// Current instant, used to measure delay drift.
    fn now(&self) -> Self::Instant;

    /// Whole milliseconds elapsed between `earlier` and now.
    fn millis_since(&self, earlier: Self::Instant) -> u64;
}
