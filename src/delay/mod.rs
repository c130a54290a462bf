//! Delay factory: binds a [`DelayTimer`] and hands out [`DelayFuture`]s that
//! resolve with a payload once the requested duration has elapsed.
//!
//! Every delay can settle in exactly one of three ways:
//!
//! * the timer fires: resolves with the payload;
//! * [`clear_delay`](crate::registry::clear_delay) is called: the timer is
//!   cancelled and the future resolves with the payload right away;
//! * the [`AbortSignal`] triggers: the timer is cancelled and the future
//!   fails with the signal's reason.
//!
//! Whichever comes first wins; the others become no-ops.
use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use core::marker::PhantomData;

use crate::error::AbortError;
use crate::registry::{self, Clear};
use crate::signal::AbortSignal;
use crate::timer::DelayTimer;

mod future;

pub use future::DelayFuture;

use future::PendingDelay;

//==================================================================================STATS
/// Timing statistics attached to a delay resolved in [`WithStats`] mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DelayStats {
    /// Measured elapsed milliseconds minus requested milliseconds.
    /// Negative when the timer (or an early clear) resolved sooner.
    pub drift: i64,
}

/// Payload together with the statistics of the delay that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measured<V> {
    pub value: V,
    pub stats: DelayStats,
}

//==================================================================================RESULT_MODES
mod sealed {
    pub trait Sealed {}
}

/// Selects the shape a delay resolves with.
pub trait ResultMode<V>: sealed::Sealed + 'static {
    type Output: Send + 'static;

    /// Build the resolved output; `stats` is only evaluated when needed.
    fn finish(value: V, stats: impl FnOnce() -> DelayStats) -> Self::Output;
}

/// Resolve with the bare payload (default).
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

/// Resolve with [`Measured`]: the payload plus [`DelayStats`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WithStats;

impl sealed::Sealed for Plain {}
impl sealed::Sealed for WithStats {}

impl<V: Send + 'static> ResultMode<V> for Plain {
    type Output = V;

    fn finish(value: V, _stats: impl FnOnce() -> DelayStats) -> V {
        value
    }
}

impl<V: Send + 'static> ResultMode<V> for WithStats {
    type Output = Measured<V>;

    fn finish(value: V, stats: impl FnOnce() -> DelayStats) -> Measured<V> {
        Measured {
            value,
            stats: stats(),
        }
    }
}

//==================================================================================OPTIONS
/// Per-call options: payload, abort signal, and result shape.
///
/// ```rust,ignore
/// let options = DelayOptions::new()
///     .value("☕")
///     .signal(controller.signal())
///     .stats();
/// ```
pub struct DelayOptions<V = (), R = AbortError, M = Plain> {
    value: V,
    signal: Option<AbortSignal<R>>,
    mode: PhantomData<fn() -> M>,
}

impl Default for DelayOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayOptions {
    /// Resolve with `()`, no signal, no statistics.
    pub fn new() -> Self {
        Self {
            value: (),
            signal: None,
            mode: PhantomData,
        }
    }

    /// Shorthand for `DelayOptions::new().value(value)`.
    pub fn with_value<V>(value: V) -> DelayOptions<V> {
        Self::new().value(value)
    }
}

impl<V, R, M> DelayOptions<V, R, M> {
    /// Payload the future resolves with.
    pub fn value<W>(self, value: W) -> DelayOptions<W, R, M> {
        DelayOptions {
            value,
            signal: self.signal,
            mode: PhantomData,
        }
    }

    /// Abort the delay when `signal` triggers. Replaces any previous signal.
    pub fn signal<S>(self, signal: AbortSignal<S>) -> DelayOptions<V, S, M> {
        DelayOptions {
            value: self.value,
            signal: Some(signal),
            mode: PhantomData,
        }
    }

    /// Resolve with [`Measured`] instead of the bare payload.
    pub fn stats(self) -> DelayOptions<V, R, WithStats> {
        DelayOptions {
            value: self.value,
            signal: self.signal,
            mode: PhantomData,
        }
    }
}

//==================================================================================FACTORY
/// Delay function bound to one set of timer primitives.
pub struct Delay<T: DelayTimer> {
    timer: Arc<T>,
}

impl<T: DelayTimer> Clone for Delay<T> {
    fn clone(&self) -> Self {
        Self {
            timer: self.timer.clone(),
        }
    }
}

impl<T: DelayTimer + core::fmt::Debug> core::fmt::Debug for Delay<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Delay").field("timer", &self.timer).finish()
    }
}

/// Build a delay function on top of `timer`.
pub fn create_delay<T: DelayTimer>(timer: T) -> Delay<T> {
    Delay::new(timer)
}

impl<T: DelayTimer> Delay<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer: Arc::new(timer),
        }
    }

    /// Timer primitives this instance schedules on.
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Start a delay of `millis` milliseconds.
    ///
    /// The timer is scheduled immediately, not on first poll. If the options
    /// carry a signal that is already aborted, nothing is scheduled and the
    /// returned future is already failed with the signal's reason.
    pub fn delay<V, R, M>(&self, millis: u64, options: DelayOptions<V, R, M>) -> DelayFuture<V, R, M>
    where
        V: Send + 'static,
        R: Clone + Send + 'static,
        M: ResultMode<V>,
    {
        let DelayOptions { value, signal, .. } = options;
        let id = registry::next_id();

        if let Some(reason) = signal.as_ref().and_then(AbortSignal::reason) {
            #[cfg(feature = "defmt")]
            defmt::debug!("Delay {} rejected: signal already aborted", id);
            return DelayFuture::rejected(id, millis, reason);
        }

        let started = self.timer.now();
        let stopwatch = {
            let timer = self.timer.clone();
            Box::new(move || timer.millis_since(started))
        };
        let pending = Arc::new(PendingDelay::<V, R, M>::new(id, millis, value, stopwatch));

        // Timer callback and abort listener only hold weak references: the
        // future is the sole owner of the pending state.
        let on_fire = Arc::downgrade(&pending);
        let handle = self.timer.schedule(
            Box::new(move || {
                if let Some(pending) = on_fire.upgrade() {
                    pending.fire();
                }
            }),
            millis,
        );

        #[cfg(feature = "defmt")]
        defmt::trace!("Delay {} scheduled for {} ms", id, millis);

        let cancel_timer = {
            let timer = self.timer.clone();
            Box::new(move || timer.cancel(handle))
        };
        pending.arm(cancel_timer);

        if let Some(signal) = signal {
            let on_abort = Arc::downgrade(&pending);
            let listener = signal.add_abort_listener(move |reason| {
                if let Some(pending) = on_abort.upgrade() {
                    pending.abort(reason);
                }
            });
            match listener {
                Some(listener) => pending.attach_listener(signal, listener),
                // Triggered between the fast-path check and the registration.
                None => {
                    if let Some(reason) = signal.reason() {
                        pending.abort(reason);
                    }
                }
            }
        }

        if pending.is_pending() {
            let action: Weak<dyn Clear> = Arc::downgrade(&pending) as Weak<dyn Clear>;
            registry::insert(id, action);
        }

        DelayFuture::new(pending)
    }
}
