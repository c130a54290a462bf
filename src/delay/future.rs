//! Pending delay state machine and the future exposing it.
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::cell::RefCell;
use core::future::Future;
use core::marker::PhantomData;
use core::mem;
use core::pin::Pin;
use core::task::{Context, Poll};

use embassy_sync::blocking_mutex::CriticalSectionMutex;
use futures_util::task::AtomicWaker;

use super::{DelayStats, Plain, ResultMode};
use crate::error::AbortError;
use crate::registry::{self, Clear, DelayId};
use crate::signal::{AbortSignal, ListenerId};

/// Releases the scheduled timer callback.
pub(super) type CancelTimer = Box<dyn FnOnce() + Send + 'static>;
/// Milliseconds elapsed since the delay started.
pub(super) type Stopwatch = Box<dyn Fn() -> u64 + Send + Sync + 'static>;

enum Phase<V, R, O> {
    /// Timer armed, payload waiting.
    Pending(V),
    /// Claimed by a resolving path; the output is being computed.
    Settling,
    Ready(Result<O, R>),
    /// Output handed to the caller, or the future was dropped.
    Done,
}

struct Slot<V, R, O> {
    phase: Phase<V, R, O>,
    cancel_timer: Option<CancelTimer>,
    listener: Option<(AbortSignal<R>, ListenerId)>,
}

/// Everything released when a delay leaves the `Pending` phase.
struct Teardown<R> {
    cancel_timer: Option<CancelTimer>,
    listener: Option<(AbortSignal<R>, ListenerId)>,
}

impl<R> Teardown<R> {
    fn detach_listener(&mut self) {
        if let Some((signal, id)) = self.listener.take() {
            signal.remove_abort_listener(id);
        }
    }

    fn cancel_timer(&mut self) {
        if let Some(cancel) = self.cancel_timer.take() {
            cancel();
        }
    }
}

//==================================================================================PENDING_DELAY
/// State shared between a [`DelayFuture`], its timer callback, its abort
/// listener and its registry entry. Only the future holds a strong reference.
pub(super) struct PendingDelay<V, R, M: ResultMode<V>> {
    id: DelayId,
    millis: u64,
    stopwatch: Option<Stopwatch>,
    slot: CriticalSectionMutex<RefCell<Slot<V, R, M::Output>>>,
    waker: AtomicWaker,
    mode: PhantomData<fn() -> M>,
}

impl<V, R, M: ResultMode<V>> PendingDelay<V, R, M> {
    pub(super) fn new(id: DelayId, millis: u64, value: V, stopwatch: Stopwatch) -> Self {
        Self::with_phase(id, millis, Phase::Pending(value), Some(stopwatch))
    }

    fn with_phase(
        id: DelayId,
        millis: u64,
        phase: Phase<V, R, M::Output>,
        stopwatch: Option<Stopwatch>,
    ) -> Self {
        Self {
            id,
            millis,
            stopwatch,
            slot: CriticalSectionMutex::new(RefCell::new(Slot {
                phase,
                cancel_timer: None,
                listener: None,
            })),
            waker: AtomicWaker::new(),
            mode: PhantomData,
        }
    }

    pub(super) fn is_pending(&self) -> bool {
        self.slot
            .lock(|cell| matches!(cell.borrow().phase, Phase::Pending(_)))
    }

    /// Store the timer cancellation. Dropped unused when the callback already
    /// ran from inside `schedule`.
    pub(super) fn arm(&self, cancel_timer: CancelTimer) {
        let unused = self.slot.lock(|cell| {
            let mut slot = cell.borrow_mut();
            if matches!(slot.phase, Phase::Pending(_)) {
                slot.cancel_timer = Some(cancel_timer);
                None
            } else {
                Some(cancel_timer)
            }
        });
        drop(unused);
    }

    /// Remember the abort listener so settlement can detach it.
    pub(super) fn attach_listener(&self, signal: AbortSignal<R>, id: ListenerId) {
        let stale = self.slot.lock(|cell| {
            let mut slot = cell.borrow_mut();
            if matches!(slot.phase, Phase::Pending(_)) {
                slot.listener = Some((signal, id));
                None
            } else {
                Some((signal, id))
            }
        });
        if let Some((signal, id)) = stale {
            signal.remove_abort_listener(id);
        }
    }

    /// Leave `Pending` for `next`, returning the payload and what must be
    /// released. `None` when another path already won.
    fn claim(&self, next: Phase<V, R, M::Output>) -> Option<(V, Teardown<R>)> {
        self.slot.lock(|cell| {
            let mut slot = cell.borrow_mut();
            if !matches!(slot.phase, Phase::Pending(_)) {
                return None;
            }
            let Phase::Pending(value) = mem::replace(&mut slot.phase, next) else {
                return None;
            };
            let teardown = Teardown {
                cancel_timer: slot.cancel_timer.take(),
                listener: slot.listener.take(),
            };
            Some((value, teardown))
        })
    }

    /// Resolve with the payload: detach the listener, measure, publish.
    fn settle(&self, value: V, mut teardown: Teardown<R>) {
        teardown.detach_listener();

        let output = M::finish(value, || self.stats());
        self.slot
            .lock(|cell| cell.borrow_mut().phase = Phase::Ready(Ok(output)));

        registry::remove(self.id);
        self.waker.wake();
    }

    fn stats(&self) -> DelayStats {
        let elapsed = self.stopwatch.as_ref().map_or(0, |stopwatch| stopwatch());
        let drift = i64::try_from(elapsed)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(self.millis).unwrap_or(i64::MAX));
        DelayStats { drift }
    }

    /// Timer callback.
    pub(super) fn fire(&self) {
        if let Some((value, teardown)) = self.claim(Phase::Settling) {
            #[cfg(feature = "defmt")]
            defmt::trace!("Delay {} fired", self.id);

            // The timer has run; its handle must not be cancelled.
            let Teardown { listener, .. } = teardown;
            self.settle(
                value,
                Teardown {
                    cancel_timer: None,
                    listener,
                },
            );
        }
    }

    /// Abort listener: cancel the timer and fail with the reason.
    pub(super) fn abort(&self, reason: R) {
        if let Some((value, mut teardown)) = self.claim(Phase::Ready(Err(reason))) {
            #[cfg(feature = "defmt")]
            defmt::debug!("Delay {} aborted", self.id);

            teardown.cancel_timer();
            teardown.detach_listener();
            drop(value);
            registry::remove(self.id);
            self.waker.wake();
        }
    }

    /// Future dropped before settling: release everything, resolve nothing.
    fn release(&self) {
        if let Some((value, mut teardown)) = self.claim(Phase::Done) {
            #[cfg(feature = "defmt")]
            defmt::trace!("Delay {} dropped while pending", self.id);

            teardown.cancel_timer();
            teardown.detach_listener();
            drop(value);
        }
        registry::remove(self.id);
    }

    fn take_output(&self) -> Option<Result<M::Output, R>> {
        self.slot.lock(|cell| {
            let mut slot = cell.borrow_mut();
            match mem::replace(&mut slot.phase, Phase::Done) {
                Phase::Ready(result) => Some(result),
                other => {
                    slot.phase = other;
                    None
                }
            }
        })
    }
}

impl<V, R, M> Clear for PendingDelay<V, R, M>
where
    V: Send + 'static,
    R: Send + 'static,
    M: ResultMode<V>,
{
    fn clear(&self) {
        if let Some((value, mut teardown)) = self.claim(Phase::Settling) {
            teardown.cancel_timer();
            self.settle(value, teardown);
        }
    }
}

//==================================================================================DELAY_FUTURE
/// Future returned by [`Delay::delay`](super::Delay::delay).
///
/// Resolves with `Ok(V)` (or `Ok(Measured<V>)` in stats mode), or with
/// `Err(reason)` when its abort signal triggers. The timer runs whether or not
/// the future is polled; dropping it before completion cancels the timer.
#[must_use = "a delay does nothing useful unless awaited, and is cancelled when dropped"]
pub struct DelayFuture<V, R = AbortError, M: ResultMode<V> = Plain> {
    pending: Arc<PendingDelay<V, R, M>>,
}

impl<V, R, M> DelayFuture<V, R, M>
where
    V: Send + 'static,
    R: Clone + Send + 'static,
    M: ResultMode<V>,
{
    pub(super) fn new(pending: Arc<PendingDelay<V, R, M>>) -> Self {
        Self { pending }
    }

    /// Future that is already failed; nothing is scheduled nor registered.
    pub(super) fn rejected(id: DelayId, millis: u64, reason: R) -> Self {
        Self::new(Arc::new(PendingDelay::with_phase(
            id,
            millis,
            Phase::Ready(Err(reason)),
            None,
        )))
    }

    /// Registry identity, usable with [`clear_delay`](crate::registry::clear_delay).
    pub fn id(&self) -> DelayId {
        self.pending.id
    }

    /// Requested duration in milliseconds.
    pub fn millis(&self) -> u64 {
        self.pending.millis
    }

    /// Whether the delay is still waiting for its timer.
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }
}

impl<V, R, M> Future for DelayFuture<V, R, M>
where
    V: Send + 'static,
    R: Clone + Send + 'static,
    M: ResultMode<V>,
{
    type Output = Result<M::Output, R>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.pending.waker.register(cx.waker());
        match self.pending.take_output() {
            Some(result) => Poll::Ready(result),
            None => Poll::Pending,
        }
    }
}

impl<V, R, M: ResultMode<V>> Drop for DelayFuture<V, R, M> {
    fn drop(&mut self) {
        self.pending.release();
    }
}

impl<V, R, M: ResultMode<V>> From<&DelayFuture<V, R, M>> for DelayId {
    fn from(future: &DelayFuture<V, R, M>) -> Self {
        future.pending.id
    }
}
