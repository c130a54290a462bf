//! Cooperative cancellation signal.
//!
//! An [`AbortController`] owns the right to trigger; any number of
//! [`AbortSignal`] clones can be handed to delays. A signal can be queried for
//! a prior trigger and subscribed to with one-shot listeners, each receiving
//! a clone of the reason the controller aborted with.
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

use crate::error::AbortError;

/// One-shot listener invoked with the abort reason.
type AbortListener<R> = Box<dyn FnOnce(R) + Send + 'static>;

/// Identifies a listener registered with [`AbortSignal::add_abort_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ListenerId(u64);

struct SignalState<R> {
    reason: Option<R>,
    next_listener: u64,
    listeners: Vec<(ListenerId, AbortListener<R>)>,
}

//==================================================================================ABORT_SIGNAL
/// Read side of an abort: cheap to clone, shared by every holder.
pub struct AbortSignal<R = AbortError> {
    state: Arc<CriticalSectionMutex<RefCell<SignalState<R>>>>,
}

impl<R> Clone for AbortSignal<R> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<R> fmt::Debug for AbortSignal<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortSignal")
            .field("aborted", &self.is_aborted())
            .finish()
    }
}

impl<R> AbortSignal<R> {
    fn with_reason(reason: Option<R>) -> Self {
        Self {
            state: Arc::new(CriticalSectionMutex::new(RefCell::new(SignalState {
                reason,
                next_listener: 0,
                listeners: Vec::new(),
            }))),
        }
    }

    /// Signal that is already triggered with `reason`.
    pub fn aborted(reason: R) -> Self {
        Self::with_reason(Some(reason))
    }

    /// Whether the controller has already aborted.
    pub fn is_aborted(&self) -> bool {
        self.state.lock(|cell| cell.borrow().reason.is_some())
    }

    /// Detach a listener. Returns `false` if it already ran or was never known.
    pub fn remove_abort_listener(&self, id: ListenerId) -> bool {
        // The listener is dropped outside of the critical section.
        let removed = self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            let position = state.listeners.iter().position(|(known, _)| *known == id);
            position.map(|index| state.listeners.remove(index))
        });
        removed.is_some()
    }

    /// Number of listeners still waiting for the trigger.
    pub fn listener_count(&self) -> usize {
        self.state.lock(|cell| cell.borrow().listeners.len())
    }
}

impl<R: Clone + Send + 'static> AbortSignal<R> {
    /// Reason carried by the trigger, `None` while not aborted.
    pub fn reason(&self) -> Option<R> {
        self.state.lock(|cell| cell.borrow().reason.clone())
    }

    /// Register a one-shot listener run when the signal triggers.
    ///
    /// Returns `None` without registering when the signal is already
    /// aborted: the caller is expected to check [`reason`](Self::reason) and
    /// react synchronously instead.
    pub fn add_abort_listener<F>(&self, listener: F) -> Option<ListenerId>
    where
        F: FnOnce(R) + Send + 'static,
    {
        self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            if state.reason.is_some() {
                return None;
            }
            let id = ListenerId(state.next_listener);
            state.next_listener += 1;
            state.listeners.push((id, Box::new(listener)));
            Some(id)
        })
    }

    /// Trigger the signal. Listeners run on the caller's stack, in
    /// registration order, after the internal lock is released.
    fn trigger(&self, reason: R) -> bool {
        let listeners = self.state.lock(|cell| {
            let mut state = cell.borrow_mut();
            if state.reason.is_some() {
                return None;
            }
            state.reason = Some(reason.clone());
            Some(core::mem::take(&mut state.listeners))
        });

        let Some(listeners) = listeners else {
            return false;
        };

        #[cfg(feature = "defmt")]
        defmt::debug!("Abort signal triggered, {} listener(s)", listeners.len());

        for (_, listener) in listeners {
            listener(reason.clone());
        }
        true
    }
}

//==================================================================================ABORT_CONTROLLER
/// Write side of an abort: triggers its signal exactly once.
pub struct AbortController<R = AbortError> {
    signal: AbortSignal<R>,
}

impl<R> fmt::Debug for AbortController<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbortController")
            .field("signal", &self.signal)
            .finish()
    }
}

impl<R> Default for AbortController<R> {
    fn default() -> Self {
        Self {
            signal: AbortSignal::with_reason(None),
        }
    }
}

impl<R> AbortController<R> {
    /// Fresh controller whose signal is not triggered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle to pass to delays.
    pub fn signal(&self) -> AbortSignal<R> {
        self.signal.clone()
    }
}

impl<R: Clone + Send + 'static> AbortController<R> {
    /// Trigger with an explicit reason.
    ///
    /// Returns `false` if the signal was already aborted; the first reason wins.
    pub fn abort_with(&self, reason: R) -> bool {
        self.signal.trigger(reason)
    }

    /// Trigger with the reason type's default value.
    pub fn abort(&self) -> bool
    where
        R: Default,
    {
        self.abort_with(R::default())
    }
}
