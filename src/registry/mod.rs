//! Cancellation registry: a process-wide side table mapping the identity of
//! every pending delay to the action that resolves it early.
//!
//! Entries hold weak references only, so a forgotten entry can never keep a
//! delay alive. Delays remove their own entry when they settle or are dropped.
use alloc::collections::BTreeMap;
use alloc::sync::Weak;
use core::cell::RefCell;

use embassy_sync::blocking_mutex::CriticalSectionMutex;

/// Unique identity of one delay future, used as the registry key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DelayId(u64);

impl DelayId {
    /// Raw numeric value, unique for the lifetime of the process.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Early resolution action registered by a pending delay.
pub(crate) trait Clear: Send + Sync {
    /// Cancel the timer and resolve with the original payload.
    fn clear(&self);
}

struct Registry {
    next_id: u64,
    entries: BTreeMap<DelayId, Weak<dyn Clear>>,
}

static REGISTRY: CriticalSectionMutex<RefCell<Registry>> =
    CriticalSectionMutex::new(RefCell::new(Registry {
        next_id: 0,
        entries: BTreeMap::new(),
    }));

/// Mint a fresh identity.
pub(crate) fn next_id() -> DelayId {
    REGISTRY.lock(|cell| {
        let mut registry = cell.borrow_mut();
        let id = DelayId(registry.next_id);
        registry.next_id += 1;
        id
    })
}

pub(crate) fn insert(id: DelayId, action: Weak<dyn Clear>) {
    let previous = REGISTRY.lock(|cell| cell.borrow_mut().entries.insert(id, action));
    drop(previous);
}

pub(crate) fn remove(id: DelayId) {
    let removed = REGISTRY.lock(|cell| cell.borrow_mut().entries.remove(&id));
    drop(removed);
}

/// Whether a clear action is still registered for `id`.
pub fn is_registered(id: DelayId) -> bool {
    REGISTRY.lock(|cell| cell.borrow().entries.contains_key(&id))
}

/// Force a pending delay to resolve now with its original value.
///
/// The delay's timer is cancelled and the future settles synchronously, in
/// the caller's turn. Unknown, already settled, aborted or dropped delays are
/// ignored: this never fails.
///
/// Accepts a `&DelayFuture` or the [`DelayId`] obtained from
/// [`DelayFuture::id`](crate::delay::DelayFuture::id), so a delay can be
/// cleared after it was moved into an `.await` or another task.
pub fn clear_delay<K: Into<DelayId>>(key: K) {
    let id = key.into();
    let entry = REGISTRY.lock(|cell| cell.borrow_mut().entries.remove(&id));

    match entry.and_then(|weak| weak.upgrade()) {
        Some(action) => {
            #[cfg(feature = "defmt")]
            defmt::debug!("Clearing delay {}", id);
            action.clear();
        }
        None => {
            #[cfg(feature = "defmt")]
            defmt::trace!("Clear ignored for unknown delay {}", id);
        }
    }
}
