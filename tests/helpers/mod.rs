/// Test doubles to drive delays deterministically during integration tests.
use korri_delay::{DelayTimer, RandomSource, TimerCallback};
use std::sync::{Arc, Mutex};

#[allow(dead_code)]
/// One `schedule` call recorded by [`FakeTimer`].
pub struct Scheduled {
    pub handle: u64,
    pub millis: u64,
    callback: Option<TimerCallback>,
}

#[derive(Default)]
struct FakeTimerState {
    now: u64,
    next_handle: u64,
    scheduled: Vec<Scheduled>,
    cancelled: Vec<u64>,
}

#[derive(Clone, Default)]
#[allow(dead_code)]
/// Timer that never fires on its own: callbacks are captured and run on
/// demand, cancellations are recorded, and the clock is moved by hand.
pub struct FakeTimer {
    state: Arc<Mutex<FakeTimerState>>,
}

#[allow(dead_code)]
impl FakeTimer {
    /// Durations requested so far, in call order.
    pub fn scheduled_millis(&self) -> Vec<u64> {
        let state = self.state.lock().unwrap();
        state.scheduled.iter().map(|entry| entry.millis).collect()
    }

    /// Handles returned by `schedule`, in call order.
    pub fn handles(&self) -> Vec<u64> {
        let state = self.state.lock().unwrap();
        state.scheduled.iter().map(|entry| entry.handle).collect()
    }

    /// Handles passed to `cancel`, in call order.
    pub fn cancelled(&self) -> Vec<u64> {
        self.state.lock().unwrap().cancelled.clone()
    }

    /// Move the clock forward.
    pub fn advance(&self, millis: u64) {
        self.state.lock().unwrap().now += millis;
    }

    /// Run the callback captured by the `index`-th `schedule` call.
    /// Returns `false` if it already ran.
    pub fn fire(&self, index: usize) -> bool {
        let callback = self.state.lock().unwrap().scheduled[index].callback.take();
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl DelayTimer for FakeTimer {
    type Handle = u64;
    type Instant = u64;

    fn schedule(&self, callback: TimerCallback, millis: u64) -> u64 {
        let mut state = self.state.lock().unwrap();
        let handle = 1000 + state.next_handle;
        state.next_handle += 1;
        state.scheduled.push(Scheduled {
            handle,
            millis,
            callback: Some(callback),
        });
        handle
    }

    fn cancel(&self, handle: u64) {
        self.state.lock().unwrap().cancelled.push(handle);
    }

    fn now(&self) -> u64 {
        self.state.lock().unwrap().now
    }

    fn millis_since(&self, earlier: u64) -> u64 {
        self.now().saturating_sub(earlier)
    }
}

#[allow(dead_code)]
/// Random source that always returns one end of the requested range.
pub enum FixedDraw {
    Minimum,
    Maximum,
}

impl RandomSource for FixedDraw {
    fn random_in(&mut self, minimum: u64, maximum: u64) -> u64 {
        match self {
            FixedDraw::Minimum => minimum,
            FixedDraw::Maximum => maximum,
        }
    }
}
