//! Ranged delay: draw a duration uniformly from `[minimum, maximum]` (both
//! bounds inclusive) and delegate to [`Delay::delay`].
//!
//! The draw is the only thing added on top of the factory: abort, clear and
//! statistics behave exactly as for a fixed delay.
use rand::Rng;

use crate::delay::{Delay, DelayFuture, DelayOptions, ResultMode};
use crate::timer::DelayTimer;

/// Source of uniformly distributed durations.
pub trait RandomSource {
    /// Uniform draw in `[minimum, maximum]`, both inclusive. Callers
    /// guarantee `minimum <= maximum`.
    fn random_in(&mut self, minimum: u64, maximum: u64) -> u64;
}

impl<G: rand::RngCore> RandomSource for G {
    fn random_in(&mut self, minimum: u64, maximum: u64) -> u64 {
        self.gen_range(minimum..=maximum)
    }
}

/// Order a pair of bounds; reversed bounds are swapped.
pub fn normalize_bounds(minimum: u64, maximum: u64) -> (u64, u64) {
    if minimum <= maximum {
        (minimum, maximum)
    } else {
        (maximum, minimum)
    }
}

impl<T: DelayTimer> Delay<T> {
    /// Delay for a duration drawn from `source` in `[minimum, maximum]`.
    pub fn range_delay_with<S, V, R, M>(
        &self,
        source: &mut S,
        minimum: u64,
        maximum: u64,
        options: DelayOptions<V, R, M>,
    ) -> DelayFuture<V, R, M>
    where
        S: RandomSource + ?Sized,
        V: Send + 'static,
        R: Clone + Send + 'static,
        M: ResultMode<V>,
    {
        let (minimum, maximum) = normalize_bounds(minimum, maximum);
        let millis = source.random_in(minimum, maximum);

        #[cfg(feature = "defmt")]
        defmt::trace!("Ranged delay drew {} ms in [{}, {}]", millis, minimum, maximum);

        self.delay(millis, options)
    }

    /// Delay for a duration drawn from the thread-local RNG in `[minimum, maximum]`.
    #[cfg(feature = "std")]
    pub fn range_delay<V, R, M>(
        &self,
        minimum: u64,
        maximum: u64,
        options: DelayOptions<V, R, M>,
    ) -> DelayFuture<V, R, M>
    where
        V: Send + 'static,
        R: Clone + Send + 'static,
        M: ResultMode<V>,
    {
        self.range_delay_with(&mut rand::thread_rng(), minimum, maximum, options)
    }
}

//==================================================================================TESTS
#[cfg(test)]
#[path = "tests.rs"]
mod tests;
