//! Process-wide default delay, bound to [`TokioTimer`] on first use.
use std::sync::OnceLock;

use crate::delay::{create_delay, Delay, DelayFuture, DelayOptions, ResultMode};
use crate::timer::tokio_timer::TokioTimer;

static DEFAULT_DELAY: OnceLock<Delay<TokioTimer>> = OnceLock::new();

/// Shared instance used by [`delay`] and [`range_delay`].
///
/// Its timer spawns on the Tokio runtime current at call time.
pub fn default_delay() -> &'static Delay<TokioTimer> {
    DEFAULT_DELAY.get_or_init(|| create_delay(TokioTimer::new()))
}

/// Resolve after `millis` milliseconds on the default instance.
///
/// ```rust,ignore
/// use korri_delay::{delay, DelayOptions};
///
/// let result = delay(100, DelayOptions::with_value("☕")).await?;
/// assert_eq!(result, "☕");
/// ```
///
/// # Panics
///
/// Panics when called outside of a Tokio runtime.
pub fn delay<V, R, M>(millis: u64, options: DelayOptions<V, R, M>) -> DelayFuture<V, R, M>
where
    V: Send + 'static,
    R: Clone + Send + 'static,
    M: ResultMode<V>,
{
    default_delay().delay(millis, options)
}

/// Resolve after a duration drawn uniformly from `[minimum, maximum]`
/// (inclusive) on the default instance.
///
/// # Panics
///
/// Panics when called outside of a Tokio runtime.
pub fn range_delay<V, R, M>(
    minimum: u64,
    maximum: u64,
    options: DelayOptions<V, R, M>,
) -> DelayFuture<V, R, M>
where
    V: Send + 'static,
    R: Clone + Send + 'static,
    M: ResultMode<V>,
{
    default_delay().range_delay(minimum, maximum, options)
}
