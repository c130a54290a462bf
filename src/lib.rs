//! `korri-delay` library: cancelable, abortable timer delays exposed as
//! futures, in a `no_std` + `alloc` environment. The crate exposes the timer
//! abstraction to plug a host timer in, the delay factory, the cancellation
//! registry used to clear pending delays, and an abort signal.
//!
//! With the `tokio` feature (enabled by default) a process-wide instance backed
//! by the Tokio runtime is available through [`delay()`] and [`range_delay()`].
#![no_std]
extern crate alloc;
#[cfg(feature = "std")]
extern crate std;
//==================================================================================
/// Delay factory, per-call options, result shapes, and the delay future.
pub mod delay;
/// Default abort reason.
pub mod error;
/// Delays with a randomly drawn duration.
pub mod range;
/// Cancellation registry and [`clear_delay`].
pub mod registry;
/// Abort controller and signal.
pub mod signal;
/// Timer primitives consumed by the factory.
pub mod timer;
#[cfg(feature = "tokio")]
mod default_instance;
//==================================================================================
pub use delay::{
    create_delay, Delay, DelayFuture, DelayOptions, DelayStats, Measured, Plain, ResultMode,
    WithStats,
};
pub use error::AbortError;
pub use range::RandomSource;
pub use registry::{clear_delay, DelayId};
pub use signal::{AbortController, AbortSignal, ListenerId};
pub use timer::{DelayTimer, TimerCallback};

#[cfg(feature = "tokio")]
pub use default_instance::{default_delay, delay, range_delay};
#[cfg(feature = "tokio")]
pub use timer::tokio_timer::TokioTimer;
//==================================================================================
