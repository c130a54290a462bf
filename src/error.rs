//! Error definitions shared across library modules.
//!
//! A delay has a single failure scenario: the abort signal it listens to was
//! triggered. The future then fails with the signal's reason, unchanged, so
//! the only error type owned by this crate is the default reason used when a
//! controller aborts without one.
use thiserror_no_std::Error;

#[derive(Error, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
/// Default abort reason, used by [`AbortController::abort`](crate::signal::AbortController::abort).
#[error("This operation was aborted")]
pub struct AbortError;

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    /// The default reason carries a human-readable message.
    fn test_abort_error_display() {
        assert_eq!(AbortError.to_string(), "This operation was aborted");
        assert_eq!(AbortError::default(), AbortError);
    }
}
