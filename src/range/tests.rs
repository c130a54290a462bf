//! Unit tests for bound handling and the `RngCore` adapter.
use super::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
/// Reversed bounds are swapped, ordered bounds are kept.
fn test_normalize_bounds() {
    assert_eq!(normalize_bounds(50, 150), (50, 150));
    assert_eq!(normalize_bounds(150, 50), (50, 150));
    assert_eq!(normalize_bounds(7, 7), (7, 7));
}

#[test]
/// Any `RngCore` draws inside the inclusive range and reaches both ends.
fn test_rng_draws_stay_in_range() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut saw_minimum = false;
    let mut saw_maximum = false;

    for _ in 0..2_000 {
        let drawn = rng.random_in(10, 14);
        assert!((10..=14).contains(&drawn), "drew {drawn}");
        saw_minimum |= drawn == 10;
        saw_maximum |= drawn == 14;
    }

    assert!(saw_minimum && saw_maximum);
}

#[test]
/// A degenerate range always yields its single value.
fn test_rng_single_value_range() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(rng.random_in(42, 42), 42);
}
