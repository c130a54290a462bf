//! # Quickstart Example
//!
//! Minimal tour of korri-delay:
//! - Wait with a payload
//! - Clear a pending delay early
//! - Abort a delay with a signal
//! - Read drift statistics
//! - Wait for a random duration
//!
//! ```bash
//! cargo run --example quickstart
//! ```

use korri_delay::{clear_delay, delay, range_delay, AbortController, DelayOptions};
use tokio::time::{sleep, Duration, Instant};

#[tokio::main]
async fn main() {
    println!("=== korri-delay Quickstart ===\n");

    // ======================================================================
    // 1. Plain delay with a payload
    // ======================================================================
    let start = Instant::now();
    let coffee = delay(100, DelayOptions::with_value("☕")).await;
    println!("1. Resolved {:?} after {:?}", coffee, start.elapsed());

    // ======================================================================
    // 2. Clear a pending delay: it resolves right away with its payload
    // ======================================================================
    let start = Instant::now();
    let pending = delay(5_000, DelayOptions::with_value("cleared"));
    clear_delay(&pending);
    println!("2. Resolved {:?} after {:?}", pending.await, start.elapsed());

    // ======================================================================
    // 3. Abort with a signal
    // ======================================================================
    let controller: AbortController = AbortController::new();
    let signal = controller.signal();
    tokio::spawn(async move {
        sleep(Duration::from_millis(50)).await;
        controller.abort();
    });
    match delay(1_000, DelayOptions::new().signal(signal)).await {
        Ok(()) => println!("3. Not aborted?"),
        Err(reason) => println!("3. Aborted: {reason}"),
    }

    // ======================================================================
    // 4. Drift statistics
    // ======================================================================
    if let Ok(measured) = delay(100, DelayOptions::with_value(42).stats()).await {
        println!(
            "4. Value {} with drift {} ms",
            measured.value, measured.stats.drift
        );
    }

    // ======================================================================
    // 5. Random duration in [50, 150] ms
    // ======================================================================
    let start = Instant::now();
    let _ = range_delay(50, 150, DelayOptions::new()).await;
    println!("5. Ranged delay took {:?}", start.elapsed());
}
