//! Tests for the default, Tokio-backed instance. Time is paused so elapsed
//! durations are exact; Tokio auto-advances the clock while tasks are idle.
use korri_delay::{clear_delay, delay, AbortController, AbortError, DelayOptions};
use tokio::time::{sleep, Duration, Instant};

#[tokio::test(start_paused = true)]
async fn test_delay_resolves_after_duration() {
    let start = Instant::now();
    let result = delay(50, DelayOptions::new()).await;

    assert_eq!(result, Ok(()));
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(50), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(70), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_delay_zero_is_near_immediate() {
    let start = Instant::now();
    delay(0, DelayOptions::new()).await.unwrap();
    assert!(start.elapsed() < Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn test_delay_resolves_falsy_value() {
    assert_eq!(delay(50, DelayOptions::with_value(0)).await, Ok(0));
}

#[tokio::test(start_paused = true)]
async fn test_clear_resolves_immediately() {
    let start = Instant::now();
    let pending = delay(1000, DelayOptions::with_value("success!"));

    clear_delay(&pending);
    let value = pending.await;

    assert_eq!(value, Ok("success!"));
    assert!(start.elapsed() < Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn test_abort_while_pending_rejects() {
    let start = Instant::now();
    let controller: AbortController = AbortController::new();
    let signal = controller.signal();

    tokio::spawn(async move {
        sleep(Duration::from_millis(1)).await;
        controller.abort();
    });

    let result = delay(1000, DelayOptions::new().signal(signal)).await;
    assert_eq!(result, Err(AbortError));
    assert!(start.elapsed() < Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn test_abort_with_value_rejects() {
    let controller: AbortController = AbortController::new();
    let signal = controller.signal();

    tokio::spawn(async move {
        sleep(Duration::from_millis(1)).await;
        controller.abort();
    });

    let result = delay(1000, DelayOptions::with_value(123).signal(signal)).await;
    assert_eq!(result, Err(AbortError));
}

#[tokio::test(start_paused = true)]
async fn test_already_aborted_rejects_immediately() {
    let start = Instant::now();
    let controller: AbortController = AbortController::new();
    controller.abort();

    let result = delay(1000, DelayOptions::new().signal(controller.signal())).await;
    assert_eq!(result, Err(AbortError));
    assert!(start.elapsed() < Duration::from_millis(30));
}

#[tokio::test(start_paused = true)]
async fn test_stats_report_small_drift() {
    let measured = delay(100, DelayOptions::with_value("☕").stats())
        .await
        .unwrap();

    assert_eq!(measured.value, "☕");
    assert!((0..=2).contains(&measured.stats.drift), "{:?}", measured.stats);
}

#[tokio::test(start_paused = true)]
async fn test_cleared_stats_drift_is_negative() {
    let pending = delay(500, DelayOptions::new().stats());
    sleep(Duration::from_millis(100)).await;
    clear_delay(pending.id());

    let measured = pending.await.unwrap();
    assert!((-401..=-399).contains(&measured.stats.drift), "{:?}", measured.stats);
}

#[tokio::test]
async fn test_delay_on_real_clock() {
    // Same property without paused time; bounds are generous for CI jitter.
    let start = std::time::Instant::now();
    delay(50, DelayOptions::new()).await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= Duration::from_millis(50), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(500), "{elapsed:?}");
}
