//! Integration tests for the turn clock.
//!
//! All tests run with paused Tokio time, so `sleep_until` resolves as
//! soon as the test advances the clock — deterministic and instant.

use std::time::Duration;

use tokio::time;
use zoka_clock::TurnClock;

#[test]
fn test_new_clock_is_disarmed() {
    let clock = TurnClock::new();
    assert!(!clock.is_armed());
    assert_eq!(clock.remaining(), None);
    assert_eq!(clock.generation(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_expired_fires_at_the_deadline() {
    let mut clock = TurnClock::new();
    let generation = clock.arm(Duration::from_secs(20));

    time::advance(Duration::from_secs(20)).await;
    let fired = clock.expired().await;
    assert_eq!(fired.generation, generation);
    assert!(!clock.is_armed(), "clock disarms itself after firing");
}

#[tokio::test(start_paused = true)]
async fn test_expired_pends_before_the_deadline() {
    let mut clock = TurnClock::new();
    clock.arm(Duration::from_secs(20));

    time::advance(Duration::from_secs(19)).await;
    let premature =
        time::timeout(Duration::from_millis(1), clock.expired()).await;
    assert!(premature.is_err(), "must not fire a second early");
    assert!(clock.is_armed(), "losing the race keeps the deadline armed");
}

#[tokio::test(start_paused = true)]
async fn test_disarmed_clock_pends_forever() {
    let mut clock = TurnClock::new();
    let waited =
        time::timeout(Duration::from_secs(3600), clock.expired()).await;
    assert!(waited.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_disarm_cancels_pending_deadline() {
    let mut clock = TurnClock::new();
    clock.arm(Duration::from_secs(20));
    clock.disarm();
    assert!(!clock.is_armed());

    time::advance(Duration::from_secs(60)).await;
    let waited = time::timeout(Duration::from_secs(1), clock.expired()).await;
    assert!(waited.is_err(), "cancelled deadline must never fire");
}

#[tokio::test(start_paused = true)]
async fn test_rearm_replaces_deadline_and_bumps_generation() {
    let mut clock = TurnClock::new();
    let first = clock.arm(Duration::from_secs(20));
    let second = clock.arm(Duration::from_secs(20));
    assert!(second > first);

    // The original deadline's instant passes; only the new one counts.
    time::advance(Duration::from_secs(20)).await;
    let fired = clock.expired().await;
    assert_eq!(fired.generation, second);
}

#[tokio::test(start_paused = true)]
async fn test_remaining_counts_down() {
    let mut clock = TurnClock::new();
    clock.arm(Duration::from_secs(20));
    time::advance(Duration::from_secs(5)).await;
    assert_eq!(clock.remaining(), Some(Duration::from_secs(15)));
}

#[tokio::test(start_paused = true)]
async fn test_clock_works_inside_select_loop() {
    // The intended integration shape: command channel + clock.
    let (tx, mut rx) = tokio::sync::mpsc::channel::<u32>(4);
    let mut clock = TurnClock::new();
    clock.arm(Duration::from_secs(20));

    tx.send(7).await.unwrap();
    tokio::select! {
        Some(cmd) = rx.recv() => {
            assert_eq!(cmd, 7);
            clock.disarm();
        }
        _ = clock.expired() => panic!("command must win while time is paused"),
    }
    assert!(!clock.is_armed());
}
