//! Gate contention between the three tasks.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{CRITICAL_READING, Harness, card, config, settle};
use portcullis_hardware::IndicatorState::{Green, Off, Orange};
use portcullis_hardware::mock::NOMINAL_READING;
use portcullis_terminal::TerminalConfig;
use portcullis_terminal::gate::{AcquireTimeout, Gate};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[tokio::test(start_paused = true)]
async fn test_gate_admits_one_holder_at_a_time() {
    let gate = Arc::new(Gate::new("shared", ()));
    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let cancel = CancellationToken::new();

    let mut tasks = JoinSet::new();
    for _ in 0..16 {
        let gate = Arc::clone(&gate);
        let active = Arc::clone(&active);
        let peak = Arc::clone(&peak);
        let cancel = cancel.clone();
        tasks.spawn(async move {
            let _guard = gate.acquire(AcquireTimeout::Unbounded, &cancel).await.unwrap();
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            active.fetch_sub(1, Ordering::SeqCst);
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    assert_eq!(peak.load(Ordering::SeqCst), 1);
    assert!(!gate.is_held());
}

#[tokio::test(start_paused = true)]
async fn test_gate_released_when_holder_fails() {
    async fn failing_use(gate: &Gate<u32>, cancel: &CancellationToken) -> Result<(), String> {
        let mut value = gate
            .acquire(AcquireTimeout::Unbounded, cancel)
            .await
            .map_err(|e| e.to_string())?;
        *value += 1;
        Err("device fault".to_string())
    }

    let gate = Gate::new("shared", 0u32);
    let cancel = CancellationToken::new();

    assert!(failing_use(&gate, &cancel).await.is_err());
    assert!(!gate.is_held());
    assert_eq!(gate.try_acquire().map(|value| *value), Some(1));
}

#[tokio::test(start_paused = true)]
async fn test_channel_is_never_shared() {
    let harness = Harness::start(TerminalConfig {
        liveness_interval_ms: 100,
        ..config()
    })
    .await;
    harness
        .transport
        .set_fallback(portcullis_network::mock::MockReply::body("200 Reader alive"));
    harness.transport.set_latency(Duration::from_millis(300));

    for _ in 0..5 {
        harness.present(card()).await;
        settle(250).await;
    }
    settle(2_000).await;

    assert!(harness.transport.requests().len() > 5);
    assert_eq!(harness.transport.max_in_flight(), 1);

    harness.terminal.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_battery_warning_starves_verdicts() {
    let harness = Harness::start(config()).await;
    harness
        .transport
        .set_fallback(portcullis_network::mock::MockReply::body("100 OK"));

    harness.power.set(CRITICAL_READING);
    settle(1_500).await;
    assert_eq!(harness.states(), vec![Orange]);

    // Reported, but the verdict cannot reach the indicator.
    harness.present(card()).await;
    settle(3_000).await;
    assert_eq!(harness.transport.requests().len(), 1);
    assert_eq!(harness.states(), vec![Orange]);

    harness.power.set(NOMINAL_READING);
    settle(1_500).await;
    assert_eq!(harness.states(), vec![Orange, Off]);

    harness.present(card()).await;
    settle(1_000).await;
    assert_eq!(harness.states(), vec![Orange, Off, Green, Off]);

    harness.terminal.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_battery_warning_waits_for_verdict() {
    let harness = Harness::start(TerminalConfig {
        verdict_display_ms: 5_000,
        ..config()
    })
    .await;
    harness.transport.reply("100 OK");

    harness.present(card()).await;
    settle(100).await;
    harness.power.set(CRITICAL_READING);
    settle(2_000).await;
    assert_eq!(harness.states(), vec![Green]);

    settle(4_000).await;
    assert_eq!(harness.states(), vec![Green, Off, Orange]);

    harness.terminal.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_recovering_on_battery_keeps_warning() {
    let harness = Harness::start(config()).await;

    harness.power.set(CRITICAL_READING);
    settle(1_500).await;
    harness.power.set(portcullis_hardware::PowerReading {
        externally_powered: false,
        battery_mv: 4_000,
    });
    settle(5_000).await;

    assert_eq!(harness.states(), vec![Orange]);

    harness.terminal.shutdown().await;
}
