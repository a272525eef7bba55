//! Daemon-mode timer loop behavior
//!
//! These tests run on a paused tokio clock, so interval ticks fire as
//! virtual time is advanced by the test's own sleeps.

mod common;

use common::{ScriptedApi, config};
use splitdns_core::sync::Syncer;
use std::time::Duration;
use tokio::sync::oneshot;

#[tokio::test(start_paused = true)]
async fn cycle_failure_does_not_stop_the_loop() {
    // The first submission fails; the next tick must still fire and succeed.
    let api = ScriptedApi::new().failing_first_updates(1);
    let counters = api.counters();
    let cfg = config(&[("example.com", &["192.168.1.1"])]);
    let syncer = Syncer::new(Box::new(api), cfg);

    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        syncer
            .run_with_shutdown(Duration::from_secs(300), Some(rx))
            .await
    });

    // First cycle at t=0 fails, second at t=300 succeeds.
    tokio::time::sleep(Duration::from_secs(301)).await;
    tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(counters.update_attempts(), 2);
    let submitted = counters.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0]["example.com"], vec!["192.168.1.1"]);
}

#[tokio::test(start_paused = true)]
async fn first_cycle_runs_before_the_interval_elapses() {
    let api = ScriptedApi::new();
    let counters = api.counters();
    let cfg = config(&[("example.com", &["192.168.1.1"])]);
    let syncer = Syncer::new(Box::new(api), cfg);

    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        syncer
            .run_with_shutdown(Duration::from_secs(3600), Some(rx))
            .await
    });

    // Well under one interval of virtual time.
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(counters.update_attempts(), 1);

    tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn ticks_keep_firing_at_the_configured_interval() {
    let api = ScriptedApi::new();
    let counters = api.counters();
    let cfg = config(&[("example.com", &["192.168.1.1"])]);
    let syncer = Syncer::new(Box::new(api), cfg);

    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        syncer
            .run_with_shutdown(Duration::from_secs(60), Some(rx))
            .await
    });

    // t=0, t=60, t=120.
    tokio::time::sleep(Duration::from_secs(121)).await;
    tx.send(()).unwrap();
    handle.await.unwrap().unwrap();

    assert_eq!(counters.update_attempts(), 3);
}

#[tokio::test]
async fn shutdown_signal_stops_an_idle_loop() {
    let api = ScriptedApi::new();
    let cfg = config(&[]);
    let syncer = Syncer::new(Box::new(api), cfg);

    let (tx, rx) = oneshot::channel();
    let handle = tokio::spawn(async move {
        syncer
            .run_with_shutdown(Duration::from_secs(1), Some(rx))
            .await
    });

    tx.send(()).unwrap();
    handle.await.unwrap().unwrap();
}
