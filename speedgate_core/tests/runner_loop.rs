//! Runner tallying and shutdown behavior with a live tick driver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use speedgate_core::mocks::{BufferDisplay, InstantStart, ScriptedSampler};
use speedgate_core::{run_trials, DistanceConfig, TrialBuilder, WatchdogConfig};

#[test]
fn aborted_trials_are_tallied_and_the_run_continues() {
    // Gates never trip; the watchdog ends each trial.
    let sampler = ScriptedSampler::new()
        .channel(0, vec![100])
        .channel(1, vec![100]);
    let mut trial = TrialBuilder::new()
        .sampler(sampler)
        .display(BufferDisplay::new())
        .distance(DistanceConfig::from_byte(0x01))
        .watchdog(WatchdogConfig { arm_timeout_ms: 1 })
        .build()
        .unwrap();

    let shutdown = Arc::new(AtomicBool::new(false));
    let summary = run_trials(&mut trial, &mut InstantStart, 3, &shutdown).unwrap();
    assert_eq!(summary.completed, 0);
    assert_eq!(summary.aborted, 3);
}

#[test]
fn preset_shutdown_runs_nothing() {
    let sampler = ScriptedSampler::new()
        .channel(0, vec![900])
        .channel(1, vec![900]);
    let mut trial = TrialBuilder::new()
        .sampler(sampler)
        .display(BufferDisplay::new())
        .distance(DistanceConfig::from_byte(0x01))
        .build()
        .unwrap();

    let shutdown = Arc::new(AtomicBool::new(true));
    shutdown.store(true, Ordering::Relaxed);
    let summary = run_trials(&mut trial, &mut InstantStart, 5, &shutdown).unwrap();
    assert_eq!(summary.total(), 0);
}
