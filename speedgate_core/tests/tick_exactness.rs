//! Counting must be exact under concurrency, not merely approximate.

use std::thread;
use std::time::Duration;

use speedgate_core::{TickCounter, TickDriver};
use speedgate_traits::MonotonicClock;

#[test]
fn concurrent_ticks_are_all_counted() {
    let counter = TickCounter::new();
    counter.arm();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let c = counter.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..10_000 {
                c.on_tick();
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    counter.disarm();
    assert_eq!(counter.read_when_disarmed().unwrap(), 40_000);
}

#[test]
fn disarm_freezes_the_count_while_the_driver_runs() {
    let counter = TickCounter::new();
    let _driver = TickDriver::spawn(
        counter.clone(),
        Duration::from_micros(100),
        MonotonicClock,
    );

    counter.arm();
    thread::sleep(Duration::from_millis(20));
    counter.disarm();

    let first = counter.read_when_disarmed().unwrap();
    assert!(first > 0, "driver produced no ticks");
    thread::sleep(Duration::from_millis(20));
    let second = counter.read_when_disarmed().unwrap();
    assert_eq!(first, second);
}

#[test]
fn rearm_discards_the_previous_count() {
    let counter = TickCounter::new();
    counter.arm();
    for _ in 0..500 {
        counter.on_tick();
    }
    counter.arm();
    for _ in 0..3 {
        counter.on_tick();
    }
    counter.disarm();
    assert_eq!(counter.read_when_disarmed().unwrap(), 3);
}

#[test]
fn dropping_the_driver_stops_ticking() {
    let counter = TickCounter::new();
    {
        let _driver = TickDriver::spawn(
            counter.clone(),
            Duration::from_micros(100),
            MonotonicClock,
        );
        counter.arm();
        thread::sleep(Duration::from_millis(5));
    }
    counter.disarm();
    let frozen = counter.read_when_disarmed().unwrap();
    counter.arm();
    thread::sleep(Duration::from_millis(5));
    counter.disarm();
    assert_eq!(counter.read_when_disarmed().unwrap(), 0);
    assert!(frozen > 0);
}
