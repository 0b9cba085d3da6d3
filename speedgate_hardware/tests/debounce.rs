//! Debounced pad behavior over a scripted digital input and a fake clock.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use speedgate_hardware::buttons::{ButtonPins, DebouncedPad};
use speedgate_traits::clock::Clock;
use speedgate_traits::{BitEntry, BitPress, DigitalInput, StartButton};

const PINS: ButtonPins = ButtonPins {
    bit_one: 1,
    bit_zero: 2,
    start: 0,
};

/// Clock that advances only when slept on; never blocks the test.
#[derive(Clone)]
struct StepClock {
    origin: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl StepClock {
    fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock().unwrap()
    }
    fn sleep(&self, d: Duration) {
        *self.offset.lock().unwrap() += d;
    }
}

/// Plays back a per-pin script of levels, one entry per read; holds the last
/// entry forever. Levels are raw (active-low wiring: false = pressed).
struct ScriptedLines {
    scripts: [Vec<bool>; 3],
    cursors: [usize; 3],
}

impl ScriptedLines {
    fn new(start: Vec<bool>, one: Vec<bool>, zero: Vec<bool>) -> Self {
        Self {
            scripts: [start, one, zero],
            cursors: [0; 3],
        }
    }
}

impl DigitalInput for ScriptedLines {
    fn read(&mut self, pin: u8) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let i = usize::from(pin);
        let script = &self.scripts[i];
        let level = script
            .get(self.cursors[i])
            .or(script.last())
            .copied()
            .unwrap_or(true);
        if self.cursors[i] < script.len() {
            self.cursors[i] += 1;
        }
        Ok(level)
    }
}

#[test]
fn one_button_press_decodes_as_one() {
    // "1" line dips low for a few polls then releases; "0" line stays high.
    let lines = ScriptedLines::new(
        vec![true],
        vec![true, false, false, false, true],
        vec![true],
    );
    let mut pad = DebouncedPad::new(lines, StepClock::new(), PINS, true);
    assert_eq!(pad.next_press().unwrap(), BitPress::One);
}

#[test]
fn zero_button_press_decodes_as_zero() {
    let lines = ScriptedLines::new(
        vec![true],
        vec![true],
        vec![true, false, false, false, true],
    );
    let mut pad = DebouncedPad::new(lines, StepClock::new(), PINS, true);
    assert_eq!(pad.next_press().unwrap(), BitPress::Zero);
}

#[test]
fn simultaneous_press_is_reported_not_resolved() {
    let lines = ScriptedLines::new(
        vec![true],
        vec![true, false, false, false, true],
        vec![true, false, false, false, true],
    );
    let mut pad = DebouncedPad::new(lines, StepClock::new(), PINS, true);
    assert_eq!(pad.next_press().unwrap(), BitPress::Both);
}

#[test]
fn press_wait_times_out_when_configured() {
    // All lines held released.
    let lines = ScriptedLines::new(vec![true], vec![true], vec![true]);
    let mut pad = DebouncedPad::new(lines, StepClock::new(), PINS, true)
        .with_timeout(Duration::from_millis(50));
    assert!(pad.next_press().is_err());
}

#[test]
fn start_press_and_release_completes() {
    let lines = ScriptedLines::new(
        vec![true, false, false, true],
        vec![true],
        vec![true],
    );
    let mut pad = DebouncedPad::new(lines, StepClock::new(), PINS, true);
    pad.wait_press().expect("start press");
}
