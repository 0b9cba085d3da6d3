//! Debounced button decoding over raw digital inputs.
//!
//! The trap rig wires three momentary buttons: the "1" and "0" bit-entry
//! lines and the start/reset line, all active-low with pull-ups. This module
//! turns busy-wait debouncing into the blocking `BitEntry`/`StartButton`
//! abstractions the core consumes, so the decoder and state machine carry no
//! timing loops of their own.

use std::time::Duration;

use speedgate_traits::clock::Clock;
use speedgate_traits::{BitEntry, BitPress, DigitalInput, StartButton};

use crate::error::HwError;
use crate::util::wait_for_level;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Pin assignment for the three buttons.
#[derive(Debug, Clone, Copy)]
pub struct ButtonPins {
    pub bit_one: u8,
    pub bit_zero: u8,
    pub start: u8,
}

/// Debounced pad over any `DigitalInput`.
///
/// Press protocol per event: wait for a line to assert, hold off for the
/// debounce window, classify (both lines sampled together, so a simultaneous
/// press is reported as `BitPress::Both`, not silently resolved), then wait
/// for full release plus another debounce window.
pub struct DebouncedPad<I: DigitalInput, C: Clock> {
    input: I,
    clock: C,
    pins: ButtonPins,
    active_low: bool,
    debounce: Duration,
    poll: Duration,
    /// Optional cap on how long to wait for a press; `None` blocks forever.
    timeout: Option<Duration>,
}

impl<I: DigitalInput, C: Clock> DebouncedPad<I, C> {
    pub fn new(input: I, clock: C, pins: ButtonPins, active_low: bool) -> Self {
        Self {
            input,
            clock,
            pins,
            active_low,
            debounce: Duration::from_millis(6),
            poll: Duration::from_millis(1),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn asserted(&mut self, pin: u8) -> Result<bool, HwError> {
        let level = self
            .input
            .read(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        Ok(level != self.active_low)
    }

    fn wait_release(&mut self, pin: u8) -> Result<(), HwError> {
        let active_low = self.active_low;
        wait_for_level(
            &mut self.input,
            &self.clock,
            pin,
            |level| level == active_low,
            None,
            self.poll,
        )
    }

    /// Block until one (or both) of the bit lines asserts, debounced.
    fn wait_bit_press(&mut self) -> Result<BitPress, HwError> {
        let deadline = self.timeout.map(|t| self.clock.now() + t);
        loop {
            if self.asserted(self.pins.bit_one)? || self.asserted(self.pins.bit_zero)? {
                break;
            }
            if let Some(d) = deadline
                && self.clock.now() >= d
            {
                return Err(HwError::PressTimeout);
            }
            self.clock.sleep(self.poll);
        }
        self.clock.sleep(self.debounce);

        let one = self.asserted(self.pins.bit_one)?;
        let zero = self.asserted(self.pins.bit_zero)?;
        let press = match (one, zero) {
            (true, true) => BitPress::Both,
            (true, false) => BitPress::One,
            (false, true) => BitPress::Zero,
            // Released again within the debounce window; count it as a bounce
            // on whichever line we saw first and report nothing special.
            (false, false) => {
                tracing::debug!("press vanished within debounce window, re-arming");
                return self.wait_bit_press();
            }
        };

        self.wait_release(self.pins.bit_one)?;
        self.wait_release(self.pins.bit_zero)?;
        self.clock.sleep(self.debounce);
        Ok(press)
    }
}

impl<I: DigitalInput, C: Clock> BitEntry for DebouncedPad<I, C> {
    fn next_press(&mut self) -> Result<BitPress, BoxedError> {
        self.wait_bit_press().map_err(Into::into)
    }
}

impl<I: DigitalInput, C: Clock> StartButton for DebouncedPad<I, C> {
    fn wait_press(&mut self) -> Result<(), BoxedError> {
        let deadline = self.timeout.map(|t| self.clock.now() + t);
        loop {
            if self.asserted(self.pins.start).map_err(BoxedError::from)? {
                break;
            }
            if let Some(d) = deadline
                && self.clock.now() >= d
            {
                return Err(Box::new(HwError::PressTimeout));
            }
            self.clock.sleep(self.poll);
        }
        self.clock.sleep(self.debounce);
        self.wait_release(self.pins.start)?;
        self.clock.sleep(self.debounce);
        Ok(())
    }
}
