//! Hardware backends for the speed trap rig.
//!
//! Simulated implementations live here unconditionally; the Raspberry Pi
//! backends (HD44780 LCD, MCP3008 ADC, GPIO buttons) are behind the
//! `hardware` feature and use `rppal`.

pub mod buttons;
pub mod error;
pub mod util;

#[cfg(feature = "hardware")]
pub use rppal;

#[cfg(feature = "hardware")]
pub mod gpio;
#[cfg(feature = "hardware")]
pub mod lcd;
#[cfg(feature = "hardware")]
pub mod mcp3008;

use std::collections::HashMap;
use std::collections::VecDeque;
use std::io::Write as _;
use std::time::{Duration, Instant};

use speedgate_traits::clock::Clock;
use speedgate_traits::{AnalogSampler, BitEntry, BitPress, Display, DigitalOutput, StartButton};

use crate::error::HwError;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Timing profile for one simulated object pass.
#[derive(Debug, Clone, Copy)]
pub struct PassProfile {
    /// Delay from cycle start to the object reaching gate 1.
    pub lead: Duration,
    /// Travel time between the two gates.
    pub transit: Duration,
    /// How long each gate stays occluded.
    pub blocked_for: Duration,
}

impl Default for PassProfile {
    fn default() -> Self {
        Self {
            lead: Duration::from_millis(300),
            transit: Duration::from_millis(250),
            blocked_for: Duration::from_millis(120),
        }
    }
}

/// Simulated photogate pair: replays an object pass on a repeating cycle.
///
/// Ambient reading ~0.49 V, occluded ~4.40 V on the 0-1023 scale, so the
/// default thresholds trip only while a gate is covered. When a cycle
/// completes the epoch resets, so trials can run back to back.
pub struct SimulatedGates<C: Clock> {
    gate1_channel: u8,
    gate2_channel: u8,
    ambient_raw: u16,
    blocked_raw: u16,
    profile: PassProfile,
    epoch: Instant,
    clock: C,
}

impl<C: Clock> SimulatedGates<C> {
    pub fn new(gate1_channel: u8, gate2_channel: u8, profile: PassProfile, clock: C) -> Self {
        let epoch = clock.now();
        Self {
            gate1_channel,
            gate2_channel,
            ambient_raw: 100,
            blocked_raw: 900,
            profile,
            epoch,
            clock,
        }
    }

    fn cycle_len(&self) -> Duration {
        self.profile.lead + self.profile.transit + self.profile.blocked_for
    }

    fn blocked_window(&self, channel: u8) -> Option<(Duration, Duration)> {
        if channel == self.gate1_channel {
            Some((self.profile.lead, self.profile.lead + self.profile.blocked_for))
        } else if channel == self.gate2_channel {
            let open = self.profile.lead + self.profile.transit;
            Some((open, open + self.profile.blocked_for))
        } else {
            None
        }
    }
}

impl<C: Clock> AnalogSampler for SimulatedGates<C> {
    fn sample(&mut self, channel: u8) -> Result<u16, BoxedError> {
        let mut elapsed = self.clock.now().saturating_duration_since(self.epoch);
        if elapsed >= self.cycle_len() {
            // Pass finished; start the next cycle so trials repeat.
            self.epoch = self.clock.now();
            elapsed = Duration::ZERO;
        }
        let Some((open, close)) = self.blocked_window(channel) else {
            return Err(Box::new(HwError::Adc(format!("unknown channel {channel}"))));
        };
        let raw = if elapsed >= open && elapsed < close {
            self.blocked_raw
        } else {
            self.ambient_raw
        };
        tracing::trace!(channel, raw, "simulated gate sample");
        Ok(raw)
    }
}

/// In-memory 16x2 panel. Tracks cursor addressing the way the HD44780 does
/// (row 1 at 0x00.., row 2 at 0x40..) and optionally echoes both lines to
/// stdout so the simulated rig is watchable.
pub struct ConsoleDisplay {
    rows: [[u8; Self::COLS]; 2],
    row: usize,
    col: usize,
    echo: bool,
}

impl ConsoleDisplay {
    pub const COLS: usize = 16;

    pub fn new(echo: bool) -> Self {
        Self {
            rows: [[b' '; Self::COLS]; 2],
            row: 0,
            col: 0,
            echo,
        }
    }

    /// Current panel contents, one String per row (for assertions).
    pub fn line(&self, row: usize) -> String {
        self.rows[row].iter().map(|&b| b as char).collect()
    }

    fn put(&mut self, c: char) -> Result<(), BoxedError> {
        if self.col >= Self::COLS {
            return Err(Box::new(HwError::Display(format!(
                "write past column {} on row {}",
                Self::COLS,
                self.row
            ))));
        }
        self.rows[self.row][self.col] = if c.is_ascii() { c as u8 } else { b'?' };
        self.col += 1;
        Ok(())
    }

    fn echo_panel(&self) {
        if self.echo {
            print!("\r[{}] [{}]", self.line(0), self.line(1));
            let _ = std::io::stdout().flush();
        }
    }
}

impl Display for ConsoleDisplay {
    fn init(&mut self) -> Result<(), BoxedError> {
        self.clear_and_home()
    }

    fn clear_and_home(&mut self) -> Result<(), BoxedError> {
        self.rows = [[b' '; Self::COLS]; 2];
        self.row = 0;
        self.col = 0;
        if self.echo {
            println!();
        }
        Ok(())
    }

    fn move_cursor(&mut self, pos: u8) -> Result<(), BoxedError> {
        let (row, col) = if pos < 0x40 { (0, pos) } else { (1, pos - 0x40) };
        if usize::from(col) >= Self::COLS {
            return Err(Box::new(HwError::Display(format!(
                "cursor position {pos:#04x} out of panel range"
            ))));
        }
        self.row = row;
        self.col = usize::from(col);
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> Result<(), BoxedError> {
        for c in text.chars() {
            self.put(c)?;
        }
        self.echo_panel();
        Ok(())
    }

    fn write_char(&mut self, c: char) -> Result<(), BoxedError> {
        self.put(c)?;
        self.echo_panel();
        Ok(())
    }
}

/// Bit pad that replays a fixed sequence of debounced presses.
pub struct ScriptedBitPad {
    presses: VecDeque<BitPress>,
    served: usize,
}

impl ScriptedBitPad {
    pub fn new(presses: impl Into<VecDeque<BitPress>>) -> Self {
        Self {
            presses: presses.into(),
            served: 0,
        }
    }

    /// Eight presses spelling out `byte`, MSB first.
    pub fn from_byte(byte: u8) -> Self {
        let presses = (0..8)
            .rev()
            .map(|i| {
                if byte & (1 << i) != 0 {
                    BitPress::One
                } else {
                    BitPress::Zero
                }
            })
            .collect::<VecDeque<_>>();
        Self::new(presses)
    }
}

impl BitEntry for ScriptedBitPad {
    fn next_press(&mut self) -> Result<BitPress, BoxedError> {
        match self.presses.pop_front() {
            Some(p) => {
                self.served += 1;
                Ok(p)
            }
            None => Err(Box::new(HwError::EntryExhausted(self.served))),
        }
    }
}

/// Start button that "presses itself" after a fixed delay.
pub struct AutoStart<C: Clock> {
    delay: Duration,
    clock: C,
}

impl<C: Clock> AutoStart<C> {
    pub fn new(delay: Duration, clock: C) -> Self {
        Self { delay, clock }
    }
}

impl<C: Clock> StartButton for AutoStart<C> {
    fn wait_press(&mut self) -> Result<(), BoxedError> {
        self.clock.sleep(self.delay);
        Ok(())
    }
}

/// Digital output backed by a map of pin levels.
#[derive(Default)]
pub struct SimulatedPin {
    levels: HashMap<u8, bool>,
}

impl SimulatedPin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn level(&self, pin: u8) -> Option<bool> {
        self.levels.get(&pin).copied()
    }
}

impl DigitalOutput for SimulatedPin {
    fn write(&mut self, pin: u8, level: bool) -> Result<(), BoxedError> {
        tracing::debug!(pin, level, "simulated pin write");
        self.levels.insert(pin, level);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speedgate_traits::clock::MonotonicClock;

    #[test]
    fn scripted_pad_spells_byte_msb_first() {
        let mut pad = ScriptedBitPad::from_byte(0x85);
        let mut bits = Vec::new();
        for _ in 0..8 {
            bits.push(pad.next_press().unwrap());
        }
        use BitPress::{One, Zero};
        assert_eq!(bits, vec![One, Zero, Zero, Zero, Zero, One, Zero, One]);
        assert!(pad.next_press().is_err());
    }

    #[test]
    fn console_display_tracks_both_rows() {
        let mut d = ConsoleDisplay::new(false);
        d.init().unwrap();
        d.write_str("1: 0.48").unwrap();
        d.move_cursor(0x40).unwrap();
        d.write_str("2: 0.43").unwrap();
        assert!(d.line(0).starts_with("1: 0.48"));
        assert!(d.line(1).starts_with("2: 0.43"));
    }

    #[test]
    fn console_display_rejects_out_of_range_cursor() {
        let mut d = ConsoleDisplay::new(false);
        assert!(d.move_cursor(0x10).is_err());
        assert!(d.move_cursor(0x50).is_err());
        assert!(d.move_cursor(0x4F).is_ok());
    }

    #[test]
    fn simulated_gates_block_in_sequence() {
        let profile = PassProfile {
            lead: Duration::from_millis(20),
            transit: Duration::from_millis(40),
            blocked_for: Duration::from_millis(15),
        };
        let clock = MonotonicClock::new();
        let mut gates = SimulatedGates::new(13, 11, profile, clock);

        // Before the lead both gates read ambient.
        assert!(gates.sample(13).unwrap() < 500);
        assert!(gates.sample(11).unwrap() < 500);

        std::thread::sleep(Duration::from_millis(25));
        assert!(gates.sample(13).unwrap() > 500, "gate 1 should be covered");
        assert!(gates.sample(11).unwrap() < 500, "gate 2 not yet");

        std::thread::sleep(Duration::from_millis(40));
        assert!(gates.sample(11).unwrap() > 500, "gate 2 covered after transit");
    }

    #[test]
    fn simulated_gates_reject_unknown_channel() {
        let mut gates = SimulatedGates::new(
            13,
            11,
            PassProfile::default(),
            MonotonicClock::new(),
        );
        assert!(gates.sample(7).is_err());
    }
}
