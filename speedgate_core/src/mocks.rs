//! In-memory test doubles for the hardware traits.
//!
//! Used by unit and integration tests and by the benches; none of these
//! touch real hardware.

use std::collections::HashMap;

use speedgate_traits::{
    AnalogSampler, BitEntry, BitPress, BoxedError, DigitalOutput, Display, StartButton,
};

/// Sampler fed from per-channel scripts. Once a script runs out the last
/// value repeats, so a "blocked" reading can be held indefinitely.
#[derive(Debug, Default)]
pub struct ScriptedSampler {
    scripts: HashMap<u8, Vec<u16>>,
    cursors: HashMap<u8, usize>,
}

impl ScriptedSampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(mut self, channel: u8, readings: Vec<u16>) -> Self {
        self.scripts.insert(channel, readings);
        self
    }
}

impl AnalogSampler for ScriptedSampler {
    fn sample(&mut self, channel: u8) -> Result<u16, BoxedError> {
        let script = self
            .scripts
            .get(&channel)
            .ok_or_else(|| format!("no script for channel {channel}"))?;
        if script.is_empty() {
            return Err(format!("empty script for channel {channel}").into());
        }
        let cursor = self.cursors.entry(channel).or_insert(0);
        let value = script[(*cursor).min(script.len() - 1)];
        *cursor += 1;
        Ok(value)
    }
}

/// 2x16 character buffer implementing the display trait, with HD44780 row
/// addressing (row two starts at 0x40).
#[derive(Debug)]
pub struct BufferDisplay {
    rows: [[u8; 16]; 2],
    cursor: (usize, usize),
}

impl Default for BufferDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferDisplay {
    pub fn new() -> Self {
        Self {
            rows: [[b' '; 16]; 2],
            cursor: (0, 0),
        }
    }

    pub fn row_text(&self, row: usize) -> String {
        String::from_utf8_lossy(&self.rows[row]).into_owned()
    }

    fn put(&mut self, ch: char) -> Result<(), BoxedError> {
        let (row, col) = self.cursor;
        if col >= 16 {
            return Err(format!("write past end of row {row}").into());
        }
        self.rows[row][col] = ch as u8;
        self.cursor = (row, col + 1);
        Ok(())
    }
}

impl Display for BufferDisplay {
    fn init(&mut self) -> Result<(), BoxedError> {
        self.clear_and_home()
    }

    fn clear_and_home(&mut self) -> Result<(), BoxedError> {
        self.rows = [[b' '; 16]; 2];
        self.cursor = (0, 0);
        Ok(())
    }

    fn move_cursor(&mut self, pos: u8) -> Result<(), BoxedError> {
        let (row, col) = if pos >= 0x40 {
            (1, usize::from(pos - 0x40))
        } else {
            (0, usize::from(pos))
        };
        if col >= 16 {
            return Err(format!("cursor {pos:#04x} out of range").into());
        }
        self.cursor = (row, col);
        Ok(())
    }

    fn write_str(&mut self, s: &str) -> Result<(), BoxedError> {
        for ch in s.chars() {
            self.put(ch)?;
        }
        Ok(())
    }

    fn write_char(&mut self, ch: char) -> Result<(), BoxedError> {
        self.put(ch)
    }
}

/// Records every pin write. The log is shared so a test can keep a handle
/// after the recorder moves behind a `Box<dyn DigitalOutput>`.
#[derive(Debug, Default, Clone)]
pub struct PinRecorder {
    writes: std::sync::Arc<std::sync::Mutex<Vec<(u8, bool)>>>,
}

impl PinRecorder {
    pub fn writes(&self) -> Vec<(u8, bool)> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }
}

impl DigitalOutput for PinRecorder {
    fn write(&mut self, pin: u8, level: bool) -> Result<(), BoxedError> {
        if let Ok(mut w) = self.writes.lock() {
            w.push((pin, level));
        }
        Ok(())
    }
}

/// Start button that reports a press immediately.
#[derive(Debug, Default)]
pub struct InstantStart;

impl StartButton for InstantStart {
    fn wait_press(&mut self) -> Result<(), BoxedError> {
        Ok(())
    }
}

/// Bit pad that replays a fixed byte, most significant bit first.
#[derive(Debug)]
pub struct ScriptedPad {
    presses: Vec<BitPress>,
    cursor: usize,
}

impl ScriptedPad {
    pub fn from_byte(byte: u8) -> Self {
        let presses = (0..8)
            .rev()
            .map(|i| {
                if (byte >> i) & 1 == 1 {
                    BitPress::One
                } else {
                    BitPress::Zero
                }
            })
            .collect();
        Self { presses, cursor: 0 }
    }

    pub fn from_presses(presses: Vec<BitPress>) -> Self {
        Self { presses, cursor: 0 }
    }
}

impl BitEntry for ScriptedPad {
    fn next_press(&mut self) -> Result<BitPress, BoxedError> {
        let press = self
            .presses
            .get(self.cursor)
            .copied()
            .ok_or("bit pad script exhausted")?;
        self.cursor += 1;
        Ok(press)
    }
}
