//! HD44780-compatible character panel in 4-bit transfer mode.
//!
//! Write-only wiring: RS, EN, and data lines D4-D7; R/W is strapped to
//! ground. Commands and timing follow the Optrex/Hitachi datasheet sequence.

use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use tracing::trace;

use crate::error::{HwError, Result};
use speedgate_traits::Display;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

const CMD_CLEAR_DISPLAY: u8 = 0x01;
const CMD_ENTRY_MODE: u8 = 0x06; // auto-increment cursor
const CMD_DISPLAY_ON: u8 = 0x0C; // display on, cursor off, blink off
const CMD_FUNCTION_SET: u8 = 0x28; // 4-bit, 2 lines, 5x7 dots
const CMD_SET_DDRAM: u8 = 0x80;

pub struct Lcd4Bit {
    rs: OutputPin,
    en: OutputPin,
    data: [OutputPin; 4], // D4..D7
}

impl Lcd4Bit {
    pub fn new(gpio: &Gpio, rs: u8, en: u8, data: [u8; 4]) -> Result<Self> {
        let open_out = |n: u8| -> Result<OutputPin> {
            let mut pin = gpio
                .get(n)
                .map_err(|e| HwError::Display(format!("open lcd pin {n}: {e}")))?
                .into_output();
            pin.set_low();
            Ok(pin)
        };
        Ok(Self {
            rs: open_out(rs)?,
            en: open_out(en)?,
            data: [
                open_out(data[0])?,
                open_out(data[1])?,
                open_out(data[2])?,
                open_out(data[3])?,
            ],
        })
    }

    /// Strobe EN high then low; the falling edge latches the nibble.
    fn strobe(&mut self) {
        self.en.set_high();
        std::thread::sleep(Duration::from_micros(20));
        self.en.set_low();
    }

    fn put_nibble(&mut self, nibble: u8) {
        for (i, pin) in self.data.iter_mut().enumerate() {
            if nibble & (1 << i) != 0 {
                pin.set_high();
            } else {
                pin.set_low();
            }
        }
        self.strobe();
        std::thread::sleep(Duration::from_micros(20));
    }

    fn write_byte(&mut self, data_mode: bool, byte: u8) {
        if data_mode {
            self.rs.set_high();
        } else {
            self.rs.set_low();
        }
        self.put_nibble(byte >> 4);
        self.put_nibble(byte & 0x0F);
    }

    fn command(&mut self, cmd: u8) {
        self.write_byte(false, cmd);
    }
}

impl Display for Lcd4Bit {
    fn init(&mut self) -> std::result::Result<(), BoxedError> {
        // Datasheet asks for >40 ms after power before the first command.
        std::thread::sleep(Duration::from_millis(50));
        self.command(CMD_FUNCTION_SET);
        self.command(CMD_DISPLAY_ON);
        self.clear_and_home()?;
        self.command(CMD_ENTRY_MODE);
        Ok(())
    }

    fn clear_and_home(&mut self) -> std::result::Result<(), BoxedError> {
        self.command(CMD_CLEAR_DISPLAY);
        std::thread::sleep(Duration::from_millis(2));
        Ok(())
    }

    fn move_cursor(&mut self, pos: u8) -> std::result::Result<(), BoxedError> {
        self.command(CMD_SET_DDRAM | (pos & 0x7F));
        std::thread::sleep(Duration::from_millis(2));
        Ok(())
    }

    fn write_str(&mut self, text: &str) -> std::result::Result<(), BoxedError> {
        for c in text.chars() {
            self.write_char(c)?;
        }
        Ok(())
    }

    fn write_char(&mut self, c: char) -> std::result::Result<(), BoxedError> {
        let byte = if c.is_ascii() { c as u8 } else { b'?' };
        trace!(c = %c, "lcd putch");
        self.write_byte(true, byte);
        Ok(())
    }
}
