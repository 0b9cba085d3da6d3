//! MCP3008 10-bit ADC over bit-banged SPI.
//!
//! The photogate transistors feed two of the eight channels. Mode 0 SPI,
//! clocked slowly enough from userspace that no explicit delays are needed
//! beyond a settle hint per edge.

use rppal::gpio::{Gpio, InputPin, OutputPin};
use tracing::trace;

use crate::error::{HwError, Result};
use speedgate_traits::AnalogSampler;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

pub struct Mcp3008 {
    clk: OutputPin,
    mosi: OutputPin,
    miso: InputPin,
    cs: OutputPin,
}

impl Mcp3008 {
    pub fn new(gpio: &Gpio, clk: u8, mosi: u8, miso: u8, cs: u8) -> Result<Self> {
        let open_out = |n: u8| -> Result<OutputPin> {
            Ok(gpio
                .get(n)
                .map_err(|e| HwError::Adc(format!("open adc pin {n}: {e}")))?
                .into_output())
        };
        let miso = gpio
            .get(miso)
            .map_err(|e| HwError::Adc(format!("open adc pin {miso}: {e}")))?
            .into_input();
        let mut clk = open_out(clk)?;
        let mut cs = open_out(cs)?;
        let mosi = open_out(mosi)?;
        clk.set_low(); // mode 0: clock idles low
        cs.set_high(); // deselected
        Ok(Self {
            clk,
            mosi,
            miso,
            cs,
        })
    }

    fn clock_out_bit(&mut self, bit: bool) {
        if bit {
            self.mosi.set_high();
        } else {
            self.mosi.set_low();
        }
        self.clk.set_high();
        spin_settle();
        self.clk.set_low();
        spin_settle();
    }

    fn clock_in_bit(&mut self) -> u16 {
        self.clk.set_high();
        spin_settle();
        let bit = u16::from(self.miso.is_high());
        self.clk.set_low();
        spin_settle();
        bit
    }

    fn convert(&mut self, channel: u8) -> Result<u16> {
        if channel > 7 {
            return Err(HwError::Adc(format!("mcp3008 channel {channel} out of range")));
        }
        self.cs.set_low();

        // Start bit, single-ended flag, then the 3 channel-select bits.
        self.clock_out_bit(true);
        self.clock_out_bit(true);
        for shift in (0..3).rev() {
            self.clock_out_bit(channel & (1 << shift) != 0);
        }

        // One null bit, then 10 data bits MSB first.
        let _ = self.clock_in_bit();
        let mut value: u16 = 0;
        for _ in 0..10 {
            value = (value << 1) | self.clock_in_bit();
        }

        self.cs.set_high();
        trace!(channel, raw = value, "mcp3008 conversion");
        Ok(value)
    }
}

impl AnalogSampler for Mcp3008 {
    fn sample(&mut self, channel: u8) -> std::result::Result<u16, BoxedError> {
        self.convert(channel).map_err(Into::into)
    }
}

#[inline(always)]
fn spin_settle() {
    std::hint::spin_loop();
}
