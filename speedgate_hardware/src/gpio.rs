//! rppal-backed digital I/O keyed by BCM pin number.

use std::collections::HashMap;

use rppal::gpio::{Gpio, InputPin, OutputPin};
use speedgate_traits::{DigitalInput, DigitalOutput};

use crate::error::{HwError, Result};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// A set of input pins with pull-ups (buttons are active-low).
pub struct GpioInputs {
    pins: HashMap<u8, InputPin>,
}

impl GpioInputs {
    pub fn open(gpio: &Gpio, pin_numbers: &[u8]) -> Result<Self> {
        let mut pins = HashMap::new();
        for &n in pin_numbers {
            let pin = gpio
                .get(n)
                .map_err(|e| HwError::Gpio(format!("open input pin {n}: {e}")))?
                .into_input_pullup();
            pins.insert(n, pin);
        }
        Ok(Self { pins })
    }
}

impl DigitalInput for GpioInputs {
    fn read(&mut self, pin: u8) -> std::result::Result<bool, BoxedError> {
        let p = self
            .pins
            .get(&pin)
            .ok_or_else(|| HwError::Gpio(format!("input pin {pin} not opened")))?;
        Ok(p.is_high())
    }
}

/// A set of output pins, driven low at open.
pub struct GpioOutputs {
    pins: HashMap<u8, OutputPin>,
}

impl GpioOutputs {
    pub fn open(gpio: &Gpio, pin_numbers: &[u8]) -> Result<Self> {
        let mut pins = HashMap::new();
        for &n in pin_numbers {
            let mut pin = gpio
                .get(n)
                .map_err(|e| HwError::Gpio(format!("open output pin {n}: {e}")))?
                .into_output();
            pin.set_low();
            pins.insert(n, pin);
        }
        Ok(Self { pins })
    }
}

impl DigitalOutput for GpioOutputs {
    fn write(&mut self, pin: u8, level: bool) -> std::result::Result<(), BoxedError> {
        let p = self
            .pins
            .get_mut(&pin)
            .ok_or_else(|| HwError::Gpio(format!("output pin {pin} not opened")))?;
        if level {
            p.set_high();
        } else {
            p.set_low();
        }
        Ok(())
    }
}
