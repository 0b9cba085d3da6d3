use std::time::Duration;

use speedgate_traits::DigitalInput;
use speedgate_traits::clock::Clock;

use crate::error::{HwError, Result};

/// Poll `pin` until `pred` holds for its level, or an optional timeout
/// expires. Sleeps `poll_interval` between reads to avoid CPU spinning.
pub fn wait_for_level<I: DigitalInput, C: Clock>(
    input: &mut I,
    clock: &C,
    pin: u8,
    pred: impl Fn(bool) -> bool,
    timeout: Option<Duration>,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = timeout.map(|t| clock.now() + t);
    loop {
        let level = input
            .read(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?;
        if pred(level) {
            return Ok(());
        }
        if let Some(d) = deadline
            && clock.now() >= d
        {
            return Err(HwError::PressTimeout);
        }
        clock.sleep(poll_interval);
    }
}
