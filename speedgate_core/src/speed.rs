//! Exact integer speed computation.
//!
//! With distance in fixed-point units (10_000 per inch) and elapsed time in
//! 0.1 ms ticks, miles per hour scaled by 100 come out as
//! `distance_fixed * 125 / (22 * ticks)`, derived from
//! 3600 s/h / (63360 in/mi) with all scale factors folded in. The division
//! floors, matching the display's truncation to hundredths.

use crate::error::TrialError;

/// A completed speed measurement, scaled by 100 (hundredths of mph).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeedReading {
    /// Miles per hour times 100.
    pub scaled: u32,
}

impl SpeedReading {
    /// Whole miles per hour, truncated.
    pub fn whole_mph(&self) -> u32 {
        self.scaled / 100
    }

    /// Hundredths remainder, 0..=99.
    pub fn hundredths(&self) -> u32 {
        self.scaled % 100
    }
}

/// Compute speed in hundredths of mph from fixed-point inches and tick count.
///
/// Uses 64-bit intermediates so the full encodable distance range cannot
/// overflow. A zero tick count is rejected; it means the gates fired in the
/// same tick window and no meaningful speed exists.
pub fn speed_scaled(distance_fixed: u32, ticks: u32) -> Result<u32, TrialError> {
    if ticks == 0 {
        return Err(TrialError::ZeroTicks);
    }
    let num = u64::from(distance_fixed) * 125;
    let den = 22u64 * u64::from(ticks);
    Ok((num / den) as u32)
}
