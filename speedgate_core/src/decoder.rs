//! Bit-serial distance entry.
//!
//! The operator keys in a Q5.3 distance byte one bit at a time, most
//! significant bit first, using the one/zero buttons. Each accepted bit is
//! echoed to the display. A simultaneous press of both buttons resolves
//! according to the configured [`BitPolicy`].

use speedgate_traits::{BitEntry, BitPress, Display};
use tracing::{debug, trace};

use crate::error::{Result, TrialError};
use crate::fixed_point::q53_distance_fixed;
use crate::hw_error::map_hw_error;

/// Resolution rule for a simultaneous press of both bit buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BitPolicy {
    /// Both pressed counts as a one.
    #[default]
    PreferOne,
    /// Both pressed counts as a zero.
    PreferZero,
}

impl BitPolicy {
    fn resolve(self, press: BitPress) -> u8 {
        match (press, self) {
            (BitPress::One, _) => 1,
            (BitPress::Zero, _) => 0,
            (BitPress::Both, BitPolicy::PreferOne) => 1,
            (BitPress::Both, BitPolicy::PreferZero) => 0,
        }
    }
}

/// Validated distance for a trial: the raw Q5.3 byte plus its fixed-point
/// expansion, computed once at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistanceConfig {
    byte: u8,
    distance_fixed: u32,
}

impl DistanceConfig {
    /// Accept any byte; the Q5.3 encoding is total over `u8`.
    pub fn from_byte(byte: u8) -> Self {
        Self {
            byte,
            distance_fixed: q53_distance_fixed(byte),
        }
    }

    /// Build from whole inches and eighths. Errors when either component
    /// exceeds its field width.
    pub fn from_parts(inches: u8, eighths: u8) -> Result<Self> {
        if inches > 31 {
            return Err(TrialError::Range("inches").into());
        }
        if eighths > 7 {
            return Err(TrialError::Range("eighths").into());
        }
        Ok(Self::from_byte((inches << 3) | eighths))
    }

    pub fn byte(&self) -> u8 {
        self.byte
    }

    pub fn distance_fixed(&self) -> u32 {
        self.distance_fixed
    }

    /// Whole inches component.
    pub fn inches(&self) -> u8 {
        self.byte >> 3
    }

    /// Eighths component.
    pub fn eighths(&self) -> u8 {
        self.byte & 0x07
    }
}

/// Collect eight bit presses into a distance byte, echoing each bit.
///
/// Bits arrive most significant first. The pad blocks on each press; a pad
/// error (timeout, exhausted script) aborts entry.
pub fn decode_distance<B, D>(pad: &mut B, display: &mut D, policy: BitPolicy) -> Result<DistanceConfig>
where
    B: BitEntry + ?Sized,
    D: Display + ?Sized,
{
    let mut byte = 0u8;
    for i in 0..8 {
        let press = pad.next_press().map_err(|e| map_hw_error(e.as_ref()))?;
        let bit = policy.resolve(press);
        trace!(bit, index = i, "distance bit accepted");
        byte = (byte << 1) | bit;
        let glyph = if bit == 1 { '1' } else { '0' };
        display
            .write_char(glyph)
            .map_err(|e| map_hw_error(e.as_ref()))?;
    }
    let cfg = DistanceConfig::from_byte(byte);
    debug!(
        byte = format_args!("{byte:#04x}"),
        fixed = cfg.distance_fixed,
        "distance entered"
    );
    Ok(cfg)
}
