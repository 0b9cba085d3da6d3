//! Fixed-point helpers for distance and ADC conversions.
//!
//! Distances are carried as integers scaled by 10_000 per inch so that
//! eighth-inch quanta stay exact (one eighth = 1_250 units). All arithmetic
//! is integer-only; no floating point enters the measurement path.

use crate::error::TrialError;

/// Fixed-point units per inch.
pub const DISTANCE_SCALE: u32 = 10_000;

/// Fixed-point units per eighth of an inch.
pub const EIGHTH_FIXED: u32 = 1_250;

/// Largest encodable distance: 31 inches + 7/8 in fixed-point units.
pub const MAX_DISTANCE_FIXED: u32 = 31 * DISTANCE_SCALE + 7 * EIGHTH_FIXED;

/// Decode a Q5.3 distance byte into fixed-point units.
///
/// The high five bits carry whole inches (0..=31) and the low three bits
/// carry eighths (0..=7). Every byte value is a valid encoding.
pub fn q53_distance_fixed(byte: u8) -> u32 {
    let inches = u32::from(byte >> 3);
    let eighths = u32::from(byte & 0x07);
    inches * DISTANCE_SCALE + eighths * EIGHTH_FIXED
}

/// Convert a raw 10-bit ADC reading to centivolts on a 5 V scale.
///
/// Readings above the 10-bit range are clamped before scaling.
pub fn adc_to_centivolts(raw: u16) -> u16 {
    let raw = u32::from(raw.min(1023));
    ((raw * 500) / 1023) as u16
}

/// Split a value into exactly `N` decimal digits, most significant first.
///
/// Returns `TrialError::Range` when the value does not fit in `N` digits;
/// out-of-range values must surface as errors rather than wrap silently.
pub fn split_digits<const N: usize>(value: u32, what: &'static str) -> Result<[u8; N], TrialError> {
    let mut digits = [0u8; N];
    let mut rest = value;
    for slot in digits.iter_mut().rev() {
        *slot = (rest % 10) as u8;
        rest /= 10;
    }
    if rest != 0 {
        return Err(TrialError::Range(what));
    }
    Ok(digits)
}
