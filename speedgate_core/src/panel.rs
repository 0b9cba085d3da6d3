//! Fixed panel layout for a 2x16 character display.
//!
//! Addressing follows HD44780 DDRAM: row one starts at 0x00, row two at
//! 0x40. Gate voltages live at the row starts, the entered distance at
//! column 9 of row one, and the speed readout at column 8 of row two.

use speedgate_traits::Display;

use crate::error::Result;
use crate::fixed_point::split_digits;
use crate::hw_error::map_hw_error;
use crate::speed::SpeedReading;

pub const LINE1: u8 = 0x00;
pub const LINE2: u8 = 0x40;
pub const DIST_POS: u8 = 0x09;
pub const SPEED_POS: u8 = 0x48;

fn digit_char(d: u8) -> char {
    (b'0' + d) as char
}

/// Clear the panel and position the cursor for bit-by-bit distance echo.
pub fn prompt_distance<D: Display + ?Sized>(display: &mut D) -> Result<()> {
    display.clear_and_home().map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_str("d:")
        .map_err(|e| map_hw_error(e.as_ref()))?;
    Ok(())
}

/// Render the entered distance as `XX.XXX"` at its fixed position.
///
/// With distance in units of 10_000 per inch, dividing by ten yields a
/// five-digit value read as inches with three decimals.
pub fn show_distance<D: Display + ?Sized>(display: &mut D, distance_fixed: u32) -> Result<()> {
    let digits = split_digits::<5>(distance_fixed / 10, "distance")?;
    display
        .move_cursor(DIST_POS)
        .map_err(|e| map_hw_error(e.as_ref()))?;
    for (i, d) in digits.into_iter().enumerate() {
        if i == 2 {
            display
                .write_char('.')
                .map_err(|e| map_hw_error(e.as_ref()))?;
        }
        display
            .write_char(digit_char(d))
            .map_err(|e| map_hw_error(e.as_ref()))?;
    }
    display
        .write_char('"')
        .map_err(|e| map_hw_error(e.as_ref()))?;
    Ok(())
}

/// Render a gate's live voltage as `N: X.XX` at the start of its row.
pub fn show_gate_voltage<D: Display + ?Sized>(display: &mut D, gate: u8, centivolts: u16) -> Result<()> {
    let row = if gate == 1 { LINE1 } else { LINE2 };
    let digits = split_digits::<3>(u32::from(centivolts.min(999)), "voltage")?;
    display
        .move_cursor(row)
        .map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_char(digit_char(gate))
        .map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_str(": ")
        .map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_char(digit_char(digits[0]))
        .map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_char('.')
        .map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_char(digit_char(digits[1]))
        .map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_char(digit_char(digits[2]))
        .map_err(|e| map_hw_error(e.as_ref()))?;
    Ok(())
}

/// Render the final speed as `v:XX.XX` at its fixed position.
pub fn show_speed<D: Display + ?Sized>(display: &mut D, reading: SpeedReading) -> Result<()> {
    let digits = split_digits::<4>(reading.scaled, "speed")?;
    display
        .move_cursor(SPEED_POS)
        .map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_str("v:")
        .map_err(|e| map_hw_error(e.as_ref()))?;
    for (i, d) in digits.into_iter().enumerate() {
        if i == 2 {
            display
                .write_char('.')
                .map_err(|e| map_hw_error(e.as_ref()))?;
        }
        display
            .write_char(digit_char(d))
            .map_err(|e| map_hw_error(e.as_ref()))?;
    }
    Ok(())
}

/// Replace the speed readout with an error marker.
pub fn show_error<D: Display + ?Sized>(display: &mut D) -> Result<()> {
    display
        .move_cursor(SPEED_POS)
        .map_err(|e| map_hw_error(e.as_ref()))?;
    display
        .write_str("v:Err  ")
        .map_err(|e| map_hw_error(e.as_ref()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::BufferDisplay;

    #[test]
    fn distance_render() {
        let mut d = BufferDisplay::new();
        show_distance(&mut d, 166_250).unwrap();
        assert_eq!(d.row_text(0).trim_end(), "         16.625\"");
    }

    #[test]
    fn speed_render() {
        let mut d = BufferDisplay::new();
        show_speed(&mut d, SpeedReading { scaled: 1234 }).unwrap();
        assert!(d.row_text(1).contains("v:12.34"));
    }

    #[test]
    fn gate_voltage_render() {
        let mut d = BufferDisplay::new();
        show_gate_voltage(&mut d, 1, 230).unwrap();
        show_gate_voltage(&mut d, 2, 45).unwrap();
        assert!(d.row_text(0).starts_with("1: 2.30"));
        assert!(d.row_text(1).starts_with("2: 0.45"));
    }

    #[test]
    fn error_marker_overwrites_speed_field() {
        let mut d = BufferDisplay::new();
        show_speed(&mut d, SpeedReading { scaled: 9999 }).unwrap();
        show_error(&mut d).unwrap();
        assert!(d.row_text(1).contains("v:Err"));
        assert!(!d.row_text(1).contains("99.99"));
    }
}
