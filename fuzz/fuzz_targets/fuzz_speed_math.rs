#![no_main]
use libfuzzer_sys::fuzz_target;
use speedgate_core::fixed_point::q53_distance_fixed;
use speedgate_core::speed_scaled;

fuzz_target!(|input: (u8, u32)| {
    let (byte, ticks) = input;
    // Every byte is a valid Q5.3 distance and every nonzero tick count must
    // divide cleanly without panicking or overflowing.
    let fixed = q53_distance_fixed(byte);
    match speed_scaled(fixed, ticks) {
        Ok(scaled) => {
            // Flooring division cannot exceed the 1-tick bound.
            assert!(scaled <= fixed.saturating_mul(125) / 22);
        }
        Err(_) => assert_eq!(ticks, 0),
    }
});
