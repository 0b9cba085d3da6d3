use std::time::Duration;

/// Tick period for a configured microsecond interval.
pub fn tick_period(tick_us: u32) -> Duration {
    Duration::from_micros(u64::from(tick_us))
}
