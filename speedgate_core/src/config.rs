//! Trial configuration as consumed by the core.
//!
//! These are plain structs, decoupled from any file format. The `speedgate_config`
//! crate owns parsing and validation; `conversions` maps its types into these.

use crate::decoder::BitPolicy;

/// Photogate channels and trip thresholds, in centivolts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateConfig {
    pub gate1_channel: u8,
    pub gate2_channel: u8,
    pub gate1_threshold_cv: u16,
    pub gate2_threshold_cv: u16,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            gate1_channel: 0,
            gate2_channel: 1,
            gate1_threshold_cv: 230,
            gate2_threshold_cv: 230,
        }
    }
}

/// Tick period for the timing thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Microseconds per tick. 100 gives the canonical 0.1 ms resolution.
    pub tick_us: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self { tick_us: 100 }
    }
}

/// Distance-entry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderConfig {
    pub bit_policy: BitPolicy,
}

/// Stuck-gate watchdog. Zero timeout disables it, which is the default: a
/// trial with no object in flight simply waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WatchdogConfig {
    pub arm_timeout_ms: u32,
}

impl WatchdogConfig {
    pub fn enabled(&self) -> bool {
        self.arm_timeout_ms > 0
    }

    /// Timeout expressed in ticks at the given tick period, rounded up.
    pub fn timeout_ticks(&self, tick_us: u32) -> Option<u32> {
        if !self.enabled() || tick_us == 0 {
            return None;
        }
        let timeout_us = u64::from(self.arm_timeout_ms) * 1_000;
        let ticks = timeout_us.div_ceil(u64::from(tick_us));
        Some(ticks.min(u64::from(u32::MAX)) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watchdog_disabled_by_default() {
        let w = WatchdogConfig::default();
        assert!(!w.enabled());
        assert_eq!(w.timeout_ticks(100), None);
    }

    #[test]
    fn watchdog_ticks_round_up() {
        let w = WatchdogConfig { arm_timeout_ms: 1 };
        assert_eq!(w.timeout_ticks(100), Some(10));
        assert_eq!(w.timeout_ticks(300), Some(4));
    }
}
