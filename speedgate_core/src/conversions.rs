//! Conversions from file-backed `speedgate_config` types into core config.

use crate::config::{DecoderConfig, GateConfig, TimerConfig, WatchdogConfig};
use crate::decoder::BitPolicy;

impl From<&speedgate_config::Gates> for GateConfig {
    fn from(g: &speedgate_config::Gates) -> Self {
        Self {
            gate1_channel: g.gate1_channel,
            gate2_channel: g.gate2_channel,
            gate1_threshold_cv: g.gate1_threshold_cv,
            gate2_threshold_cv: g.gate2_threshold_cv,
        }
    }
}

impl From<&speedgate_config::Timer> for TimerConfig {
    fn from(t: &speedgate_config::Timer) -> Self {
        // Validation bounds tick_us well inside u32 range.
        Self {
            tick_us: t.tick_us.min(u64::from(u32::MAX)) as u32,
        }
    }
}

impl From<speedgate_config::BitPolicy> for BitPolicy {
    fn from(p: speedgate_config::BitPolicy) -> Self {
        match p {
            speedgate_config::BitPolicy::PreferOne => BitPolicy::PreferOne,
            speedgate_config::BitPolicy::PreferZero => BitPolicy::PreferZero,
        }
    }
}

impl From<&speedgate_config::Decoder> for DecoderConfig {
    fn from(d: &speedgate_config::Decoder) -> Self {
        Self {
            bit_policy: d.bit_policy.into(),
        }
    }
}

impl From<&speedgate_config::Watchdog> for WatchdogConfig {
    fn from(w: &speedgate_config::Watchdog) -> Self {
        Self {
            arm_timeout_ms: w.arm_timeout_ms.min(u64::from(u32::MAX)) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_and_watchdog_map_through() {
        let t = speedgate_config::Timer { tick_us: 250 };
        assert_eq!(TimerConfig::from(&t).tick_us, 250);

        let w = speedgate_config::Watchdog {
            arm_timeout_ms: 5_000,
        };
        assert_eq!(WatchdogConfig::from(&w).arm_timeout_ms, 5_000);
    }

    #[test]
    fn bit_policy_maps() {
        assert_eq!(
            BitPolicy::from(speedgate_config::BitPolicy::PreferZero),
            BitPolicy::PreferZero
        );
    }
}
