//! Type-state builder for [`TrialCore`].
//!
//! The sampler, display, and distance slots start as [`Missing`] and become
//! the real payload types as they are supplied; `build` only exists once all
//! three are present, so a half-wired trial is a compile error rather than a
//! runtime one.

use speedgate_traits::{AnalogSampler, DigitalOutput, Display};

use crate::config::{GateConfig, TimerConfig, WatchdogConfig};
use crate::decoder::DistanceConfig;
use crate::error::BuildError;
use crate::trial::TrialCore;

/// Placeholder for a builder slot that has not been filled.
#[derive(Debug, Default)]
pub struct Missing;

pub struct TrialBuilder<A, D, T> {
    sampler: A,
    display: D,
    distance: T,
    gates: GateConfig,
    timer: TimerConfig,
    watchdog: WatchdogConfig,
    indicator: Option<(Box<dyn DigitalOutput>, u8)>,
}

impl TrialBuilder<Missing, Missing, Missing> {
    pub fn new() -> Self {
        Self {
            sampler: Missing,
            display: Missing,
            distance: Missing,
            gates: GateConfig::default(),
            timer: TimerConfig::default(),
            watchdog: WatchdogConfig::default(),
            indicator: None,
        }
    }
}

impl Default for TrialBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, D, T> TrialBuilder<A, D, T> {
    pub fn sampler<A2: AnalogSampler>(self, sampler: A2) -> TrialBuilder<A2, D, T> {
        TrialBuilder {
            sampler,
            display: self.display,
            distance: self.distance,
            gates: self.gates,
            timer: self.timer,
            watchdog: self.watchdog,
            indicator: self.indicator,
        }
    }

    pub fn display<D2: Display>(self, display: D2) -> TrialBuilder<A, D2, T> {
        TrialBuilder {
            sampler: self.sampler,
            display,
            distance: self.distance,
            gates: self.gates,
            timer: self.timer,
            watchdog: self.watchdog,
            indicator: self.indicator,
        }
    }

    pub fn distance(self, distance: DistanceConfig) -> TrialBuilder<A, D, DistanceConfig> {
        TrialBuilder {
            sampler: self.sampler,
            display: self.display,
            distance,
            gates: self.gates,
            timer: self.timer,
            watchdog: self.watchdog,
            indicator: self.indicator,
        }
    }

    pub fn gates(mut self, gates: GateConfig) -> Self {
        self.gates = gates;
        self
    }

    pub fn timer(mut self, timer: TimerConfig) -> Self {
        self.timer = timer;
        self
    }

    pub fn watchdog(mut self, watchdog: WatchdogConfig) -> Self {
        self.watchdog = watchdog;
        self
    }

    pub fn indicator(mut self, output: Box<dyn DigitalOutput>, pin: u8) -> Self {
        self.indicator = Some((output, pin));
        self
    }
}

impl<A, D> TrialBuilder<A, D, DistanceConfig>
where
    A: AnalogSampler,
    D: Display,
{
    pub fn build(self) -> Result<TrialCore<A, D>, BuildError> {
        if self.timer.tick_us == 0 {
            return Err(BuildError::InvalidConfig("tick_us must be nonzero"));
        }
        if self.gates.gate1_channel == self.gates.gate2_channel {
            return Err(BuildError::InvalidConfig(
                "gates must use distinct channels",
            ));
        }
        Ok(TrialCore::new(
            self.sampler,
            self.display,
            self.distance,
            self.gates,
            self.timer,
            self.watchdog,
            self.indicator,
        ))
    }
}
