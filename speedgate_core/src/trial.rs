//! The four-state trial machine.
//!
//! A trial idles until started, arms gate one, arms gate two once the first
//! beam is broken, and computes a speed once the second beam is broken.
//! One `step` call performs at most one state's work, so transitions are
//! observable and states cannot be skipped.
//!
//! When a watchdog timeout is configured the tick counter is armed at trial
//! start so the deadline has a time base while gate one waits; the gate-one
//! trip arms (or re-arms) it, resetting the count to zero, and only the
//! gate-one-to-gate-two interval reaches the speed computation. The
//! indicator output mirrors that interval: on at the gate-one trip, off at
//! the gate-two trip.

use speedgate_traits::{AnalogSampler, DigitalOutput, Display};
use tracing::{debug, info, warn};

use crate::config::{GateConfig, TimerConfig, WatchdogConfig};
use crate::decoder::DistanceConfig;
use crate::error::{Result, TrialError};
use crate::fixed_point::adc_to_centivolts;
use crate::hw_error::map_hw_error;
use crate::panel;
use crate::speed::{speed_scaled, SpeedReading};
use crate::status::TrialStatus;
use crate::tick::{TickCounter, MAX_DISPLAY_TICKS};

/// Trial phases, in order. `Compute` runs once and returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    ArmGate1,
    ArmGate2,
    Compute,
}

pub struct TrialCore<A, D> {
    sampler: A,
    display: D,
    distance: DistanceConfig,
    gates: GateConfig,
    timer: TimerConfig,
    counter: TickCounter,
    state: GateState,
    timeout_ticks: Option<u32>,
    indicator: Option<(Box<dyn DigitalOutput>, u8)>,
}

impl<A, D> TrialCore<A, D>
where
    A: AnalogSampler,
    D: Display,
{
    pub(crate) fn new(
        sampler: A,
        display: D,
        distance: DistanceConfig,
        gates: GateConfig,
        timer: TimerConfig,
        watchdog: WatchdogConfig,
        indicator: Option<(Box<dyn DigitalOutput>, u8)>,
    ) -> Self {
        Self {
            sampler,
            display,
            distance,
            gates,
            timer,
            counter: TickCounter::new(),
            state: GateState::Idle,
            timeout_ticks: watchdog.timeout_ticks(timer.tick_us),
            indicator,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn distance(&self) -> DistanceConfig {
        self.distance
    }

    pub fn timer(&self) -> TimerConfig {
        self.timer
    }

    /// Handle to the shared counter, for wiring up a tick driver.
    pub fn counter(&self) -> TickCounter {
        self.counter.clone()
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    fn set_indicator(&mut self, on: bool) -> Result<()> {
        if let Some((out, pin)) = self.indicator.as_mut() {
            out.write(*pin, on).map_err(|e| map_hw_error(e.as_ref()))?;
        }
        Ok(())
    }

    /// Begin a trial. Only valid from `Idle`.
    pub fn start_trial(&mut self) -> Result<()> {
        if self.state != GateState::Idle {
            return Err(TrialError::State(format!(
                "start requested in {:?}",
                self.state
            ))
            .into());
        }
        if self.timeout_ticks.is_some() {
            self.counter.arm();
        }
        self.state = GateState::ArmGate1;
        info!(distance_fixed = self.distance.distance_fixed(), "trial started");
        Ok(())
    }

    fn sample_cv(&mut self, channel: u8) -> Result<u16> {
        let raw = self
            .sampler
            .sample(channel)
            .map_err(|e| map_hw_error(e.as_ref()))?;
        Ok(adc_to_centivolts(raw))
    }

    fn abort(&mut self, err: TrialError) -> Result<TrialStatus> {
        warn!(error = %err, "trial aborted");
        self.counter.disarm();
        panel::show_error(&mut self.display)?;
        self.set_indicator(false)?;
        self.state = GateState::Idle;
        Ok(TrialStatus::Aborted(err))
    }

    fn watchdog_expired(&self) -> bool {
        match self.timeout_ticks {
            Some(limit) => self.counter.peek() > limit,
            None => false,
        }
    }

    /// Advance the machine by one state's worth of work.
    pub fn step(&mut self) -> Result<TrialStatus> {
        match self.state {
            GateState::Idle => Ok(TrialStatus::Waiting),
            GateState::ArmGate1 => {
                let cv = self.sample_cv(self.gates.gate1_channel)?;
                panel::show_gate_voltage(&mut self.display, 1, cv)?;
                if cv > self.gates.gate1_threshold_cv {
                    // Arming resets the count, so timing starts at the trip
                    // and any watchdog ticks are discarded.
                    self.counter.arm();
                    self.set_indicator(true)?;
                    debug!(cv, "gate 1 tripped");
                    self.state = GateState::ArmGate2;
                } else if self.watchdog_expired() {
                    return self.abort(TrialError::StuckGate(1));
                }
                Ok(TrialStatus::Running)
            }
            GateState::ArmGate2 => {
                let cv = self.sample_cv(self.gates.gate2_channel)?;
                panel::show_gate_voltage(&mut self.display, 2, cv)?;
                if cv > self.gates.gate2_threshold_cv {
                    self.counter.disarm();
                    self.set_indicator(false)?;
                    debug!(cv, "gate 2 tripped");
                    self.state = GateState::Compute;
                } else if self.watchdog_expired() {
                    return self.abort(TrialError::StuckGate(2));
                }
                Ok(TrialStatus::Running)
            }
            GateState::Compute => {
                let ticks = self.counter.read_when_disarmed()?;
                if ticks > MAX_DISPLAY_TICKS {
                    return self.abort(TrialError::Range("ticks"));
                }
                let scaled = match speed_scaled(self.distance.distance_fixed(), ticks) {
                    Ok(s) => s,
                    Err(e) => return self.abort(e),
                };
                if scaled > 9_999 {
                    // Too fast for the four-digit readout.
                    return self.abort(TrialError::Range("speed"));
                }
                let reading = SpeedReading { scaled };
                panel::show_speed(&mut self.display, reading)?;
                self.state = GateState::Idle;
                info!(ticks, scaled, "trial complete");
                Ok(TrialStatus::Complete(reading))
            }
        }
    }
}
