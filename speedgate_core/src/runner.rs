//! Drives repeated trials against a built [`TrialCore`].
//!
//! The runner owns the tick driver's lifetime: it is spawned before the
//! first trial and joined (via drop) when the run ends, so ticks flow for
//! exactly as long as trials can be armed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use speedgate_traits::clock::Clock;
use speedgate_traits::{AnalogSampler, Display, MonotonicClock, StartButton};
use tracing::{info, warn};

use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::status::TrialStatus;
use crate::tick::TickDriver;
use crate::trial::TrialCore;
use crate::util::tick_period;

/// Tally of a finished run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub completed: u32,
    pub aborted: u32,
}

impl RunSummary {
    pub fn total(&self) -> u32 {
        self.completed + self.aborted
    }
}

/// Run up to `trials` trials, waiting on the start button before each.
///
/// An aborted trial is tallied and the loop continues; only hardware
/// failures end the run early. `shutdown` is polled between blocking
/// phases so Ctrl-C lands between trials, not mid-measurement.
pub fn run_trials<A, D, S>(
    trial: &mut TrialCore<A, D>,
    start: &mut S,
    trials: u32,
    shutdown: &Arc<AtomicBool>,
) -> Result<RunSummary>
where
    A: AnalogSampler,
    D: Display,
    S: StartButton + ?Sized,
{
    let period = tick_period(trial.timer().tick_us);
    let clock = MonotonicClock;
    let _driver = TickDriver::spawn(trial.counter(), period, clock);

    let mut summary = RunSummary::default();
    while summary.total() < trials {
        if shutdown.load(Ordering::Relaxed) {
            info!("shutdown requested, stopping run");
            break;
        }
        start
            .wait_press()
            .map_err(|e| map_hw_error(e.as_ref()))?;
        trial.start_trial()?;
        loop {
            if shutdown.load(Ordering::Relaxed) {
                warn!("shutdown requested mid-trial");
                return Ok(summary);
            }
            match trial.step()? {
                TrialStatus::Complete(reading) => {
                    info!(scaled = reading.scaled, "trial recorded");
                    summary.completed += 1;
                    break;
                }
                TrialStatus::Aborted(err) => {
                    warn!(error = %err, "trial discarded");
                    summary.aborted += 1;
                    break;
                }
                TrialStatus::Running | TrialStatus::Waiting => {
                    clock.sleep(period);
                }
            }
        }
    }
    Ok(summary)
}
