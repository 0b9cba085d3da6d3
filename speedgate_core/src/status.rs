//! Trial progress reporting.

use crate::error::TrialError;
use crate::speed::SpeedReading;

/// Outcome of a single `step` call on a trial.
#[derive(Debug)]
pub enum TrialStatus {
    /// Idle, waiting for the start button.
    Waiting,
    /// Armed and watching the gates.
    Running,
    /// Both gates tripped and a speed was computed.
    Complete(SpeedReading),
    /// The trial ended without a speed. The machine has returned to idle.
    Aborted(TrialError),
}

impl TrialStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrialStatus::Complete(_) | TrialStatus::Aborted(_))
    }
}
