//! Maps `Box<dyn Error>` from trait boundaries to typed `TrialError`.
//!
//! The traits in `speedgate_traits` use `Box<dyn Error + Send + Sync>` for
//! maximum flexibility; this module converts those to our typed error enum,
//! with an optional feature-gated path for `speedgate_hardware::HwError`
//! downcasting.

use crate::error::TrialError;

/// Map a trait-boundary error to a typed `TrialError`.
///
/// Attempts to downcast known hardware error types first, then falls back
/// to string-based heuristics.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> TrialError {
    // Feature-gated: try to downcast to HwError for precise mapping
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<speedgate_hardware::error::HwError>() {
            return match hw {
                speedgate_hardware::error::HwError::PressTimeout => TrialError::Timeout,
                other => TrialError::Hardware(other.to_string()),
            };
        }
    }

    // Fallback: string-based detection
    let s = e.to_string();
    if s.to_lowercase().contains("timeout") {
        TrialError::Timeout
    } else {
        TrialError::Hardware(s)
    }
}
