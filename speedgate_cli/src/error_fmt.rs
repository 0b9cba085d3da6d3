//! Human-readable error descriptions and structured JSON error formatting.

use speedgate_core::{BuildError, TrialError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
        };
    }

    if let Some(te) = err.downcast_ref::<TrialError>() {
        return match te {
            TrialError::ZeroTicks => {
                "What happened: Both gates tripped within the same tick.\nLikely causes: Gates mounted too close together, thresholds too low, or electrical noise tripping both at once.\nHow to fix: Increase gate spacing, recalibrate thresholds, or check sensor wiring.".to_string()
            }
            TrialError::Range(what) => format!(
                "What happened: The {what} value exceeded its display digit budget.\nLikely causes: Object moving far outside the measurable range, or a gate tripping spuriously.\nHow to fix: Check the entered distance and the gate thresholds."
            ),
            TrialError::StuckGate(gate) => format!(
                "What happened: Gate {gate} never tripped within the arm timeout.\nLikely causes: Object missed the gate, beam misaligned, or threshold set out of reach.\nHow to fix: Re-align the photogate, recalibrate, or raise watchdog.arm_timeout_ms."
            ),
            TrialError::Timeout => {
                "What happened: Timed out waiting for button input.\nLikely causes: No press within the configured window, or button wiring fault.\nHow to fix: Check the button pins in [pins] and press within the timeout.".to_string()
            }
            TrialError::Hardware(msg) => format!(
                "What happened: Hardware error ({msg}).\nLikely causes: GPIO or SPI wiring fault, or insufficient permissions.\nHow to fix: Check [pins] in the config and GPIO access rights."
            ),
            TrialError::State(msg) => format!(
                "What happened: Invalid trial state ({msg}).\nLikely causes: Out-of-order operations.\nHow to fix: Re-run with --log-level=debug and report the sequence."
            ),
        };
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("calibration csv must have headers") {
        return "Invalid headers in calibration CSV. Expected 'gate,ambient_cv,blocked_cv'.".to_string();
    }

    if lower.contains("invalid configuration") || lower.contains("pins") {
        return "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [pins] (bit_one, bit_zero, start, ...) or out-of-range values.\nHow to fix: Edit the TOML config and try again.".to_string();
    }

    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map trial failures to stable exit codes; other errors return 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(te) = err.downcast_ref::<TrialError>() {
        return match te {
            TrialError::Timeout => 2,
            TrialError::StuckGate(_) => 3,
            TrialError::ZeroTicks => 4,
            TrialError::Range(_) => 5,
            TrialError::Hardware(_) => 6,
            TrialError::State(_) => 7,
        };
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = if let Some(te) = err.downcast_ref::<TrialError>() {
        match te {
            TrialError::ZeroTicks => "ZeroTicks",
            TrialError::Range(_) => "Range",
            TrialError::StuckGate(_) => "StuckGate",
            TrialError::Timeout => "Timeout",
            TrialError::Hardware(_) => "Hardware",
            TrialError::State(_) => "State",
        }
    } else {
        "Error"
    };

    json!({ "reason": reason, "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trial_errors_get_stable_codes() {
        let err = eyre::Report::new(TrialError::StuckGate(2));
        assert_eq!(exit_code_for_error(&err), 3);
        let err = eyre::Report::new(TrialError::ZeroTicks);
        assert_eq!(exit_code_for_error(&err), 4);
    }

    #[test]
    fn json_errors_carry_a_reason() {
        let err = eyre::Report::new(TrialError::ZeroTicks);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "ZeroTicks");
    }
}
