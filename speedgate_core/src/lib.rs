#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core speed-trap logic (hardware-agnostic).
//!
//! Everything hardware-shaped goes through the `speedgate_traits` traits;
//! this crate owns the measurement semantics.
//!
//! ## Architecture
//!
//! - **Distance entry**: bit-serial Q5.3 decoding (`decoder` module)
//! - **Timing**: shared tick counter plus a driver thread (`tick` module)
//! - **Trial machine**: idle/arm-gate-1/arm-gate-2/compute (`trial` module)
//! - **Speed**: exact integer mph computation (`speed` module)
//! - **Panel**: fixed 16x2 display layout (`panel` module)
//!
//! ## Fixed-Point Arithmetic
//!
//! Distances are `u32` in units of 1/10_000 inch so eighth-inch quanta are
//! exact; speeds are `u32` hundredths of mph. No floats ever enter the
//! measurement path.

pub mod builder;
pub mod config;
mod conversions;
pub mod decoder;
pub mod error;
pub mod fixed_point;
pub mod hw_error;
pub mod mocks;
pub mod panel;
pub mod runner;
pub mod speed;
pub mod status;
pub mod tick;
pub mod trial;
pub mod util;

pub use builder::{Missing, TrialBuilder};
pub use config::{DecoderConfig, GateConfig, TimerConfig, WatchdogConfig};
pub use decoder::{decode_distance, BitPolicy, DistanceConfig};
pub use error::{BuildError, Result, TrialError};
pub use runner::{run_trials, RunSummary};
pub use speed::{speed_scaled, SpeedReading};
pub use status::TrialStatus;
pub use tick::{TickCounter, TickDriver, MAX_DISPLAY_TICKS};
pub use trial::{GateState, TrialCore};
