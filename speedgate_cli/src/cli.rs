//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "speedgate", version, about = "Photogate speed trap CLI")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/speedgate.toml")]
    pub config: PathBuf,

    /// Optional gate calibration CSV (strict header: gate,ambient_cv,blocked_cv)
    #[arg(long, value_name = "FILE")]
    pub calibration: Option<PathBuf>,

    /// Log as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Memory locking mode for real-time operation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RtLock {
    /// Do not lock memory
    None,
    /// Lock currently resident pages
    Current,
    /// Lock current and future pages
    All,
}

impl RtLock {
    #[inline]
    pub fn os_default() -> Self {
        #[cfg(target_os = "linux")]
        {
            return RtLock::Current;
        }
        #[allow(unreachable_code)]
        RtLock::None
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run speed trials
    Run {
        /// Distance as a raw Q5.3 byte (0..=255); skips button entry
        #[arg(long, value_name = "BYTE")]
        distance_bits: Option<u8>,
        /// Whole inches (0..=31); combines with --eighths, skips button entry
        #[arg(long, value_name = "IN", conflicts_with = "distance_bits")]
        inches: Option<u8>,
        /// Eighths of an inch (0..=7); requires --inches
        #[arg(long, value_name = "N", requires = "inches", default_value = "0")]
        eighths: u8,
        /// Number of trials to run before exiting
        #[arg(long, value_name = "N", default_value = "1")]
        trials: u32,
        /// Override both gate thresholds (centivolts)
        #[arg(long, value_name = "CV")]
        threshold_cv: Option<u16>,
        /// Override the stuck-gate watchdog (ms, 0 disables)
        #[arg(long, value_name = "MS")]
        arm_timeout_ms: Option<u64>,
        /// Enable real-time mode (SCHED_FIFO, affinity, mlockall)
        #[arg(
            long,
            action = ArgAction::SetTrue,
            long_help = "Enable real-time mode on supported OSes.\n\nLinux: Attempts SCHED_FIFO priority, pins to one CPU, and calls mlockall to lock the process address space into RAM. This tightens tick jitter but may require elevated privileges or ulimits (e.g., memlock). Use with care on shared systems."
        )]
        rt: bool,
        /// Real-time priority for SCHED_FIFO on Linux (1..=max)
        #[arg(long, value_name = "PRIO")]
        rt_prio: Option<i32>,
        /// Select memory locking mode for --rt: none, current, or all
        #[arg(long, value_enum, value_name = "MODE")]
        rt_lock: Option<RtLock>,
        /// CPU index to pin the process to when --rt is enabled (Linux only)
        #[arg(long, value_name = "CPU")]
        rt_cpu: Option<usize>,
    },
    /// Quick health check (hardware presence / sim ok)
    SelfCheck,
}
