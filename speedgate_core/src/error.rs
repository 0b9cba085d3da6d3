use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrialError {
    #[error("timer recorded zero ticks between gates")]
    ZeroTicks,
    #[error("{0} exceeds the display digit budget")]
    Range(&'static str),
    #[error("gate {0} never tripped within the arm timeout")]
    StuckGate(u8),
    #[error("timed out waiting for input")]
    Timeout,
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
