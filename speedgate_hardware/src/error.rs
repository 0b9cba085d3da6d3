use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("display error: {0}")]
    Display(String),
    #[error("adc error: {0}")]
    Adc(String),
    #[error("button press timeout")]
    PressTimeout,
    #[error("bit entry exhausted after {0} events")]
    EntryExhausted(usize),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
