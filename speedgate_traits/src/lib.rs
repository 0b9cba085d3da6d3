pub mod clock;

pub use clock::{Clock, MonotonicClock};

pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Character display panel (16x2 on the trap rig).
///
/// All calls are synchronous and blocking: each call completes before the
/// next is issued. Row 1 addresses are `0x00..`, row 2 addresses `0x40..`.
pub trait Display {
    fn init(&mut self) -> Result<(), BoxedError>;
    fn clear_and_home(&mut self) -> Result<(), BoxedError>;
    fn move_cursor(&mut self, pos: u8) -> Result<(), BoxedError>;
    fn write_str(&mut self, text: &str) -> Result<(), BoxedError>;
    fn write_char(&mut self, c: char) -> Result<(), BoxedError>;
}

/// Analog sampler for the photogate transistors.
///
/// `sample` blocks until conversion completes and returns a raw reading in
/// `[0, 1023]` for the given channel.
pub trait AnalogSampler {
    fn sample(&mut self, channel: u8) -> Result<u16, BoxedError>;
}

/// Raw digital input line (true = asserted).
pub trait DigitalInput {
    fn read(&mut self, pin: u8) -> Result<bool, BoxedError>;
}

/// Raw digital output line (trial-in-progress indicator).
pub trait DigitalOutput {
    fn write(&mut self, pin: u8, level: bool) -> Result<(), BoxedError>;
}

/// One debounced actuation of the two mutually exclusive bit-entry lines.
///
/// `Both` is reported when the debounced poll saw both lines asserted in the
/// same event; the decoder resolves it by its configured policy rather than
/// guessing here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitPress {
    One,
    Zero,
    Both,
}

/// Blocking "await next debounced edge" source for distance entry.
///
/// Implementations guarantee exactly one logical event per physical
/// actuation and require both lines released before the next event.
pub trait BitEntry {
    fn next_press(&mut self) -> Result<BitPress, BoxedError>;
}

/// Blocking wait for the debounced start/reset edge (press then release).
pub trait StartButton {
    fn wait_press(&mut self) -> Result<(), BoxedError>;
}
