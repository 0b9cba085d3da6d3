//! Shared tick counter and its background driver thread.
//!
//! `TickCounter` is the single point of truth for elapsed time during a
//! trial. The armed flag and the count live behind one mutex so that arming
//! (reset + enable) is a single critical section and a reader can never
//! observe a torn pair. The driver thread calls `on_tick` once per period;
//! ticks that arrive while disarmed are ignored.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use speedgate_traits::clock::Clock;
use tracing::{debug, warn};

use crate::error::TrialError;

/// Largest tick count renderable on the panel (six decimal digits).
pub const MAX_DISPLAY_TICKS: u32 = 999_999;

#[derive(Debug, Default)]
struct TickCell {
    armed: bool,
    count: u32,
}

/// Cloneable handle to the shared tick state.
#[derive(Debug, Clone, Default)]
pub struct TickCounter {
    cell: Arc<Mutex<TickCell>>,
}

impl TickCounter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TickCell> {
        // A poisoned lock only means another thread panicked mid-update of
        // plain integers; the state itself stays usable.
        self.cell.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Reset the count to zero and start accepting ticks, atomically.
    pub fn arm(&self) {
        let mut cell = self.lock();
        cell.count = 0;
        cell.armed = true;
    }

    /// Stop accepting ticks. The count freezes at its current value.
    pub fn disarm(&self) {
        self.lock().armed = false;
    }

    /// Called by the driver on every tick period. No-op while disarmed.
    pub fn on_tick(&self) {
        let mut cell = self.lock();
        if cell.armed {
            cell.count = cell.count.saturating_add(1);
        }
    }

    /// Whether the counter is currently accepting ticks.
    pub fn is_armed(&self) -> bool {
        self.lock().armed
    }

    /// Snapshot of the live count. May trail the driver by one tick while
    /// armed; fine for watchdog deadlines, not for the speed computation.
    pub fn peek(&self) -> u32 {
        self.lock().count
    }

    /// Read the frozen count. Errors if still armed; reading a live count
    /// would race the driver.
    pub fn read_when_disarmed(&self) -> Result<u32, TrialError> {
        let cell = self.lock();
        if cell.armed {
            return Err(TrialError::State(
                "tick counter read while armed".to_string(),
            ));
        }
        Ok(cell.count)
    }
}

/// Background thread that advances a `TickCounter` at a fixed period.
///
/// Timing model: each iteration sleeps for the full period from wakeup, so
/// handler latency adds a bounded constant per tick rather than compounding.
/// Dropping the driver signals shutdown and joins the thread.
pub struct TickDriver {
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl TickDriver {
    pub fn spawn<C>(counter: TickCounter, period: Duration, clock: C) -> Self
    where
        C: Clock + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let stop = Arc::clone(&shutdown);
        debug!(period_us = period.as_micros() as u64, "tick driver starting");
        let handle = std::thread::Builder::new()
            .name("tick-driver".into())
            .spawn(move || {
                while !stop.load(Ordering::Relaxed) {
                    clock.sleep(period);
                    counter.on_tick();
                }
            })
            .ok();
        if handle.is_none() {
            warn!("failed to spawn tick driver thread");
        }
        Self {
            shutdown,
            handle,
        }
    }
}

impl Drop for TickDriver {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}
