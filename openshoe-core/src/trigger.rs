//! Sensor-ready trigger
//!
//! The interrupt handler records that the sensor fired and when; nothing
//! else. The main loop consumes triggers through a [`TriggerReceiver`].
//!
//! ```ignore
//! static TRIGGER: TriggerLine = TriggerLine::new();
//!
//! #[interrupt]
//! fn EXTINT() {
//!     TRIGGER.signal(timer_now());
//! }
//! ```

use portable_atomic::{AtomicU32, Ordering};

/// Trigger count and timestamp shared with the interrupt handler
///
/// Single writer: only the interrupt handler calls [`TriggerLine::signal`].
#[derive(Debug)]
pub struct TriggerLine {
    count: AtomicU32,
    timestamp: AtomicU32,
}

impl Default for TriggerLine {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerLine {
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
            timestamp: AtomicU32::new(0),
        }
    }

    /// Record a trigger at `timestamp`
    ///
    /// Plain loads and stores only, so this works on cores without
    /// read-modify-write atomics.
    pub fn signal(&self, timestamp: u32) {
        self.timestamp.store(timestamp, Ordering::Relaxed);
        let count = self.count.load(Ordering::Relaxed);
        self.count.store(count.wrapping_add(1), Ordering::Release);
    }

    /// Number of triggers since power-up, wrapping
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::Acquire)
    }

    /// Timestamp of the latest trigger
    pub fn timestamp(&self) -> u32 {
        self.timestamp.load(Ordering::Relaxed)
    }

    /// Receiver that has seen every trigger so far
    pub fn receiver(&self) -> TriggerReceiver<'_> {
        TriggerReceiver {
            line: self,
            seen: self.count(),
        }
    }
}

/// Main-loop side of a [`TriggerLine`]
#[derive(Debug)]
pub struct TriggerReceiver<'a> {
    line: &'a TriggerLine,
    seen: u32,
}

impl TriggerReceiver<'_> {
    /// Consume pending triggers, returning the latest timestamp
    ///
    /// Several pending triggers count as one.
    pub fn try_take(&mut self) -> Option<u32> {
        let count = self.line.count();
        if count == self.seen {
            return None;
        }
        self.seen = count;
        Some(self.line.timestamp())
    }

    /// Whether a trigger fired since the last [`TriggerReceiver::try_take`]
    pub fn is_pending(&self) -> bool {
        self.line.count() != self.seen
    }
}
