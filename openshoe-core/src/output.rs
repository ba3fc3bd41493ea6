//! Output multiplexer
//!
//! Each reportable state has a rate divider. A state is due whenever its
//! counter reaches zero, after which the counter reloads to the divider.
//! Dividers are powers of two, so zeroing every counter lines all enabled
//! outputs up on a common cadence.

use crate::registry::IdSet;

/// Largest accepted `log2_divider` argument
pub const MAX_LOG2_DIVIDER: u8 = 14;

/// Rejected output configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputError {
    /// State ID is not registered
    UnknownState(u8),
    /// Divider argument above [`MAX_LOG2_DIVIDER`]
    DividerOutOfRange(u8),
}

/// Divider and countdown of one state output
///
/// `divider == 0` means disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputRate {
    pub divider: u16,
    pub counter: u16,
}

impl OutputRate {
    /// Disabled output
    pub const OFF: Self = Self {
        divider: 0,
        counter: 0,
    };

    /// Whether this output is enabled
    pub fn is_enabled(&self) -> bool {
        self.divider != 0
    }
}

/// Per-state output rates
#[derive(Debug, Clone)]
pub struct OutputMultiplexer {
    rates: [OutputRate; 256],
    known: IdSet,
    enabled: IdSet,
}

impl OutputMultiplexer {
    /// Create a multiplexer for the registered states in `known`, all disabled
    pub fn new(known: IdSet) -> Self {
        Self {
            rates: [OutputRate::OFF; 256],
            known,
            enabled: IdSet::new(),
        }
    }

    /// Enable, retune or disable the output of one state
    ///
    /// `log2_divider == 0` disables the output. `1..=14` sets the divider to
    /// `2^(log2_divider - 1)` cycles and makes the state due on the next
    /// tick. Errors leave the rates unchanged.
    pub fn set_output(&mut self, state_id: u8, log2_divider: u8) -> Result<(), OutputError> {
        if !self.known.contains(state_id) {
            return Err(OutputError::UnknownState(state_id));
        }
        if log2_divider > MAX_LOG2_DIVIDER {
            return Err(OutputError::DividerOutOfRange(log2_divider));
        }

        if log2_divider == 0 {
            self.rates[state_id as usize] = OutputRate::OFF;
            self.enabled.remove(state_id);
        } else {
            self.rates[state_id as usize] = OutputRate {
                divider: 1 << (log2_divider - 1),
                counter: 0,
            };
            self.enabled.insert(state_id);
        }
        Ok(())
    }

    /// Disable every output
    pub fn disable_all(&mut self) {
        for id in self.enabled.iter() {
            self.rates[id as usize] = OutputRate::OFF;
        }
        self.enabled.clear();
    }

    /// Make every enabled output due on the next tick
    pub fn reset_all_counters(&mut self) {
        for id in self.enabled.iter() {
            self.rates[id as usize].counter = 0;
        }
    }

    /// Advance one cycle and return the states due now
    pub fn tick_and_select(&mut self) -> IdSet {
        let mut due = IdSet::new();
        for id in self.enabled.iter() {
            let rate = &mut self.rates[id as usize];
            rate.counter = rate.counter.saturating_sub(1);
            if rate.counter == 0 {
                rate.counter = rate.divider;
                due.insert(id);
            }
        }
        due
    }

    /// Current rate of `state_id`
    pub fn rate(&self, state_id: u8) -> OutputRate {
        self.rates[state_id as usize]
    }

    /// States with a nonzero divider
    pub fn enabled(&self) -> &IdSet {
        &self.enabled
    }
}
