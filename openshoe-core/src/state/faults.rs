//! Soft-fault register
//!
//! Invalid host input and transient hardware trouble never stop the cycle.
//! They are recorded here instead, as sticky flags the host can read back
//! through the state report and clear with a command.

/// Kinds of soft fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SoftFault {
    /// Output requested for a state ID that is not registered
    UnknownState,
    /// Output divider outside `0..=14`
    DividerOutOfRange,
    /// Process sequence index outside the sequence
    SequenceIndexOutOfRange,
    /// Processing step ID that is not registered
    UnknownStep,
    /// Sequence save requested while a saved sequence is outstanding
    SequenceAlreadySaved,
    /// Sequence restore requested with nothing saved
    NothingSaved,
    /// Low-pass filter setting outside the supported range
    FilterTapsOutOfRange,
    /// Sensor burst read failed; previous readings were kept
    SensorReadFailed,
    /// Sensor rejected a configuration change
    SensorConfigFailed,
    /// Reply did not fit in the reply buffer and was dropped
    ReplyOverflow,
    /// Due states did not fit in one report; the rest were skipped
    ReportTruncated,
    /// Command arguments did not match the command layout
    MalformedArguments,
    /// Transport refused a byte
    TransmitFailed,
    /// Cycle ran past the next sensor trigger
    DeadlineOverrun,
}

impl SoftFault {
    /// Flag bit of this fault in the register
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Sticky fault flags plus counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FaultRegister {
    flags: u16,
    raised: u32,
    overruns: u32,
}

impl FaultRegister {
    /// Create an empty register
    pub const fn new() -> Self {
        Self {
            flags: 0,
            raised: 0,
            overruns: 0,
        }
    }

    /// Record a fault
    ///
    /// Every soft fault in the runtime goes through here, so each one is
    /// logged once at warn level.
    pub fn raise(&mut self, fault: SoftFault) {
        log_warn!("soft fault: {}", fault);
        self.flags |= fault.bit();
        self.raised = self.raised.saturating_add(1);
    }

    /// Record a deadline overrun
    pub fn record_overrun(&mut self) {
        self.raise(SoftFault::DeadlineOverrun);
        self.overruns = self.overruns.saturating_add(1);
    }

    /// Check whether a fault has been raised since the last clear
    pub fn is_set(&self, fault: SoftFault) -> bool {
        self.flags & fault.bit() != 0
    }

    /// Raw flag word as reported to the host
    pub fn flags(&self) -> u16 {
        self.flags
    }

    /// Number of faults raised since the last clear
    pub fn raised(&self) -> u32 {
        self.raised
    }

    /// Number of deadline overruns since the last clear
    pub fn overruns(&self) -> u32 {
        self.overruns
    }

    /// Clear flags and counters
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}
