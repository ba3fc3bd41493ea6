//! Command descriptors and the command table
//!
//! Each command ID maps to a fixed payload layout and a [`Command`] variant
//! that the controller dispatches on. Payload length and field widths are
//! part of the descriptor, so the receive state machine knows how many bytes
//! to expect as soon as it sees a header.

use openshoe_protocol::ids::command as id;
use openshoe_protocol::{CHECKSUM_LEN, MAX_COMMAND_PAYLOAD};

use super::idset::IdSet;
use super::RegistryError;

/// Maximum number of argument fields in one command
pub const MAX_COMMAND_FIELDS: usize = 10;

/// Command handler selected by a command ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Acknowledge only
    Acknowledge,
    /// Reply with the device identifier
    DeviceId,
    /// Clear the soft-fault register
    ClearFaults,
    /// Restart alignment, then ZUPT-aided navigation
    ResetNavigation,
    /// Run the gyroscope self-calibration, then resume
    GyroCalibration,
    /// Run the accelerometer calibration over N orientations, then resume
    AccelerometerCalibration,
    /// Set the IMU low-pass filter
    SetLowPassFilter,
    /// Enable/disable one state output
    OutputState,
    /// Disable every state output
    OutputAllOff,
    /// Specific force and angular rate outputs
    OutputInertial,
    /// Position and zero-velocity flag outputs
    OutputPositionPlusZupt,
    /// Position, velocity, attitude and cycle counter outputs
    OutputNavigationalStates,
    /// Enable one state output and resynchronize
    AddSyncOutput,
    /// Resynchronize all outputs
    SyncOutput,
    /// Place or remove a processing step in the sequence
    ProcessingStepOnOff,
}

/// Static description of one command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandDescriptor {
    /// Command ID, also the frame header
    pub id: u8,
    /// Handler to run once the frame checks out
    pub command: Command,
    /// Payload bytes following the header
    pub payload_len: u8,
    /// Width of each payload field, in order
    pub field_widths: &'static [u8],
}

impl CommandDescriptor {
    /// Describe a command whose payload is the concatenation of `field_widths`
    pub const fn new(id: u8, command: Command, field_widths: &'static [u8]) -> Self {
        let mut payload_len = 0u8;
        let mut i = 0;
        while i < field_widths.len() {
            payload_len += field_widths[i];
            i += 1;
        }
        Self {
            id,
            command,
            payload_len,
            field_widths,
        }
    }

    /// Number of payload fields
    pub fn field_count(&self) -> u8 {
        self.field_widths.len() as u8
    }

    /// Bytes still expected after the header (payload and checksum)
    pub fn expected_after_header(&self) -> u8 {
        self.payload_len + CHECKSUM_LEN as u8
    }

    pub(crate) fn validate(&self) -> Result<(), RegistryError> {
        if self.payload_len as usize > MAX_COMMAND_PAYLOAD {
            return Err(RegistryError::PayloadTooLarge(self.id));
        }
        let widths: usize = self.field_widths.iter().map(|&w| w as usize).sum();
        if self.field_widths.len() > MAX_COMMAND_FIELDS
            || widths != self.payload_len as usize
            || self.field_widths.contains(&0)
        {
            return Err(RegistryError::FieldLayout(self.id));
        }
        Ok(())
    }
}

/// Commands understood by the standard runtime
pub const STANDARD_COMMANDS: &[CommandDescriptor] = &[
    CommandDescriptor::new(id::ONLY_ACK, Command::Acknowledge, &[]),
    CommandDescriptor::new(id::DEVICE_ID, Command::DeviceId, &[]),
    CommandDescriptor::new(id::CLEAR_FAULTS, Command::ClearFaults, &[]),
    CommandDescriptor::new(id::OUTPUT_STATE, Command::OutputState, &[1, 1]),
    CommandDescriptor::new(id::OUTPUT_ALL_OFF, Command::OutputAllOff, &[]),
    CommandDescriptor::new(id::OUTPUT_INERTIAL, Command::OutputInertial, &[1]),
    CommandDescriptor::new(
        id::OUTPUT_POSITION_PLUS_ZUPT,
        Command::OutputPositionPlusZupt,
        &[1],
    ),
    CommandDescriptor::new(
        id::OUTPUT_NAVIGATIONAL_STATES,
        Command::OutputNavigationalStates,
        &[1],
    ),
    CommandDescriptor::new(
        id::PROCESSING_STEP_ONOFF,
        Command::ProcessingStepOnOff,
        &[1, 1, 1],
    ),
    CommandDescriptor::new(id::RESET_ZUPT_AIDED_INS, Command::ResetNavigation, &[]),
    CommandDescriptor::new(id::GYRO_CALIBRATION, Command::GyroCalibration, &[]),
    CommandDescriptor::new(id::ACC_CALIBRATION, Command::AccelerometerCalibration, &[1]),
    CommandDescriptor::new(id::SET_LOWPASS_FILTER, Command::SetLowPassFilter, &[1]),
    CommandDescriptor::new(id::ADD_SYNC_OUTPUT, Command::AddSyncOutput, &[1, 1]),
    CommandDescriptor::new(id::SYNC_OUTPUT, Command::SyncOutput, &[]),
];

/// Header bitmap plus ID-indexed descriptor lookup
///
/// Invariant: a header bit is set exactly when its table entry is present.
#[derive(Debug, Clone)]
pub struct CommandTable {
    headers: IdSet,
    entries: [Option<CommandDescriptor>; 256],
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            headers: IdSet::new(),
            entries: [None; 256],
        }
    }

    /// Add descriptors to the table
    ///
    /// Validates the whole batch before inserting anything, so a rejected
    /// batch leaves the table unchanged.
    pub fn register(&mut self, descriptors: &[CommandDescriptor]) -> Result<(), RegistryError> {
        let mut seen = self.headers;
        for descriptor in descriptors {
            descriptor.validate()?;
            if !seen.insert(descriptor.id) {
                return Err(RegistryError::DuplicateCommand(descriptor.id));
            }
        }

        for descriptor in descriptors {
            self.headers.insert(descriptor.id);
            self.entries[descriptor.id as usize] = Some(*descriptor);
        }
        Ok(())
    }

    /// O(1) check whether `byte` starts a known command
    pub fn is_valid_header(&self, byte: u8) -> bool {
        self.headers.contains(byte)
    }

    /// Descriptor registered for `id`
    pub fn lookup(&self, id: u8) -> Option<CommandDescriptor> {
        self.entries[id as usize]
    }

    /// Number of registered commands
    pub fn len(&self) -> usize {
        self.headers.len()
    }

    /// Check whether no command is registered
    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}
