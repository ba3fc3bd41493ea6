//! Command receive state machine
//!
//! The header byte doubles as the sync byte: anything that is not a
//! registered command ID is dropped while waiting for a header. Once a
//! header is seen, the descriptor fixes how many bytes follow, so no length
//! byte is needed on the wire.

use heapless::Vec;
use openshoe_protocol::{has_valid_checksum, CHECKSUM_LEN, MAX_COMMAND_FRAME};

use crate::registry::{CommandDescriptor, CommandTable};

/// Receive state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxState {
    /// Waiting for a registered command ID
    AwaitingHeader,
    /// Header buffered; `remaining` payload and checksum bytes still due
    AwaitingPayload { remaining: u8 },
}

/// A received frame whose checksum checked out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFrame {
    pub descriptor: CommandDescriptor,
    bytes: Vec<u8, MAX_COMMAND_FRAME>,
}

impl CommandFrame {
    /// Command ID
    pub fn header(&self) -> u8 {
        self.descriptor.id
    }

    /// Payload between header and checksum
    pub fn payload(&self) -> &[u8] {
        &self.bytes[1..self.bytes.len() - CHECKSUM_LEN]
    }
}

/// Outcome of feeding one byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RxEvent {
    /// Not a command header; dropped
    Skipped,
    /// Byte buffered, frame not complete
    Buffered,
    /// Complete frame with a valid checksum
    Accepted(CommandFrame),
    /// Complete frame with a bad checksum
    Rejected,
}

/// Byte-at-a-time command framer
#[derive(Debug, Clone)]
pub struct Receiver {
    state: RxState,
    frame: Vec<u8, MAX_COMMAND_FRAME>,
    descriptor: Option<CommandDescriptor>,
    last_byte_at: u32,
}

impl Default for Receiver {
    fn default() -> Self {
        Self::new()
    }
}

impl Receiver {
    /// Create a receiver waiting for a header
    pub const fn new() -> Self {
        Self {
            state: RxState::AwaitingHeader,
            frame: Vec::new(),
            descriptor: None,
            last_byte_at: 0,
        }
    }

    /// Current state
    pub fn state(&self) -> RxState {
        self.state
    }

    /// Drop any partial frame and wait for a header
    pub fn reset(&mut self) {
        self.state = RxState::AwaitingHeader;
        self.frame.clear();
        self.descriptor = None;
    }

    /// Feed one byte received at `now`
    pub fn feed(&mut self, byte: u8, now: u32, commands: &CommandTable) -> RxEvent {
        self.last_byte_at = now;

        let remaining = match self.state {
            RxState::AwaitingHeader => {
                let Some(descriptor) = commands.lookup(byte) else {
                    return RxEvent::Skipped;
                };
                self.frame.clear();
                self.descriptor = Some(descriptor);
                descriptor.expected_after_header() + 1
            }
            RxState::AwaitingPayload { remaining } => remaining,
        };

        if self.frame.push(byte).is_err() {
            self.reset();
            return RxEvent::Rejected;
        }
        if remaining > 1 {
            self.state = RxState::AwaitingPayload {
                remaining: remaining - 1,
            };
            return RxEvent::Buffered;
        }

        let event = match self.descriptor {
            Some(descriptor) if has_valid_checksum(&self.frame) => RxEvent::Accepted(CommandFrame {
                descriptor,
                bytes: self.frame.clone(),
            }),
            _ => RxEvent::Rejected,
        };
        self.reset();
        event
    }

    /// Drop a partial frame if no byte arrived for more than `timeout` ticks
    ///
    /// Returns true if a frame was dropped.
    pub fn expire(&mut self, now: u32, timeout: u32) -> bool {
        if self.state == RxState::AwaitingHeader {
            return false;
        }
        if now.wrapping_sub(self.last_byte_at) > timeout {
            self.reset();
            return true;
        }
        false
    }
}
