//! One-shot reply buffer
//!
//! Acknowledgements, naks, info blocks and notices queued during a cycle.
//! The transmit pass copies them ahead of the state report and empties the
//! buffer.

use heapless::Vec;
use openshoe_protocol::{encode_ack, encode_block, encode_notice, INFO_HEADER, NAK_FRAME};

/// Bytes of replies that can be queued between two transmit passes
pub const REPLY_CAPACITY: usize = 32;

/// Reply did not fit and was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReplyOverflow;

/// Queued reply frames
#[derive(Debug, Clone, Default)]
pub struct ReplyBuffer {
    bytes: Vec<u8, REPLY_CAPACITY>,
    overflows: u32,
}

impl ReplyBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            overflows: 0,
        }
    }

    /// Queue an acknowledgement of `header`
    pub fn push_ack(&mut self, header: u8) -> Result<(), ReplyOverflow> {
        self.push_frame(&encode_ack(header))
    }

    /// Queue a negative acknowledgement
    pub fn push_nak(&mut self) -> Result<(), ReplyOverflow> {
        self.push_frame(&NAK_FRAME)
    }

    /// Queue an info block carrying `payload`
    pub fn push_info(&mut self, payload: &[u8]) -> Result<(), ReplyOverflow> {
        let mut frame = [0u8; REPLY_CAPACITY];
        match encode_block(INFO_HEADER, payload, &mut frame) {
            Ok(len) => self.push_frame(&frame[..len]),
            Err(_) => self.overflow(),
        }
    }

    /// Queue a notice carrying `code`
    pub fn push_notice(&mut self, code: u8) -> Result<(), ReplyOverflow> {
        self.push_frame(&encode_notice(code))
    }

    /// Queued bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Drop every queued reply
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Drop replies queued after the first `len` bytes
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Number of queued bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Replies dropped for lack of room since power-up, wrapping
    pub fn overflows(&self) -> u32 {
        self.overflows
    }

    // Whole frames only; a partial frame would desynchronize the host
    fn push_frame(&mut self, frame: &[u8]) -> Result<(), ReplyOverflow> {
        if self.bytes.extend_from_slice(frame).is_err() {
            return self.overflow();
        }
        Ok(())
    }

    fn overflow(&mut self) -> Result<(), ReplyOverflow> {
        self.overflows = self.overflows.wrapping_add(1);
        Err(ReplyOverflow)
    }
}
