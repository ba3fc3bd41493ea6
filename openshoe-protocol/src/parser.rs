//! Parser for the device → host byte stream
//!
//! Used by host tooling and by the device's own tests to read back what the
//! transmit pass produced. Bytes that cannot start a device frame are
//! skipped, so the parser resynchronizes after line noise.

use heapless::Vec;

use crate::frame::{
    checksum_bytes, FrameError, ACK_HEADER, CHECKSUM_LEN, INFO_HEADER, MAX_BLOCK_FRAME,
    MAX_BLOCK_PAYLOAD, NAK_FRAME, NAK_HEADER, NOTICE_HEADER, SHORT_FRAME_LEN,
    STATE_REPORT_HEADER,
};

/// A complete frame sent by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceFrame {
    /// Command accepted; echoes the command header
    Ack { header: u8 },
    /// Command rejected on checksum
    Nak,
    /// Asynchronous notice
    Notice { code: u8 },
    /// Device information block
    Info { payload: Vec<u8, MAX_BLOCK_PAYLOAD> },
    /// Periodic state report
    StateReport { payload: Vec<u8, MAX_BLOCK_PAYLOAD> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for a device frame header
    WaitingForHeader,
    /// Block header seen, waiting for LENGTH
    WaitingForLength,
    /// Collecting bytes until the frame reaches `total` bytes
    Collecting { total: usize },
}

/// State machine for parsing device frames
#[derive(Debug, Clone)]
pub struct DeviceFrameParser {
    state: ParseState,
    buffer: Vec<u8, MAX_BLOCK_FRAME>,
}

impl Default for DeviceFrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceFrameParser {
    /// Create a new parser
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForHeader,
            buffer: Vec::new(),
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForHeader;
        self.buffer.clear();
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is parsed,
    /// `Ok(None)` when more bytes are needed, or `Err` on parse error.
    pub fn feed(&mut self, byte: u8) -> Result<Option<DeviceFrame>, FrameError> {
        match self.state {
            ParseState::WaitingForHeader => {
                let total = match byte {
                    ACK_HEADER | NOTICE_HEADER => Some(SHORT_FRAME_LEN),
                    NAK_HEADER => Some(NAK_FRAME.len()),
                    INFO_HEADER | STATE_REPORT_HEADER => None,
                    // Not a frame start; skip
                    _ => return Ok(None),
                };
                self.buffer.clear();
                self.buffer_byte(byte)?;
                self.state = match total {
                    Some(total) => ParseState::Collecting { total },
                    None => ParseState::WaitingForLength,
                };
                Ok(None)
            }
            ParseState::WaitingForLength => {
                self.buffer_byte(byte)?;
                self.state = ParseState::Collecting {
                    total: 2 + byte as usize + CHECKSUM_LEN,
                };
                Ok(None)
            }
            ParseState::Collecting { total } => {
                self.buffer_byte(byte)?;
                if self.buffer.len() < total {
                    return Ok(None);
                }
                let result = self.finish();
                self.reset();
                result.map(Some)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<DeviceFrame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn buffer_byte(&mut self, byte: u8) -> Result<(), FrameError> {
        self.buffer.push(byte).map_err(|_| {
            self.reset();
            FrameError::InvalidFrame
        })
    }

    fn finish(&self) -> Result<DeviceFrame, FrameError> {
        let frame = self.buffer.as_slice();
        let header = frame[0];

        if header == NAK_HEADER {
            return if frame == NAK_FRAME {
                Ok(DeviceFrame::Nak)
            } else {
                Err(FrameError::InvalidFrame)
            };
        }

        let (body, trailer) = frame.split_at(frame.len() - CHECKSUM_LEN);
        if trailer != checksum_bytes(body) {
            return Err(FrameError::InvalidChecksum);
        }

        match header {
            ACK_HEADER => Ok(DeviceFrame::Ack { header: body[1] }),
            NOTICE_HEADER => Ok(DeviceFrame::Notice { code: body[1] }),
            INFO_HEADER | STATE_REPORT_HEADER => {
                let mut payload = Vec::new();
                payload
                    .extend_from_slice(&body[2..])
                    .map_err(|_| FrameError::PayloadTooLarge)?;
                if header == INFO_HEADER {
                    Ok(DeviceFrame::Info { payload })
                } else {
                    Ok(DeviceFrame::StateReport { payload })
                }
            }
            _ => Err(FrameError::InvalidFrame),
        }
    }
}
