//! Frame encoding for the OpenShoe host link.
//!
//! Command frame (host → device):
//! - HEADER (1 byte): command ID, doubles as the synchronization byte
//! - PAYLOAD (0-17 bytes): fixed length per command ID
//! - CHECKSUM (2 bytes): 16-bit sum of HEADER and PAYLOAD, MSB first
//!
//! Device frames reuse the same checksum. Short frames (ack, notice) carry
//! a single body byte; block frames (info, state report) carry a length byte.

/// Number of checksum bytes trailing every checksummed frame
pub const CHECKSUM_LEN: usize = 2;

/// Largest command frame the device will buffer (header + payload + checksum)
pub const MAX_COMMAND_FRAME: usize = 20;

/// Largest command payload
pub const MAX_COMMAND_PAYLOAD: usize = MAX_COMMAND_FRAME - 1 - CHECKSUM_LEN;

/// Acknowledgement header
pub const ACK_HEADER: u8 = 0xA0;

/// Negative acknowledgement header
pub const NAK_HEADER: u8 = 0xA1;

/// Device information block header
pub const INFO_HEADER: u8 = 0xA2;

/// Asynchronous notice header
pub const NOTICE_HEADER: u8 = 0xA3;

/// Periodic state report header
pub const STATE_REPORT_HEADER: u8 = 0xAA;

/// Length of an acknowledgement or notice frame
pub const SHORT_FRAME_LEN: usize = 2 + CHECKSUM_LEN;

/// The negative acknowledgement is a fixed pattern, not checksummed
pub const NAK_FRAME: [u8; 3] = [NAK_HEADER, 0x00, NAK_HEADER];

/// Largest payload a block frame can carry (length is a single byte)
pub const MAX_BLOCK_PAYLOAD: usize = u8::MAX as usize;

/// Largest block frame (HEADER + LENGTH + MAX_BLOCK_PAYLOAD + CHECKSUM)
pub const MAX_BLOCK_FRAME: usize = 2 + MAX_BLOCK_PAYLOAD + CHECKSUM_LEN;

/// Errors that can occur during frame parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Invalid frame structure
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// 16-bit wrapping sum of `bytes`
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |sum, &byte| sum.wrapping_add(u16::from(byte)))
}

/// Checksum of `bytes` in wire order (MSB first)
pub fn checksum_bytes(bytes: &[u8]) -> [u8; CHECKSUM_LEN] {
    checksum(bytes).to_be_bytes()
}

/// Check the two trailing checksum bytes of `frame` against the rest of it
pub fn has_valid_checksum(frame: &[u8]) -> bool {
    if frame.len() <= CHECKSUM_LEN {
        return false;
    }
    let (body, trailer) = frame.split_at(frame.len() - CHECKSUM_LEN);
    trailer == checksum_bytes(body)
}

/// Encode a host command into `buffer`
///
/// Returns the number of bytes written
pub fn encode_command(header: u8, payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if payload.len() > MAX_COMMAND_PAYLOAD {
        return Err(FrameError::PayloadTooLarge);
    }
    let frame_len = 1 + payload.len() + CHECKSUM_LEN;
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[0] = header;
    buffer[1..1 + payload.len()].copy_from_slice(payload);
    let chk = checksum_bytes(&buffer[..1 + payload.len()]);
    buffer[1 + payload.len()..frame_len].copy_from_slice(&chk);

    Ok(frame_len)
}

fn encode_short(header: u8, body: u8) -> [u8; SHORT_FRAME_LEN] {
    let [hi, lo] = checksum_bytes(&[header, body]);
    [header, body, hi, lo]
}

/// Acknowledgement echoing the header of the accepted command
pub fn encode_ack(command_header: u8) -> [u8; SHORT_FRAME_LEN] {
    encode_short(ACK_HEADER, command_header)
}

/// Notice frame carrying a single code byte
pub fn encode_notice(code: u8) -> [u8; SHORT_FRAME_LEN] {
    encode_short(NOTICE_HEADER, code)
}

/// Encode a length-prefixed block frame (`[header][len][payload][chk]`)
///
/// Returns the number of bytes written
pub fn encode_block(header: u8, payload: &[u8], buffer: &mut [u8]) -> Result<usize, FrameError> {
    if payload.len() > MAX_BLOCK_PAYLOAD {
        return Err(FrameError::PayloadTooLarge);
    }
    let frame_len = 2 + payload.len() + CHECKSUM_LEN;
    if buffer.len() < frame_len {
        return Err(FrameError::BufferTooSmall);
    }

    buffer[0] = header;
    buffer[1] = payload.len() as u8;
    buffer[2..2 + payload.len()].copy_from_slice(payload);
    let chk = checksum_bytes(&buffer[..2 + payload.len()]);
    buffer[2 + payload.len()..frame_len].copy_from_slice(&chk);

    Ok(frame_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_wraps() {
        // 300 * 0xFF = 76500, which wraps to 10964
        assert_eq!(checksum(&[0xFF; 300]), 10964);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_encode_command_with_payload() {
        let mut buffer = [0u8; MAX_COMMAND_FRAME];
        let len = encode_command(0x20, &[0x11, 0x03], &mut buffer).unwrap();

        assert_eq!(len, 5);
        assert_eq!(&buffer[..len], &[0x20, 0x11, 0x03, 0x00, 0x34]);
        assert!(has_valid_checksum(&buffer[..len]));
    }

    #[test]
    fn test_encode_command_empty_payload() {
        let mut buffer = [0u8; 4];
        let len = encode_command(0x10, &[], &mut buffer).unwrap();
        assert_eq!(&buffer[..len], &[0x10, 0x00, 0x10]);
    }

    #[test]
    fn test_encode_command_limits() {
        let mut buffer = [0u8; 64];
        let payload = [0u8; MAX_COMMAND_PAYLOAD + 1];
        assert_eq!(
            encode_command(0x20, &payload, &mut buffer),
            Err(FrameError::PayloadTooLarge)
        );

        let mut small = [0u8; 3];
        assert_eq!(
            encode_command(0x20, &[1, 2], &mut small),
            Err(FrameError::BufferTooSmall)
        );
    }

    #[test]
    fn test_ack_layout() {
        assert_eq!(encode_ack(0x20), [0xA0, 0x20, 0x00, 0xC0]);
        assert_eq!(encode_ack(0x70), [0xA0, 0x70, 0x01, 0x10]);
    }

    #[test]
    fn test_notice_layout() {
        assert_eq!(encode_notice(0x67), [0xA3, 0x67, 0x01, 0x0A]);
    }

    #[test]
    fn test_block_layout() {
        let mut buffer = [0u8; 16];
        let len = encode_block(STATE_REPORT_HEADER, &[0x01, 0x02, 0x03], &mut buffer).unwrap();

        assert_eq!(len, 7);
        assert_eq!(buffer[0], STATE_REPORT_HEADER);
        assert_eq!(buffer[1], 3);
        assert_eq!(&buffer[2..5], &[0x01, 0x02, 0x03]);
        // 0xAA + 3 + 1 + 2 + 3 = 0xB3
        assert_eq!(&buffer[5..7], &[0x00, 0xB3]);
    }

    #[test]
    fn test_block_payload_too_large() {
        let mut buffer = [0u8; MAX_BLOCK_FRAME + 1];
        let payload = [0u8; MAX_BLOCK_PAYLOAD + 1];
        assert_eq!(
            encode_block(INFO_HEADER, &payload, &mut buffer),
            Err(FrameError::PayloadTooLarge)
        );
        assert!(encode_block(INFO_HEADER, &payload[..MAX_BLOCK_PAYLOAD], &mut buffer).is_ok());
    }

    #[test]
    fn test_short_frames_fail_checksum_check() {
        assert!(!has_valid_checksum(&[0x01, 0x00]));
        assert!(!has_valid_checksum(&[]));
    }
}
