//! OpenShoe host link protocol
//!
//! Binary protocol spoken between the navigation unit and its host over a
//! single serial link (USB CDC or UART).
//!
//! # Protocol Overview
//!
//! Host to device, one command per frame. The payload length is fixed per
//! header, so no length byte is sent:
//! ```text
//! ┌────────┬───────────────┬────────┬────────┐
//! │ HEADER │ PAYLOAD       │ CHK_HI │ CHK_LO │
//! │ 1B     │ 0–17B         │ 1B     │ 1B     │
//! └────────┴───────────────┴────────┴────────┘
//! ```
//!
//! Device to host:
//! ```text
//! ack        A0 <header> CHK_HI CHK_LO
//! nak        A1 00 A1
//! info       A2 <len> <payload…> CHK_HI CHK_LO
//! notice     A3 <code> CHK_HI CHK_LO
//! report     AA <len> <state bytes…> CHK_HI CHK_LO
//! ```
//!
//! Every checksum is the 16-bit wrapping sum of the preceding frame bytes,
//! sent most significant byte first.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod ids;
pub mod parser;

pub use frame::{
    checksum, checksum_bytes, encode_ack, encode_block, encode_command, encode_notice,
    has_valid_checksum, FrameError, ACK_HEADER, CHECKSUM_LEN, INFO_HEADER, MAX_BLOCK_FRAME,
    MAX_BLOCK_PAYLOAD, MAX_COMMAND_FRAME, MAX_COMMAND_PAYLOAD, NAK_FRAME, NAK_HEADER,
    NOTICE_HEADER, STATE_REPORT_HEADER,
};
pub use parser::{DeviceFrame, DeviceFrameParser};
