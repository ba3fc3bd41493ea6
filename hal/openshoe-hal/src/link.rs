//! Serial link abstraction
//!
//! The host link is polled once per cycle in each direction. None of these
//! calls may block: a byte is either available or not, and the transmitter
//! either has room for one more byte or not.

/// Polled byte transport to the host
pub trait SerialLink {
    /// Error type for transmit operations
    type Error;

    /// Whether a host is attached (USB VBUS high, cable present, ...)
    ///
    /// While detached the runtime drops any partially received command and
    /// skips the transmit pass.
    fn is_attached(&self) -> bool;

    /// Take the next received byte, if one is available
    fn read_byte(&mut self) -> Option<u8>;

    /// Whether the transmitter can accept another byte right now
    fn tx_ready(&self) -> bool;

    /// Queue one byte for transmission
    ///
    /// Only called after [`SerialLink::tx_ready`] returned true.
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;
}
