//! Runtime configuration
//!
//! Compile-time limits live next to the types that use them. The values
//! here are the few knobs a board crate may want to tune.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Length of the device identifier returned by the identifier query
pub const DEVICE_ID_LEN: usize = 14;

/// Runtime tuning knobs
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RuntimeConfig {
    /// Upper bound on bytes consumed by one receive pass
    ///
    /// Bounds worst-case cycle time; leftover bytes wait for the next cycle.
    pub rx_bytes_per_cycle: u8,
    /// Silence, in trigger timestamp ticks, after which a partially
    /// received command is dropped
    pub rx_timeout_ticks: u32,
    /// Identifier returned by the device-identifier query
    pub device_id: [u8; DEVICE_ID_LEN],
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            rx_bytes_per_cycle: 10,
            rx_timeout_ticks: 200_000_000,
            device_id: [0; DEVICE_ID_LEN],
        }
    }
}

impl RuntimeConfig {
    /// Default configuration with a board-specific device identifier
    pub fn with_device_id(device_id: [u8; DEVICE_ID_LEN]) -> Self {
        Self {
            device_id,
            ..Self::default()
        }
    }
}
