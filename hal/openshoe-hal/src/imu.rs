//! Inertial sensor abstraction
//!
//! The sensor driver performs one burst read per cycle and hands back the
//! scaled readings. Bus timing, status bits and raw-to-SI scaling belong to
//! the driver implementing this trait.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest accepted log2 of the on-sensor low-pass filter tap count
pub const MAX_LOG2_FILTER_TAPS: u8 = 4;

/// One set of readings from a burst read, in SI units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImuReadings {
    /// Specific force [m/s^2]
    pub specific_force: [f32; 3],
    /// Angular rate [rad/s]
    pub angular_rate: [f32; 3],
    /// Per-axis sensor temperature [°C]
    pub temperatures: [f32; 3],
    /// Supply voltage [V]
    pub supply_voltage: f32,
}

/// IMU reachable over a burst-read capable bus
pub trait InertialSensor {
    /// Error type for bus operations
    type Error;

    /// Read every output register in one burst
    fn burst_read(&mut self) -> Result<ImuReadings, Self::Error>;

    /// Set the on-sensor averaging filter to `2^log2_taps` taps
    ///
    /// Callers only pass values up to [`MAX_LOG2_FILTER_TAPS`].
    fn set_filter_taps(&mut self, log2_taps: u8) -> Result<(), Self::Error>;
}
