//! Navigation filter outputs

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// State written by the navigation filter steps
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NavState {
    /// Position in the navigation frame [m]
    pub position: [f32; 3],
    /// Velocity in the navigation frame [m/s]
    pub velocity: [f32; 3],
    /// Attitude quaternion, scalar first
    pub quaternion: [f32; 4],
    /// Zero-velocity detector output for the current cycle
    pub zupt: bool,
    /// Accelerometer bias estimate [m/s^2]
    pub accelerometer_biases: [f32; 3],
}

impl Default for NavState {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            velocity: [0.0; 3],
            quaternion: [1.0, 0.0, 0.0, 0.0],
            zupt: false,
            accelerometer_biases: [0.0; 3],
        }
    }
}
