//! System state shared by the processing steps and the state report
//!
//! A single [`SystemState`] owns every quantity the host can ask for. The
//! sensor read refreshes `imu`, the navigation filter steps mutate `nav`,
//! and the state report encodes straight out of it each cycle, so what is
//! reported is always what the filter is working with.

pub mod faults;
pub mod nav;

pub use faults::{FaultRegister, SoftFault};
pub use nav::NavState;

use openshoe_hal::ImuReadings;

/// Everything the device can report
#[derive(Debug, Clone, Default)]
pub struct SystemState {
    /// Latest sensor readings
    pub imu: ImuReadings,
    /// Navigation filter outputs
    pub nav: NavState,
    /// Number of cycles started since power-up
    pub cycle_counter: u32,
    /// Sticky soft faults and the deadline-overrun count
    pub faults: FaultRegister,
}

impl SystemState {
    /// Create a zeroed state
    pub fn new() -> Self {
        Self::default()
    }
}
