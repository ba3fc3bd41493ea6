//! Navigation filter trait

use openshoe_hal::ImuReadings;

use crate::registry::ProcessingStep;
use crate::state::NavState;

/// Progress reported by a running accelerometer calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationEvent {
    /// Enough samples in the current orientation; the device should be moved
    OrientationRequired,
    /// Every orientation has been sampled and the biases are updated
    Finished,
}

/// Strapdown navigation filter and calibration routines
///
/// The core schedules processing steps but never looks inside them. Each
/// call to [`NavigationFilter::execute`] runs one step to completion.
pub trait NavigationFilter {
    /// Run one processing step against the latest readings
    fn execute(&mut self, step: ProcessingStep, imu: &ImuReadings, nav: &mut NavState);

    /// Drop all filter state and start a new initial alignment
    fn restart(&mut self);

    /// Whether the initial alignment has converged
    fn is_aligned(&self) -> bool;

    /// Prepare an accelerometer calibration over `orientations` poses
    fn start_accelerometer_calibration(&mut self, orientations: u8);

    /// Take the latest calibration event, if one is pending
    ///
    /// Returns each event once.
    fn poll_calibration(&mut self) -> Option<CalibrationEvent>;
}
