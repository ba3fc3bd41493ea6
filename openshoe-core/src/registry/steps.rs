//! Processing step descriptors
//!
//! Processing steps are the externally implemented stages of the navigation
//! filter and the calibration routines. The core only knows them by ID and
//! hands them to [`crate::traits::NavigationFilter::execute`].

use openshoe_protocol::ids::step as id;

use super::idset::IdSet;
use super::RegistryError;

/// Processing step implemented by the navigation filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProcessingStep {
    /// Push the latest readings into the filter's input buffers
    UpdateBuffer,
    /// Accumulate the initial alignment (attitude from gravity)
    InitialAlignment,
    /// Strapdown mechanization
    Mechanization,
    /// Kalman filter time update
    TimeUpdate,
    /// Zero-velocity detector
    ZuptDetector,
    /// Zero-velocity measurement update
    ZuptUpdate,
    /// Gyroscope bias null calibration
    GyroCalibration,
    /// Accelerometer calibration over several orientations
    AccelerometerCalibration,
}

/// Static description of one processing step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepDescriptor {
    /// Step ID as used by the host
    pub id: u8,
    /// Step to execute
    pub step: ProcessingStep,
}

impl StepDescriptor {
    /// Describe a step
    pub const fn new(id: u8, step: ProcessingStep) -> Self {
        Self { id, step }
    }
}

/// Steps provided by the standard navigation filter
pub const STANDARD_STEPS: &[StepDescriptor] = &[
    StepDescriptor::new(id::UPDATE_BUFFER, ProcessingStep::UpdateBuffer),
    StepDescriptor::new(id::INITIAL_ALIGNMENT, ProcessingStep::InitialAlignment),
    StepDescriptor::new(id::MECHANIZATION, ProcessingStep::Mechanization),
    StepDescriptor::new(id::TIME_UPDATE, ProcessingStep::TimeUpdate),
    StepDescriptor::new(id::ZUPT_DETECTOR, ProcessingStep::ZuptDetector),
    StepDescriptor::new(id::ZUPT_UPDATE, ProcessingStep::ZuptUpdate),
    StepDescriptor::new(id::GYRO_CALIBRATION, ProcessingStep::GyroCalibration),
    StepDescriptor::new(
        id::ACCELEROMETER_CALIBRATION,
        ProcessingStep::AccelerometerCalibration,
    ),
];

/// ID-indexed step lookup
#[derive(Debug, Clone)]
pub struct StepTable {
    ids: IdSet,
    entries: [Option<StepDescriptor>; 256],
}

impl Default for StepTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StepTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            ids: IdSet::new(),
            entries: [None; 256],
        }
    }

    /// Add descriptors to the table; a rejected batch changes nothing
    pub fn register(&mut self, descriptors: &[StepDescriptor]) -> Result<(), RegistryError> {
        let mut seen = self.ids;
        for descriptor in descriptors {
            if !seen.insert(descriptor.id) {
                return Err(RegistryError::DuplicateStep(descriptor.id));
            }
        }

        for descriptor in descriptors {
            self.ids.insert(descriptor.id);
            self.entries[descriptor.id as usize] = Some(*descriptor);
        }
        Ok(())
    }

    /// Descriptor registered for `id`
    pub fn lookup(&self, id: u8) -> Option<StepDescriptor> {
        self.entries[id as usize]
    }

    /// Number of registered steps
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check whether no step is registered
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
