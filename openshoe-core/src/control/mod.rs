//! Controller: the state the command handlers act on
//!
//! Owns the system state, the output multiplexer, the process sequence and
//! the two per-cycle collaborators (navigation filter and inertial sensor).
//! The cycle orchestrator drives it; the protocol engine reaches it through
//! [`crate::engine::CommandHandler`].

mod handlers;

use openshoe_hal::InertialSensor;
use openshoe_protocol::ids::notice;

use crate::config::{RuntimeConfig, DEVICE_ID_LEN};
use crate::engine::ReplyBuffer;
use crate::output::OutputMultiplexer;
use crate::registry::{ProcessingStep, Registry};
use crate::sequence::{ProcessSequence, SequenceError};
use crate::state::{FaultRegister, SoftFault, SystemState};
use crate::traits::{CalibrationEvent, NavigationFilter};

/// Chain run while the filter aligns
pub const ALIGNMENT_CHAIN: [ProcessingStep; 2] =
    [ProcessingStep::UpdateBuffer, ProcessingStep::InitialAlignment];

/// Chain run during ZUPT-aided navigation
pub const NAVIGATION_CHAIN: [ProcessingStep; 5] = [
    ProcessingStep::UpdateBuffer,
    ProcessingStep::Mechanization,
    ProcessingStep::TimeUpdate,
    ProcessingStep::ZuptDetector,
    ProcessingStep::ZuptUpdate,
];

/// Entry of the process sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Step {
    /// Filter or calibration step, addressable by the host
    Processing(ProcessingStep),
    /// Sequencing logic installed by a command
    Control(ControlStep),
}

/// Steps that rearrange the sequence itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlStep {
    /// Switch to the navigation chain once the filter is aligned
    FinishAlignment,
    /// Return to the saved chain
    RestoreSequence,
    /// Report accelerometer calibration progress and finish it
    CalibrationCheckpoint,
}

/// Mutable side of the runtime
pub struct Controller<F, S> {
    state: SystemState,
    outputs: OutputMultiplexer,
    sequence: ProcessSequence<Step>,
    filter: F,
    sensor: S,
    device_id: [u8; DEVICE_ID_LEN],
}

impl<F, S> Controller<F, S>
where
    F: NavigationFilter,
    S: InertialSensor,
{
    /// Create a controller with every output off and an empty sequence
    pub fn new(registry: &Registry, filter: F, sensor: S, config: &RuntimeConfig) -> Self {
        Self {
            state: SystemState::new(),
            outputs: OutputMultiplexer::new(*registry.states().ids()),
            sequence: ProcessSequence::new(),
            filter,
            sensor,
            device_id: config.device_id,
        }
    }

    /// Refresh the sensor readings
    ///
    /// On a failed read the previous readings are kept and a fault raised.
    pub fn read_sensor(&mut self) {
        match self.sensor.burst_read() {
            Ok(readings) => self.state.imu = readings,
            Err(_) => self.raise(SoftFault::SensorReadFailed),
        }
    }

    /// Run the process sequence once
    pub fn run_sequence(&mut self, replies: &mut ReplyBuffer) {
        let Self {
            state,
            sequence,
            filter,
            ..
        } = self;

        sequence.run(|sequence, step| match step {
            Step::Processing(step) => filter.execute(step, &state.imu, &mut state.nav),
            Step::Control(control) => {
                run_control_step(control, sequence, filter, &mut state.faults, replies)
            }
        });
    }

    /// Record a soft fault
    pub fn raise(&mut self, fault: SoftFault) {
        self.state.faults.raise(fault);
    }

    /// Start a new cycle
    pub fn begin_cycle(&mut self) {
        self.state.cycle_counter = self.state.cycle_counter.wrapping_add(1);
    }

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SystemState {
        &mut self.state
    }

    pub fn outputs(&self) -> &OutputMultiplexer {
        &self.outputs
    }

    pub fn outputs_mut(&mut self) -> &mut OutputMultiplexer {
        &mut self.outputs
    }

    pub fn sequence(&self) -> &ProcessSequence<Step> {
        &self.sequence
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn filter_mut(&mut self) -> &mut F {
        &mut self.filter
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }
}

fn run_control_step<F: NavigationFilter>(
    control: ControlStep,
    sequence: &mut ProcessSequence<Step>,
    filter: &mut F,
    faults: &mut FaultRegister,
    replies: &mut ReplyBuffer,
) {
    match control {
        ControlStep::FinishAlignment => {
            if filter.is_aligned() {
                log_info!("alignment complete, starting navigation");
                install_chain(sequence, &NAVIGATION_CHAIN);
            }
        }
        ControlStep::RestoreSequence => restore(sequence, faults),
        ControlStep::CalibrationCheckpoint => match filter.poll_calibration() {
            Some(CalibrationEvent::OrientationRequired) => {
                notify(replies, faults, notice::NEXT_ORIENTATION);
            }
            Some(CalibrationEvent::Finished) => {
                log_info!("accelerometer calibration complete");
                notify(replies, faults, notice::CALIBRATION_COMPLETE);
                restore(sequence, faults);
            }
            None => {}
        },
    }
}

/// Empty the sequence and fill it from slot 0 with `chain`
fn install_chain(sequence: &mut ProcessSequence<Step>, chain: &[ProcessingStep]) {
    sequence.fill(chain.iter().map(|&step| Step::Processing(step)));
}

fn restore(sequence: &mut ProcessSequence<Step>, faults: &mut FaultRegister) {
    match sequence.restore() {
        Ok(()) => log_info!("sequence restored"),
        Err(err) => faults.raise(err.into()),
    }
}

fn notify(replies: &mut ReplyBuffer, faults: &mut FaultRegister, code: u8) {
    if replies.push_notice(code).is_err() {
        faults.raise(SoftFault::ReplyOverflow);
    }
}

impl From<SequenceError> for SoftFault {
    fn from(err: SequenceError) -> Self {
        match err {
            SequenceError::IndexOutOfRange(_) => SoftFault::SequenceIndexOutOfRange,
            SequenceError::AlreadySaved => SoftFault::SequenceAlreadySaved,
            SequenceError::NothingSaved => SoftFault::NothingSaved,
        }
    }
}
