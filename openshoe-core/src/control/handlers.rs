//! Command handlers
//!
//! Every handler runs to completion inside the cycle. Bad arguments never
//! stop the cycle; they end up as soft faults.

use openshoe_hal::{InertialSensor, MAX_LOG2_FILTER_TAPS};
use openshoe_protocol::ids::state as sid;

use super::{install_chain, ControlStep, Controller, Step, ALIGNMENT_CHAIN};
use crate::engine::{CommandArgs, ReplyBuffer};
use crate::output::OutputError;
use crate::registry::{Command, ProcessingStep, Registry};
use crate::state::SoftFault;
use crate::traits::NavigationFilter;

impl From<OutputError> for SoftFault {
    fn from(err: OutputError) -> Self {
        match err {
            OutputError::UnknownState(_) => SoftFault::UnknownState,
            OutputError::DividerOutOfRange(_) => SoftFault::DividerOutOfRange,
        }
    }
}

impl<F, S> Controller<F, S>
where
    F: NavigationFilter,
    S: InertialSensor,
{
    /// Run one accepted command
    pub fn handle(
        &mut self,
        command: Command,
        args: &CommandArgs<'_>,
        replies: &mut ReplyBuffer,
        registry: &Registry,
    ) {
        if let Err(fault) = self.dispatch(command, args, replies, registry) {
            self.raise(fault);
        }
    }

    fn dispatch(
        &mut self,
        command: Command,
        args: &CommandArgs<'_>,
        replies: &mut ReplyBuffer,
        registry: &Registry,
    ) -> Result<(), SoftFault> {
        let arg = |index| args.u8_at(index).ok_or(SoftFault::MalformedArguments);

        match command {
            Command::Acknowledge => Ok(()),
            Command::DeviceId => replies
                .push_info(&self.device_id)
                .map_err(|_| SoftFault::ReplyOverflow),
            Command::ClearFaults => {
                self.state.faults.clear();
                Ok(())
            }
            Command::ResetNavigation => {
                self.reset_navigation();
                Ok(())
            }
            Command::GyroCalibration => self.start_gyro_calibration(),
            Command::AccelerometerCalibration => self.start_accelerometer_calibration(arg(0)?),
            Command::SetLowPassFilter => self.set_low_pass_filter(arg(0)?),
            Command::OutputState => Ok(self.outputs.set_output(arg(0)?, arg(1)?)?),
            Command::OutputAllOff => {
                self.outputs.disable_all();
                Ok(())
            }
            Command::OutputInertial => {
                self.set_outputs(&[sid::ANGULAR_RATE, sid::SPECIFIC_FORCE], arg(0)?)
            }
            Command::OutputPositionPlusZupt => self.set_outputs(&[sid::POSITION, sid::ZUPT], arg(0)?),
            Command::OutputNavigationalStates => self.set_outputs(
                &[sid::POSITION, sid::VELOCITY, sid::QUATERNION, sid::CYCLE_COUNTER],
                arg(0)?,
            ),
            Command::AddSyncOutput => {
                let result = self.outputs.set_output(arg(0)?, arg(1)?);
                self.outputs.reset_all_counters();
                Ok(result?)
            }
            Command::SyncOutput => {
                self.outputs.reset_all_counters();
                Ok(())
            }
            Command::ProcessingStepOnOff => {
                self.processing_step_onoff(registry, arg(0)?, arg(1)?, arg(2)?)
            }
        }
    }

    // Applies the divider to every state, then reports the first failure
    fn set_outputs(&mut self, states: &[u8], log2_divider: u8) -> Result<(), SoftFault> {
        let mut result = Ok(());
        for &state in states {
            if let Err(err) = self.outputs.set_output(state, log2_divider) {
                result = result.and(Err(err.into()));
            }
        }
        result
    }

    fn reset_navigation(&mut self) {
        log_info!("restarting alignment");
        self.sequence.reset();
        self.filter.restart();
        install_chain(&mut self.sequence, &ALIGNMENT_CHAIN);
        self.sequence
            .set_last(Step::Control(ControlStep::FinishAlignment));
    }

    fn start_gyro_calibration(&mut self) -> Result<(), SoftFault> {
        self.sequence.save_and_clear()?;
        log_info!("gyro calibration started");
        self.install_temporary(
            ProcessingStep::GyroCalibration,
            ControlStep::RestoreSequence,
        );
        Ok(())
    }

    fn start_accelerometer_calibration(&mut self, orientations: u8) -> Result<(), SoftFault> {
        self.sequence.save_and_clear()?;
        log_info!("accelerometer calibration over {=u8} orientations", orientations);
        self.filter.start_accelerometer_calibration(orientations);
        self.install_temporary(
            ProcessingStep::AccelerometerCalibration,
            ControlStep::CalibrationCheckpoint,
        );
        Ok(())
    }

    fn install_temporary(&mut self, step: ProcessingStep, finish: ControlStep) {
        self.sequence.set_first(Step::Processing(step));
        self.sequence.set_last(Step::Control(finish));
    }

    fn set_low_pass_filter(&mut self, log2_taps: u8) -> Result<(), SoftFault> {
        if log2_taps > MAX_LOG2_FILTER_TAPS {
            return Err(SoftFault::FilterTapsOutOfRange);
        }
        self.sensor
            .set_filter_taps(log2_taps)
            .map_err(|_| SoftFault::SensorConfigFailed)
    }

    fn processing_step_onoff(
        &mut self,
        registry: &Registry,
        step_id: u8,
        on: u8,
        index: u8,
    ) -> Result<(), SoftFault> {
        let step = if on != 0 {
            let descriptor = registry.lookup_step(step_id).ok_or(SoftFault::UnknownStep)?;
            Some(Step::Processing(descriptor.step))
        } else {
            None
        };
        Ok(self.sequence.set(index, step)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RuntimeConfig;
    use crate::control::NAVIGATION_CHAIN;
    use crate::output::OutputRate;
    use crate::testing::{parse_frames, RecordingFilter, ScriptedSensor};
    use openshoe_protocol::ids::step;
    use openshoe_protocol::DeviceFrame;

    struct Fixture {
        registry: Registry,
        controller: Controller<RecordingFilter, ScriptedSensor>,
        replies: ReplyBuffer,
    }

    impl Fixture {
        fn new() -> Self {
            let registry = Registry::standard().unwrap();
            let config = RuntimeConfig::with_device_id(*b"OpenShoe-00042");
            let controller = Controller::new(
                &registry,
                RecordingFilter::default(),
                ScriptedSensor::default(),
                &config,
            );
            Self {
                registry,
                controller,
                replies: ReplyBuffer::new(),
            }
        }

        fn send(&mut self, command: Command, payload: &[u8]) {
            let widths = self.registry.commands();
            let descriptor = (0..=u8::MAX)
                .filter_map(|id| widths.lookup(id))
                .find(|d| d.command == command)
                .unwrap();
            let args = CommandArgs::split(payload, descriptor.field_widths).unwrap();
            self.controller
                .handle(command, &args, &mut self.replies, &self.registry);
        }

        fn is_set(&self, fault: SoftFault) -> bool {
            self.controller.state().faults.is_set(fault)
        }
    }

    #[test]
    fn test_device_id() {
        let mut fx = Fixture::new();
        fx.send(Command::DeviceId, &[]);

        let frames = parse_frames(fx.replies.as_slice());
        let [DeviceFrame::Info { payload }] = frames.as_slice() else {
            panic!("expected one info frame, got {:?}", frames);
        };
        assert_eq!(payload.as_slice(), b"OpenShoe-00042");
    }

    #[test]
    fn test_output_state() {
        let mut fx = Fixture::new();
        fx.send(Command::OutputState, &[sid::VELOCITY, 3]);
        assert_eq!(
            fx.controller.outputs().rate(sid::VELOCITY),
            OutputRate { divider: 4, counter: 0 }
        );

        fx.send(Command::OutputState, &[0x77, 3]);
        assert!(fx.is_set(SoftFault::UnknownState));
        fx.send(Command::OutputState, &[sid::VELOCITY, 20]);
        assert!(fx.is_set(SoftFault::DividerOutOfRange));
        assert_eq!(fx.controller.outputs().rate(sid::VELOCITY).divider, 4);
    }

    #[test]
    fn test_output_groups() {
        let mut fx = Fixture::new();
        fx.send(Command::OutputInertial, &[1]);
        fx.send(Command::OutputPositionPlusZupt, &[2]);
        fx.send(Command::OutputNavigationalStates, &[3]);

        let enabled: Vec<u8> = fx.controller.outputs().enabled().iter().collect();
        assert_eq!(
            enabled,
            vec![
                sid::SPECIFIC_FORCE,
                sid::ANGULAR_RATE,
                sid::POSITION,
                sid::VELOCITY,
                sid::QUATERNION,
                sid::ZUPT,
                sid::CYCLE_COUNTER,
            ]
        );
        assert_eq!(fx.controller.outputs().rate(sid::ZUPT).divider, 2);
        assert_eq!(fx.controller.outputs().rate(sid::POSITION).divider, 4);

        fx.send(Command::OutputAllOff, &[]);
        assert!(fx.controller.outputs().enabled().is_empty());
    }

    #[test]
    fn test_add_sync_output() {
        let mut fx = Fixture::new();
        fx.send(Command::OutputState, &[sid::POSITION, 3]);
        fx.controller.outputs_mut().tick_and_select();
        fx.send(Command::AddSyncOutput, &[sid::VELOCITY, 4]);

        assert_eq!(fx.controller.outputs().rate(sid::POSITION).counter, 0);
        let due = fx.controller.outputs_mut().tick_and_select();
        assert!(due.contains(sid::POSITION) && due.contains(sid::VELOCITY));
    }

    #[test]
    fn test_reset_navigation() {
        let mut fx = Fixture::new();
        fx.send(Command::ResetNavigation, &[]);

        assert_eq!(fx.controller.filter().restarts, 1);
        let sequence = fx.controller.sequence();
        assert_eq!(sequence.get(0), Some(Step::Processing(ProcessingStep::UpdateBuffer)));
        assert_eq!(
            sequence.get(1),
            Some(Step::Processing(ProcessingStep::InitialAlignment))
        );
        assert_eq!(sequence.get(9), Some(Step::Control(ControlStep::FinishAlignment)));
        assert_eq!(sequence.slots().iter().flatten().count(), 3);
    }

    #[test]
    fn test_reset_during_calibration_leaves_normal_mode() {
        let mut fx = Fixture::new();
        fx.send(Command::AccelerometerCalibration, &[6]);
        assert!(fx.controller.sequence().is_temporary());

        fx.send(Command::ResetNavigation, &[]);
        assert!(!fx.controller.sequence().is_temporary());
    }

    #[test]
    fn test_gyro_calibration_runs_once_then_restores() {
        let mut fx = Fixture::new();
        fx.send(Command::ResetNavigation, &[]);
        fx.controller.filter_mut().aligned = true;
        fx.controller.run_sequence(&mut fx.replies);
        fx.controller.filter_mut().take_executed();

        fx.send(Command::GyroCalibration, &[]);
        fx.controller.run_sequence(&mut fx.replies);
        assert_eq!(
            fx.controller.filter_mut().take_executed(),
            vec![ProcessingStep::GyroCalibration]
        );

        fx.controller.run_sequence(&mut fx.replies);
        assert_eq!(fx.controller.filter_mut().take_executed(), NAVIGATION_CHAIN.to_vec());
    }

    #[test]
    fn test_double_calibration_rejected() {
        let mut fx = Fixture::new();
        fx.send(Command::GyroCalibration, &[]);
        fx.send(Command::AccelerometerCalibration, &[4]);

        assert!(fx.is_set(SoftFault::SequenceAlreadySaved));
        assert_eq!(fx.controller.filter().calibration_orientations, None);
        assert_eq!(
            fx.controller.sequence().get(0),
            Some(Step::Processing(ProcessingStep::GyroCalibration))
        );
    }

    #[test]
    fn test_accelerometer_calibration_setup() {
        let mut fx = Fixture::new();
        fx.send(Command::AccelerometerCalibration, &[6]);

        assert_eq!(fx.controller.filter().calibration_orientations, Some(6));
        assert_eq!(
            fx.controller.sequence().get(9),
            Some(Step::Control(ControlStep::CalibrationCheckpoint))
        );
    }

    #[test]
    fn test_low_pass_filter() {
        let mut fx = Fixture::new();
        fx.send(Command::SetLowPassFilter, &[4]);
        assert_eq!(fx.controller.sensor().filter_taps, Some(4));

        fx.send(Command::SetLowPassFilter, &[5]);
        assert_eq!(fx.controller.sensor().filter_taps, Some(4));
        assert!(fx.is_set(SoftFault::FilterTapsOutOfRange));
    }

    #[test]
    fn test_low_pass_filter_rejected_by_sensor() {
        let mut fx = Fixture::new();
        fx.controller.sensor_mut().fail_config = true;
        fx.send(Command::SetLowPassFilter, &[2]);

        assert_eq!(fx.controller.sensor().filter_taps, None);
        assert!(fx.is_set(SoftFault::SensorConfigFailed));
        assert!(!fx.is_set(SoftFault::FilterTapsOutOfRange));
        assert!(fx.replies.is_empty());
    }

    #[test]
    fn test_processing_step_onoff() {
        let mut fx = Fixture::new();
        fx.send(Command::ProcessingStepOnOff, &[step::ZUPT_DETECTOR, 1, 3]);
        assert_eq!(
            fx.controller.sequence().get(3),
            Some(Step::Processing(ProcessingStep::ZuptDetector))
        );

        fx.send(Command::ProcessingStepOnOff, &[0xEE, 0, 3]);
        assert_eq!(fx.controller.sequence().get(3), None);

        fx.send(Command::ProcessingStepOnOff, &[0xEE, 1, 3]);
        assert!(fx.is_set(SoftFault::UnknownStep));

        fx.send(Command::ProcessingStepOnOff, &[step::ZUPT_UPDATE, 1, 10]);
        assert!(fx.is_set(SoftFault::SequenceIndexOutOfRange));
    }

    #[test]
    fn test_clear_faults() {
        let mut fx = Fixture::new();
        fx.send(Command::SetLowPassFilter, &[9]);
        fx.send(Command::ClearFaults, &[]);
        assert_eq!(fx.controller.state().faults.flags(), 0);
    }
}
