//! Cycle orchestrator
//!
//! One cycle per sensor trigger:
//!
//! 1. take the trigger and advance the cycle counter
//! 2. burst-read the sensor
//! 3. run the process sequence
//! 4. receive pass (command handlers run here)
//! 5. select due outputs and run the transmit pass
//! 6. deadline check
//!
//! A trigger that arrives before step 6 means the cycle took longer than the
//! sensor period. The overrun is counted and flagged, and the next cycle
//! starts straight away on the pending trigger.

use openshoe_hal::{InertialSensor, SerialLink};

use crate::config::RuntimeConfig;
use crate::control::Controller;
use crate::engine::{CommandArgs, CommandHandler, ProtocolEngine, ReplyBuffer};
use crate::registry::{Command, Registry, RegistryError};
use crate::state::SoftFault;
use crate::traits::NavigationFilter;
use crate::trigger::{TriggerLine, TriggerReceiver};

/// Cycle counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleStats {
    /// Cycles run
    pub cycles: u32,
    /// Cycles that ran past the next trigger
    pub overruns: u32,
}

/// The whole runtime, driven by one trigger line
pub struct Runtime<'t, L, F, S> {
    link: L,
    trigger: TriggerReceiver<'t>,
    registry: Registry,
    engine: ProtocolEngine,
    controller: Controller<F, S>,
    config: RuntimeConfig,
    stats: CycleStats,
}

impl<'t, L, F, S> Runtime<'t, L, F, S>
where
    L: SerialLink,
    F: NavigationFilter,
    S: InertialSensor,
{
    /// Assemble a runtime over an already populated registry
    pub fn new(
        registry: Registry,
        trigger: &'t TriggerLine,
        link: L,
        filter: F,
        sensor: S,
        config: RuntimeConfig,
    ) -> Self {
        let controller = Controller::new(&registry, filter, sensor, &config);
        Self {
            link,
            trigger: trigger.receiver(),
            registry,
            engine: ProtocolEngine::new(),
            controller,
            config,
            stats: CycleStats::default(),
        }
    }

    /// Assemble a runtime with the standard command, step and state tables
    pub fn standard(
        trigger: &'t TriggerLine,
        link: L,
        filter: F,
        sensor: S,
        config: RuntimeConfig,
    ) -> Result<Self, RegistryError> {
        let registry = Registry::standard()?;
        Ok(Self::new(registry, trigger, link, filter, sensor, config))
    }

    /// Spin until the sensor triggers; returns the trigger timestamp
    pub fn wait_for_trigger(&mut self) -> u32 {
        loop {
            if let Some(timestamp) = self.trigger.try_take() {
                return timestamp;
            }
            core::hint::spin_loop();
        }
    }

    /// Run one cycle if a trigger is pending
    pub fn try_cycle(&mut self) -> bool {
        match self.trigger.try_take() {
            Some(timestamp) => {
                self.run_cycle(timestamp);
                true
            }
            None => false,
        }
    }

    /// Run the cycle body for a trigger taken at `now`
    pub fn run_cycle(&mut self, now: u32) {
        self.stats.cycles = self.stats.cycles.wrapping_add(1);
        self.controller.begin_cycle();

        self.controller.read_sensor();
        self.controller.run_sequence(self.engine.replies_mut());

        let mut dispatch = Dispatch {
            controller: &mut self.controller,
            registry: &self.registry,
        };
        self.engine.receive(
            &mut self.link,
            now,
            self.registry.commands(),
            &mut dispatch,
            &self.config,
        );

        // Detached: output counters hold and replies stay queued
        if self.link.is_attached() {
            let due = self.controller.outputs_mut().tick_and_select();
            self.engine.transmit(
                &mut self.link,
                &due,
                self.registry.states(),
                self.controller.state_mut(),
            );
        }

        if self.trigger.is_pending() {
            self.stats.overruns = self.stats.overruns.wrapping_add(1);
            self.controller.state_mut().faults.record_overrun();
            log_warn!("deadline overrun in cycle {=u32}", self.stats.cycles);
        }
    }

    /// Run cycles forever
    pub fn run(&mut self) -> ! {
        log_info!("runtime started");
        loop {
            let now = self.wait_for_trigger();
            self.run_cycle(now);
        }
    }

    pub fn controller(&self) -> &Controller<F, S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller<F, S> {
        &mut self.controller
    }

    pub fn engine(&self) -> &ProtocolEngine {
        &self.engine
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn stats(&self) -> &CycleStats {
        &self.stats
    }
}

/// Routes engine callbacks to the controller
struct Dispatch<'c, F, S> {
    controller: &'c mut Controller<F, S>,
    registry: &'c Registry,
}

impl<F, S> CommandHandler for Dispatch<'_, F, S>
where
    F: NavigationFilter,
    S: InertialSensor,
{
    fn handle(&mut self, command: Command, args: &CommandArgs<'_>, replies: &mut ReplyBuffer) {
        self.controller.handle(command, args, replies, self.registry);
    }

    fn raise(&mut self, fault: SoftFault) {
        self.controller.raise(fault);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{ControlStep, Step, NAVIGATION_CHAIN};
    use crate::registry::ProcessingStep;
    use crate::testing::{command_frame, parse_frames, RecordingFilter, ScriptedLink, ScriptedSensor};
    use openshoe_hal::ImuReadings;
    use openshoe_protocol::ids::{command, state as sid};
    use openshoe_protocol::DeviceFrame;

    type TestRuntime<'t> = Runtime<'t, ScriptedLink, RecordingFilter, ScriptedSensor>;

    fn runtime(line: &TriggerLine) -> TestRuntime<'_> {
        Runtime::standard(
            line,
            ScriptedLink::new(),
            RecordingFilter::default(),
            ScriptedSensor::default(),
            RuntimeConfig::default(),
        )
        .unwrap()
    }

    fn cycle(runtime: &mut TestRuntime<'_>, line: &TriggerLine, now: u32) {
        line.signal(now);
        assert!(runtime.try_cycle());
    }

    #[test]
    fn test_no_trigger_no_cycle() {
        let line = TriggerLine::new();
        let mut runtime = runtime(&line);
        assert!(!runtime.try_cycle());
        assert_eq!(runtime.stats().cycles, 0);
    }

    #[test]
    fn test_cycle_counter_report() {
        let line = TriggerLine::new();
        let mut runtime = runtime(&line);

        runtime
            .link_mut()
            .push_rx(&command_frame(command::OUTPUT_STATE, &[sid::CYCLE_COUNTER, 1]));
        cycle(&mut runtime, &line, 10);
        cycle(&mut runtime, &line, 20);

        assert_eq!(
            parse_frames(&runtime.link().tx),
            vec![
                DeviceFrame::Ack { header: command::OUTPUT_STATE },
                DeviceFrame::StateReport {
                    payload: heapless::Vec::from_slice(&[0, 0, 0, 1]).unwrap()
                },
                DeviceFrame::StateReport {
                    payload: heapless::Vec::from_slice(&[0, 0, 0, 2]).unwrap()
                },
            ]
        );
    }

    #[test]
    fn test_reset_then_alignment_then_navigation() {
        let line = TriggerLine::new();
        let mut runtime = runtime(&line);

        runtime
            .link_mut()
            .push_rx(&command_frame(command::RESET_ZUPT_AIDED_INS, &[]));
        cycle(&mut runtime, &line, 1);
        assert_eq!(
            runtime.controller().sequence().get(9),
            Some(Step::Control(ControlStep::FinishAlignment))
        );

        cycle(&mut runtime, &line, 2);
        assert_eq!(
            runtime.controller_mut().filter_mut().take_executed(),
            vec![ProcessingStep::UpdateBuffer, ProcessingStep::InitialAlignment]
        );

        runtime.controller_mut().filter_mut().aligned = true;
        cycle(&mut runtime, &line, 3);
        runtime.controller_mut().filter_mut().take_executed();

        cycle(&mut runtime, &line, 4);
        assert_eq!(
            runtime.controller_mut().filter_mut().take_executed(),
            NAVIGATION_CHAIN.to_vec()
        );
        assert_eq!(runtime.controller().sequence().slots().iter().flatten().count(), 5);
    }

    #[test]
    fn test_sensor_readings_reach_report() {
        let line = TriggerLine::new();
        let mut runtime = runtime(&line);
        runtime.controller_mut().sensor_mut().readings = ImuReadings {
            angular_rate: [0.25, 0.0, -1.0],
            ..ImuReadings::default()
        };

        runtime
            .link_mut()
            .push_rx(&command_frame(command::OUTPUT_STATE, &[sid::ANGULAR_RATE, 1]));
        cycle(&mut runtime, &line, 1);

        let frames = parse_frames(&runtime.link().tx);
        let Some(DeviceFrame::StateReport { payload }) = frames.last() else {
            panic!("expected report, got {:?}", frames);
        };
        let mut expected = std::vec::Vec::new();
        for value in [0.25f32, 0.0, -1.0] {
            expected.extend_from_slice(&value.to_be_bytes());
        }
        assert_eq!(payload.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_detached_link_holds_output() {
        let line = TriggerLine::new();
        let mut runtime = runtime(&line);
        runtime
            .controller_mut()
            .outputs_mut()
            .set_output(sid::CYCLE_COUNTER, 2)
            .unwrap();

        runtime.link_mut().attached = false;
        cycle(&mut runtime, &line, 1);
        cycle(&mut runtime, &line, 2);
        assert!(runtime.link().tx.is_empty());
        assert_eq!(runtime.controller().outputs().rate(sid::CYCLE_COUNTER).counter, 0);

        runtime.link_mut().attached = true;
        cycle(&mut runtime, &line, 3);
        assert_eq!(parse_frames(&runtime.link().tx).len(), 1);
    }

    struct SlowSensor {
        line: &'static TriggerLine,
    }

    impl InertialSensor for SlowSensor {
        type Error = ();

        fn burst_read(&mut self) -> Result<ImuReadings, ()> {
            // The next trigger fires while this cycle is still running
            self.line.signal(0);
            Ok(ImuReadings::default())
        }

        fn set_filter_taps(&mut self, _log2_taps: u8) -> Result<(), ()> {
            Ok(())
        }
    }

    #[test]
    fn test_deadline_overrun() {
        static LINE: TriggerLine = TriggerLine::new();
        let mut runtime = Runtime::standard(
            &LINE,
            ScriptedLink::new(),
            RecordingFilter::default(),
            SlowSensor { line: &LINE },
            RuntimeConfig::default(),
        )
        .unwrap();

        LINE.signal(0);
        assert!(runtime.try_cycle());
        assert_eq!(runtime.stats().overruns, 1);
        assert_eq!(runtime.controller().state().faults.overruns(), 1);
        assert!(runtime
            .controller()
            .state()
            .faults
            .is_set(SoftFault::DeadlineOverrun));

        // The coalesced trigger starts the next cycle immediately
        assert!(runtime.try_cycle());
        assert_eq!(runtime.stats().cycles, 2);
    }
}
