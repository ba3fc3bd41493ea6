//! Host-side doubles for the collaborator traits

use std::collections::VecDeque;
use std::vec::Vec;

use openshoe_hal::{ImuReadings, InertialSensor, SerialLink};
use openshoe_protocol::{encode_command, DeviceFrame, DeviceFrameParser, MAX_COMMAND_FRAME};

use crate::engine::{CommandArgs, CommandHandler, ReplyBuffer};
use crate::registry::{Command, ProcessingStep};
use crate::state::{NavState, SoftFault};
use crate::traits::{CalibrationEvent, NavigationFilter};

/// Encode a command frame with a valid checksum
pub fn command_frame(header: u8, payload: &[u8]) -> Vec<u8> {
    let mut buf = [0u8; MAX_COMMAND_FRAME];
    let len = encode_command(header, payload, &mut buf).unwrap();
    buf[..len].to_vec()
}

/// Parse every device frame in `bytes`
pub fn parse_frames(bytes: &[u8]) -> Vec<DeviceFrame> {
    let mut parser = DeviceFrameParser::new();
    bytes
        .iter()
        .filter_map(|&b| parser.feed(b).unwrap())
        .collect()
}

/// Serial link fed from a queue, recording everything written
#[derive(Debug)]
pub struct ScriptedLink {
    pub rx: VecDeque<u8>,
    pub tx: Vec<u8>,
    pub attached: bool,
    /// Total bytes the link accepts before reporting not ready
    pub tx_budget: Option<usize>,
    /// Refuse writes once this many bytes have been written
    pub fail_writes_after: Option<usize>,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self {
            rx: VecDeque::new(),
            tx: Vec::new(),
            attached: true,
            tx_budget: None,
            fail_writes_after: None,
        }
    }

    pub fn push_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }
}

impl SerialLink for ScriptedLink {
    type Error = ();

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }

    fn tx_ready(&self) -> bool {
        self.tx_budget.map_or(true, |budget| self.tx.len() < budget)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), ()> {
        if self.fail_writes_after.is_some_and(|limit| self.tx.len() >= limit) {
            return Err(());
        }
        self.tx.push(byte);
        Ok(())
    }
}

/// Command handler that records what it was given
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub calls: Vec<(Command, Vec<Vec<u8>>)>,
    pub faults: Vec<SoftFault>,
}

impl CommandHandler for RecordingHandler {
    fn handle(&mut self, command: Command, args: &CommandArgs<'_>, _replies: &mut ReplyBuffer) {
        let fields = (0..args.len())
            .filter_map(|i| args.field(i))
            .map(<[u8]>::to_vec)
            .collect();
        self.calls.push((command, fields));
    }

    fn raise(&mut self, fault: SoftFault) {
        self.faults.push(fault);
    }
}

/// Navigation filter that records executed steps
#[derive(Debug, Default)]
pub struct RecordingFilter {
    pub executed: Vec<ProcessingStep>,
    pub restarts: u32,
    pub aligned: bool,
    pub calibration_orientations: Option<u8>,
    pub calibration_events: VecDeque<CalibrationEvent>,
}

impl RecordingFilter {
    /// Take the steps executed since the last call
    pub fn take_executed(&mut self) -> Vec<ProcessingStep> {
        std::mem::take(&mut self.executed)
    }
}

impl NavigationFilter for RecordingFilter {
    fn execute(&mut self, step: ProcessingStep, imu: &ImuReadings, nav: &mut NavState) {
        self.executed.push(step);
        if step == ProcessingStep::ZuptDetector {
            nav.zupt = imu.angular_rate == [0.0; 3];
        }
    }

    fn restart(&mut self) {
        self.restarts += 1;
        self.aligned = false;
    }

    fn is_aligned(&self) -> bool {
        self.aligned
    }

    fn start_accelerometer_calibration(&mut self, orientations: u8) {
        self.calibration_orientations = Some(orientations);
    }

    fn poll_calibration(&mut self) -> Option<CalibrationEvent> {
        self.calibration_events.pop_front()
    }
}

/// Inertial sensor returning canned readings
#[derive(Debug, Default)]
pub struct ScriptedSensor {
    pub readings: ImuReadings,
    pub fail_reads: bool,
    pub fail_config: bool,
    pub filter_taps: Option<u8>,
}

impl InertialSensor for ScriptedSensor {
    type Error = ();

    fn burst_read(&mut self) -> Result<ImuReadings, ()> {
        if self.fail_reads {
            Err(())
        } else {
            Ok(self.readings)
        }
    }

    fn set_filter_taps(&mut self, log2_taps: u8) -> Result<(), ()> {
        if self.fail_config {
            return Err(());
        }
        self.filter_taps = Some(log2_taps);
        Ok(())
    }
}
